//! 交互式会话：提示、读取一行、执行、输出结果。

use std::io::{BufRead, Write};

use ncad_engine::shared::SharedInterpreter;
use tracing::{debug, info};

use crate::errors::FrontendError;
use crate::loader::decode_line;
use crate::render::RenderWorker;

/// 会话结束方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    EndOfInput,
    Quit(i32),
}

/// 识别 `quit [code]` / `exit [code]`。返回 `None` 表示普通命令行。
///
/// 退出码限定在 0..=255，超出范围视为错误。
pub fn parse_quit(line: &str) -> Option<Result<i32, String>> {
    let mut words = line.split_whitespace();
    let directive = words.next()?;
    if !matches!(directive, "quit" | "exit") {
        return None;
    }

    let code = match (words.next(), words.next()) {
        (None, _) => Ok(0),
        (Some(code), None) => code
            .parse::<u8>()
            .map(i32::from)
            .map_err(|_| format!("invalid exit code '{code}', expected 0 to 255")),
        (Some(_), Some(extra)) => Err(format!("unexpected argument '{extra}' for '{directive}'")),
    };
    Some(code)
}

/// 运行交互会话直到输入结束或遇到退出指令。
pub fn run_session<R, W>(
    shared: &SharedInterpreter,
    mut input: R,
    out: &mut W,
    prompt: &str,
    renderer: Option<&RenderWorker>,
) -> Result<SessionEnd, FrontendError>
where
    R: BufRead,
    W: Write,
{
    info!("进入交互会话");
    let mut buffer = Vec::new();
    loop {
        write!(out, "{prompt}")?;
        out.flush()?;

        buffer.clear();
        if input.read_until(b'\n', &mut buffer)? == 0 {
            writeln!(out)?;
            return Ok(SessionEnd::EndOfInput);
        }
        let line = decode_line(&buffer);
        let text = line.as_str();

        match parse_quit(text) {
            Some(Ok(code)) => {
                writeln!(out, "Bye!")?;
                info!(code, "会话结束");
                return Ok(SessionEnd::Quit(code));
            }
            Some(Err(message)) => {
                writeln!(out, "Error: {message}")?;
                continue;
            }
            None => {}
        }

        match shared.execute_line(text) {
            Ok(response) => {
                if let Some(message) = response.message {
                    writeln!(out, "{message}")?;
                }
                if let Some(worker) = renderer {
                    worker.request_frame();
                }
            }
            Err(err) => {
                debug!(kind = err.kind(), "交互命令失败");
                writeln!(out, "Error: {err}")?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncad_engine::interpreter::Interpreter;
    use std::io::Cursor;

    fn session(input: &str) -> (SessionEnd, String, SharedInterpreter) {
        let shared = SharedInterpreter::new(Interpreter::new());
        let mut out = Vec::new();
        let end = run_session(&shared, Cursor::new(input), &mut out, "> ", None)
            .expect("session");
        (end, String::from_utf8(out).expect("utf8"), shared)
    }

    #[test]
    fn parses_quit_directives() {
        assert_eq!(parse_quit("quit"), Some(Ok(0)));
        assert_eq!(parse_quit("  exit 3 "), Some(Ok(3)));
        assert!(matches!(parse_quit("quit soon"), Some(Err(_))));
        assert!(matches!(parse_quit("exit 1 2"), Some(Err(_))));
        assert_eq!(parse_quit("exit 255"), Some(Ok(255)));
        assert!(matches!(parse_quit("quit 300"), Some(Err(_))));
        assert!(matches!(parse_quit("quit -1"), Some(Err(_))));
        assert_eq!(parse_quit("line x0;y0, w1"), None);
        assert_eq!(parse_quit(""), None);
    }

    #[test]
    fn quit_ends_with_code_and_farewell() {
        let (end, out, shared) = session("line x0;y0, w5\nexit 4\nline x0;y0, w6\n");
        assert_eq!(end, SessionEnd::Quit(4));
        assert!(out.ends_with("Bye!\n"));
        assert_eq!(shared.read(|scene| scene.document().objects().len()), 1);
    }

    #[test]
    fn out_of_range_exit_code_keeps_session_open() {
        let (end, out, _) = session("quit 300\nquit 2\n");
        assert_eq!(end, SessionEnd::Quit(2));
        assert!(out.contains("Error: invalid exit code '300', expected 0 to 255"));
    }

    #[test]
    fn invalid_utf8_input_is_reported_not_fatal() {
        let shared = SharedInterpreter::new(Interpreter::new());
        let mut out = Vec::new();
        let input: &[u8] = b"line x0;y0, w\xff\nline x0;y0, w3\n";
        let end = run_session(&shared, Cursor::new(input), &mut out, "> ", None)
            .expect("session");
        assert_eq!(end, SessionEnd::EndOfInput);
        assert!(String::from_utf8(out).expect("utf8").contains("Error: "));
        assert_eq!(shared.read(|scene| scene.document().objects().len()), 1);
    }

    #[test]
    fn errors_are_reported_and_session_continues() {
        let (end, out, shared) = session("frobnicate\nset $w, 2\ninspect $w\n");
        assert_eq!(end, SessionEnd::EndOfInput);
        assert!(out.contains("Error: unknown command 'frobnicate'"));
        assert!(out.contains("Name: w - Value: 2.000000"));
        assert_eq!(shared.read(|scene| scene.history().len()), 2);
    }
}
