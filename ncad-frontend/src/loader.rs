//! 命令文件回放：逐行执行，出错时报告行号并按配置继续或停止。

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use ncad_engine::shared::SharedInterpreter;
use tracing::{debug, info, warn};

use crate::errors::{FrontendError, LineError};
use crate::render::RenderWorker;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    pub stop_on_error: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    pub lines: usize,
    pub executed: usize,
    /// 未命中的 `inspect` 等非致命失败。
    pub soft_failures: usize,
    pub errors: Vec<LineError>,
    pub stopped_early: bool,
}

impl ReplaySummary {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// 逐行回放 `reader`。命令输出写入 `out`，诊断信息写入 `diag`。
///
/// 非 UTF-8 字节按替换字符处理，不中断回放。
pub fn replay<R, W, E>(
    shared: &SharedInterpreter,
    mut reader: R,
    out: &mut W,
    diag: &mut E,
    options: ReplayOptions,
    renderer: Option<&RenderWorker>,
) -> Result<ReplaySummary, FrontendError>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut summary = ReplaySummary::default();
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        let line = decode_line(&buffer);
        summary.lines += 1;
        let line_number = summary.lines;

        match shared.execute_line(&line) {
            Ok(response) => {
                if let Some(message) = &response.message {
                    writeln!(out, "{message}")?;
                }
                if response.success {
                    summary.executed += 1;
                } else {
                    summary.soft_failures += 1;
                }
                if let Some(worker) = renderer {
                    worker.request_frame();
                }
            }
            Err(source) => {
                let error = LineError {
                    line_number,
                    line: line.clone(),
                    source,
                };
                warn!(line_number, kind = error.source.kind(), "命令行执行失败");
                writeln!(diag, "{error}")?;
                summary.errors.push(error);
                if options.stop_on_error {
                    summary.stopped_early = true;
                    break;
                }
            }
        }
    }

    debug!(?summary, "回放结束");
    Ok(summary)
}

/// 去掉行尾换行并解码；无效 UTF-8 序列记录警告后替换。
pub(crate) fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let text = String::from_utf8_lossy(bytes);
    if let Cow::Owned(_) = text {
        warn!("输入行包含无效的 UTF-8 字节，已替换");
    }
    text.into_owned()
}

/// 打开并回放命令文件。
pub fn replay_file<W: Write, E: Write>(
    shared: &SharedInterpreter,
    path: &Path,
    out: &mut W,
    diag: &mut E,
    options: ReplayOptions,
    renderer: Option<&RenderWorker>,
) -> Result<ReplaySummary, FrontendError> {
    let file = File::open(path).map_err(|source| FrontendError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "开始回放命令文件");
    let summary = replay(shared, BufReader::new(file), out, diag, options, renderer)?;
    info!(
        path = %path.display(),
        lines = summary.lines,
        executed = summary.executed,
        failed = summary.errors.len(),
        "命令文件回放完成"
    );
    Ok(summary)
}
