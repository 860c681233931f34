pub mod cli;
pub mod dump;
pub mod errors;
pub mod loader;
pub mod render;
pub mod resource_locator;

use std::io::{self, Write};
use std::path::PathBuf;

use errors::FrontendError;
use ncad_config::{AppConfig, FrontendMode, InterpreterConfig};
use ncad_engine::interpreter::Interpreter;
use ncad_engine::lexer::Limits;
use ncad_engine::shared::SharedInterpreter;
use tracing::{info, warn};

use crate::cli::SessionEnd;
use crate::loader::ReplayOptions;
use crate::render::RenderWorker;
use crate::resource_locator::SourceLocator;

/// 一次运行的选项，由命令行参数与配置合并而来。
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub source: Option<PathBuf>,
    pub mode: FrontendMode,
    pub render: bool,
    pub dump_json: bool,
}

impl RunOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            source: None,
            mode: config.frontend.default_mode,
            render: config.frontend.render,
            dump_json: config.frontend.dump_json,
        }
    }
}

pub fn limits_from_config(config: &InterpreterConfig) -> Limits {
    Limits {
        max_command_len: config.max_command_len,
        max_argument_len: config.max_argument_len,
        max_arguments: config.max_arguments,
    }
}

/// 回放命令文件和/或运行交互会话，返回进程退出码。
///
/// 退出指令给出的退出码优先；否则回放中出现错误时返回 1。
pub fn run(options: &RunOptions, config: &AppConfig) -> Result<i32, FrontendError> {
    let shared = SharedInterpreter::new(Interpreter::with_limits(limits_from_config(
        &config.interpreter,
    )));
    let renderer = options.render.then(|| RenderWorker::spawn(shared.clone()));
    let stdout = io::stdout();
    let mut exit_code = 0;

    if let Some(source) = &options.source {
        let base_dir = std::env::current_dir().ok();
        let locator = SourceLocator::from_config(base_dir.as_deref(), config);
        let path = locator
            .resolve(source)
            .ok_or_else(|| FrontendError::SourceNotFound {
                path: source.clone(),
            })?;

        let summary = loader::replay_file(
            &shared,
            &path,
            &mut stdout.lock(),
            &mut io::stderr().lock(),
            ReplayOptions {
                stop_on_error: config.interpreter.stop_on_error,
            },
            renderer.as_ref(),
        )?;
        if !summary.is_clean() {
            warn!(failed = summary.errors.len(), "命令文件中存在执行失败的行");
            exit_code = 1;
        }
    }

    if options.mode == FrontendMode::Interactive {
        let end = cli::run_session(
            &shared,
            io::stdin().lock(),
            &mut stdout.lock(),
            &config.frontend.prompt,
            renderer.as_ref(),
        )?;
        if let SessionEnd::Quit(code) = end {
            exit_code = code;
        }
    }

    let mut out = stdout.lock();
    if let Some(worker) = renderer {
        let report = worker.finish()?;
        info!(frames = report.frames, fallbacks = report.last_stats.layer_fallbacks, "渲染结束");
        if let Some(frame) = report.last_frame {
            write!(out, "{frame}")?;
        }
    }
    if options.dump_json {
        let json = shared.read(|scene| dump::dump_document(scene.document()))?;
        writeln!(out, "{json}")?;
    }

    Ok(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_follow_interpreter_config() {
        let mut config = InterpreterConfig::default();
        config.max_arguments = 3;
        let limits = limits_from_config(&config);
        assert_eq!(limits.max_arguments, 3);
        assert_eq!(limits.max_command_len, Limits::default().max_command_len);
        assert_eq!(limits.max_argument_len, Limits::default().max_argument_len);
    }

    #[test]
    fn missing_source_is_reported() {
        let options = RunOptions {
            source: Some(PathBuf::from("no/such/drawing.ncad")),
            ..RunOptions::default()
        };
        let err = run(&options, &AppConfig::default()).unwrap_err();
        assert!(matches!(err, FrontendError::SourceNotFound { .. }));
    }
}
