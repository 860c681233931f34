use std::io;
use std::path::PathBuf;

use ncad_engine::errors::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("找不到命令文件 {path:?}")]
    SourceNotFound { path: PathBuf },
    #[error("读取命令文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("终端读写失败: {0}")]
    Terminal(#[from] io::Error),
    #[error("序列化文档失败: {0}")]
    Dump(#[from] serde_json::Error),
    #[error("渲染线程异常退出")]
    RenderThread,
}

/// 带行号与原始文本的单行错误。
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line_number}: {source} (in `{line}`)")]
pub struct LineError {
    pub line_number: usize,
    pub line: String,
    #[source]
    pub source: EngineError,
}
