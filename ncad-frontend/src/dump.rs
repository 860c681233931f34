use ncad_core::document::Document;

use crate::errors::FrontendError;

/// 以格式化 JSON 输出文档，仅用于调试查看。
pub fn dump_document(document: &Document) -> Result<String, FrontendError> {
    Ok(serde_json::to_string_pretty(document)?)
}
