//! Clipboard  cross-platform clipboard helpers

use serde_json::Value;
use thiserror::Error;

use crate::model::tree::{NodeId, Tree};

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard error: {0}")]
    Clip(String),

    #[error("JSON序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 将文本复制到系统剪贴板
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    use copypasta::{ClipboardContext, ClipboardProvider};
    let mut ctx = ClipboardContext::new().map_err(|e| ClipboardError::Clip(e.to_string()))?;
    ctx.set_contents(text.to_string())
        .map_err(|e| ClipboardError::Clip(e.to_string()))
}

/// 将节点的JSON值（格式化）复制到系统剪贴板
pub fn copy_node_json(tree: &Tree, node: NodeId) -> Result<(), ClipboardError> {
    let text = serde_json::to_string_pretty(tree.value(node).unwrap_or(&Value::Null))?;
    copy_to_clipboard(&text)
}

/// 从系统剪贴板获取文本（用于测试）
#[cfg(test)]
pub fn get_clipboard_contents() -> Result<String, ClipboardError> {
    use copypasta::{ClipboardContext, ClipboardProvider};
    let mut ctx = ClipboardContext::new().map_err(|e| ClipboardError::Clip(e.to_string()))?;
    ctx.get_contents()
        .map_err(|e| ClipboardError::Clip(e.to_string()))
}
