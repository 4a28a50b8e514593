use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从本地文件读取的学习资料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedMaterial {
    /// 默认标题（文件名去掉扩展名）
    pub title: String,
    /// 文件全文
    pub content: String,
}

/// 读取本地文本文件作为自定义资料
///
/// 只要求文件是可读的 UTF-8 文本，不校验格式。
pub async fn load_material_file(path: &Path) -> Result<ImportedMaterial> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("无法读取资料文件: {}", path.display()))?;

    let content = String::from_utf8(bytes)
        .with_context(|| format!("资料文件不是 UTF-8 文本: {}", path.display()))?;

    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    tracing::info!(
        "已读取资料文件 {} ({} 字符)",
        path.display(),
        content.chars().count()
    );

    Ok(ImportedMaterial { title, content })
}
