use crate::error::StoreError;
use crate::models::document::StoredDocument;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载一条试卷记录
pub async fn load_toml_to_document(toml_file_path: &Path) -> anyhow::Result<StoredDocument> {
    use anyhow::Context;

    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let document: StoredDocument = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(document)
}

/// 从文件夹中加载所有 TOML 试卷记录
///
/// 无法解析的文件只记录警告并跳过；文件夹不存在时返回空列表。
/// 结果按文件名排序，保证每次加载的顺序一致。
pub async fn load_all_toml_files(folder: &Path) -> Result<Vec<StoredDocument>, StoreError> {
    if !fs::try_exists(folder).await.unwrap_or(false) {
        tracing::debug!("存储目录不存在: {}", folder.display());
        return Ok(Vec::new());
    }

    let mut toml_files: Vec<PathBuf> = Vec::new();
    let mut entries = fs::read_dir(folder)
        .await
        .map_err(|e| StoreError::read_failed(folder, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StoreError::read_failed(folder, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut documents = Vec::with_capacity(toml_files.len());
    for path in toml_files {
        match load_toml_to_document(&path).await {
            Ok(document) => documents.push(document),
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(documents)
}

/// 将试卷记录写入 `<folder>/<id>.toml`
pub async fn save_document_to_toml(
    folder: &Path,
    document: &StoredDocument,
) -> Result<PathBuf, StoreError> {
    let path = folder.join(format!("{}.toml", document.id));

    let content =
        toml::to_string_pretty(document).map_err(|source| StoreError::TomlSerializeFailed {
            path: path.display().to_string(),
            source,
        })?;

    fs::create_dir_all(folder)
        .await
        .map_err(|e| StoreError::write_failed(folder, e))?;
    fs::write(&path, content)
        .await
        .map_err(|e| StoreError::write_failed(&path, e))?;

    Ok(path)
}
