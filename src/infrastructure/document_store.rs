//! 试卷存储 - 基础设施层
//!
//! 持久化本身属于外部 CRUD 层，这里只提供分析流程需要的最小接口，
//! 以及一个基于文件夹的实现和一个内存实现。

use crate::error::StoreError;
use crate::models::loaders::{load_all_toml_files, save_document_to_toml};
use crate::models::StoredDocument;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// 试卷存储接口
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 保存一份试卷（含原始文件）
    async fn insert(&self, document: StoredDocument) -> Result<(), StoreError>;

    /// 按科目代码查询，顺序固定
    async fn find_by_subject(&self, subject_code: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// 读取原始扫描件字节
    async fn load_raw_file(&self, id: &str) -> Result<Vec<u8>, StoreError>;
}

/// 文件夹存储：`<id>.toml` 保存元数据和全文，`<id>.<扩展名>` 保存原始文件
pub struct TomlFolderStore {
    folder: PathBuf,
}

impl TomlFolderStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn raw_file_path(&self, document: &StoredDocument) -> PathBuf {
        self.folder
            .join(format!("{}.{}", document.id, document.file_extension))
    }

    async fn find_by_id(&self, id: &str) -> Result<StoredDocument, StoreError> {
        load_all_toml_files(&self.folder)
            .await?
            .into_iter()
            .find(|doc| doc.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }
}

#[async_trait]
impl DocumentStore for TomlFolderStore {
    async fn insert(&self, document: StoredDocument) -> Result<(), StoreError> {
        let toml_path = save_document_to_toml(&self.folder, &document).await?;

        let raw_path = self.raw_file_path(&document);
        fs::write(&raw_path, &document.raw_file_bytes)
            .await
            .map_err(|e| StoreError::write_failed(&raw_path, e))?;

        debug!("试卷已保存: {}", toml_path.display());
        Ok(())
    }

    async fn find_by_subject(&self, subject_code: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let documents = load_all_toml_files(&self.folder).await?;
        Ok(documents
            .into_iter()
            .filter(|doc| doc.subject_code == subject_code)
            .collect())
    }

    async fn load_raw_file(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let document = self.find_by_id(id).await?;
        let raw_path = self.raw_file_path(&document);
        fs::read(&raw_path)
            .await
            .map_err(|e| StoreError::read_failed(&raw_path, e))
    }
}

/// 内存存储，按插入顺序返回
#[derive(Default)]
pub struct InMemoryStore {
    documents: RwLock<Vec<StoredDocument>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<StoredDocument>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert(&self, document: StoredDocument) -> Result<(), StoreError> {
        self.documents.write().await.push(document);
        Ok(())
    }

    async fn find_by_subject(&self, subject_code: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|doc| doc.subject_code == subject_code)
            .cloned()
            .collect())
    }

    async fn load_raw_file(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        self.documents
            .read()
            .await
            .iter()
            .find(|doc| doc.id == id)
            .map(|doc| doc.raw_file_bytes.clone())
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentMeta, TestType};

    fn document(subject: &str, text: &str) -> StoredDocument {
        let meta = DocumentMeta {
            subject_code: subject.to_string(),
            exam_period: "Jun 2024".to_string(),
            academic_year: "2023/2024".to_string(),
            test_type: TestType::Regular,
        };
        StoredDocument::new(&meta, text.to_string(), "png", vec![0x89, 0x50])
    }

    #[tokio::test]
    async fn test_folder_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlFolderStore::new(dir.path());

        let doc = document("CS302", "1. Explain recursion");
        let id = doc.id.clone();
        store.insert(doc).await.unwrap();
        store.insert(document("MA101", "1. Integrate x")).await.unwrap();

        let found = store.find_by_subject("CS302").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_text, "1. Explain recursion");
        assert_eq!(store.load_raw_file(&id).await.unwrap(), vec![0x89, 0x50]);
    }

    #[tokio::test]
    async fn test_folder_store_skips_broken_records() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [valid").unwrap();
        let store = TomlFolderStore::new(dir.path());
        store.insert(document("CS302", "1. Q")).await.unwrap();

        assert_eq!(store.find_by_subject("CS302").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_folder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlFolderStore::new(dir.path().join("nope"));
        assert!(store.find_by_subject("CS302").await.unwrap().is_empty());
    }

    #[test]
    fn test_in_memory_store_keeps_insert_order() {
        let store = InMemoryStore::new();
        tokio_test::block_on(async {
            store.insert(document("CS302", "a")).await.unwrap();
            store.insert(document("CS302", "b")).await.unwrap();
            let texts: Vec<String> = store
                .find_by_subject("CS302")
                .await
                .unwrap()
                .into_iter()
                .map(|d| d.full_text)
                .collect();
            assert_eq!(texts, vec!["a", "b"]);
            assert!(matches!(
                store.load_raw_file("missing").await,
                Err(StoreError::NotFound { .. })
            ));
        });
    }
}
