//! File Storage - 下载目录音频文件管理
//!
//! 实现 AudioStoragePort trait

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::application::ports::{AudioFormat, AudioStorageError, AudioStoragePort, SweepResult};

/// 文件系统音频存储
pub struct FileAudioStorage {
    /// 下载目录
    base_dir: PathBuf,
}

impl FileAudioStorage {
    /// 创建新的文件存储，目录不存在时创建
    ///
    /// 根目录取规范化的绝对路径，与外部工具输出的路径可以直接比较
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, AudioStorageError> {
        let base_dir = base_dir.as_ref();

        fs::create_dir_all(base_dir)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        let base_dir = fs::canonicalize(base_dir)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    fn is_inside(&self, path: &Path) -> bool {
        path.starts_with(&self.base_dir)
            && !path.components().any(|c| matches!(c, Component::ParentDir))
    }

    /// 下载目录中的普通文件
    async fn list_files(&self) -> Result<Vec<(PathBuf, u64)>, AudioStorageError> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?
        {
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if metadata.is_file() {
                files.push((entry.path(), metadata.len()));
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl AudioStoragePort for FileAudioStorage {
    fn download_dir(&self) -> PathBuf {
        self.base_dir.clone()
    }

    async fn find_normalized(&self, stem: &str, format: AudioFormat) -> Option<PathBuf> {
        let path = self.normalized_path(stem, format);
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() && metadata.len() > 0 => Some(path),
            _ => None,
        }
    }

    async fn purge_artifacts(&self, stem: &str) -> Result<u64, AudioStorageError> {
        let prefix = format!("{}.", stem);
        let mut deleted = 0u64;

        for (path, _) in self.list_files().await? {
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with(&prefix));
            if !matches {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => deleted += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(AudioStorageError::IoError(e.to_string())),
            }
        }

        if deleted > 0 {
            tracing::debug!(stem = %stem, files = deleted, "Purged artifacts");
        }
        Ok(deleted)
    }

    async fn delete_file(&self, path: &Path) -> Result<bool, AudioStorageError> {
        if !self.is_inside(path) {
            return Err(AudioStorageError::OutsideStore(
                path.to_string_lossy().to_string(),
            ));
        }

        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted audio file");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AudioStorageError::IoError(e.to_string())),
        }
    }

    async fn sweep_stale(&self, keep_format: AudioFormat) -> Result<SweepResult, AudioStorageError> {
        let mut result = SweepResult::default();
        let keep_ext = keep_format.extension();

        for (path, size) in self.list_files().await? {
            let keep = path
                .extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| e.eq_ignore_ascii_case(keep_ext));
            if keep {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => {
                    result.deleted_files += 1;
                    result.freed_bytes += size;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to sweep file");
                }
            }
        }

        tracing::info!(
            "Swept download dir: files={}, freed={} bytes",
            result.deleted_files,
            result.freed_bytes
        );
        Ok(result)
    }
}
