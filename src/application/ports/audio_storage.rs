//! Audio Storage Port - 出站端口
//!
//! 定义下载目录中音频文件的定位、清理接口

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::AudioFormat;

/// 音频存储错误
#[derive(Debug, Error)]
pub enum AudioStorageError {
    #[error("Path is outside the download directory: {0}")]
    OutsideStore(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 清理结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepResult {
    /// 删除的文件数量
    pub deleted_files: u64,
    /// 释放的空间（字节）
    pub freed_bytes: u64,
}

/// Audio Storage Port - 出站端口
#[async_trait]
pub trait AudioStoragePort: Send + Sync {
    /// 下载目录
    fn download_dir(&self) -> PathBuf;

    /// 归一化文件路径：`{download_dir}/{stem}.{ext}`
    fn normalized_path(&self, stem: &str, format: AudioFormat) -> PathBuf {
        self.download_dir()
            .join(format!("{}.{}", stem, format.extension()))
    }

    /// 已存在的归一化文件
    async fn find_normalized(&self, stem: &str, format: AudioFormat) -> Option<PathBuf>;

    /// 删除 `{stem}.*` 的所有产物（含 .part / .tmp），返回删除数量
    async fn purge_artifacts(&self, stem: &str) -> Result<u64, AudioStorageError>;

    /// 删除单个文件，文件不存在时返回 Ok(false)
    async fn delete_file(&self, path: &Path) -> Result<bool, AudioStorageError>;

    /// 启动清理：删除所有非 `keep_format` 的文件
    async fn sweep_stale(&self, keep_format: AudioFormat) -> Result<SweepResult, AudioStorageError>;
}
