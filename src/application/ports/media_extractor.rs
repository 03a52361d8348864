//! Media Extractor Port - 远程媒体提取抽象
//!
//! 定义从远程 URL 获取元数据和最佳音频流的接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 提取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Extractor not found: {0}")]
    ToolMissing(String),

    /// 网络错误、视频不可用、地区/年龄限制、URL 不支持等
    #[error("Extraction failed: {0}")]
    Failed(String),

    #[error("Extraction timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid extractor output: {0}")]
    InvalidOutput(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 媒体元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    /// 来源站点内的唯一 ID
    pub id: String,
    /// 提取器名称（如 "Youtube"）
    pub extractor: String,
    /// 最佳音频流的扩展名
    pub ext: String,
    pub title: Option<String>,
}

/// 生成下载文件名（不含扩展名）
///
/// 只使用提取器和媒体 ID，不使用任何用户输入的文本
pub fn media_file_stem(extractor: &str, media_id: &str) -> String {
    let key = format!("{}:{}", extractor.to_lowercase(), media_id);
    format!("{:x}", md5::compute(key.as_bytes()))
}

/// Media Extractor Port
#[async_trait]
pub trait MediaExtractorPort: Send + Sync {
    /// 获取媒体元数据（不下载）
    async fn probe(&self, url: &str) -> Result<MediaInfo, ExtractError>;

    /// 下载最佳音频流到 `dest_dir/{stem}.{ext}`，返回实际文件路径
    async fn download(
        &self,
        url: &str,
        info: &MediaInfo,
        dest_dir: &Path,
        stem: &str,
    ) -> Result<PathBuf, ExtractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_is_stable_and_hex() {
        let a = media_file_stem("Youtube", "dQw4w9WgXcQ");
        let b = media_file_stem("youtube", "dQw4w9WgXcQ");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_stem_differs_per_media() {
        assert_ne!(
            media_file_stem("youtube", "video1"),
            media_file_stem("youtube", "video2")
        );
        assert_ne!(
            media_file_stem("youtube", "video1"),
            media_file_stem("vimeo", "video1")
        );
    }

    #[test]
    fn test_stem_never_contains_path_characters() {
        let stem = media_file_stem("generic", "../../etc/passwd");
        assert!(!stem.contains('/'));
        assert!(!stem.contains('.'));
    }
}
