//! Audio Resolver Port - 远程音频解析为本地可播放文件

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use super::{AudioFormat, MediaLease};

/// 解析错误
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Transcoder unavailable: {0}")]
    TranscodeUnavailable(String),

    #[error("Transcode failed: {0}")]
    TranscodeFailed(String),

    #[error("Resolve worker unavailable: {0}")]
    WorkerUnavailable(String),
}

/// 解析结果
#[derive(Debug, Clone)]
pub struct ResolvedAudio {
    /// 本地文件路径（位于下载目录内）
    pub path: PathBuf,
    pub title: Option<String>,
    /// 提取到的原始扩展名
    pub source_ext: String,
    /// 最终文件格式
    pub format: AudioFormat,
    /// 是否进行了转码
    pub normalized: bool,
    /// 文件交给会话之前的租约，持有期间文件不会被删除
    pub lease: Option<MediaLease>,
}

impl ResolvedAudio {
    /// 本地文件名
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Audio Resolver Port
///
/// 播放管理器只依赖这个接口；实现可以直接执行，也可以投递到 worker 池
#[async_trait]
pub trait AudioResolverPort: Send + Sync {
    async fn resolve(&self, source_url: &str) -> Result<ResolvedAudio, ResolveError>;
}
