//! 应用层错误定义
//!
//! 播放相关命令的统一错误类型，在命令路由边界被转换为文本回复

use thiserror::Error;

use crate::application::ports::{DestinationError, ResolveError, VoiceCallError};
use crate::domain::playback::DestinationId;

/// 播放错误
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// 来源为空或格式错误
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// 提取工具没有产出可用音频流
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// 需要转码但宿主机上没有转码工具
    #[error("Transcoder unavailable: {0}")]
    TranscodeUnavailable(String),

    /// bot 无法访问目标聊天
    #[error("Destination unavailable: {0}")]
    DestinationUnavailable(String),

    #[error("Destination {0} is already playing")]
    AlreadyPlaying(DestinationId),

    #[error("Nothing is playing in destination {0}")]
    NotPlaying(DestinationId),

    #[error("Playback in destination {0} is already stopping")]
    AlreadyStopping(DestinationId),

    /// 解析期间收到 stop，结果已丢弃
    #[error("Playback in destination {0} was cancelled before it started")]
    Cancelled(DestinationId),

    /// 语音通话端拒绝推流
    #[error("Playback start failed: {0}")]
    PlaybackStartFailed(String),

    /// 分类之外的协作方错误
    #[error("Unexpected failure: {0}")]
    UnexpectedFailure(String),
}

impl PlaybackError {
    /// 创建 UnexpectedFailure 错误
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedFailure(message.into())
    }

    /// 是否为需要完整记录上下文的意外错误
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::UnexpectedFailure(_))
    }
}

impl From<ResolveError> for PlaybackError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidSource(msg) => Self::InvalidSource(msg),
            ResolveError::DownloadFailed(msg) => Self::DownloadFailed(msg),
            ResolveError::TranscodeUnavailable(msg) => Self::TranscodeUnavailable(msg),
            other => Self::UnexpectedFailure(other.to_string()),
        }
    }
}

impl From<DestinationError> for PlaybackError {
    fn from(err: DestinationError) -> Self {
        match err {
            DestinationError::NotMember(_) | DestinationError::Unreachable(_) => {
                Self::DestinationUnavailable(err.to_string())
            }
            DestinationError::NetworkError(msg) => Self::UnexpectedFailure(msg),
        }
    }
}

impl From<VoiceCallError> for PlaybackError {
    fn from(err: VoiceCallError) -> Self {
        Self::PlaybackStartFailed(err.to_string())
    }
}
