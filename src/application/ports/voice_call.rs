//! Voice Call Port - 群组语音通话客户端抽象

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::playback::DestinationId;

/// 语音通话错误
#[derive(Debug, Error)]
pub enum VoiceCallError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    /// 通话端拒绝（无语音聊天、无权限、文件不可读等）
    #[error("Rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// 目标当前没有推流
    #[error("Not in call: {0}")]
    NotInCall(DestinationId),
}

/// Voice Call Port
#[async_trait]
pub trait VoiceCallPort: Send + Sync {
    /// 加入目标的语音聊天并开始推流本地文件
    async fn start_stream(&self, destination: DestinationId, path: &Path)
        -> Result<(), VoiceCallError>;

    /// 停止推流并离开语音聊天
    async fn stop_stream(&self, destination: DestinationId) -> Result<(), VoiceCallError>;
}
