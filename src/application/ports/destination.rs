//! Destination Probe Port - 目标可达性检查
//!
//! 由消息客户端实现：bot 是否仍是目标聊天的成员

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::playback::DestinationId;

#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("Bot is not a member of {0}")]
    NotMember(DestinationId),

    #[error("Destination unreachable: {0}")]
    Unreachable(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

#[async_trait]
pub trait DestinationProbePort: Send + Sync {
    async fn check(&self, destination: DestinationId) -> Result<(), DestinationError>;
}
