//! Playback Context - 播放限界上下文
//!
//! 职责:
//! - 播放目标（聊天/群组）标识
//! - 音频来源校验
//! - 播放会话聚合及其状态迁移

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::PlaybackSession;
pub use errors::PlaybackDomainError;
pub use value_objects::{DestinationId, PlaybackState, SourceUrl};
