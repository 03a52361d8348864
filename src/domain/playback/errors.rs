//! Playback Context - Errors

use thiserror::Error;

use super::PlaybackState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackDomainError {
    #[error("音频来源不能为空")]
    EmptySource,

    #[error("非法的状态迁移: {from} -> {to}")]
    InvalidTransition {
        from: PlaybackState,
        to: PlaybackState,
    },
}
