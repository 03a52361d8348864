//! 回复文本
//!
//! 所有播放错误在这里收敛为一行用户可见的文本

use crate::application::commands::{StartPlaybackResponse, StopPlaybackResponse};
use crate::application::PlaybackError;
use crate::domain::playback::DestinationId;

pub const GREETING: &str = "Hello! I'm working fine ✅";

pub const PONG: &str = "pong";

pub const USAGE: &str = "Usage:\n\
    /ping - check that the bot is alive\n\
    /play <url> - play the audio of a video in this chat's voice chat\n\
    /stop - stop playback";

pub const GENERIC_FAILURE: &str = "⚠️ Something went wrong, please try again later.";

pub fn playback_started(response: &StartPlaybackResponse) -> String {
    match &response.title {
        Some(title) => format!("▶️ Now playing: {}\nFile: {}", title, response.file_name),
        None => format!("▶️ Now playing: {}", response.file_name),
    }
}

pub fn playback_stopped(response: &StopPlaybackResponse) -> String {
    match response {
        StopPlaybackResponse::Stopped { .. } => "⏹ Playback stopped.".to_string(),
        StopPlaybackResponse::CancelPending { .. } => {
            "⏹ Stopping: the track was still loading and will not be played.".to_string()
        }
    }
}

/// 错误转回复文本；意外错误记录完整上下文
pub fn playback_failed(destination: DestinationId, err: &PlaybackError) -> String {
    match err {
        PlaybackError::UnexpectedFailure(_) => {
            tracing::error!(
                destination = %destination,
                error = %err,
                error_debug = ?err,
                "Unexpected failure while handling command"
            );
            return GENERIC_FAILURE.to_string();
        }
        other => {
            tracing::warn!(destination = %destination, error = %other, "Command failed");
        }
    }

    match err {
        PlaybackError::InvalidSource(_) => {
            format!("❌ Please provide a valid link.\n\n{}", USAGE)
        }
        PlaybackError::DownloadFailed(reason) => {
            format!("❌ Could not download audio: {}", reason)
        }
        PlaybackError::TranscodeUnavailable(_) => {
            "❌ This format cannot be played: no audio converter is installed.".to_string()
        }
        PlaybackError::DestinationUnavailable(_) => {
            "❌ I can't reach this chat. Make sure I'm a member with voice chat permissions."
                .to_string()
        }
        PlaybackError::AlreadyPlaying(_) => {
            "⚠️ Already playing in this chat. Use /stop first.".to_string()
        }
        PlaybackError::NotPlaying(_) => "⚠️ Nothing is playing right now.".to_string(),
        PlaybackError::AlreadyStopping(_) => "⏳ Playback is already stopping.".to_string(),
        PlaybackError::Cancelled(_) => "⏹ Playback was cancelled.".to_string(),
        PlaybackError::PlaybackStartFailed(_) => {
            "❌ Could not start playback. Is a voice chat active in this group?".to_string()
        }
        PlaybackError::UnexpectedFailure(_) => GENERIC_FAILURE.to_string(),
    }
}
