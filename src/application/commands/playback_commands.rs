//! Playback Commands - 播放相关命令

use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::playback::DestinationId;

/// 开始播放命令
#[derive(Debug, Clone)]
pub struct StartPlaybackCommand {
    pub destination: DestinationId,
    pub source: String,
}

/// 开始播放响应
#[derive(Debug, Clone)]
pub struct StartPlaybackResponse {
    pub session_id: Uuid,
    pub destination: DestinationId,
    pub path: PathBuf,
    pub file_name: String,
    pub title: Option<String>,
    pub transcoded: bool,
}

/// 停止播放命令
#[derive(Debug, Clone)]
pub struct StopPlaybackCommand {
    pub destination: DestinationId,
}

/// 停止播放响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopPlaybackResponse {
    /// 推流已停止，会话已移除
    Stopped {
        session_id: Uuid,
        file_deleted: bool,
    },
    /// 会话仍在解析，已标记取消
    CancelPending { session_id: Uuid },
}
