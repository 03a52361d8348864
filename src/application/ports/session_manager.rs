//! Session Manager Port - 播放会话生命周期管理
//!
//! 定义会话管理的抽象接口，具体实现在 infrastructure/memory 层
//! 以 destination 为键，同一 destination 最多一个会话

use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::playback::{DestinationId, PlaybackSession, PlaybackState, SourceUrl};

/// Session Manager 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No session for destination {0}")]
    NotFound(DestinationId),

    #[error("Destination {destination} already has a {state} session")]
    AlreadyActive {
        destination: DestinationId,
        state: PlaybackState,
    },

    #[error("Session for destination {0} is already stopping")]
    AlreadyStopping(DestinationId),

    /// 会话在解析期间被 stop 标记取消
    #[error("Session {0} was cancelled")]
    Cancelled(Uuid),

    /// 会话已被替换或移除
    #[error("Session {0} is no longer current")]
    Stale(Uuid),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// stop 请求的处理方式
#[derive(Debug, Clone)]
pub enum StopRequest {
    /// 会话仍在解析，已标记取消，结果到达后丢弃
    CancelPending(PlaybackSession),
    /// 会话已进入 Stopping，调用方负责停止推流并移除
    Stop(PlaybackSession),
}

/// Session Manager Port
///
/// 所有方法都是同步的，单个 destination 的检查与修改在一次调用内原子完成
pub trait PlaybackSessionPort: Send + Sync {
    /// 为 destination 创建 Resolving 会话；已有会话时拒绝
    fn reserve(
        &self,
        destination: DestinationId,
        source: SourceUrl,
    ) -> Result<PlaybackSession, SessionError>;

    /// 当前状态，无会话时为 Idle
    fn state_of(&self, destination: DestinationId) -> PlaybackState;

    /// 记录解析结果；会话已被标记取消时返回 Cancelled
    fn attach_audio(
        &self,
        destination: DestinationId,
        session_id: Uuid,
        path: PathBuf,
        title: Option<String>,
    ) -> Result<PlaybackSession, SessionError>;

    /// 推流确认后迁移到 Playing；会话已被标记取消时返回 Cancelled
    fn mark_playing(
        &self,
        destination: DestinationId,
        session_id: Uuid,
    ) -> Result<PlaybackSession, SessionError>;

    /// 处理 stop 请求
    fn request_stop(&self, destination: DestinationId) -> Result<StopRequest, SessionError>;

    /// 移除会话；只有 session_id 匹配时才移除
    fn release(&self, destination: DestinationId, session_id: Uuid) -> Option<PlaybackSession>;

    /// 是否有会话引用该文件
    fn is_path_in_use(&self, path: &Path) -> bool;

    /// 所有会话
    fn list_all(&self) -> Vec<PlaybackSession>;
}
