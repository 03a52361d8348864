//! Playback Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{DestinationId, PlaybackDomainError, PlaybackState, SourceUrl};

/// PlaybackSession 聚合根
///
/// 不变量:
/// - 每个 destination 同一时刻最多一个会话（由会话管理器保证）
/// - 会话从 Resolving 开始，只能迁移到 Playing，再到 Stopping
/// - Playing 状态下 resolved_path 一定存在
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackSession {
    id: Uuid,
    destination: DestinationId,
    source: SourceUrl,
    resolved_path: Option<PathBuf>,
    title: Option<String>,
    state: PlaybackState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlaybackSession {
    /// 创建新会话（Resolving）
    pub fn new(destination: DestinationId, source: SourceUrl) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            destination,
            source,
            resolved_path: None,
            title: None,
            state: PlaybackState::Resolving,
            created_at: now,
            updated_at: now,
        }
    }

    /// 记录解析出的本地文件，状态保持 Resolving
    pub fn attach_audio(
        &mut self,
        path: PathBuf,
        title: Option<String>,
    ) -> Result<(), PlaybackDomainError> {
        if self.state != PlaybackState::Resolving {
            return Err(PlaybackDomainError::InvalidTransition {
                from: self.state,
                to: PlaybackState::Resolving,
            });
        }
        self.resolved_path = Some(path);
        self.title = title;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// 语音通话端确认推流后进入 Playing
    pub fn mark_playing(&mut self) -> Result<(), PlaybackDomainError> {
        if self.state != PlaybackState::Resolving || self.resolved_path.is_none() {
            return Err(PlaybackDomainError::InvalidTransition {
                from: self.state,
                to: PlaybackState::Playing,
            });
        }
        self.state = PlaybackState::Playing;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// 开始停止
    pub fn begin_stopping(&mut self) -> Result<(), PlaybackDomainError> {
        if self.state != PlaybackState::Playing {
            return Err(PlaybackDomainError::InvalidTransition {
                from: self.state,
                to: PlaybackState::Stopping,
            });
        }
        self.state = PlaybackState::Stopping;
        self.updated_at = Utc::now();
        Ok(())
    }

    // ========== Getters ==========

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn destination(&self) -> DestinationId {
        self.destination
    }

    pub fn source(&self) -> &SourceUrl {
        &self.source
    }

    pub fn resolved_path(&self) -> Option<&Path> {
        self.resolved_path.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
