//! In-Memory Playback Session Manager Implementation

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::ports::{PlaybackSessionPort, SessionError, StopRequest};
use crate::domain::playback::{DestinationId, PlaybackSession, PlaybackState, SourceUrl};

struct SessionEntry {
    session: PlaybackSession,
    /// stop 在 Resolving 期间到达时触发
    cancel: CancellationToken,
}

/// 内存会话管理器
///
/// destination -> 会话，DashMap 的 entry 锁保证单个 destination 上的检查与修改原子完成
pub struct InMemoryPlaybackSessions {
    sessions: DashMap<DestinationId, SessionEntry>,
}

impl InMemoryPlaybackSessions {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }
}

impl Default for InMemoryPlaybackSessions {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSessionPort for InMemoryPlaybackSessions {
    fn reserve(
        &self,
        destination: DestinationId,
        source: SourceUrl,
    ) -> Result<PlaybackSession, SessionError> {
        match self.sessions.entry(destination) {
            Entry::Occupied(entry) => {
                let state = entry.get().session.state();
                Err(SessionError::AlreadyActive { destination, state })
            }
            Entry::Vacant(entry) => {
                let session = PlaybackSession::new(destination, source);
                entry.insert(SessionEntry {
                    session: session.clone(),
                    cancel: CancellationToken::new(),
                });
                tracing::debug!(
                    destination = %destination,
                    session_id = %session.id(),
                    "Session reserved"
                );
                Ok(session)
            }
        }
    }

    fn state_of(&self, destination: DestinationId) -> PlaybackState {
        self.sessions
            .get(&destination)
            .map(|e| e.session.state())
            .unwrap_or(PlaybackState::Idle)
    }

    fn attach_audio(
        &self,
        destination: DestinationId,
        session_id: Uuid,
        path: PathBuf,
        title: Option<String>,
    ) -> Result<PlaybackSession, SessionError> {
        let mut entry = self
            .sessions
            .get_mut(&destination)
            .filter(|e| e.session.id() == session_id)
            .ok_or(SessionError::Stale(session_id))?;

        if entry.cancel.is_cancelled() {
            return Err(SessionError::Cancelled(session_id));
        }

        entry
            .session
            .attach_audio(path, title)
            .map_err(|e| SessionError::InvalidOperation(e.to_string()))?;
        Ok(entry.session.clone())
    }

    fn mark_playing(
        &self,
        destination: DestinationId,
        session_id: Uuid,
    ) -> Result<PlaybackSession, SessionError> {
        let mut entry = self
            .sessions
            .get_mut(&destination)
            .filter(|e| e.session.id() == session_id)
            .ok_or(SessionError::Stale(session_id))?;

        if entry.cancel.is_cancelled() {
            return Err(SessionError::Cancelled(session_id));
        }

        entry
            .session
            .mark_playing()
            .map_err(|e| SessionError::InvalidOperation(e.to_string()))?;

        tracing::debug!(
            destination = %destination,
            session_id = %session_id,
            "Session playing"
        );
        Ok(entry.session.clone())
    }

    fn request_stop(&self, destination: DestinationId) -> Result<StopRequest, SessionError> {
        let mut entry = self
            .sessions
            .get_mut(&destination)
            .ok_or(SessionError::NotFound(destination))?;

        match entry.session.state() {
            PlaybackState::Resolving => {
                entry.cancel.cancel();
                Ok(StopRequest::CancelPending(entry.session.clone()))
            }
            PlaybackState::Playing => {
                entry
                    .session
                    .begin_stopping()
                    .map_err(|e| SessionError::InvalidOperation(e.to_string()))?;
                Ok(StopRequest::Stop(entry.session.clone()))
            }
            PlaybackState::Stopping => Err(SessionError::AlreadyStopping(destination)),
            PlaybackState::Idle => Err(SessionError::NotFound(destination)),
        }
    }

    fn release(&self, destination: DestinationId, session_id: Uuid) -> Option<PlaybackSession> {
        self.sessions
            .remove_if(&destination, |_, e| e.session.id() == session_id)
            .map(|(_, e)| {
                tracing::debug!(
                    destination = %destination,
                    session_id = %session_id,
                    "Session released"
                );
                e.session
            })
    }

    fn is_path_in_use(&self, path: &Path) -> bool {
        self.sessions
            .iter()
            .any(|e| e.session.resolved_path() == Some(path))
    }

    fn list_all(&self) -> Vec<PlaybackSession> {
        self.sessions.iter().map(|e| e.session.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourceUrl {
        SourceUrl::parse("https://valid.example/video1").unwrap()
    }

    #[test]
    fn test_session_lifecycle() {
        let manager = InMemoryPlaybackSessions::new();
        let dest = DestinationId::new(42);

        // Reserve
        let session = manager.reserve(dest, source()).unwrap();
        assert_eq!(manager.state_of(dest), PlaybackState::Resolving);

        // Attach + play
        manager
            .attach_audio(dest, session.id(), PathBuf::from("/data/a.opus"), None)
            .unwrap();
        manager.mark_playing(dest, session.id()).unwrap();
        assert_eq!(manager.state_of(dest), PlaybackState::Playing);
        assert!(manager.is_path_in_use(Path::new("/data/a.opus")));

        // Stop
        let request = manager.request_stop(dest).unwrap();
        assert!(matches!(request, StopRequest::Stop(_)));
        assert_eq!(manager.state_of(dest), PlaybackState::Stopping);

        // Release
        assert!(manager.release(dest, session.id()).is_some());
        assert_eq!(manager.state_of(dest), PlaybackState::Idle);
        assert!(!manager.is_path_in_use(Path::new("/data/a.opus")));
    }

    #[test]
    fn test_reserve_rejects_existing_session() {
        let manager = InMemoryPlaybackSessions::new();
        let dest = DestinationId::new(42);

        manager.reserve(dest, source()).unwrap();
        let second = manager.reserve(dest, source());
        assert!(matches!(
            second,
            Err(SessionError::AlreadyActive {
                state: PlaybackState::Resolving,
                ..
            })
        ));
        assert_eq!(manager.list_all().len(), 1);
    }

    #[test]
    fn test_stop_while_resolving_marks_cancel() {
        let manager = InMemoryPlaybackSessions::new();
        let dest = DestinationId::new(42);
        let session = manager.reserve(dest, source()).unwrap();

        let request = manager.request_stop(dest).unwrap();
        assert!(matches!(request, StopRequest::CancelPending(_)));
        assert_eq!(manager.state_of(dest), PlaybackState::Resolving);

        let attached =
            manager.attach_audio(dest, session.id(), PathBuf::from("/data/a.opus"), None);
        assert!(matches!(attached, Err(SessionError::Cancelled(_))));
    }

    #[test]
    fn test_release_ignores_other_session() {
        let manager = InMemoryPlaybackSessions::new();
        let dest = DestinationId::new(42);
        manager.reserve(dest, source()).unwrap();

        assert!(manager.release(dest, Uuid::new_v4()).is_none());
        assert_eq!(manager.state_of(dest), PlaybackState::Resolving);
    }

    #[test]
    fn test_stop_unknown_destination() {
        let manager = InMemoryPlaybackSessions::new();
        assert!(matches!(
            manager.request_stop(DestinationId::new(1)),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn test_double_stop() {
        let manager = InMemoryPlaybackSessions::new();
        let dest = DestinationId::new(42);
        let session = manager.reserve(dest, source()).unwrap();
        manager
            .attach_audio(dest, session.id(), PathBuf::from("/data/a.opus"), None)
            .unwrap();
        manager.mark_playing(dest, session.id()).unwrap();

        manager.request_stop(dest).unwrap();
        assert!(matches!(
            manager.request_stop(dest),
            Err(SessionError::AlreadyStopping(_))
        ));
    }
}
