//! Playback Command Handlers
//!
//! 每个 destination 最多一个播放会话：
//! Idle → Resolving → Playing → Stopping → Idle

use std::path::Path;
use std::sync::Arc;

use crate::application::commands::playback_commands::*;
use crate::application::error::PlaybackError;
use crate::application::ports::{
    AudioResolverPort, AudioStoragePort, DestinationProbePort, MediaLeases, PlaybackSessionPort,
    SessionError, StopRequest, VoiceCallError, VoiceCallPort,
};
use crate::domain::playback::{DestinationId, PlaybackSession, SourceUrl};

/// 播放文件清理策略
#[derive(Debug, Clone, Copy)]
pub struct CleanupPolicy {
    /// stop 后删除本地文件（其他会话仍在使用时保留）
    pub delete_on_stop: bool,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            delete_on_stop: true,
        }
    }
}

/// 删除不再被任何会话或解析结果引用的文件
///
/// 在媒体锁内检查并删除，解析器无法在两者之间交出同一文件。
/// 先查租约再查会话：租约只在会话记录文件之后才归还
async fn discard_audio(
    sessions: &dyn PlaybackSessionPort,
    storage: &dyn AudioStoragePort,
    leases: &MediaLeases,
    path: &Path,
) -> bool {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let guard = leases.lock(&stem).await;

    let deleted = if leases.is_leased(path) || sessions.is_path_in_use(path) {
        tracing::debug!(path = ?path, "Audio still referenced, keeping");
        false
    } else {
        match storage.delete_file(path).await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to delete audio file");
                false
            }
        }
    };

    leases.unlock(&stem, guard);
    deleted
}

/// StartPlayback Handler
pub struct StartPlaybackHandler {
    sessions: Arc<dyn PlaybackSessionPort>,
    resolver: Arc<dyn AudioResolverPort>,
    voice_call: Arc<dyn VoiceCallPort>,
    destinations: Arc<dyn DestinationProbePort>,
    storage: Arc<dyn AudioStoragePort>,
    leases: Arc<MediaLeases>,
}

impl StartPlaybackHandler {
    pub fn new(
        sessions: Arc<dyn PlaybackSessionPort>,
        resolver: Arc<dyn AudioResolverPort>,
        voice_call: Arc<dyn VoiceCallPort>,
        destinations: Arc<dyn DestinationProbePort>,
        storage: Arc<dyn AudioStoragePort>,
        leases: Arc<MediaLeases>,
    ) -> Self {
        Self {
            sessions,
            resolver,
            voice_call,
            destinations,
            storage,
            leases,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartPlaybackCommand,
    ) -> Result<StartPlaybackResponse, PlaybackError> {
        let destination = cmd.destination;
        let source =
            SourceUrl::parse(&cmd.source).map_err(|e| PlaybackError::InvalidSource(e.to_string()))?;

        // 占位：同一 destination 的第二个请求在这里被拒绝，不会触发下载
        let session = self
            .sessions
            .reserve(destination, source.clone())
            .map_err(|e| match e {
                SessionError::AlreadyActive { .. } | SessionError::AlreadyStopping(_) => {
                    PlaybackError::AlreadyPlaying(destination)
                }
                other => PlaybackError::unexpected(other.to_string()),
            })?;
        let session_id = session.id();

        tracing::info!(
            destination = %destination,
            session_id = %session_id,
            source = %source,
            "Playback requested"
        );

        if let Err(e) = self.destinations.check(destination).await {
            self.sessions.release(destination, session_id);
            return Err(e.into());
        }

        let mut audio = match self.resolver.resolve(source.as_str()).await {
            Ok(audio) => audio,
            Err(e) => {
                self.sessions.release(destination, session_id);
                tracing::warn!(
                    destination = %destination,
                    session_id = %session_id,
                    error = %e,
                    "Audio resolution failed"
                );
                return Err(e.into());
            }
        };

        let attached = self.sessions.attach_audio(
            destination,
            session_id,
            audio.path.clone(),
            audio.title.clone(),
        );
        // 会话已记录文件（或放弃了它），归还租约
        drop(audio.lease.take());
        if let Err(e) = attached {
            return Err(self.discard(destination, session_id, &audio.path, e).await);
        }

        if let Err(e) = self.voice_call.start_stream(destination, &audio.path).await {
            // 文件保留在下载目录，供复用或启动清理
            self.sessions.release(destination, session_id);
            tracing::error!(
                destination = %destination,
                session_id = %session_id,
                error = %e,
                "Voice call rejected stream"
            );
            return Err(e.into());
        }

        if let Err(e) = self.sessions.mark_playing(destination, session_id) {
            // stop 在推流启动期间到达：撤销推流
            if let Err(stop_err) = self.voice_call.stop_stream(destination).await {
                tracing::warn!(
                    destination = %destination,
                    error = %stop_err,
                    "Failed to stop stream of cancelled session"
                );
            }
            return Err(self.discard(destination, session_id, &audio.path, e).await);
        }

        tracing::info!(
            destination = %destination,
            session_id = %session_id,
            path = ?audio.path,
            transcoded = audio.normalized,
            "Playback started"
        );

        Ok(StartPlaybackResponse {
            session_id,
            destination,
            file_name: audio.file_name(),
            path: audio.path,
            title: audio.title,
            transcoded: audio.normalized,
        })
    }

    /// 丢弃已解析但不再需要的结果
    async fn discard(
        &self,
        destination: DestinationId,
        session_id: uuid::Uuid,
        path: &Path,
        cause: SessionError,
    ) -> PlaybackError {
        self.sessions.release(destination, session_id);
        discard_audio(
            self.sessions.as_ref(),
            self.storage.as_ref(),
            &self.leases,
            path,
        )
        .await;

        match cause {
            SessionError::Cancelled(_) => {
                tracing::info!(
                    destination = %destination,
                    session_id = %session_id,
                    "Resolved audio discarded after stop request"
                );
                PlaybackError::Cancelled(destination)
            }
            other => PlaybackError::unexpected(other.to_string()),
        }
    }
}

/// StopPlayback Handler
pub struct StopPlaybackHandler {
    sessions: Arc<dyn PlaybackSessionPort>,
    voice_call: Arc<dyn VoiceCallPort>,
    storage: Arc<dyn AudioStoragePort>,
    leases: Arc<MediaLeases>,
    policy: CleanupPolicy,
}

impl StopPlaybackHandler {
    pub fn new(
        sessions: Arc<dyn PlaybackSessionPort>,
        voice_call: Arc<dyn VoiceCallPort>,
        storage: Arc<dyn AudioStoragePort>,
        leases: Arc<MediaLeases>,
        policy: CleanupPolicy,
    ) -> Self {
        Self {
            sessions,
            voice_call,
            storage,
            leases,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: StopPlaybackCommand,
    ) -> Result<StopPlaybackResponse, PlaybackError> {
        let destination = cmd.destination;

        let session = match self.sessions.request_stop(destination) {
            Ok(StopRequest::CancelPending(session)) => {
                tracing::info!(
                    destination = %destination,
                    session_id = %session.id(),
                    "Stop requested while resolving, result will be discarded"
                );
                return Ok(StopPlaybackResponse::CancelPending {
                    session_id: session.id(),
                });
            }
            Ok(StopRequest::Stop(session)) => session,
            Err(SessionError::NotFound(_)) => return Err(PlaybackError::NotPlaying(destination)),
            Err(SessionError::AlreadyStopping(_)) => {
                return Err(PlaybackError::AlreadyStopping(destination))
            }
            Err(e) => return Err(PlaybackError::unexpected(e.to_string())),
        };

        let stop_result = self.voice_call.stop_stream(destination).await;

        // 无论通话端结果如何都移除会话并清理文件，避免 destination 永久占用
        self.sessions.release(destination, session.id());
        let file_deleted = self.cleanup(&session).await;

        match stop_result {
            Ok(()) | Err(VoiceCallError::NotInCall(_)) => {}
            Err(e) => {
                tracing::error!(
                    destination = %destination,
                    session_id = %session.id(),
                    file_deleted = file_deleted,
                    error = %e,
                    "Voice call failed to stop stream"
                );
                return Err(PlaybackError::unexpected(format!(
                    "session removed but stream stop failed: {}",
                    e
                )));
            }
        }

        tracing::info!(
            destination = %destination,
            session_id = %session.id(),
            file_deleted = file_deleted,
            "Playback stopped"
        );

        Ok(StopPlaybackResponse::Stopped {
            session_id: session.id(),
            file_deleted,
        })
    }

    async fn cleanup(&self, session: &PlaybackSession) -> bool {
        if !self.policy.delete_on_stop {
            return false;
        }
        match session.resolved_path() {
            Some(path) => {
                discard_audio(
                    self.sessions.as_ref(),
                    self.storage.as_ref(),
                    &self.leases,
                    path,
                )
                .await
            }
            None => false,
        }
    }
}
