//! Command Router
//!
//! 解析聊天命令并分发到播放命令处理器。返回 `None` 表示消息不需要回复

use std::sync::Arc;

use super::reply;
use crate::application::commands::handlers::{StartPlaybackHandler, StopPlaybackHandler};
use crate::application::commands::{StartPlaybackCommand, StopPlaybackCommand};
use crate::domain::playback::DestinationId;
use crate::domain::{parse_command, ChatCommand};

pub struct CommandRouter {
    /// bot 自己的用户名，用于过滤 `/cmd@other_bot`
    bot_username: Option<String>,
    start_handler: Arc<StartPlaybackHandler>,
    stop_handler: Arc<StopPlaybackHandler>,
}

impl CommandRouter {
    pub fn new(
        bot_username: Option<String>,
        start_handler: Arc<StartPlaybackHandler>,
        stop_handler: Arc<StopPlaybackHandler>,
    ) -> Self {
        Self {
            bot_username,
            start_handler,
            stop_handler,
        }
    }

    pub async fn handle(&self, destination: DestinationId, text: &str) -> Option<String> {
        let command = match parse_command(text, self.bot_username.as_deref())? {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(destination = %destination, error = %e, "Rejected command");
                return Some(reply::USAGE.to_string());
            }
        };

        tracing::debug!(destination = %destination, command = ?command, "Handling command");

        let text = match command {
            ChatCommand::Start => reply::GREETING.to_string(),
            ChatCommand::Ping => reply::PONG.to_string(),
            ChatCommand::Play { url } => {
                let cmd = StartPlaybackCommand {
                    destination,
                    source: url,
                };
                match self.start_handler.handle(cmd).await {
                    Ok(response) => reply::playback_started(&response),
                    Err(e) => reply::playback_failed(destination, &e),
                }
            }
            ChatCommand::Stop => {
                let cmd = StopPlaybackCommand { destination };
                match self.stop_handler.handle(cmd).await {
                    Ok(response) => reply::playback_stopped(&response),
                    Err(e) => reply::playback_failed(destination, &e),
                }
            }
        };

        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::CleanupPolicy;
    use crate::application::ports::fakes::{FakeDestinations, FakeResolver, FakeVoiceCall};
    use crate::application::ports::{AudioStoragePort, MediaLeases, PlaybackSessionPort};
    use crate::domain::playback::PlaybackState;
    use crate::infrastructure::adapters::FileAudioStorage;
    use crate::infrastructure::memory::InMemoryPlaybackSessions;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        sessions: Arc<InMemoryPlaybackSessions>,
        resolver: Arc<FakeResolver>,
        voice_call: Arc<FakeVoiceCall>,
        router: Arc<CommandRouter>,
    }

    async fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileAudioStorage::new(dir.path()).await.unwrap());
        let sessions = Arc::new(InMemoryPlaybackSessions::new());
        let resolver = Arc::new(
            FakeResolver::new(&storage.download_dir()).with_delay(Duration::from_millis(30)),
        );
        let voice_call = Arc::new(FakeVoiceCall::default());
        let leases = Arc::new(MediaLeases::new());

        let start = Arc::new(StartPlaybackHandler::new(
            sessions.clone(),
            resolver.clone(),
            voice_call.clone(),
            Arc::new(FakeDestinations::default()),
            storage.clone(),
            leases.clone(),
        ));
        let stop = Arc::new(StopPlaybackHandler::new(
            sessions.clone(),
            voice_call.clone(),
            storage,
            leases,
            CleanupPolicy::default(),
        ));
        let router = Arc::new(CommandRouter::new(Some("cast_bot".to_string()), start, stop));

        Harness {
            _dir: dir,
            sessions,
            resolver,
            voice_call,
            router,
        }
    }

    const DEST: i64 = 42;

    #[tokio::test]
    async fn test_ping_and_start() {
        let h = harness().await;
        let dest = DestinationId::new(DEST);

        assert_eq!(h.router.handle(dest, "/ping").await.as_deref(), Some("pong"));
        assert_eq!(
            h.router.handle(dest, "/start@cast_bot").await.as_deref(),
            Some(reply::GREETING)
        );
    }

    #[tokio::test]
    async fn test_ignores_plain_text_and_other_bots() {
        let h = harness().await;
        let dest = DestinationId::new(DEST);

        assert!(h.router.handle(dest, "hello there").await.is_none());
        assert!(h.router.handle(dest, "/play@other_bot https://x").await.is_none());
        assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_play_replies_with_file_name() {
        let h = harness().await;
        let dest = DestinationId::new(DEST);

        let reply = h
            .router
            .handle(dest, "/play https://valid.example/video1")
            .await
            .unwrap();

        let produced = h.resolver.produced();
        assert_eq!(produced.len(), 1);
        let file_name = produced[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(reply.contains(&file_name), "reply: {}", reply);
        assert_eq!(h.sessions.state_of(dest), PlaybackState::Playing);
        assert_eq!(h.voice_call.started().len(), 1);
    }

    #[tokio::test]
    async fn test_second_play_is_rejected_without_download() {
        let h = harness().await;
        let dest = DestinationId::new(DEST);

        h.router
            .handle(dest, "/play https://valid.example/video1")
            .await
            .unwrap();
        let reply = h
            .router
            .handle(dest, "/play https://valid.example/video2")
            .await
            .unwrap();

        assert!(reply.contains("Already playing"));
        assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_plays_yield_one_session() {
        let h = harness().await;
        let dest = DestinationId::new(DEST);

        let a = {
            let router = h.router.clone();
            tokio::spawn(async move { router.handle(dest, "/play https://valid.example/a").await })
        };
        let b = {
            let router = h.router.clone();
            tokio::spawn(async move { router.handle(dest, "/play https://valid.example/b").await })
        };
        let replies = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];

        let rejected = replies
            .iter()
            .filter(|r| r.contains("Already playing"))
            .count();
        assert_eq!(rejected, 1);
        assert_eq!(h.sessions.list_all().len(), 1);
        assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_while_playing() {
        let h = harness().await;
        let dest = DestinationId::new(DEST);

        h.router
            .handle(dest, "/play https://valid.example/video1")
            .await
            .unwrap();
        let reply = h.router.handle(dest, "/stop").await.unwrap();

        assert!(reply.contains("stopped"));
        assert_eq!(h.voice_call.stopped(), vec![dest]);
        assert_eq!(h.sessions.state_of(dest), PlaybackState::Idle);
    }

    #[tokio::test]
    async fn test_stop_without_session() {
        let h = harness().await;
        let reply = h
            .router
            .handle(DestinationId::new(DEST), "/stop")
            .await
            .unwrap();
        assert!(reply.contains("Nothing is playing"));
    }

    #[tokio::test]
    async fn test_play_without_url_replies_usage() {
        let h = harness().await;
        let reply = h
            .router
            .handle(DestinationId::new(DEST), "/play")
            .await
            .unwrap();

        assert_eq!(reply, reply::USAGE);
        assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_command_replies_usage() {
        let h = harness().await;
        let dest = DestinationId::new(DEST);

        assert_eq!(
            h.router.handle(dest, "/dance").await.as_deref(),
            Some(reply::USAGE)
        );
        assert_eq!(
            h.router.handle(dest, "/stop now").await.as_deref(),
            Some(reply::USAGE)
        );
    }
}
