//! tgcast - 群组语音聊天音频推流 bot
//!
//! - Bot: Telegram 长轮询，命令 /ping /play /stop
//! - Worker: yt-dlp 下载 + ffmpeg 转码
//! - HTTP: 存活探针

use std::sync::Arc;

use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;

use tgcast::application::ports::{AudioStoragePort, AudioTranscoderPort, MediaLeases};
use tgcast::application::{CleanupPolicy, ResolveAudioHandler, StartPlaybackHandler, StopPlaybackHandler};
use tgcast::config::{load_config, print_config, AppConfig};
use tgcast::infrastructure::adapters::{
    FfmpegTranscoder, FfmpegTranscoderConfig, FileAudioStorage, HttpVoiceCallClient,
    HttpVoiceCallClientConfig, YtDlpExtractor, YtDlpExtractorConfig,
};
use tgcast::infrastructure::bot::{CommandRouter, TelegramBot, TelegramDestinationProbe};
use tgcast::infrastructure::http::{HttpServer, ServerConfig};
use tgcast::infrastructure::memory::InMemoryPlaybackSessions;
use tgcast::infrastructure::worker::{resolve_channel, ResolveWorker, ResolveWorkerConfig};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},tgcast={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("tgcast - voice chat streaming bot");
    print_config(&config);

    // 下载目录
    let storage = Arc::new(FileAudioStorage::new(&config.storage.download_dir).await?);
    if config.storage.sweep_on_startup {
        if let Err(e) = storage.sweep_stale(config.audio.output_format).await {
            tracing::warn!(error = %e, "Startup sweep failed");
        }
    }

    // 外部工具
    let extractor = Arc::new(YtDlpExtractor::new(
        YtDlpExtractorConfig::new(&config.resolver.ytdlp_path)
            .with_timeout(config.resolver.download_timeout_secs),
    ));
    let transcoder = Arc::new(FfmpegTranscoder::new(
        FfmpegTranscoderConfig::new(&config.resolver.ffmpeg_path)
            .with_timeout(config.resolver.transcode_timeout_secs),
    ));
    if !transcoder.is_available() {
        tracing::warn!(
            ffmpeg = %config.resolver.ffmpeg_path,
            "ffmpeg not found, only sources already in {} can be played",
            config.audio.output_format
        );
    }

    // 解析 Worker
    let leases = Arc::new(MediaLeases::new());
    let resolve_handler = Arc::new(ResolveAudioHandler::new(
        extractor,
        transcoder,
        storage.clone(),
        config.audio.transcode_config(),
        leases.clone(),
    ));
    let (resolve_queue, resolve_rx) = resolve_channel(config.resolver.queue_capacity);
    let worker = ResolveWorker::new(
        ResolveWorkerConfig {
            max_concurrent: config.resolver.max_concurrent,
        },
        resolve_rx,
        resolve_handler,
    );
    tokio::spawn(worker.run());

    // 语音通话桥接
    let voice_call = Arc::new(HttpVoiceCallClient::new(
        HttpVoiceCallClientConfig::new(&config.voice_call.url)
            .with_timeout(config.voice_call.timeout_secs),
    )?);

    // Telegram
    let bot = Bot::new(&config.telegram.bot_token);
    let me = bot.get_me().await?;
    tracing::info!(
        bot_id = ?me.user.id,
        username = ?me.user.username,
        "Authorized with Telegram"
    );
    let destinations = Arc::new(TelegramDestinationProbe::new(bot.clone(), me.user.id));

    // 播放命令
    let sessions = Arc::new(InMemoryPlaybackSessions::new());
    let start_handler = Arc::new(StartPlaybackHandler::new(
        sessions.clone(),
        Arc::new(resolve_queue),
        voice_call.clone(),
        destinations,
        storage.clone(),
        leases.clone(),
    ));
    let stop_handler = Arc::new(StopPlaybackHandler::new(
        sessions,
        voice_call,
        storage,
        leases,
        CleanupPolicy {
            delete_on_stop: config.storage.delete_on_stop,
        },
    ));
    let router = Arc::new(CommandRouter::new(
        me.user.username.clone(),
        start_handler,
        stop_handler,
    ));

    // 存活探针
    let shutdown = CancellationToken::new();
    let server = HttpServer::new(ServerConfig::new(&config.server.host, config.server.port));
    let mut http_task = tokio::spawn({
        let shutdown = shutdown.clone();
        server.run_with_shutdown(async move { shutdown.cancelled().await })
    });

    tokio::select! {
        _ = TelegramBot::new(bot, router).run() => {
            tracing::warn!("Telegram polling ended");
        }
        result = &mut http_task => {
            result??;
            tracing::warn!("HTTP server ended");
            return Ok(());
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        }
    }

    shutdown.cancel();
    http_task.await??;

    tracing::info!("Shutdown complete");

    Ok(())
}
