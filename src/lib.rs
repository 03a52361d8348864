//! tgcast - 群组语音聊天音频推流 bot
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Playback Context: 播放会话、目标、来源
//! - 聊天命令解析
//!
//! 应用层 (application/):
//! - Ports: 端口定义（MediaExtractor, AudioTranscoder, AudioStorage, VoiceCall, PlaybackSession）
//! - Commands: 播放启动/停止、音频解析
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: yt-dlp, ffmpeg, 下载目录, 语音通话桥接客户端
//! - Memory: 播放会话内存实现
//! - Worker: ResolveWorker 后台下载/转码
//! - Bot: Telegram 命令入口
//! - HTTP: 存活探针

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
