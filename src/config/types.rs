//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::ports::{AudioFormat, TranscodeConfig};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 存活探针服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// Telegram bot 配置
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// 语音通话桥接服务配置
    #[serde(default)]
    pub voice_call: VoiceCallConfig,

    /// 下载/转码工具配置
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// 音频归一化配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Telegram 配置
#[derive(Clone, Default, Deserialize)]
pub struct TelegramConfig {
    /// BotFather 签发的 token
    #[serde(default)]
    pub bot_token: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

/// 语音通话桥接服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceCallConfig {
    /// 桥接服务基础 URL
    #[serde(default = "default_voice_call_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_voice_call_timeout")]
    pub timeout_secs: u64,
}

fn default_voice_call_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_voice_call_timeout() -> u64 {
    30
}

impl Default for VoiceCallConfig {
    fn default() -> Self {
        Self {
            url: default_voice_call_url(),
            timeout_secs: default_voice_call_timeout(),
        }
    }
}

/// 下载/转码配置
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// yt-dlp 可执行文件
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,

    /// ffmpeg 可执行文件
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// 最大并发解析数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 排队上限，超过后直接拒绝
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    #[serde(default = "default_transcode_timeout")]
    pub transcode_timeout_secs: u64,
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_max_concurrent() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    64
}

fn default_download_timeout() -> u64 {
    600 // 10 分钟
}

fn default_transcode_timeout() -> u64 {
    300
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            ffmpeg_path: default_ffmpeg_path(),
            max_concurrent: default_max_concurrent(),
            queue_capacity: default_queue_capacity(),
            download_timeout_secs: default_download_timeout(),
            transcode_timeout_secs: default_transcode_timeout(),
        }
    }
}

/// 音频配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// 输出格式
    /// 可选: opus, mp3, wav
    #[serde(default)]
    pub output_format: AudioFormat,

    /// 目标比特率（bps），仅用于有损格式
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,

    /// 目标采样率（Hz）
    /// 如果为 0，则保持原始采样率
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// 声道数
    /// 0 表示保持原始声道数
    #[serde(default = "default_channels")]
    pub channels: u8,
}

fn default_bitrate() -> u32 {
    128_000
}

fn default_sample_rate() -> u32 {
    48_000 // 语音通话原生采样率
}

fn default_channels() -> u8 {
    2
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            output_format: AudioFormat::Opus,
            bitrate: default_bitrate(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
        }
    }
}

impl AudioConfig {
    /// 转换为转码参数
    pub fn transcode_config(&self) -> TranscodeConfig {
        TranscodeConfig {
            format: self.output_format,
            bitrate: Some(self.bitrate),
            sample_rate: (self.sample_rate > 0).then_some(self.sample_rate),
            channels: (self.channels > 0).then_some(self.channels),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 下载目录
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// stop 后删除播放文件
    #[serde(default = "default_true")]
    pub delete_on_stop: bool,

    /// 启动时清理残留的下载中间文件
    #[serde(default = "default_true")]
    pub sweep_on_startup: bool,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("data/downloads")
}

fn default_true() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            delete_on_stop: true,
            sweep_on_startup: true,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
