//! Audio Transcoder Port - 音频转码抽象
//!
//! 定义音频转码的抽象接口，将下载的任意容器转换为目标格式（如 Opus）

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 转码错误
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// 宿主机上找不到转码工具
    #[error("Transcoder not found: {0}")]
    ToolMissing(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Transcoder exited with status {status:?}: {stderr}")]
    Failed { status: Option<i32>, stderr: String },

    #[error("Transcoder timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 音频输出格式（归一化目标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Ogg Opus - 语音通话原生编码
    #[default]
    Opus,
    /// MP3 格式 - 通用兼容
    Mp3,
    /// 16-bit PCM WAV
    Wav,
}

impl AudioFormat {
    /// 按文件扩展名识别，非归一化格式（webm、m4a 等）返回 None
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "opus" => Some(Self::Opus),
            "mp3" => Some(Self::Mp3),
            "wav" => Some(Self::Wav),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Opus => "opus",
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    /// ffmpeg 封装格式名（`-f`）
    pub fn ffmpeg_muxer(&self) -> &'static str {
        match self {
            Self::Opus => "opus",
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    /// ffmpeg 编码器名（`-c:a`）
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Opus => "libopus",
            Self::Mp3 => "libmp3lame",
            Self::Wav => "pcm_s16le",
        }
    }

    /// 是否为有损压缩格式（需要比特率参数）
    pub fn is_lossy(&self) -> bool {
        !matches!(self, Self::Wav)
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = TranscodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| TranscodeError::UnsupportedFormat(s.to_string()))
    }
}

/// 转码配置
#[derive(Debug, Clone)]
pub struct TranscodeConfig {
    /// 输出格式
    pub format: AudioFormat,
    /// 目标比特率（bps），仅用于有损压缩格式
    pub bitrate: Option<u32>,
    /// 目标采样率（Hz），None 表示保持原始采样率
    pub sample_rate: Option<u32>,
    /// 声道数，None 表示保持原始声道数
    pub channels: Option<u8>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::Opus,
            bitrate: Some(128_000),
            sample_rate: Some(48_000), // 语音通话采样率
            channels: Some(2),
        }
    }
}

/// Audio Transcoder Port
///
/// 外部转码工具的抽象接口
#[async_trait]
pub trait AudioTranscoderPort: Send + Sync {
    /// 转码工具是否存在于宿主机
    fn is_available(&self) -> bool;

    /// 转码 `input` 到 `output`
    ///
    /// 成功时 `output` 是完整文件；失败时不留下 `output`
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        config: &TranscodeConfig,
    ) -> Result<(), TranscodeError>;
}
