//! FFmpeg Transcoder - 调用外部 ffmpeg 进程
//!
//! 实现 AudioTranscoderPort trait：
//! - 丢弃视频轨
//! - 按目标格式重编码音频
//! - 先写入 `.tmp` 再原子重命名，失败时不留半成品

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::application::ports::{AudioTranscoderPort, TranscodeConfig, TranscodeError};

/// stderr 保留的最大字符数
const STDERR_TAIL_CHARS: usize = 512;

/// FFmpeg 转码器配置
#[derive(Debug, Clone)]
pub struct FfmpegTranscoderConfig {
    /// ffmpeg 可执行文件
    pub binary: String,
    /// 转码超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for FfmpegTranscoderConfig {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            timeout_secs: 300,
        }
    }
}

impl FfmpegTranscoderConfig {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// FFmpeg 转码器
pub struct FfmpegTranscoder {
    config: FfmpegTranscoderConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: FfmpegTranscoderConfig) -> Self {
        Self { config }
    }

    fn temp_path(output: &Path) -> PathBuf {
        let mut name = output.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn build_args(input: &Path, temp_output: &Path, config: &TranscodeConfig) -> Vec<String> {
        let format = config.format;
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-c:a".to_string(),
            format.ffmpeg_codec().to_string(),
        ];

        if format.is_lossy() {
            if let Some(bitrate) = config.bitrate {
                args.push("-b:a".to_string());
                args.push(bitrate.to_string());
            }
        }
        if let Some(sample_rate) = config.sample_rate {
            args.push("-ar".to_string());
            args.push(sample_rate.to_string());
        }
        if let Some(channels) = config.channels {
            args.push("-ac".to_string());
            args.push(channels.to_string());
        }

        // 临时文件扩展名是 .tmp，必须显式指定封装格式
        args.push("-f".to_string());
        args.push(format.ffmpeg_muxer().to_string());
        args.push(temp_output.to_string_lossy().to_string());
        args
    }

    fn stderr_tail(stderr: &[u8]) -> String {
        let text = String::from_utf8_lossy(stderr);
        let text = text.trim();
        let count = text.chars().count();
        if count <= STDERR_TAIL_CHARS {
            text.to_string()
        } else {
            text.chars().skip(count - STDERR_TAIL_CHARS).collect()
        }
    }
}

#[async_trait]
impl AudioTranscoderPort for FfmpegTranscoder {
    fn is_available(&self) -> bool {
        which::which(&self.config.binary).is_ok()
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        config: &TranscodeConfig,
    ) -> Result<(), TranscodeError> {
        let temp_output = Self::temp_path(output);
        let args = Self::build_args(input, &temp_output, config);

        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            format = %config.format,
            "Starting transcode"
        );

        let child = Command::new(&self.config.binary)
            .args(&args)
            .kill_on_drop(true)
            .output();

        let result = match tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), child)
            .await
        {
            Err(_) => Err(TranscodeError::Timeout(self.config.timeout_secs)),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TranscodeError::ToolMissing(self.config.binary.clone()))
            }
            Ok(Err(e)) => Err(TranscodeError::IoError(e.to_string())),
            Ok(Ok(out)) if !out.status.success() => Err(TranscodeError::Failed {
                status: out.status.code(),
                stderr: Self::stderr_tail(&out.stderr),
            }),
            Ok(Ok(_)) => tokio::fs::rename(&temp_output, output)
                .await
                .map_err(|e| TranscodeError::IoError(e.to_string())),
        };

        if result.is_err() {
            let _ = tokio::fs::remove_file(&temp_output).await;
        } else {
            tracing::info!(output = %output.display(), "Transcode completed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::AudioFormat;

    #[test]
    fn test_config_default() {
        let config = FfmpegTranscoderConfig::default();
        assert_eq!(config.binary, "ffmpeg");
        assert_eq!(config.timeout_secs, 300);
    }

    #[test]
    fn test_opus_args() {
        let args = FfmpegTranscoder::build_args(
            Path::new("/data/abc.webm"),
            Path::new("/data/abc.opus.tmp"),
            &TranscodeConfig::default(),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-i /data/abc.webm -vn -c:a libopus -b:a 128000"));
        assert!(joined.contains("-ar 48000 -ac 2"));
        assert!(joined.ends_with("-f opus /data/abc.opus.tmp"));
    }

    #[test]
    fn test_wav_args_skip_bitrate() {
        let config = TranscodeConfig {
            format: AudioFormat::Wav,
            ..Default::default()
        };
        let args = FfmpegTranscoder::build_args(
            Path::new("in.m4a"),
            Path::new("out.wav.tmp"),
            &config,
        );
        assert!(!args.contains(&"-b:a".to_string()));
        assert!(args.contains(&"pcm_s16le".to_string()));
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            FfmpegTranscoder::temp_path(Path::new("/data/abc.opus")),
            PathBuf::from("/data/abc.opus.tmp")
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder =
            FfmpegTranscoder::new(FfmpegTranscoderConfig::new("/nonexistent/ffmpeg-binary"));
        assert!(!transcoder.is_available());

        let input = dir.path().join("abc.webm");
        tokio::fs::write(&input, b"data").await.unwrap();
        let output = dir.path().join("abc.opus");

        let result = transcoder
            .transcode(&input, &output, &TranscodeConfig::default())
            .await;
        assert!(matches!(result, Err(TranscodeError::ToolMissing(_))));
        assert!(!output.exists());
        assert!(!dir.path().join("abc.opus.tmp").exists());
    }
}
