//! yt-dlp Extractor - 调用外部 yt-dlp 进程
//!
//! 实现 MediaExtractorPort trait
//!
//! probe:    yt-dlp --dump-single-json --no-playlist -f bestaudio/best -- URL
//! download: yt-dlp -f bestaudio/best -o {dir}/{stem}.%(ext)s --print after_move:filepath -- URL

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::application::ports::{ExtractError, MediaExtractorPort, MediaInfo};

/// 只取最佳音频流，没有纯音频流时退回到最佳合流
const AUDIO_FORMAT_SELECTOR: &str = "bestaudio/best";

/// probe 阶段超时（秒）
const PROBE_TIMEOUT_SECS: u64 = 60;

/// yt-dlp 提取器配置
#[derive(Debug, Clone)]
pub struct YtDlpExtractorConfig {
    /// yt-dlp 可执行文件
    pub binary: String,
    /// 下载超时时间（秒）
    pub download_timeout_secs: u64,
}

impl Default for YtDlpExtractorConfig {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            download_timeout_secs: 600,
        }
    }
}

impl YtDlpExtractorConfig {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.download_timeout_secs = secs;
        self
    }
}

/// `--dump-single-json` 输出中用到的字段
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    id: String,
    #[serde(default)]
    extractor_key: Option<String>,
    #[serde(default)]
    extractor: Option<String>,
    #[serde(default)]
    ext: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// 解析 yt-dlp 的 JSON 元数据
fn parse_info(stdout: &[u8]) -> Result<MediaInfo, ExtractError> {
    let info: YtDlpInfo = serde_json::from_slice(stdout)
        .map_err(|e| ExtractError::InvalidOutput(e.to_string()))?;

    if info.id.trim().is_empty() {
        return Err(ExtractError::InvalidOutput("empty media id".to_string()));
    }

    let extractor = info
        .extractor_key
        .or(info.extractor)
        .unwrap_or_else(|| "generic".to_string());
    let ext = info
        .ext
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .ok_or_else(|| ExtractError::InvalidOutput("missing audio extension".to_string()))?;

    Ok(MediaInfo {
        id: info.id,
        extractor,
        ext,
        title: info.title,
    })
}

/// yt-dlp 错误输出中最后一条 ERROR 行
fn last_error_line(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines()
        .rev()
        .find(|l| l.starts_with("ERROR"))
        .or_else(|| text.lines().rev().find(|l| !l.trim().is_empty()))
        .unwrap_or("yt-dlp exited with an error")
        .trim()
        .to_string()
}

/// `--print after_move:filepath` 打印的最终文件路径
///
/// 路径不在下载目录内时按 `{stem}.{ext}` 推断
fn downloaded_path(stdout: &[u8], dest_dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let printed = String::from_utf8_lossy(stdout);
    printed
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(PathBuf::from)
        .filter(|p| p.starts_with(dest_dir))
        .unwrap_or_else(|| dest_dir.join(format!("{}.{}", stem, ext)))
}

/// yt-dlp 提取器
pub struct YtDlpExtractor {
    config: YtDlpExtractorConfig,
}

impl YtDlpExtractor {
    pub fn new(config: YtDlpExtractorConfig) -> Self {
        Self { config }
    }

    fn probe_args(url: &str) -> Vec<String> {
        vec![
            "--dump-single-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "-f".to_string(),
            AUDIO_FORMAT_SELECTOR.to_string(),
            "--".to_string(),
            url.to_string(),
        ]
    }

    fn download_args(url: &str, dest_dir: &Path, stem: &str) -> Vec<String> {
        let template = dest_dir.join(format!("{}.%(ext)s", stem));
        vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--no-progress".to_string(),
            "-f".to_string(),
            AUDIO_FORMAT_SELECTOR.to_string(),
            "-o".to_string(),
            template.to_string_lossy().to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            "--no-simulate".to_string(),
            "--".to_string(),
            url.to_string(),
        ]
    }

    async fn run(&self, args: &[String], timeout_secs: u64) -> Result<Output, ExtractError> {
        let child = Command::new(&self.config.binary)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(Duration::from_secs(timeout_secs), child)
            .await
            .map_err(|_| ExtractError::Timeout(timeout_secs))?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExtractError::ToolMissing(self.config.binary.clone())
                } else {
                    ExtractError::IoError(e.to_string())
                }
            })?;

        if !output.status.success() {
            return Err(ExtractError::Failed(last_error_line(&output.stderr)));
        }
        Ok(output)
    }
}

#[async_trait]
impl MediaExtractorPort for YtDlpExtractor {
    async fn probe(&self, url: &str) -> Result<MediaInfo, ExtractError> {
        tracing::debug!(url = %url, "Probing media");
        let output = self.run(&Self::probe_args(url), PROBE_TIMEOUT_SECS).await?;
        parse_info(&output.stdout)
    }

    async fn download(
        &self,
        url: &str,
        info: &MediaInfo,
        dest_dir: &Path,
        stem: &str,
    ) -> Result<PathBuf, ExtractError> {
        tracing::info!(
            media_id = %info.id,
            extractor = %info.extractor,
            ext = %info.ext,
            "Downloading audio stream"
        );

        let output = self
            .run(
                &Self::download_args(url, dest_dir, stem),
                self.config.download_timeout_secs,
            )
            .await?;

        let path = downloaded_path(&output.stdout, dest_dir, stem, &info.ext);

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ExtractError::InvalidOutput(format!(
                "downloaded file not found: {}",
                path.display()
            )));
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downloaded_path_uses_printed_extension() {
        let dest = Path::new("/srv/tgcast/downloads");
        let stdout = b"[info] done\n/srv/tgcast/downloads/abc.m4a\n";

        assert_eq!(
            downloaded_path(stdout, dest, "abc", "webm"),
            PathBuf::from("/srv/tgcast/downloads/abc.m4a")
        );
    }

    #[test]
    fn test_downloaded_path_falls_back_outside_dir() {
        let dest = Path::new("/srv/tgcast/downloads");

        assert_eq!(
            downloaded_path(b"/elsewhere/abc.m4a\n", dest, "abc", "webm"),
            PathBuf::from("/srv/tgcast/downloads/abc.webm")
        );
        assert_eq!(
            downloaded_path(b"", dest, "abc", "webm"),
            PathBuf::from("/srv/tgcast/downloads/abc.webm")
        );
    }

    #[test]
    fn test_config_default() {
        let config = YtDlpExtractorConfig::default();
        assert_eq!(config.binary, "yt-dlp");
        assert_eq!(config.download_timeout_secs, 600);
    }

    #[test]
    fn test_parse_info() {
        let json = br#"{"id":"dQw4w9WgXcQ","extractor":"youtube","extractor_key":"Youtube","ext":"webm","title":"Never Gonna Give You Up"}"#;
        let info = parse_info(json).unwrap();
        assert_eq!(info.id, "dQw4w9WgXcQ");
        assert_eq!(info.extractor, "Youtube");
        assert_eq!(info.ext, "webm");
        assert_eq!(info.title.as_deref(), Some("Never Gonna Give You Up"));
    }

    #[test]
    fn test_parse_info_rejects_bad_ext() {
        let json = br#"{"id":"abc","extractor":"generic","ext":"../x"}"#;
        assert!(matches!(
            parse_info(json),
            Err(ExtractError::InvalidOutput(_))
        ));
        assert!(matches!(
            parse_info(b"not json"),
            Err(ExtractError::InvalidOutput(_))
        ));
    }

    #[test]
    fn test_url_passed_after_separator() {
        let args = YtDlpExtractor::download_args("-rf", Path::new("/data"), "abc");
        let sep = args.iter().position(|a| a == "--").unwrap();
        assert_eq!(args[sep + 1], "-rf");
        assert!(args.contains(&"/data/abc.%(ext)s".to_string()));
    }

    #[test]
    fn test_last_error_line() {
        let stderr = b"[youtube] abc: Downloading webpage\nERROR: [youtube] abc: Video unavailable\n";
        assert_eq!(
            last_error_line(stderr),
            "ERROR: [youtube] abc: Video unavailable"
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let extractor = YtDlpExtractor::new(YtDlpExtractorConfig::new(
            "/nonexistent/yt-dlp-binary",
        ));
        let result = extractor.probe("https://valid.example/video1").await;
        assert!(matches!(result, Err(ExtractError::ToolMissing(_))));
    }
}
