//! 测试用端口实现

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::*;
use crate::domain::playback::DestinationId;

/// 假提取器：在目标目录写入 `{stem}.{ext}`
pub struct FakeExtractor {
    info: MediaInfo,
    fail_probe: bool,
    fail_download: bool,
    pub probe_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn new(id: &str, ext: &str) -> Self {
        Self {
            info: MediaInfo {
                id: id.to_string(),
                extractor: "fake".to_string(),
                ext: ext.to_string(),
                title: Some(format!("Title of {}", id)),
            },
            fail_probe: false,
            fail_download: false,
            probe_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_probe(mut self) -> Self {
        self.fail_probe = true;
        self
    }

    /// 下载失败，并留下一个 .part 残留文件
    pub fn failing_download(mut self) -> Self {
        self.fail_download = true;
        self
    }
}

#[async_trait]
impl MediaExtractorPort for FakeExtractor {
    async fn probe(&self, _url: &str) -> Result<MediaInfo, ExtractError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_probe {
            return Err(ExtractError::Failed("Unsupported URL".to_string()));
        }
        Ok(self.info.clone())
    }

    async fn download(
        &self,
        _url: &str,
        info: &MediaInfo,
        dest_dir: &Path,
        stem: &str,
    ) -> Result<PathBuf, ExtractError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_download {
            let partial = dest_dir.join(format!("{}.{}.part", stem, info.ext));
            tokio::fs::write(&partial, b"partial")
                .await
                .map_err(|e| ExtractError::IoError(e.to_string()))?;
            return Err(ExtractError::Failed("Video unavailable".to_string()));
        }
        let path = dest_dir.join(format!("{}.{}", stem, info.ext));
        tokio::fs::write(&path, b"downloaded audio")
            .await
            .map_err(|e| ExtractError::IoError(e.to_string()))?;
        Ok(path)
    }
}

/// 假转码器：复制输入文件到输出
pub struct FakeTranscoder {
    available: bool,
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeTranscoder {
    pub fn available() -> Self {
        Self {
            available: true,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            available: false,
            ..Self::available()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::available()
        }
    }
}

#[async_trait]
impl AudioTranscoderPort for FakeTranscoder {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        _config: &TranscodeConfig,
    ) -> Result<(), TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.available {
            return Err(TranscodeError::ToolMissing("ffmpeg".to_string()));
        }
        if self.fail {
            return Err(TranscodeError::Failed {
                status: Some(1),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        tokio::fs::copy(input, output)
            .await
            .map_err(|e| TranscodeError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// 假解析器：按 URL 在目录中写入归一化文件
pub struct FakeResolver {
    dir: PathBuf,
    delay: Option<Duration>,
    fail: bool,
    pub calls: AtomicUsize,
    produced: Mutex<Vec<PathBuf>>,
}

impl FakeResolver {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            delay: None,
            fail: false,
            calls: AtomicUsize::new(0),
            produced: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn produced(&self) -> Vec<PathBuf> {
        self.produced.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioResolverPort for FakeResolver {
    async fn resolve(&self, source_url: &str) -> Result<ResolvedAudio, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ResolveError::DownloadFailed("Video unavailable".to_string()));
        }

        let stem = media_file_stem("fake", source_url);
        let path = self.dir.join(format!("{}.opus", stem));
        tokio::fs::write(&path, b"normalized audio")
            .await
            .map_err(|e| ResolveError::DownloadFailed(e.to_string()))?;
        self.produced.lock().unwrap().push(path.clone());

        Ok(ResolvedAudio {
            path,
            title: Some("Fake Song".to_string()),
            source_ext: "webm".to_string(),
            format: AudioFormat::Opus,
            normalized: true,
            lease: None,
        })
    }
}

/// 假语音通话客户端
#[derive(Default)]
pub struct FakeVoiceCall {
    pub fail_start: AtomicBool,
    pub fail_stop: AtomicBool,
    started: Mutex<Vec<(DestinationId, PathBuf)>>,
    stopped: Mutex<Vec<DestinationId>>,
}

impl FakeVoiceCall {
    pub fn started(&self) -> Vec<(DestinationId, PathBuf)> {
        self.started.lock().unwrap().clone()
    }

    pub fn stopped(&self) -> Vec<DestinationId> {
        self.stopped.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceCallPort for FakeVoiceCall {
    async fn start_stream(
        &self,
        destination: DestinationId,
        path: &Path,
    ) -> Result<(), VoiceCallError> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(VoiceCallError::Rejected {
                status: 409,
                message: "no active voice chat".to_string(),
            });
        }
        self.started
            .lock()
            .unwrap()
            .push((destination, path.to_path_buf()));
        Ok(())
    }

    async fn stop_stream(&self, destination: DestinationId) -> Result<(), VoiceCallError> {
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(VoiceCallError::NetworkError("connection reset".to_string()));
        }
        self.stopped.lock().unwrap().push(destination);
        Ok(())
    }
}

/// 假目标检查：默认全部可达
#[derive(Default)]
pub struct FakeDestinations {
    blocked: Mutex<HashSet<DestinationId>>,
}

impl FakeDestinations {
    pub fn block(&self, destination: DestinationId) {
        self.blocked.lock().unwrap().insert(destination);
    }
}

#[async_trait]
impl DestinationProbePort for FakeDestinations {
    async fn check(&self, destination: DestinationId) -> Result<(), DestinationError> {
        if self.blocked.lock().unwrap().contains(&destination) {
            return Err(DestinationError::NotMember(destination));
        }
        Ok(())
    }
}
