//! Resolve Audio Handler - 远程音频解析
//!
//! 流程：校验 → 获取元数据 → 复用已有归一化文件 → 下载 → 按需转码 → 删除中间文件

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::commands::ResolveAudioCommand;
use crate::application::ports::{
    media_file_stem, AudioFormat, AudioResolverPort, AudioStoragePort, AudioTranscoderPort,
    MediaExtractorPort, MediaInfo, MediaLeases, ResolveError, ResolvedAudio, TranscodeConfig,
    TranscodeError,
};
use crate::domain::playback::SourceUrl;

/// ResolveAudio Handler
///
/// 同一媒体（相同文件名）的解析串行执行，避免重复下载写同一个文件。
/// 返回的文件带租约，会话接手之前不会被 stop 清理删除
pub struct ResolveAudioHandler {
    extractor: Arc<dyn MediaExtractorPort>,
    transcoder: Arc<dyn AudioTranscoderPort>,
    storage: Arc<dyn AudioStoragePort>,
    transcode_config: TranscodeConfig,
    leases: Arc<MediaLeases>,
}

impl ResolveAudioHandler {
    pub fn new(
        extractor: Arc<dyn MediaExtractorPort>,
        transcoder: Arc<dyn AudioTranscoderPort>,
        storage: Arc<dyn AudioStoragePort>,
        transcode_config: TranscodeConfig,
        leases: Arc<MediaLeases>,
    ) -> Self {
        Self {
            extractor,
            transcoder,
            storage,
            transcode_config,
            leases,
        }
    }

    pub async fn handle(&self, cmd: ResolveAudioCommand) -> Result<ResolvedAudio, ResolveError> {
        let source = SourceUrl::parse(&cmd.source_url)
            .map_err(|e| ResolveError::InvalidSource(e.to_string()))?;

        let info = self
            .extractor
            .probe(source.as_str())
            .await
            .map_err(|e| ResolveError::DownloadFailed(e.to_string()))?;

        let stem = media_file_stem(&info.extractor, &info.id);

        tracing::debug!(
            source = %source,
            media_id = %info.id,
            ext = %info.ext,
            stem = %stem,
            "Media probed"
        );

        let guard = self.leases.lock(&stem).await;
        let result = self
            .resolve_locked(source.as_str(), &info, &stem)
            .await
            .map(|mut audio| {
                audio.lease = Some(self.leases.acquire(audio.path.clone()));
                audio
            });
        self.leases.unlock(&stem, guard);

        result
    }

    async fn resolve_locked(
        &self,
        url: &str,
        info: &MediaInfo,
        stem: &str,
    ) -> Result<ResolvedAudio, ResolveError> {
        let target = self.transcode_config.format;

        // 已有归一化文件：不下载、不转码
        if let Some(path) = self.storage.find_normalized(stem, target).await {
            tracing::info!(media_id = %info.id, path = ?path, "Reusing normalized audio");
            return Ok(resolved(info, path, target, false));
        }

        let needs_transcode = AudioFormat::from_extension(&info.ext) != Some(target);
        if needs_transcode && !self.transcoder.is_available() {
            return Err(ResolveError::TranscodeUnavailable(format!(
                "{} audio must be converted to {} but no transcoder is installed",
                info.ext, target
            )));
        }

        let download_dir = self.storage.download_dir();
        let downloaded = match self
            .extractor
            .download(url, info, &download_dir, stem)
            .await
        {
            Ok(path) => path,
            Err(e) => {
                self.purge(stem).await;
                return Err(ResolveError::DownloadFailed(e.to_string()));
            }
        };

        let downloaded_ext = downloaded
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(info.ext.as_str())
            .to_string();

        if AudioFormat::from_extension(&downloaded_ext) == Some(target) {
            tracing::info!(
                media_id = %info.id,
                path = ?downloaded,
                "Downloaded audio already in target format"
            );
            let mut audio = resolved(info, downloaded, target, false);
            audio.source_ext = downloaded_ext;
            return Ok(audio);
        }

        // 元数据与实际下载的格式不一致时再检查一次
        if !self.transcoder.is_available() {
            self.purge(stem).await;
            return Err(ResolveError::TranscodeUnavailable(format!(
                "{} audio must be converted to {} but no transcoder is installed",
                downloaded_ext, target
            )));
        }

        let output = self.storage.normalized_path(stem, target);
        if let Err(e) = self
            .transcoder
            .transcode(&downloaded, &output, &self.transcode_config)
            .await
        {
            self.purge(stem).await;
            return Err(match e {
                TranscodeError::ToolMissing(msg) => ResolveError::TranscodeUnavailable(msg),
                other => ResolveError::TranscodeFailed(other.to_string()),
            });
        }

        if let Err(e) = self.storage.delete_file(&downloaded).await {
            tracing::warn!(path = ?downloaded, error = %e, "Failed to delete intermediate download");
        }

        tracing::info!(
            media_id = %info.id,
            from = %downloaded_ext,
            to = %target,
            path = ?output,
            "Audio transcoded"
        );

        let mut audio = resolved(info, output, target, true);
        audio.source_ext = downloaded_ext;
        Ok(audio)
    }

    /// 失败时清理本次解析的所有产物
    async fn purge(&self, stem: &str) {
        match self.storage.purge_artifacts(stem).await {
            Ok(0) => {}
            Ok(count) => tracing::debug!(stem = %stem, count = count, "Purged partial artifacts"),
            Err(e) => tracing::warn!(stem = %stem, error = %e, "Failed to purge partial artifacts"),
        }
    }
}

fn resolved(
    info: &MediaInfo,
    path: std::path::PathBuf,
    format: AudioFormat,
    normalized: bool,
) -> ResolvedAudio {
    ResolvedAudio {
        path,
        title: info.title.clone(),
        source_ext: info.ext.clone(),
        format,
        normalized,
        lease: None,
    }
}

#[async_trait]
impl AudioResolverPort for ResolveAudioHandler {
    async fn resolve(&self, source_url: &str) -> Result<ResolvedAudio, ResolveError> {
        self.handle(ResolveAudioCommand {
            source_url: source_url.to_string(),
        })
        .await
    }
}
