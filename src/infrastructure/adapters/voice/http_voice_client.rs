//! HTTP Voice Call Client - 调用外部语音通话桥接服务
//!
//! 实现 VoiceCallPort trait。桥接服务以用户账号加入群组语音聊天并推流本地文件
//!
//! 桥接服务 API:
//! POST   {base_url}/calls/{chat_id}/stream   {"path": "/abs/file.opus"}
//! DELETE {base_url}/calls/{chat_id}/stream
//! 404 on DELETE: 目标当前没有推流

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::application::ports::{VoiceCallError, VoiceCallPort};
use crate::domain::playback::DestinationId;

#[derive(Debug, Serialize)]
struct StartStreamRequest {
    /// 本地音频文件（桥接服务与本进程共享文件系统）
    path: String,
}

/// HTTP 语音通话客户端配置
#[derive(Debug, Clone)]
pub struct HttpVoiceCallClientConfig {
    /// 桥接服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpVoiceCallClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpVoiceCallClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 语音通话客户端
pub struct HttpVoiceCallClient {
    client: Client,
    config: HttpVoiceCallClientConfig,
}

impl HttpVoiceCallClient {
    pub fn new(config: HttpVoiceCallClientConfig) -> Result<Self, VoiceCallError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VoiceCallError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn stream_url(&self, destination: DestinationId) -> String {
        format!(
            "{}/calls/{}/stream",
            self.config.base_url.trim_end_matches('/'),
            destination
        )
    }

    fn map_send_error(e: reqwest::Error) -> VoiceCallError {
        if e.is_timeout() {
            VoiceCallError::Timeout
        } else if e.is_connect() {
            VoiceCallError::NetworkError(format!("Cannot connect to voice call service: {}", e))
        } else {
            VoiceCallError::NetworkError(e.to_string())
        }
    }

    async fn rejected(response: reqwest::Response) -> VoiceCallError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        VoiceCallError::Rejected { status, message }
    }
}

#[async_trait]
impl VoiceCallPort for HttpVoiceCallClient {
    async fn start_stream(
        &self,
        destination: DestinationId,
        path: &Path,
    ) -> Result<(), VoiceCallError> {
        // 桥接服务的工作目录与本进程不同，传绝对路径
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };
        let body = StartStreamRequest {
            path: path.to_string_lossy().to_string(),
        };

        tracing::debug!(
            url = %self.stream_url(destination),
            path = %body.path,
            "Sending start stream request"
        );

        let response = self
            .client
            .post(self.stream_url(destination))
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        tracing::info!(destination = %destination, "Voice stream started");
        Ok(())
    }

    async fn stop_stream(&self, destination: DestinationId) -> Result<(), VoiceCallError> {
        let response = self
            .client
            .delete(self.stream_url(destination))
            .send()
            .await
            .map_err(Self::map_send_error)?;

        match response.status() {
            s if s.is_success() => {
                tracing::info!(destination = %destination, "Voice stream stopped");
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(VoiceCallError::NotInCall(destination)),
            _ => Err(Self::rejected(response).await),
        }
    }
}
