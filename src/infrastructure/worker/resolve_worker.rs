//! Resolve Worker - Background Audio Resolution
//!
//! 下载和转码是长耗时的外部进程调用，统一排队并限制并发，
//! 不占用消息处理任务

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::application::ports::{AudioResolverPort, ResolveError, ResolvedAudio};

/// Worker 配置
#[derive(Debug, Clone)]
pub struct ResolveWorkerConfig {
    /// 最大并发解析数
    pub max_concurrent: usize,
}

impl Default for ResolveWorkerConfig {
    fn default() -> Self {
        Self { max_concurrent: 2 }
    }
}

/// 解析任务
pub struct ResolveJob {
    pub source_url: String,
    pub reply: oneshot::Sender<Result<ResolvedAudio, ResolveError>>,
}

/// 解析队列的发送端
///
/// 对调用方表现为普通的 AudioResolverPort
#[derive(Clone)]
pub struct ResolveQueue {
    sender: mpsc::Sender<ResolveJob>,
}

/// 创建解析队列
pub fn resolve_channel(capacity: usize) -> (ResolveQueue, mpsc::Receiver<ResolveJob>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (ResolveQueue { sender }, receiver)
}

#[async_trait]
impl AudioResolverPort for ResolveQueue {
    async fn resolve(&self, source_url: &str) -> Result<ResolvedAudio, ResolveError> {
        let (reply, response) = oneshot::channel();
        let job = ResolveJob {
            source_url: source_url.to_string(),
            reply,
        };

        self.sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                ResolveError::WorkerUnavailable("resolve queue is full".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                ResolveError::WorkerUnavailable("resolve worker stopped".to_string())
            }
        })?;

        response.await.map_err(|_| {
            ResolveError::WorkerUnavailable("resolve job dropped without a result".to_string())
        })?
    }
}

/// 解析 Worker
///
/// 从队列消费任务，用 semaphore 限制同时运行的下载/转码数量
pub struct ResolveWorker {
    config: ResolveWorkerConfig,
    queue_receiver: mpsc::Receiver<ResolveJob>,
    resolver: Arc<dyn AudioResolverPort>,
}

impl ResolveWorker {
    pub fn new(
        config: ResolveWorkerConfig,
        queue_receiver: mpsc::Receiver<ResolveJob>,
        resolver: Arc<dyn AudioResolverPort>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            resolver,
        }
    }

    /// 启动 Worker，所有 ResolveQueue 被丢弃后退出
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "ResolveWorker started"
        );

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.max_concurrent.max(1)));

        while let Some(job) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("Failed to acquire semaphore permit");
                    let _ = job.reply.send(Err(ResolveError::WorkerUnavailable(
                        "worker is shutting down".to_string(),
                    )));
                    continue;
                }
            };

            let resolver = self.resolver.clone();

            tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成

                if job.reply.is_closed() {
                    tracing::debug!(url = %job.source_url, "Requester gone, skipping");
                    return;
                }

                let result = resolver.resolve(&job.source_url).await;
                if let Err(e) = &result {
                    tracing::warn!(url = %job.source_url, error = %e, "Resolve failed");
                }
                let _ = job.reply.send(result);
            });
        }

        tracing::info!("ResolveWorker stopped");
    }
}
