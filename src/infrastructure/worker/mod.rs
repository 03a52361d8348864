//! Worker Layer - Background Task Processing
//!
//! 实现 ResolveWorker，处理音频下载与转码任务

mod resolve_worker;

pub use resolve_worker::{
    resolve_channel, ResolveJob, ResolveQueue, ResolveWorker, ResolveWorkerConfig,
};
