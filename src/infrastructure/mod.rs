//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现，以及 Telegram 与 HTTP 入口

pub mod adapters;
pub mod bot;
pub mod http;
pub mod memory;
pub mod worker;

pub use bot::{CommandRouter, TelegramBot, TelegramDestinationProbe};
pub use memory::InMemoryPlaybackSessions;
pub use worker::{resolve_channel, ResolveQueue, ResolveWorker, ResolveWorkerConfig};
