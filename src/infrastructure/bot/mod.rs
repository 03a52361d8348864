//! Bot Layer - 聊天消息入口
//!
//! - router: 命令解析与分发
//! - reply: 回复文本
//! - telegram: teloxide 长轮询与目标检查

pub mod reply;
mod router;
mod telegram;

pub use router::CommandRouter;
pub use telegram::{TelegramBot, TelegramDestinationProbe};
