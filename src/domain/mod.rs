//! Domain Layer - 领域层
//!
//! 包含:
//! - Playback Context: 每个目标会话（群组）的播放会话
//! - 聊天命令解析

pub mod playback;

// 聊天命令解析器
mod chat_command;

pub use chat_command::{parse_command, ChatCommand, CommandParseError};
