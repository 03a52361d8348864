//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：播放会话的启动/停止与音频解析

mod playback_commands;
mod resolve_commands;

pub mod handlers;

pub use playback_commands::*;
pub use resolve_commands::*;
