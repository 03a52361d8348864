//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod playback_handlers;
mod resolve_handler;

pub use playback_handlers::*;
pub use resolve_handler::*;
