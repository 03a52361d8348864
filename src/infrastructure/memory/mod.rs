//! Memory Layer - In-Memory State Management
//!
//! 播放会话只存在于进程内存中，重启即清空

mod session_manager;

pub use session_manager::InMemoryPlaybackSessions;
