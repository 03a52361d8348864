//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（MediaExtractor、AudioTranscoder、VoiceCall、PlaybackSession 等）
//! - commands: 播放与音频解析命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    handlers::{CleanupPolicy, ResolveAudioHandler, StartPlaybackHandler, StopPlaybackHandler},
    ResolveAudioCommand, StartPlaybackCommand, StartPlaybackResponse, StopPlaybackCommand,
    StopPlaybackResponse,
};

pub use error::PlaybackError;

pub use ports::{
    // Resolver
    AudioResolverPort,
    ResolveError,
    ResolvedAudio,
    // Storage
    AudioStorageError,
    AudioStoragePort,
    SweepResult,
    // Transcoder
    AudioFormat,
    AudioTranscoderPort,
    TranscodeConfig,
    TranscodeError,
    // Extractor
    ExtractError,
    MediaExtractorPort,
    MediaInfo,
    // Media leases
    MediaLease,
    MediaLeases,
    // Destination
    DestinationError,
    DestinationProbePort,
    // Session manager
    PlaybackSessionPort,
    SessionError,
    StopRequest,
    // Voice call
    VoiceCallError,
    VoiceCallPort,
};
