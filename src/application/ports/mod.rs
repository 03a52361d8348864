//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_resolver;
mod audio_storage;
mod audio_transcoder;
mod destination;
mod media_extractor;
mod media_lease;
mod session_manager;
mod voice_call;

#[cfg(test)]
pub(crate) mod fakes;

pub use audio_resolver::{AudioResolverPort, ResolveError, ResolvedAudio};
pub use audio_storage::{AudioStorageError, AudioStoragePort, SweepResult};
pub use audio_transcoder::{AudioFormat, AudioTranscoderPort, TranscodeConfig, TranscodeError};
pub use destination::{DestinationError, DestinationProbePort};
pub use media_extractor::{media_file_stem, ExtractError, MediaExtractorPort, MediaInfo};
pub use media_lease::{MediaLease, MediaLeases};
pub use session_manager::{PlaybackSessionPort, SessionError, StopRequest};
pub use voice_call::{VoiceCallError, VoiceCallPort};
