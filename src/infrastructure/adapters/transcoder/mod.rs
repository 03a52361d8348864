//! Audio Transcoder Adapters

mod ffmpeg_transcoder;

pub use ffmpeg_transcoder::{FfmpegTranscoder, FfmpegTranscoderConfig};
