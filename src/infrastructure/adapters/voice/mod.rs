//! Voice Call Adapters

mod http_voice_client;

pub use http_voice_client::{HttpVoiceCallClient, HttpVoiceCallClientConfig};
