//! Playback Context - Value Objects

use serde::{Deserialize, Serialize};

use super::PlaybackDomainError;

/// 播放目标标识（Telegram chat id）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DestinationId(i64);

impl DestinationId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for DestinationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DestinationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 音频来源（远程媒体 URL）
///
/// 只校验非空，URL 是否可用交给解析器判断
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUrl(String);

impl SourceUrl {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, PlaybackDomainError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PlaybackDomainError::EmptySource);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 播放状态
///
/// Idle 只作为查询结果出现，存储中的会话永远不是 Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Resolving,
    Playing,
    Stopping,
}

impl PlaybackState {
    /// 是否占用目标（新的 play 请求必须被拒绝）
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Resolving | Self::Playing)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Resolving => write!(f, "resolving"),
            Self::Playing => write!(f, "playing"),
            Self::Stopping => write!(f, "stopping"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_url_is_trimmed() {
        let url = SourceUrl::parse("  https://youtu.be/abc \n").unwrap();
        assert_eq!(url.as_str(), "https://youtu.be/abc");
    }

    #[test]
    fn test_blank_source_url_rejected() {
        assert_eq!(SourceUrl::parse(""), Err(PlaybackDomainError::EmptySource));
        assert_eq!(SourceUrl::parse("   "), Err(PlaybackDomainError::EmptySource));
    }

    #[test]
    fn test_active_states() {
        assert!(!PlaybackState::Idle.is_active());
        assert!(PlaybackState::Resolving.is_active());
        assert!(PlaybackState::Playing.is_active());
        assert!(!PlaybackState::Stopping.is_active());
    }

    #[test]
    fn test_destination_display() {
        assert_eq!(DestinationId::new(-100123).to_string(), "-100123");
    }
}
