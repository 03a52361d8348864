//! Liveness Handler

/// 存活响应正文
pub const LIVENESS_BODY: &str = "Bot is alive!";

/// `GET /`
pub async fn liveness() -> &'static str {
    LIVENESS_BODY
}
