//! Telegram 接入
//!
//! 长轮询接收消息，交给 CommandRouter，回复挂在原消息下

use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ReplyParameters, UserId};
use teloxide::RequestError;

use super::CommandRouter;
use crate::application::ports::{DestinationError, DestinationProbePort};
use crate::domain::playback::DestinationId;

/// Telegram bot
pub struct TelegramBot {
    bot: Bot,
    router: Arc<CommandRouter>,
}

impl TelegramBot {
    pub fn new(bot: Bot, router: Arc<CommandRouter>) -> Self {
        Self { bot, router }
    }

    /// 运行长轮询，直到进程退出
    pub async fn run(self) {
        tracing::info!("Telegram bot polling started");

        let handler = Update::filter_message().endpoint(handle_message);

        Dispatcher::builder(self.bot, handler)
            .dependencies(dptree::deps![self.router])
            .default_handler(|_| async {})
            .build()
            .dispatch()
            .await;

        tracing::info!("Telegram bot polling stopped");
    }
}

/// 同一聊天的更新按顺序分发，命令放到独立任务中处理，
/// 下载期间同一聊天的后续命令可以立即得到回复
async fn handle_message(bot: Bot, msg: Message, router: Arc<CommandRouter>) -> ResponseResult<()> {
    let Some(text) = msg.text().map(str::to_owned) else {
        return Ok(());
    };

    tokio::spawn(async move {
        let destination = DestinationId::new(msg.chat.id.0);
        let Some(reply) = router.handle(destination, &text).await else {
            return;
        };

        if let Err(e) = bot
            .send_message(msg.chat.id, reply)
            .reply_parameters(ReplyParameters::new(msg.id))
            .await
        {
            tracing::error!(destination = %destination, error = %e, "Failed to send reply");
        }
    });
    Ok(())
}

/// 通过 getChatMember 检查 bot 是否仍在目标聊天中
pub struct TelegramDestinationProbe {
    bot: Bot,
    bot_user_id: UserId,
}

impl TelegramDestinationProbe {
    pub fn new(bot: Bot, bot_user_id: UserId) -> Self {
        Self { bot, bot_user_id }
    }
}

#[async_trait]
impl DestinationProbePort for TelegramDestinationProbe {
    async fn check(&self, destination: DestinationId) -> Result<(), DestinationError> {
        let member = self
            .bot
            .get_chat_member(ChatId(destination.as_i64()), self.bot_user_id)
            .await
            .map_err(|e| match e {
                RequestError::Network(e) => DestinationError::NetworkError(e.to_string()),
                other => DestinationError::Unreachable(other.to_string()),
            })?;

        if member.kind.is_present() {
            Ok(())
        } else {
            Err(DestinationError::NotMember(destination))
        }
    }
}
