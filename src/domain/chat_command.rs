//! 聊天命令解析
//!
//! 受限词汇表：`/start`、`/ping`、`/play <url>`、`/stop`
//! 支持 `/cmd@bot_username` 形式

use thiserror::Error;

/// 已识别的聊天命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    Ping,
    Play { url: String },
    Stop,
}

/// 命令解析错误（一律回复用法说明）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("Unknown command: /{0}")]
    Unknown(String),

    #[error("/{0} requires an argument")]
    MissingArgument(&'static str),

    #[error("/{0} takes no extra arguments")]
    UnexpectedArgument(&'static str),
}

/// 解析一条消息
///
/// 返回 `None`：不是命令，或命令是发给其他 bot 的
pub fn parse_command(
    text: &str,
    bot_username: Option<&str>,
) -> Option<Result<ChatCommand, CommandParseError>> {
    let body = text.trim_start().strip_prefix('/')?;

    let mut tokens = body.split_whitespace();
    let head = tokens.next()?;
    let args: Vec<&str> = tokens.collect();

    let (name, mention) = match head.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (head, None),
    };

    if let (Some(mention), Some(me)) = (mention, bot_username) {
        if !mention.eq_ignore_ascii_case(me) {
            return None;
        }
    }

    Some(match name.to_ascii_lowercase().as_str() {
        "start" => no_args("start", &args, ChatCommand::Start),
        "ping" => no_args("ping", &args, ChatCommand::Ping),
        "stop" => no_args("stop", &args, ChatCommand::Stop),
        "play" => match args.as_slice() {
            [] => Err(CommandParseError::MissingArgument("play")),
            [url] => Ok(ChatCommand::Play {
                url: (*url).to_string(),
            }),
            _ => Err(CommandParseError::UnexpectedArgument("play")),
        },
        other => Err(CommandParseError::Unknown(other.to_string())),
    })
}

fn no_args(
    name: &'static str,
    args: &[&str],
    command: ChatCommand,
) -> Result<ChatCommand, CommandParseError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(CommandParseError::UnexpectedArgument(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse_command("hello there", None), None);
        assert_eq!(parse_command("", None), None);
        assert_eq!(parse_command("/", None), None);
    }

    #[test]
    fn test_play_with_url() {
        let parsed = parse_command("/play https://youtu.be/dQw4w9WgXcQ", None);
        assert_eq!(
            parsed,
            Some(Ok(ChatCommand::Play {
                url: "https://youtu.be/dQw4w9WgXcQ".to_string()
            }))
        );
    }

    #[test]
    fn test_play_without_url() {
        assert_eq!(
            parse_command("/play", None),
            Some(Err(CommandParseError::MissingArgument("play")))
        );
        assert_eq!(
            parse_command("/play    ", None),
            Some(Err(CommandParseError::MissingArgument("play")))
        );
    }

    #[test]
    fn test_play_with_too_many_args() {
        assert_eq!(
            parse_command("/play a b", None),
            Some(Err(CommandParseError::UnexpectedArgument("play")))
        );
    }

    #[test]
    fn test_no_arg_commands() {
        assert_eq!(parse_command("/ping", None), Some(Ok(ChatCommand::Ping)));
        assert_eq!(parse_command("/STOP", None), Some(Ok(ChatCommand::Stop)));
        assert_eq!(parse_command("/start", None), Some(Ok(ChatCommand::Start)));
        assert_eq!(
            parse_command("/ping now", None),
            Some(Err(CommandParseError::UnexpectedArgument("ping")))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_command("/skip", None),
            Some(Err(CommandParseError::Unknown("skip".to_string())))
        );
    }

    #[test]
    fn test_bot_mention() {
        assert_eq!(
            parse_command("/stop@CastBot", Some("castbot")),
            Some(Ok(ChatCommand::Stop))
        );
        assert_eq!(parse_command("/stop@OtherBot", Some("castbot")), None);
        // 未知自身用户名时接受所有 mention
        assert_eq!(
            parse_command("/stop@OtherBot", None),
            Some(Ok(ChatCommand::Stop))
        );
    }
}
