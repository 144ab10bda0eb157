use crate::format::{TELEGRAM_MESSAGE_LIMIT, asterisk_to_quote, split_message};
use crate::{Command, Error, Result, TelegramBot};
use teloxide::{
    payloads::SendMessageSetters,
    requests::Requester,
    types::{ChatAction, ChatId, Message},
};
use tether_conversation::{ConversationError, StartOutcome};
use tether_core::SessionId;
use tracing::{debug, info, warn};

/// Handle bot commands
pub async fn handle_command(bot: TelegramBot, msg: Message, cmd: Command) -> Result<()> {
    let chat = msg.chat.id;
    let session_id = SessionId::telegram(chat.0);
    let username = msg
        .from
        .as_ref()
        .and_then(|u| u.username.as_deref())
        .unwrap_or("unknown");

    match cmd {
        Command::Start => {
            info!("[@{username}] Command: /start");
            bot.bot
                .send_message(chat, Command::welcome_text())
                .reply_markup(Command::consent_keyboard())
                .await?;
        }
        Command::Agree => {
            info!("[@{username}] Command: /agree");
            let text = match bot.registry.start(&session_id, None).await {
                StartOutcome::Started => "Session started. Say hello whenever you are ready.",
                StartOutcome::Restarted => "Session restarted with a fresh memory.",
            };
            send_reply(&bot, chat, text).await?;
        }
        Command::Reset => {
            info!("[@{username}] Command: /reset");
            bot.registry.reset(&session_id, None).await;
            send_reply(&bot, chat, "🧹 Conversation memory cleared.").await?;
        }
        Command::Feedback => {
            info!("[@{username}] Command: /feedback");
            bot.bot.send_chat_action(chat, ChatAction::Typing).await?;
            match bot.registry.review(&session_id).await {
                Ok(feedback) => send_reply(&bot, chat, &asterisk_to_quote(&feedback)).await?,
                Err(e) => send_error(&bot, chat, &e).await?,
            }
        }
        Command::Help => {
            info!("[@{username}] Command: /help");
            bot.bot
                .send_message(chat, Command::help_text())
                .await?;
        }
    }

    Ok(())
}

/// Handle any message (commands or regular text)
pub async fn handle_message(bot: TelegramBot, msg: Message) -> Result<()> {
    let chat_id = msg.chat.id.0;
    if !bot.is_allowed(chat_id) {
        return Err(Error::Unauthorized(chat_id));
    }
    let Some(text) = msg.text() else {
        debug!("Ignoring non-text message in chat {chat_id}");
        return Ok(());
    };
    let username = msg
        .from
        .as_ref()
        .and_then(|u| u.username.as_deref())
        .unwrap_or("unknown");

    if let Some(cmd) = Command::parse_from_text(text) {
        return handle_command(bot, msg, cmd).await;
    }

    info!("[@{username}] Message: {text}");

    bot.bot
        .send_chat_action(msg.chat.id, ChatAction::Typing)
        .await?;

    match bot
        .registry
        .process_turn(&SessionId::telegram(chat_id), text)
        .await
    {
        Ok(response) => {
            info!("[@{username}] Response: {} chars", response.len());
            send_reply(&bot, msg.chat.id, &asterisk_to_quote(&response)).await
        }
        Err(e) => send_error(&bot, msg.chat.id, &e).await,
    }
}

/// Send `text` in as many messages as needed, keyboard on the last one.
async fn send_reply(bot: &TelegramBot, chat: ChatId, text: &str) -> Result<()> {
    let chunks = split_message(text, TELEGRAM_MESSAGE_LIMIT);
    let last = chunks.len().saturating_sub(1);
    for (idx, chunk) in chunks.into_iter().enumerate() {
        let request = bot.bot.send_message(chat, chunk);
        if idx == last {
            request.reply_markup(Command::session_keyboard()).await?;
        } else {
            request.await?;
        }
    }
    Ok(())
}

async fn send_error(bot: &TelegramBot, chat: ChatId, error: &ConversationError) -> Result<()> {
    let text = match error {
        ConversationError::SessionNotStarted(_) => Command::not_started_text(),
        other => {
            warn!("Chat {}: {other}", chat.0);
            other.user_message()
        }
    };
    bot.bot.send_message(chat, text).await?;
    Ok(())
}
