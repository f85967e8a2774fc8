//! Conversations between a booking's client and artist.
//!
//! A session subscribes to exactly one conversation at a time: opening a chat
//! sets `active_conversation`, and every exit path (the leave button, any
//! menu navigation, /start) clears it. Delivery to the counterpart is a push
//! to their Telegram chat; if they have the same conversation open it reads
//! as a live chat line, otherwise as a notification ping.

use std::collections::HashMap;

use sqlx::PgPool;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ReplyMarkup},
};

use crate::error::{AppError, Result};
use crate::store;

use super::{chat_menu, format_dt, menu_for, push, UserSession, UserStep};

/// How much history is replayed when a chat opens.
const HISTORY_LIMIT: usize = 20;

pub async fn show_conversations(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    profile_id: i64,
) -> Result<()> {
    let conversations = store::conversations_for(pool, profile_id).await?;
    if conversations.is_empty() {
        bot.send_message(
            chat_id,
            "No conversations yet. Use 💬 Contact on a booking to start one.",
        )
        .await?;
        return Ok(());
    }

    let keyboard: Vec<Vec<InlineKeyboardButton>> = conversations
        .iter()
        .map(|c| {
            vec![InlineKeyboardButton::callback(
                format!(
                    "{} — {}",
                    c.counterpart_name(profile_id),
                    format_dt(c.conversation.created_at)
                ),
                format!("conv:{}", c.conversation.id),
            )]
        })
        .collect();
    bot.send_message(
        chat_id,
        format!("💬 Conversations ({}):", conversations.len()),
    )
    .reply_markup(ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(keyboard)))
    .await?;
    Ok(())
}

/// Contact button on a booking: find or create the thread, then open it.
pub async fn open_for_booking(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    booking_id: i64,
) -> Result<()> {
    let Some(profile_id) = session.profile_id else {
        return Err(AppError::Forbidden(
            "Please register first with /start.".to_string(),
        ));
    };
    let booking = store::booking_by_id(pool, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;
    if booking.artist_id != profile_id && booking.client_id != profile_id {
        return Err(AppError::Forbidden(
            "You are not a party to this booking.".to_string(),
        ));
    }

    let conversation = store::find_or_create_conversation(pool, &booking).await?;
    open_conversation(bot, pool, chat_id, session, conversation.id).await
}

pub async fn open_conversation(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    conversation_id: i64,
) -> Result<()> {
    let Some(profile_id) = session.profile_id else {
        return Err(AppError::Forbidden(
            "Please register first with /start.".to_string(),
        ));
    };
    let view = store::conversation_for_participant(pool, conversation_id, profile_id)
        .await?
        .ok_or_else(|| {
            AppError::Forbidden("You are not part of that conversation.".to_string())
        })?;

    session.active_conversation = Some(conversation_id);
    session.step = UserStep::Chatting;

    let counterpart = view.counterpart_name(profile_id);
    let history = store::conversation_messages(pool, conversation_id).await?;
    let mut text = format!("💬 Chat with {counterpart}\n\n");
    if history.is_empty() {
        text.push_str("No messages yet — say hi!");
    } else {
        let skip = history.len().saturating_sub(HISTORY_LIMIT);
        for message in &history[skip..] {
            let who = if message.sender_id == profile_id {
                "You"
            } else {
                counterpart.as_str()
            };
            text.push_str(&format!(
                "[{}] {}: {}\n",
                format_dt(message.created_at),
                who,
                message.content
            ));
        }
    }
    text.push_str("\nAnything you type here is sent to them.");
    bot.send_message(chat_id, text)
        .reply_markup(ReplyMarkup::Keyboard(chat_menu()))
        .await?;
    Ok(())
}

pub async fn leave_chat(bot: &Bot, chat_id: ChatId, session: &mut UserSession) -> Result<()> {
    session.reset_dialog();
    let role = session.role.unwrap_or(crate::models::Role::Client);
    bot.send_message(chat_id, "Chat closed.")
        .reply_markup(ReplyMarkup::Keyboard(menu_for(role)))
        .await?;
    Ok(())
}

/// A text message typed while a chat is open: append it, then deliver.
pub async fn relay(
    bot: &Bot,
    pool: &PgPool,
    sessions: &mut HashMap<i64, UserSession>,
    conversation_id: Option<i64>,
    profile_id: Option<i64>,
    text: &str,
) -> Result<()> {
    let (Some(conversation_id), Some(profile_id)) = (conversation_id, profile_id) else {
        return Ok(());
    };

    let message = store::append_message(pool, conversation_id, profile_id, text)
        .await?
        .ok_or_else(|| {
            AppError::Forbidden("You are not part of that conversation.".to_string())
        })?;

    let view = store::conversation_for_participant(pool, conversation_id, profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Conversation".to_string()))?;
    let counterpart_telegram = view.counterpart_telegram_id(profile_id);
    let sender = store::profile_by_id(pool, profile_id)
        .await?
        .map(|p| p.display_name())
        .unwrap_or_else(|| "Someone".to_string());

    // Live line if they're looking at the same thread, a ping otherwise.
    let counterpart_watching = sessions
        .get(&counterpart_telegram)
        .map(|s| s.step == UserStep::Chatting && s.active_conversation == Some(conversation_id))
        .unwrap_or(false);
    let delivery = if counterpart_watching {
        format!("{sender}: {}", message.content)
    } else {
        format!("📨 New message from {sender}. Open 💬 Messages to reply.")
    };
    // No echo back to the sender; their own chat already shows the message.
    push(bot, counterpart_telegram, &delivery).await;
    Ok(())
}
