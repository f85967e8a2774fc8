//! Inline-button router. Callback data is "prefix" or "prefix:id".

use std::collections::HashMap;

use sqlx::PgPool;
use teloxide::{
    prelude::*,
    types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, ReplyMarkup},
};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::lifecycle;
use crate::models::{BookingStatus, Role};
use crate::store;

use super::{artist, client, commands, messages, payments, UserSession};

fn arg_id(data: &str) -> Option<i64> {
    data.split(':').nth(1)?.parse().ok()
}

pub async fn handle_callback_query(
    q: CallbackQuery,
    bot: Bot,
    msg: Message,
    pool: PgPool,
    config: Config,
    sessions: &mut HashMap<i64, UserSession>,
) -> Result<()> {
    let chat_id = msg.chat.id;
    let Some(data) = q.data.clone() else {
        return Ok(());
    };

    let session = sessions.entry(chat_id.0).or_insert_with(UserSession::new);
    if session.profile_id.is_none() {
        if let Some(profile) = store::profile_by_telegram(&pool, chat_id.0).await? {
            session.profile_id = Some(profile.id);
            session.role = Some(profile.role());
        }
    }

    match data.as_str() {
        "ignore" => {}
        "role:artist" => {
            if session.profile_id.is_none() {
                commands::register_role(&bot, chat_id, session, Role::Artist).await?;
            }
        }
        "role:client" => {
            if session.profile_id.is_none() {
                commands::register_role(&bot, chat_id, session, Role::Client).await?;
            }
        }
        "bkconfirm" => client::finalize_booking(&bot, &pool, chat_id, session).await?,
        "bkcancel" => client::abort_booking(&bot, chat_id, session).await?,
        "svcadd" => artist::begin_add_service(&bot, chat_id, session).await?,
        _ if data.starts_with("browse:") => {
            let page = data.split(':').nth(1).and_then(|s| s.parse().ok()).unwrap_or(0);
            client::show_artist_page(&bot, &pool, chat_id, page).await?;
        }
        _ if data.starts_with("artist:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            client::show_artist_detail(&bot, &pool, chat_id, session, id).await?;
        }
        _ if data.starts_with("svc:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            client::choose_service(&bot, &pool, chat_id, session, id).await?;
        }
        _ if data.starts_with("accept:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            artist::begin_accept(&bot, &pool, chat_id, session, id).await?;
        }
        _ if data.starts_with("decline:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            artist::begin_decline(&bot, &pool, chat_id, session, id).await?;
        }
        _ if data.starts_with("complete:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            complete_booking(&bot, &pool, chat_id, session, id).await?;
        }
        _ if data.starts_with("pay:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            payments::send_booking_invoice(&bot, &pool, &config, chat_id, session, id).await?;
        }
        _ if data.starts_with("rate:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            client::begin_rating(&bot, &pool, chat_id, session, id).await?;
        }
        _ if data.starts_with("stars:") => {
            let Some(stars) = arg_id(&data) else { return Ok(()) };
            client::set_stars(&bot, chat_id, session, stars as i32).await?;
        }
        _ if data.starts_with("conv:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            messages::open_conversation(&bot, &pool, chat_id, session, id).await?;
        }
        _ if data.starts_with("chat:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            messages::open_for_booking(&bot, &pool, chat_id, session, id).await?;
        }
        _ if data.starts_with("svctype:") => {
            let Some(index) = arg_id(&data) else { return Ok(()) };
            artist::set_service_type(&bot, chat_id, session, index as usize).await?;
        }
        _ if data.starts_with("svctravel:") => {
            let Some(value) = arg_id(&data) else { return Ok(()) };
            artist::set_service_flag(&bot, &pool, chat_id, session, true, value == 1).await?;
        }
        _ if data.starts_with("svcbridal:") => {
            let Some(value) = arg_id(&data) else { return Ok(()) };
            artist::set_service_flag(&bot, &pool, chat_id, session, false, value == 1).await?;
        }
        _ if data.starts_with("svcprice:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            artist::begin_price_edit(&bot, chat_id, session, id).await?;
        }
        _ if data.starts_with("svcdel:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            artist::delete_service(&bot, &pool, chat_id, session, id).await?;
        }
        _ if data.starts_with("pfdel:") => {
            let Some(id) = arg_id(&data) else { return Ok(()) };
            artist::delete_portfolio_photo(&bot, &pool, chat_id, session, id).await?;
        }
        _ if data.starts_with("editfield:") => {
            let Some(key) = data.split(':').nth(1) else {
                return Ok(());
            };
            let Some(field) = commands::field_from_key(key) else {
                return Ok(());
            };
            commands::begin_profile_edit(&bot, chat_id, session, field).await?;
        }
        _ => {
            warn!("unhandled callback data: {}", data);
        }
    }
    Ok(())
}

/// confirmed → completed, reachable from both parties' booking lists.
async fn complete_booking(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    booking_id: i64,
) -> Result<()> {
    let actor = session
        .actor()
        .ok_or_else(|| AppError::Forbidden("Please register first with /start.".to_string()))?;
    let booking = store::booking_by_id(pool, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;
    lifecycle::complete(&booking, &actor)?;

    let completed = store::complete_booking(pool, booking_id, actor.profile_id)
        .await?
        .ok_or_else(|| {
            AppError::InvalidTransition("This booking is not confirmed anymore.".to_string())
        })?;
    info!("booking {} completed", completed.id);
    debug_assert_eq!(completed.status(), BookingStatus::Completed);

    bot.send_message(chat_id, format!("🏁 Booking #{} marked as completed.", completed.id))
        .await?;

    if let Some(view) = store::booking_view_by_id(pool, booking_id).await? {
        let by_client = actor.profile_id == view.booking.client_id;
        let counterpart = if by_client {
            view.artist_telegram_id
        } else {
            view.client_telegram_id
        };
        super::push(
            bot,
            counterpart,
            &format!("🏁 The booking for {} was marked as completed.", view.service_name),
        )
        .await;

        // Completion is what unlocks rating for the client.
        if by_client {
            let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
                "⭐ Rate this booking",
                format!("rate:{}", completed.id),
            )]]);
            bot.send_message(chat_id, "How did it go?")
                .reply_markup(ReplyMarkup::InlineKeyboard(keyboard))
                .await?;
        }
    }
    Ok(())
}
