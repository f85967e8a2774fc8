//! Artist-side flows: service management, answering booking requests,
//! stats and the portfolio.

use sqlx::PgPool;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ReplyMarkup},
};
use url::Url;

use crate::error::{AppError, Result};
use crate::lifecycle;
use crate::models::{BookingStatus, Role, SERVICE_TYPES};
use crate::stats;
use crate::store;

use super::{format_dt, naira, opt_text, parse_price, push, UserSession, UserStep};

// ---------------------------------------------------------------------------
// services

pub async fn show_services(bot: &Bot, pool: &PgPool, chat_id: ChatId, profile_id: i64) -> Result<()> {
    let services = store::services_for_artist(pool, profile_id).await?;

    if services.is_empty() {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "➕ Add a service",
            "svcadd",
        )]]);
        bot.send_message(
            chat_id,
            "You haven't published any services yet. Clients can only book what's listed here.",
        )
        .reply_markup(ReplyMarkup::InlineKeyboard(keyboard))
        .await?;
        return Ok(());
    }

    for service in &services {
        let mut text = format!(
            "*{}* ({})\n{}",
            service.service_name,
            service.service_type,
            naira(service.base_price)
        );
        if let Some(description) = &service.description {
            text.push_str(&format!("\n{description}"));
        }
        text.push_str(&format!("\n👥 up to {}", service.max_people));
        if service.travel_required {
            text.push_str(" · 🚗 travel");
        }
        if service.includes_bridal_shower {
            text.push_str(" · 🥂 bridal shower");
        }
        let keyboard = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("💰 Change price", format!("svcprice:{}", service.id)),
            InlineKeyboardButton::callback("🗑 Delete", format!("svcdel:{}", service.id)),
        ]]);
        bot.send_message(chat_id, text)
            .parse_mode(teloxide::types::ParseMode::Markdown)
            .reply_markup(ReplyMarkup::InlineKeyboard(keyboard))
            .await?;
    }

    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "➕ Add a service",
        "svcadd",
    )]]);
    bot.send_message(chat_id, format!("{} service(s) listed.", services.len()))
        .reply_markup(ReplyMarkup::InlineKeyboard(keyboard))
        .await?;
    Ok(())
}

/// Callback arm: the add button. Starts the guided dialog.
pub async fn begin_add_service(
    bot: &Bot,
    chat_id: ChatId,
    session: &mut UserSession,
) -> Result<()> {
    session.service_draft = Default::default();
    session.step = UserStep::ServiceName;
    bot.send_message(chat_id, "What's the service called? (e.g. \"Full Bridal Glam\")")
        .await?;
    Ok(())
}

fn service_type_keyboard() -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = SERVICE_TYPES
        .chunks(2)
        .enumerate()
        .map(|(row, chunk)| {
            chunk
                .iter()
                .enumerate()
                .map(|(col, name)| {
                    InlineKeyboardButton::callback(*name, format!("svctype:{}", row * 2 + col))
                })
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn yes_no_keyboard(prefix: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Yes", format!("{prefix}:1")),
        InlineKeyboardButton::callback("No", format!("{prefix}:0")),
    ]])
}

pub async fn service_input(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    text: &str,
) -> Result<()> {
    match session.step {
        UserStep::ServiceName => {
            if text.len() < 3 {
                bot.send_message(chat_id, "That name is too short. Try again:")
                    .await?;
                return Ok(());
            }
            session.service_draft.name = Some(text.to_string());
            session.step = UserStep::ServiceType;
            bot.send_message(chat_id, "What kind of service is it?")
                .reply_markup(ReplyMarkup::InlineKeyboard(service_type_keyboard()))
                .await?;
        }
        UserStep::ServicePrice => {
            let Some(price) = parse_price(text) else {
                bot.send_message(chat_id, "Send the price as a number, like 15000.")
                    .await?;
                return Ok(());
            };
            session.service_draft.base_price = Some(price);
            session.step = UserStep::ServiceDescription;
            bot.send_message(chat_id, "Describe the service in one message, or \"-\" to skip.")
                .await?;
        }
        UserStep::ServiceDescription => {
            session.service_draft.description = opt_text(text);
            session.step = UserStep::ServiceMaxPeople;
            bot.send_message(chat_id, "For how many people at most? (e.g. 1)")
                .await?;
        }
        UserStep::ServiceMaxPeople => {
            let Ok(people) = text.trim().parse::<i32>() else {
                bot.send_message(chat_id, "Send a number, like 1 or 5.").await?;
                return Ok(());
            };
            if people < 1 {
                bot.send_message(chat_id, "At least 1 person. Try again:").await?;
                return Ok(());
            }
            session.service_draft.max_people = Some(people);
            session.step = UserStep::ServiceTravel;
            bot.send_message(chat_id, "Do you travel to the client for this service?")
                .reply_markup(ReplyMarkup::InlineKeyboard(yes_no_keyboard("svctravel")))
                .await?;
        }
        _ => {}
    }
    Ok(())
}

/// Callback arm: a service type was picked from the grid.
pub async fn set_service_type(
    bot: &Bot,
    chat_id: ChatId,
    session: &mut UserSession,
    index: usize,
) -> Result<()> {
    let Some(service_type) = SERVICE_TYPES.get(index) else {
        return Ok(());
    };
    session.service_draft.service_type = Some(service_type.to_string());
    session.step = UserStep::ServicePrice;
    bot.send_message(chat_id, "What's the base price in naira? (e.g. 15000)")
        .await?;
    Ok(())
}

/// Callback arms for the two yes/no questions; the second one completes the
/// dialog and writes the service.
pub async fn set_service_flag(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    travel: bool,
    value: bool,
) -> Result<()> {
    if travel {
        session.service_draft.travel_required = Some(value);
        session.step = UserStep::ServiceBridal;
        bot.send_message(chat_id, "Does it include a bridal shower session?")
            .reply_markup(ReplyMarkup::InlineKeyboard(yes_no_keyboard("svcbridal")))
            .await?;
        return Ok(());
    }

    session.service_draft.includes_bridal_shower = Some(value);
    let Some(profile_id) = session.profile_id else {
        return Ok(());
    };
    let draft = session.service_draft.clone();
    let (Some(name), Some(service_type), Some(base_price)) =
        (draft.name, draft.service_type, draft.base_price)
    else {
        session.reset_dialog();
        return Err(AppError::InvalidInput(
            "The service dialog was interrupted. Start again from 🎨 My Services.".to_string(),
        ));
    };

    let service = store::create_service(
        pool,
        profile_id,
        &name,
        &service_type,
        draft.description.as_deref(),
        base_price,
        draft.max_people.unwrap_or(1),
        draft.travel_required.unwrap_or(false),
        value,
    )
    .await?;
    info!("artist {} published service {}", profile_id, service.id);

    session.reset_dialog();
    bot.send_message(
        chat_id,
        format!(
            "Published! Clients can now book *{}* at {}.",
            service.service_name,
            naira(service.base_price)
        ),
    )
    .parse_mode(teloxide::types::ParseMode::Markdown)
    .await?;
    Ok(())
}

pub async fn begin_price_edit(
    bot: &Bot,
    chat_id: ChatId,
    session: &mut UserSession,
    service_id: i64,
) -> Result<()> {
    session.editing_service = Some(service_id);
    session.step = UserStep::EditingServicePrice;
    bot.send_message(chat_id, "Send the new base price, like 18000:")
        .await?;
    Ok(())
}

pub async fn price_input(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    text: &str,
) -> Result<()> {
    let Some(price) = parse_price(text) else {
        bot.send_message(chat_id, "Send the price as a number, like 18000.")
            .await?;
        return Ok(());
    };
    let (Some(profile_id), Some(service_id)) = (session.profile_id, session.editing_service) else {
        session.reset_dialog();
        return Ok(());
    };

    // Existing bookings keep the price captured when they were made.
    let updated = store::update_service_price(pool, service_id, profile_id, price).await?;
    session.reset_dialog();
    if updated {
        bot.send_message(chat_id, format!("Price updated to {}.", naira(price)))
            .await?;
    } else {
        bot.send_message(chat_id, "That service isn't yours or no longer exists.")
            .await?;
    }
    Ok(())
}

pub async fn delete_service(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &UserSession,
    service_id: i64,
) -> Result<()> {
    let Some(profile_id) = session.profile_id else {
        return Ok(());
    };
    let deleted = store::delete_service(pool, service_id, profile_id).await?;
    if deleted {
        bot.send_message(chat_id, "Service removed.").await?;
    } else {
        bot.send_message(chat_id, "That service isn't yours or no longer exists.")
            .await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// bookings

pub async fn show_bookings(bot: &Bot, pool: &PgPool, chat_id: ChatId, profile_id: i64) -> Result<()> {
    let views = store::booking_views_for(pool, Role::Artist, profile_id).await?;
    if views.is_empty() {
        bot.send_message(chat_id, "No bookings yet. Requests from clients will appear here.")
            .await?;
        return Ok(());
    }

    for view in views {
        let booking = &view.booking;
        let status = booking.status();
        let mut text = format!(
            "*Booking #{}* — {}\n{} ({})\n📅 {}\n🙋 {}",
            booking.id,
            status.label(),
            view.service_name,
            view.service_type,
            format_dt(booking.booking_date),
            view.client_name(),
        );
        let price = lifecycle::effective_price(booking);
        if booking.negotiated_price.is_some() {
            text.push_str(&format!(
                "\n💰 {} (listed at {})",
                naira(price),
                naira(booking.original_price)
            ));
        } else {
            text.push_str(&format!("\n💰 {}", naira(price)));
        }
        if let Some(address) = &booking.travel_address {
            text.push_str(&format!("\n📍 {address}"));
        }
        if let Some(notes) = &booking.client_notes {
            text.push_str(&format!("\n📝 Client: {notes}"));
        }
        if booking.paid_at.is_some() {
            text.push_str("\n💳 Paid");
        }

        let mut row: Vec<InlineKeyboardButton> = Vec::new();
        match status {
            BookingStatus::Pending => {
                row.push(InlineKeyboardButton::callback(
                    "✅ Accept",
                    format!("accept:{}", booking.id),
                ));
                row.push(InlineKeyboardButton::callback(
                    "❌ Decline",
                    format!("decline:{}", booking.id),
                ));
            }
            BookingStatus::Confirmed => {
                row.push(InlineKeyboardButton::callback(
                    "✔ Mark complete",
                    format!("complete:{}", booking.id),
                ));
            }
            BookingStatus::Cancelled | BookingStatus::Completed => {}
        }
        if status != BookingStatus::Cancelled {
            row.push(InlineKeyboardButton::callback(
                "💬 Contact",
                format!("chat:{}", booking.id),
            ));
        }

        let mut message = bot
            .send_message(chat_id, text)
            .parse_mode(teloxide::types::ParseMode::Markdown);
        if !row.is_empty() {
            message = message.reply_markup(ReplyMarkup::InlineKeyboard(
                InlineKeyboardMarkup::new(vec![row]),
            ));
        }
        message.await?;
    }
    Ok(())
}

/// Callback arm: Accept. Checks the transition now, then walks the price
/// and notes questions before writing anything.
pub async fn begin_accept(
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
    lifecycle::authorize_transition(&booking, &actor, BookingStatus::Confirmed)?;

    session.pending_booking = Some(booking_id);
    session.step = UserStep::NegotiatingPrice;
    bot.send_message(
        chat_id,
        format!(
            "The request is at {}. Offer a different price, or \"-\" to keep it.",
            naira(booking.original_price)
        ),
    )
    .await?;
    Ok(())
}

/// Callback arm: Decline.
pub async fn begin_decline(
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
    lifecycle::authorize_transition(&booking, &actor, BookingStatus::Cancelled)?;

    session.pending_booking = Some(booking_id);
    session.step = UserStep::DeclineNotes;
    bot.send_message(
        chat_id,
        "Tell the client why, or send \"-\" to decline without a note.",
    )
    .await?;
    Ok(())
}

pub async fn negotiation_input(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    text: &str,
) -> Result<()> {
    match session.step {
        UserStep::NegotiatingPrice => {
            match opt_text(text) {
                None => session.negotiated_price = None,
                Some(raw) => match parse_price(&raw) {
                    Some(price) => session.negotiated_price = Some(price),
                    None => {
                        bot.send_message(
                            chat_id,
                            "Send a number like 12000, or \"-\" to keep the listed price.",
                        )
                        .await?;
                        return Ok(());
                    }
                },
            }
            session.step = UserStep::AcceptNotes;
            bot.send_message(chat_id, "Any notes for the client? Or \"-\" to skip.")
                .await?;
        }
        UserStep::AcceptNotes => {
            let actor = session.actor().ok_or_else(|| {
                AppError::Forbidden("Please register first with /start.".to_string())
            })?;
            let booking_id = session
                .pending_booking
                .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;
            let booking = store::booking_by_id(pool, booking_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;

            let notes = opt_text(text);
            let patch = lifecycle::accept(&booking, &actor, session.negotiated_price, notes)?;

            let confirmed = store::confirm_booking(
                pool,
                booking_id,
                actor.profile_id,
                patch.negotiated_price,
                patch.artist_notes.as_deref(),
            )
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition(
                    "This booking is no longer pending.".to_string(),
                )
            })?;
            info!("booking {} confirmed", confirmed.id);

            session.reset_dialog();
            bot.send_message(
                chat_id,
                format!("✅ Booking #{} confirmed at {}.", confirmed.id,
                    naira(lifecycle::effective_price(&confirmed))),
            )
            .await?;

            if let Some(view) = store::booking_view_by_id(pool, booking_id).await? {
                let mut note = format!(
                    "🎉 {} accepted your booking for {} on {}!\n\n{} + {} platform fee = {}",
                    view.artist_name(),
                    view.service_name,
                    format_dt(confirmed.booking_date),
                    naira(lifecycle::effective_price(&confirmed)),
                    naira(lifecycle::platform_fee(&confirmed)),
                    naira(lifecycle::total_due(&confirmed)),
                );
                if let Some(artist_notes) = &confirmed.artist_notes {
                    note.push_str(&format!("\n📝 {artist_notes}"));
                }
                push(bot, view.client_telegram_id, &note).await;
            }
        }
        UserStep::DeclineNotes => {
            let actor = session.actor().ok_or_else(|| {
                AppError::Forbidden("Please register first with /start.".to_string())
            })?;
            let booking_id = session
                .pending_booking
                .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;
            let booking = store::booking_by_id(pool, booking_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;

            let notes = opt_text(text);
            let patch = lifecycle::decline(&booking, &actor, notes)?;

            let cancelled = store::cancel_booking(
                pool,
                booking_id,
                actor.profile_id,
                patch.artist_notes.as_deref(),
            )
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition(
                    "This booking is no longer pending.".to_string(),
                )
            })?;
            info!("booking {} declined", cancelled.id);

            session.reset_dialog();
            bot.send_message(chat_id, format!("❌ Booking #{} declined.", cancelled.id))
                .await?;

            if let Some(view) = store::booking_view_by_id(pool, booking_id).await? {
                let mut note = format!(
                    "😔 {} declined your booking for {}.",
                    view.artist_name(),
                    view.service_name
                );
                if let Some(artist_notes) = &cancelled.artist_notes {
                    note.push_str(&format!("\n📝 {artist_notes}"));
                }
                push(bot, view.client_telegram_id, &note).await;
            }
        }
        _ => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// stats & portfolio

pub async fn show_stats(bot: &Bot, pool: &PgPool, chat_id: ChatId, profile_id: i64) -> Result<()> {
    let bookings = store::bookings_for(pool, Role::Artist, profile_id).await?;
    let ratings = store::ratings_for_artist(pool, profile_id).await?;
    let s = stats::artist_stats(&bookings, &ratings);
    let pending = stats::pending_count(&bookings);

    bot.send_message(
        chat_id,
        format!(
            "📊 *Your numbers*\n\n\
             Bookings: {} ({} pending, {} completed)\n\
             Completion rate: {:.0}%\n\
             Revenue: {}\n\
             Tips: {}\n\
             Average rating: {:.1} from {} review(s)",
            s.total_bookings,
            pending,
            s.completed_bookings,
            s.completion_rate,
            naira(s.total_earnings),
            naira(s.tip_total),
            s.average_rating,
            ratings.len(),
        ),
    )
    .parse_mode(teloxide::types::ParseMode::Markdown)
    .await?;

    let reviews = store::rating_views_for_artist(pool, profile_id).await?;
    if !reviews.is_empty() {
        let mut text = String::from("Recent reviews:\n\n");
        for view in reviews.iter().take(5) {
            text.push_str(&format!(
                "{} — {} {} ({})",
                "⭐".repeat(view.rating.rating as usize),
                view.client_first_name,
                view.client_last_name,
                view.service_name
            ));
            if let Some(comment) = &view.rating.comment {
                text.push_str(&format!("\n_{comment}_"));
            }
            text.push('\n');
        }
        bot.send_message(chat_id, text)
            .parse_mode(teloxide::types::ParseMode::Markdown)
            .await?;
    }
    Ok(())
}

pub async fn show_portfolio(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    profile_id: i64,
) -> Result<()> {
    let photos = store::portfolio_for_artist(pool, profile_id).await?;

    if photos.is_empty() {
        bot.send_message(
            chat_id,
            format!(
                "Your portfolio is empty. Send up to {} links to your work, \
                 one per message, like \"https://example.com/look.jpg\".",
                store::PORTFOLIO_CAP
            ),
        )
        .await?;
        return Ok(());
    }

    let mut text = format!("🖼 *Portfolio* ({}/{})\n\n", photos.len(), store::PORTFOLIO_CAP);
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for (i, photo) in photos.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, photo.photo_url));
        keyboard.push(vec![InlineKeyboardButton::callback(
            format!("🗑 Remove #{}", i + 1),
            format!("pfdel:{}", photo.id),
        )]);
    }
    if (photos.len() as i64) < store::PORTFOLIO_CAP {
        text.push_str("\nSend another link to add to it.");
    } else {
        text.push_str("\nThe portfolio is full — remove one to add another.");
    }
    bot.send_message(chat_id, text)
        .parse_mode(teloxide::types::ParseMode::Markdown)
        .reply_markup(ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(keyboard)))
        .await?;
    Ok(())
}

pub async fn portfolio_input(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    text: &str,
) -> Result<()> {
    let Some(profile_id) = session.profile_id else {
        return Ok(());
    };
    match Url::parse(text) {
        Ok(url) => {
            let added = store::add_portfolio_photo(pool, profile_id, url.as_str()).await?;
            match added {
                Some(_) => {
                    bot.send_message(chat_id, "Added to your portfolio! 🖼").await?;
                    show_portfolio(bot, pool, chat_id, profile_id).await?;
                }
                None => {
                    bot.send_message(
                        chat_id,
                        format!(
                            "Your portfolio already has {} items. Remove one first.",
                            store::PORTFOLIO_CAP
                        ),
                    )
                    .await?;
                }
            }
        }
        Err(_) => {
            bot.send_message(
                chat_id,
                "Send a full link like \"https://example.com/look.jpg\"",
            )
            .await?;
        }
    }
    Ok(())
}

pub async fn delete_portfolio_photo(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &UserSession,
    photo_id: i64,
) -> Result<()> {
    let Some(profile_id) = session.profile_id else {
        return Ok(());
    };
    let removed = store::remove_portfolio_photo(pool, photo_id, profile_id).await?;
    if removed {
        bot.send_message(chat_id, "Removed.").await?;
        show_portfolio(bot, pool, chat_id, profile_id).await?;
    }
    Ok(())
}
