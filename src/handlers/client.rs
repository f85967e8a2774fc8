//! Client-side flows: browsing artists, requesting bookings, rating
//! completed work.

use chrono::Utc;
use sqlx::PgPool;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ReplyMarkup},
};

use crate::error::{AppError, Result};
use crate::lifecycle;
use crate::models::{BookingStatus, Role};
use crate::store;

use super::{
    format_dt, naira, opt_text, parse_booking_date, parse_price, push, UserSession, UserStep,
};

const ARTISTS_PER_PAGE: usize = 3;

pub async fn show_artist_page(bot: &Bot, pool: &PgPool, chat_id: ChatId, page: usize) -> Result<()> {
    let artists = store::artist_directory(pool).await?;
    if artists.is_empty() {
        bot.send_message(chat_id, "No artists have joined yet. Check back soon!")
            .await?;
        return Ok(());
    }

    let total_pages = artists.len().div_ceil(ARTISTS_PER_PAGE);
    let page = page.min(total_pages - 1);
    let start = page * ARTISTS_PER_PAGE;
    let end = (start + ARTISTS_PER_PAGE).min(artists.len());

    let mut text = String::from("💄 *Makeup artists*\n\n");
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for artist in &artists[start..end] {
        let mut line = format!("*{}*", artist.display_name());
        if artist.is_verified {
            line.push_str(" 🏅");
        }
        if artist.ratings_count > 0 {
            line.push_str(&format!(
                " — ⭐ {:.1} ({} reviews)",
                artist.average_rating, artist.ratings_count
            ));
        }
        if artist.completed_bookings > 0 {
            line.push_str(&format!(", {} bookings done", artist.completed_bookings));
        }
        match (&artist.location_city, &artist.location_state) {
            (Some(city), _) => line.push_str(&format!("\n📍 {city}")),
            (None, Some(state)) => line.push_str(&format!("\n📍 {state}")),
            _ => {}
        }
        if let Some(bio) = &artist.bio {
            line.push_str(&format!("\n_{bio}_"));
        }
        text.push_str(&line);
        text.push_str("\n\n");
        keyboard.push(vec![InlineKeyboardButton::callback(
            format!("View {}", artist.display_name()),
            format!("artist:{}", artist.id),
        )]);
    }

    if total_pages > 1 {
        let mut nav = Vec::new();
        if page > 0 {
            nav.push(InlineKeyboardButton::callback(
                "⬅️ Back",
                format!("browse:{}", page - 1),
            ));
        }
        nav.push(InlineKeyboardButton::callback(
            format!("📄 {}/{}", page + 1, total_pages),
            "ignore".to_string(),
        ));
        if page < total_pages - 1 {
            nav.push(InlineKeyboardButton::callback(
                "Next ➡️",
                format!("browse:{}", page + 1),
            ));
        }
        keyboard.push(nav);
    }

    bot.send_message(chat_id, text)
        .parse_mode(teloxide::types::ParseMode::Markdown)
        .reply_markup(ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(keyboard)))
        .await?;
    Ok(())
}

pub async fn show_artist_detail(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    artist_id: i64,
) -> Result<()> {
    let profile = store::profile_by_id(pool, artist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist".to_string()))?;
    let services = store::services_for_artist(pool, artist_id).await?;
    let portfolio = store::portfolio_for_artist(pool, artist_id).await?;

    let mut text = format!("💄 *{}*\n", profile.display_name());
    if let Some(bio) = &profile.bio {
        text.push_str(&format!("{bio}\n"));
    }
    if let Some(instagram) = &profile.instagram_handle {
        text.push_str(&format!("📷 {instagram}\n"));
    }
    if !portfolio.is_empty() {
        text.push_str("\n🖼 Portfolio:\n");
        for photo in &portfolio {
            text.push_str(&format!("{}\n", photo.photo_url));
        }
    }

    if services.is_empty() {
        text.push_str("\nThis artist hasn't published any services yet.");
        bot.send_message(chat_id, text)
            .parse_mode(teloxide::types::ParseMode::Markdown)
            .await?;
        return Ok(());
    }

    text.push_str("\nPick a service to book:");
    let keyboard: Vec<Vec<InlineKeyboardButton>> = services
        .iter()
        .map(|s| {
            vec![InlineKeyboardButton::callback(
                format!("{} — {}", s.service_name, naira(s.base_price)),
                format!("svc:{}", s.id),
            )]
        })
        .collect();

    session.selected_artist = Some(artist_id);
    bot.send_message(chat_id, text)
        .parse_mode(teloxide::types::ParseMode::Markdown)
        .reply_markup(ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(keyboard)))
        .await?;
    Ok(())
}

pub async fn choose_service(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    service_id: i64,
) -> Result<()> {
    let service = store::service_by_id(pool, service_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service".to_string()))?;

    session.selected_artist = Some(service.artist_id);
    session.selected_service = Some(service.id);
    session.step = UserStep::EnteringDate;

    let mut text = format!(
        "*{}* ({})\n{}\n",
        service.service_name,
        service.service_type,
        naira(service.base_price)
    );
    if let Some(description) = &service.description {
        text.push_str(&format!("{description}\n"));
    }
    if service.travel_required {
        text.push_str("🚗 The artist travels to you.\n");
    }
    text.push_str("\nWhen should it happen? Send the date and time like 25.12.2025 14:00");
    bot.send_message(chat_id, text)
        .parse_mode(teloxide::types::ParseMode::Markdown)
        .await?;
    Ok(())
}

pub async fn booking_input(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    text: &str,
) -> Result<()> {
    match session.step {
        UserStep::EnteringDate => {
            let Some(date) = parse_booking_date(text) else {
                bot.send_message(
                    chat_id,
                    "I couldn't read that. Use the format 25.12.2025 14:00",
                )
                .await?;
                return Ok(());
            };
            if date < Utc::now() {
                bot.send_message(chat_id, "That date is in the past. Pick a future one:")
                    .await?;
                return Ok(());
            }
            session.booking_date = Some(date);
            session.step = UserStep::EnteringTravelAddress;
            bot.send_message(
                chat_id,
                "Where should the artist come to? Send an address, or \"-\" if not needed.",
            )
            .await?;
        }
        UserStep::EnteringTravelAddress => {
            session.travel_address = opt_text(text);
            session.step = UserStep::EnteringClientNotes;
            bot.send_message(
                chat_id,
                "Anything the artist should know? Send a note, or \"-\" to skip.",
            )
            .await?;
        }
        UserStep::EnteringClientNotes => {
            session.client_notes = opt_text(text);
            session.step = UserStep::ConfirmingBooking;

            let service_id = session
                .selected_service
                .ok_or_else(|| AppError::NotFound("Service".to_string()))?;
            let service = store::service_by_id(pool, service_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Service".to_string()))?;
            let date = session
                .booking_date
                .ok_or_else(|| AppError::InvalidInput("Pick a date first.".to_string()))?;

            let fee = lifecycle::default_platform_fee(service.base_price);
            let mut summary = format!(
                "📋 *Booking request*\n\n{} ({})\n📅 {}\n\n{} + {} platform fee = *{}*",
                service.service_name,
                service.service_type,
                format_dt(date),
                naira(service.base_price),
                naira(fee),
                naira(service.base_price + fee),
            );
            if let Some(address) = &session.travel_address {
                summary.push_str(&format!("\n📍 {address}"));
            }
            if let Some(notes) = &session.client_notes {
                summary.push_str(&format!("\n📝 {notes}"));
            }
            summary.push_str("\n\nThe final price may change if the artist offers a different one.");

            let keyboard = InlineKeyboardMarkup::new(vec![vec![
                InlineKeyboardButton::callback("✅ Send request", "bkconfirm"),
                InlineKeyboardButton::callback("❌ Cancel", "bkcancel"),
            ]]);
            bot.send_message(chat_id, summary)
                .parse_mode(teloxide::types::ParseMode::Markdown)
                .reply_markup(ReplyMarkup::InlineKeyboard(keyboard))
                .await?;
        }
        _ => {}
    }
    Ok(())
}

/// Callback arm: the summary was confirmed. Validates once more and writes.
pub async fn finalize_booking(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
) -> Result<()> {
    let actor = session
        .actor()
        .ok_or_else(|| AppError::Forbidden("Please register first with /start.".to_string()))?;
    let (Some(artist_id), Some(service_id), Some(date)) = (
        session.selected_artist,
        session.selected_service,
        session.booking_date,
    ) else {
        return Err(AppError::InvalidInput(
            "Please select a service and a date first.".to_string(),
        ));
    };

    let service = store::service_by_id(pool, service_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service".to_string()))?;
    lifecycle::validate_booking_request(&service, artist_id, actor.profile_id, date, Utc::now())?;

    let booking = store::create_booking(
        pool,
        service_id,
        artist_id,
        actor.profile_id,
        date,
        session.travel_address.as_deref(),
        session.client_notes.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        AppError::InvalidInput("That service is no longer available.".to_string())
    })?;
    info!("booking {} requested for service {}", booking.id, service_id);

    // Best-effort push; the artist still sees the request in their list.
    if let Some(artist) = store::profile_by_id(pool, artist_id).await? {
        push(
            bot,
            artist.telegram_id,
            &format!(
                "🆕 New booking request!\n\n{} · {}\n📅 {}\n\nOpen 📅 My Bookings to respond.",
                service.service_name,
                naira(booking.original_price),
                format_dt(booking.booking_date),
            ),
        )
        .await;
    }

    session.reset_dialog();
    bot.send_message(
        chat_id,
        "Booking request sent! The artist will review and respond soon.",
    )
    .await?;
    Ok(())
}

pub async fn abort_booking(
    bot: &Bot,
    chat_id: ChatId,
    session: &mut UserSession,
) -> Result<()> {
    session.reset_dialog();
    bot.send_message(chat_id, "Booking cancelled. Nothing was sent.")
        .await?;
    Ok(())
}

pub async fn show_bookings(bot: &Bot, pool: &PgPool, chat_id: ChatId, profile_id: i64) -> Result<()> {
    let views = store::booking_views_for(pool, Role::Client, profile_id).await?;
    if views.is_empty() {
        bot.send_message(
            chat_id,
            "No bookings yet. Start by browsing artists and making your first booking.",
        )
        .await?;
        return Ok(());
    }

    for view in views {
        let booking = &view.booking;
        let status = booking.status();
        let mut text = format!(
            "*{}* ({})\n{}\n📅 {}\n💄 {}",
            view.service_name,
            view.service_type,
            status.label(),
            format_dt(booking.booking_date),
            view.artist_name(),
        );
        let price = lifecycle::effective_price(booking);
        if booking.negotiated_price.is_some() {
            text.push_str(&format!(
                "\n💰 {} (was {})",
                naira(price),
                naira(booking.original_price)
            ));
        } else {
            text.push_str(&format!("\n💰 {}", naira(price)));
        }
        if status == BookingStatus::Confirmed {
            text.push_str(&format!(
                "\nTotal due with platform fee: {}",
                naira(lifecycle::total_due(booking))
            ));
            if booking.paid_at.is_some() {
                text.push_str("\n💳 Paid");
            }
        }
        if let Some(notes) = &booking.artist_notes {
            text.push_str(&format!("\n📝 Artist: {notes}"));
        }

        let mut row: Vec<InlineKeyboardButton> = Vec::new();
        match status {
            BookingStatus::Confirmed => {
                if booking.paid_at.is_none() {
                    row.push(InlineKeyboardButton::callback(
                        "💳 Pay",
                        format!("pay:{}", booking.id),
                    ));
                }
                row.push(InlineKeyboardButton::callback(
                    "✔ Mark complete",
                    format!("complete:{}", booking.id),
                ));
            }
            BookingStatus::Completed => {
                row.push(InlineKeyboardButton::callback(
                    "⭐ Rate",
                    format!("rate:{}", booking.id),
                ));
            }
            BookingStatus::Pending | BookingStatus::Cancelled => {}
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

/// Callback arm: the client tapped Rate on a completed booking.
pub async fn begin_rating(
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
    lifecycle::authorize_rating(&booking, &actor)?;

    session.pending_booking = Some(booking_id);
    let stars: Vec<InlineKeyboardButton> = (1..=5)
        .map(|n| InlineKeyboardButton::callback("⭐".repeat(n as usize), format!("stars:{n}")))
        .collect();
    bot.send_message(chat_id, "How was it? Pick a rating:")
        .reply_markup(ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(vec![stars])))
        .await?;
    Ok(())
}

/// Callback arm: a star count was picked.
pub async fn set_stars(
    bot: &Bot,
    chat_id: ChatId,
    session: &mut UserSession,
    stars: i32,
) -> Result<()> {
    lifecycle::validate_stars(stars)?;
    session.rating_stars = Some(stars);
    session.step = UserStep::RatingComment;
    bot.send_message(chat_id, "Thanks! Add a comment, or \"-\" to skip.")
        .await?;
    Ok(())
}

pub async fn rating_input(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    text: &str,
) -> Result<()> {
    match session.step {
        UserStep::RatingComment => {
            session.rating_comment = opt_text(text);
            session.step = UserStep::RatingTip;
            bot.send_message(
                chat_id,
                "Would you like to add a tip? Send an amount like 2000, or \"-\" to skip.",
            )
            .await?;
        }
        UserStep::RatingTip => {
            let tip = match opt_text(text) {
                None => None,
                Some(raw) => match parse_price(&raw) {
                    Some(amount) => Some(amount),
                    None => {
                        bot.send_message(chat_id, "Send a number like 2000, or \"-\" to skip.")
                            .await?;
                        return Ok(());
                    }
                },
            };

            let actor = session.actor().ok_or_else(|| {
                AppError::Forbidden("Please register first with /start.".to_string())
            })?;
            let booking_id = session
                .pending_booking
                .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;
            let stars = session
                .rating_stars
                .ok_or_else(|| AppError::InvalidInput("Pick a star rating first.".to_string()))?;
            let comment = session.rating_comment.clone();

            let rating = store::create_rating(
                pool,
                booking_id,
                actor.profile_id,
                stars,
                comment.as_deref(),
                tip,
            )
            .await?;

            session.reset_dialog();
            match rating {
                Some(rating) => {
                    bot.send_message(chat_id, "Thanks for the review! ⭐").await?;
                    if let Some(view) = store::booking_view_by_id(pool, booking_id).await? {
                        let mut note = format!(
                            "⭐ New {}-star review from {} on {}.",
                            rating.rating,
                            view.client_name(),
                            view.service_name
                        );
                        if let Some(tip) = rating.tip_amount {
                            note.push_str(&format!(" They added a {} tip! 🎉", naira(tip)));
                        }
                        push(bot, view.artist_telegram_id, &note).await;
                    }
                }
                None => {
                    bot.send_message(chat_id, "This booking has already been rated.")
                        .await?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

pub async fn show_my_reviews(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    profile_id: i64,
) -> Result<()> {
    let ratings = store::ratings_by_client(pool, profile_id).await?;
    let unrated = store::unrated_completed_bookings(pool, profile_id).await?;

    if ratings.is_empty() && unrated.is_empty() {
        bot.send_message(
            chat_id,
            "No reviews yet. Ratings open up once a booking is completed.",
        )
        .await?;
        return Ok(());
    }

    if !ratings.is_empty() {
        let mut text = String::from("⭐ *Your reviews*\n\n");
        for rating in &ratings {
            text.push_str(&format!("{} ", "⭐".repeat(rating.rating as usize)));
            if let Some(comment) = &rating.comment {
                text.push_str(&format!("— {comment}"));
            }
            if let Some(tip) = rating.tip_amount {
                text.push_str(&format!(" (tip {})", naira(tip)));
            }
            text.push('\n');
        }
        bot.send_message(chat_id, text)
            .parse_mode(teloxide::types::ParseMode::Markdown)
            .await?;
    }

    for view in unrated {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "⭐ Rate now",
            format!("rate:{}", view.booking.id),
        )]]);
        bot.send_message(
            chat_id,
            format!(
                "You haven't rated *{}* with {} yet.",
                view.service_name,
                view.artist_name()
            ),
        )
        .parse_mode(teloxide::types::ParseMode::Markdown)
        .reply_markup(ReplyMarkup::InlineKeyboard(keyboard))
        .await?;
    }
    Ok(())
}
