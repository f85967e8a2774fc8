//! Telegram payments for confirmed bookings.
//!
//! The flow is server-verified: the client can only request an invoice;
//! Telegram asks us to approve the pre-checkout, where the booking is
//! re-validated; and only the successful-payment update, which arrives at
//! the bot rather than from anything the client can assert, marks the
//! booking paid.

use sqlx::PgPool;
use teloxide::{
    prelude::*,
    types::{LabeledPrice, Message, PreCheckoutQuery},
};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::lifecycle;
use crate::store;

use super::{format_dt, naira, push, UserSession};

const PAYLOAD_PREFIX: &str = "booking:";

fn payload_for(booking_id: i64) -> String {
    format!("{PAYLOAD_PREFIX}{booking_id}")
}

fn booking_id_from_payload(payload: &str) -> Option<i64> {
    payload.strip_prefix(PAYLOAD_PREFIX)?.parse().ok()
}

/// Telegram wants amounts in the currency's minor units; Stars have none.
fn minor_units(amount: i64, currency: &str) -> u32 {
    let factor = if currency == "XTR" { 1 } else { 100 };
    (amount * factor) as u32
}

/// Callback arm: the Pay button on a confirmed booking.
pub async fn send_booking_invoice(
    bot: &Bot,
    pool: &PgPool,
    config: &Config,
    chat_id: ChatId,
    session: &UserSession,
    booking_id: i64,
) -> Result<()> {
    let actor = session
        .actor()
        .ok_or_else(|| AppError::Forbidden("Please register first with /start.".to_string()))?;
    let booking = store::booking_by_id(pool, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;
    lifecycle::authorize_payment(&booking, &actor)?;

    let view = store::booking_view_by_id(pool, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;

    let price = lifecycle::effective_price(&booking);
    let fee = lifecycle::platform_fee(&booking);
    let prices = vec![
        LabeledPrice {
            label: view.service_name.clone(),
            amount: minor_units(price, &config.payment_currency),
        },
        LabeledPrice {
            label: "Platform fee".to_string(),
            amount: minor_units(fee, &config.payment_currency),
        },
    ];

    let title = format!("{} with {}", view.service_name, view.artist_name());
    let description = format!(
        "{} on {}. {} + {} platform fee = {}.",
        view.service_name,
        format_dt(booking.booking_date),
        naira(price),
        naira(fee),
        naira(lifecycle::total_due(&booking)),
    );

    info!("sending invoice for booking {} to chat {}", booking.id, chat_id);
    let mut request = bot
        .send_invoice(
            chat_id,
            title,
            description,
            payload_for(booking.id),
            config.payment_currency.clone(),
            prices,
        )
        .need_name(false)
        .need_phone_number(false)
        .need_email(false)
        .need_shipping_address(false)
        .is_flexible(false);
    if let Some(token) = &config.payment_provider_token {
        request = request.provider_token(token.clone());
    }
    request.send().await?;
    Ok(())
}

/// Telegram asks whether to let the checkout proceed. Re-validate: the
/// booking must still be confirmed, unpaid, and the payer must be its client.
pub async fn pre_checkout_handler(bot: Bot, q: PreCheckoutQuery, pool: PgPool) -> Result<()> {
    let payload = q.invoice_payload.clone();
    let payer_telegram = q.from.id.0 as i64;

    let verdict: std::result::Result<(), String> = async {
        let booking_id = booking_id_from_payload(&payload)
            .ok_or_else(|| "Unknown invoice.".to_string())?;
        let booking = store::booking_by_id(&pool, booking_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "Booking not found.".to_string())?;
        let payer = store::profile_by_telegram(&pool, payer_telegram)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "Please register first.".to_string())?;
        let actor = lifecycle::Actor {
            profile_id: payer.id,
            role: payer.role(),
        };
        lifecycle::authorize_payment(&booking, &actor).map_err(|e| e.user_message())
    }
    .await;

    match verdict {
        Ok(()) => {
            info!("pre-checkout approved for payload {}", payload);
            bot.answer_pre_checkout_query(q.id, true).await?;
        }
        Err(reason) => {
            warn!("pre-checkout rejected for payload {}: {}", payload, reason);
            bot.answer_pre_checkout_query(q.id, false)
                .error_message(reason)
                .await?;
        }
    }
    Ok(())
}

/// The payment went through; Telegram tells us, nobody else can. Record it
/// idempotently and let the artist know.
pub async fn successful_payment_handler(bot: Bot, msg: Message, pool: PgPool) -> Result<()> {
    let Some(payment) = msg.successful_payment() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    info!(
        "payment received: {} {} for payload {}",
        payment.total_amount, payment.currency, payment.invoice_payload
    );

    let Some(booking_id) = booking_id_from_payload(&payment.invoice_payload) else {
        warn!("payment with unknown payload {}", payment.invoice_payload);
        bot.send_message(chat_id, "⚠️ Payment received but the booking is unknown. Contact support.")
            .await?;
        return Ok(());
    };
    let Some(payer) = store::profile_by_telegram(&pool, chat_id.0).await? else {
        warn!("payment from unregistered chat {}", chat_id);
        return Ok(());
    };

    match store::mark_paid(&pool, booking_id, payer.id).await? {
        Some(booking) => {
            bot.send_message(
                chat_id,
                format!(
                    "✅ Payment of {} recorded. See you on {}!",
                    naira(lifecycle::total_due(&booking)),
                    format_dt(booking.booking_date),
                ),
            )
            .await?;
            if let Some(view) = store::booking_view_by_id(&pool, booking_id).await? {
                push(
                    &bot,
                    view.artist_telegram_id,
                    &format!(
                        "💳 {} paid {} for {} on {}.",
                        view.client_name(),
                        naira(lifecycle::total_due(&booking)),
                        view.service_name,
                        format_dt(booking.booking_date),
                    ),
                )
                .await;
            }
        }
        None => {
            // Double delivery or a race with another transition; the
            // predicate kept the row as it was.
            bot.send_message(chat_id, "ℹ️ This booking was already marked as paid.")
                .await?;
        }
    }
    Ok(())
}
