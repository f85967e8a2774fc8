//! Update handlers: dialog state, menu routing and shared formatting.
//!
//! Each Telegram user gets a [`UserSession`] keyed by chat id. The session
//! only holds dialog scratch state; identity and bookings always come from
//! the database, so a bot restart loses nothing but the current prompt.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::PgPool;
use teloxide::{
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, ReplyMarkup},
};

use crate::error::Result;
use crate::lifecycle::Actor;
use crate::models::Role;
use crate::store::{self, ProfileField};

pub mod artist;
pub mod callbacks;
pub mod client;
pub mod commands;
pub mod messages;
pub mod payments;

pub use callbacks::handle_callback_query;
pub use payments::{pre_checkout_handler, successful_payment_handler};

pub const BTN_BROWSE: &str = "💄 Browse Artists";
pub const BTN_BOOKINGS: &str = "📅 My Bookings";
pub const BTN_MESSAGES: &str = "💬 Messages";
pub const BTN_REVIEWS: &str = "⭐ My Reviews";
pub const BTN_PROFILE: &str = "👤 My Profile";
pub const BTN_SERVICES: &str = "🎨 My Services";
pub const BTN_STATS: &str = "📊 My Stats";
pub const BTN_PORTFOLIO: &str = "🖼 Portfolio";
pub const BTN_LEAVE_CHAT: &str = "⟵ Leave chat";

/// Where a user currently is in a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStep {
    /// Waiting for the role button during registration.
    Registration,
    RegFirstName,
    RegLastName,
    MainMenu,
    ArtistMenu,
    // booking request dialog (client)
    EnteringDate,
    EnteringTravelAddress,
    EnteringClientNotes,
    ConfirmingBooking,
    // rating dialog (client)
    RatingComment,
    RatingTip,
    // live conversation
    Chatting,
    // service creation dialog (artist)
    ServiceName,
    ServiceType,
    ServicePrice,
    ServiceDescription,
    ServiceMaxPeople,
    ServiceTravel,
    ServiceBridal,
    EditingServicePrice,
    // accept / decline dialog (artist)
    NegotiatingPrice,
    AcceptNotes,
    DeclineNotes,
    // profile editing (both roles)
    EditingProfile,
    // portfolio view doubles as the "send a link to add" prompt
    AwaitingPortfolioUrl,
}

/// Scratch state for the artist's add-service dialog.
#[derive(Debug, Clone, Default)]
pub struct ServiceDraft {
    pub name: Option<String>,
    pub service_type: Option<String>,
    pub base_price: Option<i64>,
    pub description: Option<String>,
    pub max_people: Option<i32>,
    pub travel_required: Option<bool>,
    pub includes_bridal_shower: Option<bool>,
}

pub struct UserSession {
    pub step: UserStep,
    pub profile_id: Option<i64>,
    pub role: Option<Role>,
    // registration scratch
    pub reg_role: Option<Role>,
    pub reg_first_name: Option<String>,
    // booking request scratch
    pub selected_artist: Option<i64>,
    pub selected_service: Option<i64>,
    pub booking_date: Option<DateTime<Utc>>,
    pub travel_address: Option<String>,
    pub client_notes: Option<String>,
    // accept / decline / rating scratch
    pub pending_booking: Option<i64>,
    pub negotiated_price: Option<i64>,
    pub rating_stars: Option<i32>,
    pub rating_comment: Option<String>,
    // artist scratch
    pub service_draft: ServiceDraft,
    pub editing_service: Option<i64>,
    pub edit_field: Option<ProfileField>,
    /// The one conversation this session is subscribed to, if any.
    pub active_conversation: Option<i64>,
}

impl UserSession {
    pub fn new() -> Self {
        UserSession {
            step: UserStep::MainMenu,
            profile_id: None,
            role: None,
            reg_role: None,
            reg_first_name: None,
            selected_artist: None,
            selected_service: None,
            booking_date: None,
            travel_address: None,
            client_notes: None,
            pending_booking: None,
            negotiated_price: None,
            rating_stars: None,
            rating_comment: None,
            service_draft: ServiceDraft::default(),
            editing_service: None,
            edit_field: None,
            active_conversation: None,
        }
    }

    pub fn actor(&self) -> Option<Actor> {
        Some(Actor {
            profile_id: self.profile_id?,
            role: self.role?,
        })
    }

    /// Drops all dialog scratch, including the open conversation. Called on
    /// every navigation away, so a chat subscription never outlives the chat
    /// screen.
    pub fn reset_dialog(&mut self) {
        let profile_id = self.profile_id;
        let role = self.role;
        *self = UserSession::new();
        self.profile_id = profile_id;
        self.role = role;
        self.step = match role {
            Some(Role::Artist) => UserStep::ArtistMenu,
            _ => UserStep::MainMenu,
        };
    }
}

pub fn client_menu() -> KeyboardMarkup {
    let buttons: Vec<Vec<KeyboardButton>> = vec![
        vec![KeyboardButton::new(BTN_BROWSE)],
        vec![KeyboardButton::new(BTN_BOOKINGS), KeyboardButton::new(BTN_MESSAGES)],
        vec![KeyboardButton::new(BTN_REVIEWS), KeyboardButton::new(BTN_PROFILE)],
    ];
    KeyboardMarkup::new(buttons).resize_keyboard()
}

pub fn artist_menu() -> KeyboardMarkup {
    let buttons: Vec<Vec<KeyboardButton>> = vec![
        vec![KeyboardButton::new(BTN_SERVICES), KeyboardButton::new(BTN_BOOKINGS)],
        vec![KeyboardButton::new(BTN_MESSAGES), KeyboardButton::new(BTN_STATS)],
        vec![KeyboardButton::new(BTN_PORTFOLIO), KeyboardButton::new(BTN_PROFILE)],
    ];
    KeyboardMarkup::new(buttons).resize_keyboard()
}

pub fn menu_for(role: Role) -> KeyboardMarkup {
    match role {
        Role::Artist => artist_menu(),
        Role::Client => client_menu(),
    }
}

pub fn chat_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(BTN_LEAVE_CHAT)]]).resize_keyboard()
}

/// "₦12,600"
pub fn naira(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-₦{grouped}")
    } else {
        format!("₦{grouped}")
    }
}

pub const DATE_INPUT_FORMAT: &str = "%d.%m.%Y %H:%M";

pub fn format_dt(dt: DateTime<Utc>) -> String {
    dt.format(DATE_INPUT_FORMAT).to_string()
}

pub fn parse_booking_date(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_INPUT_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// "-" means "skip this optional field".
pub fn opt_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Accepts "12000", "12,000" or "₦12,000".
pub fn parse_price(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Best-effort cross-actor notification; a failed push is logged, never
/// surfaced to the acting user.
pub async fn push(bot: &Bot, telegram_id: i64, text: &str) {
    if let Err(e) = bot.send_message(ChatId(telegram_id), text).await {
        warn!("failed to notify {}: {}", telegram_id, e);
    }
}

/// Top-level text-message handler.
pub async fn handle_message(
    msg: Message,
    bot: Bot,
    pool: PgPool,
    sessions: &mut HashMap<i64, UserSession>,
) -> Result<()> {
    let chat_id = msg.chat.id;
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let text = text.trim().to_string();

    let session = sessions.entry(chat_id.0).or_insert_with(UserSession::new);

    // Re-hydrate identity after a restart; every later check uses this.
    if session.profile_id.is_none() {
        if let Some(profile) = store::profile_by_telegram(&pool, chat_id.0).await? {
            session.profile_id = Some(profile.id);
            session.role = Some(profile.role());
        }
    }

    if text == "/start" {
        return commands::start(&bot, &pool, chat_id, session).await;
    }

    // A live chat swallows everything except the leave button; the relay
    // needs the whole session map to see whether the counterpart has the
    // same conversation open.
    if session.step == UserStep::Chatting {
        if text == BTN_LEAVE_CHAT {
            return messages::leave_chat(&bot, chat_id, session).await;
        }
        let conversation_id = session.active_conversation;
        let profile_id = session.profile_id;
        return messages::relay(&bot, &pool, sessions, conversation_id, profile_id, &text).await;
    }

    // Reply-keyboard navigation works from any step and abandons whatever
    // dialog was in flight.
    if let (Some(profile_id), Some(role)) = (session.profile_id, session.role) {
        match text.as_str() {
            BTN_BOOKINGS => {
                session.reset_dialog();
                return match role {
                    Role::Client => client::show_bookings(&bot, &pool, chat_id, profile_id).await,
                    Role::Artist => artist::show_bookings(&bot, &pool, chat_id, profile_id).await,
                };
            }
            BTN_MESSAGES => {
                session.reset_dialog();
                return messages::show_conversations(&bot, &pool, chat_id, profile_id).await;
            }
            BTN_PROFILE => {
                session.reset_dialog();
                return commands::show_profile(&bot, &pool, chat_id, profile_id, role).await;
            }
            BTN_BROWSE if role == Role::Client => {
                session.reset_dialog();
                return client::show_artist_page(&bot, &pool, chat_id, 0).await;
            }
            BTN_REVIEWS if role == Role::Client => {
                session.reset_dialog();
                return client::show_my_reviews(&bot, &pool, chat_id, profile_id).await;
            }
            BTN_SERVICES if role == Role::Artist => {
                session.reset_dialog();
                return artist::show_services(&bot, &pool, chat_id, profile_id).await;
            }
            BTN_STATS if role == Role::Artist => {
                session.reset_dialog();
                return artist::show_stats(&bot, &pool, chat_id, profile_id).await;
            }
            BTN_PORTFOLIO if role == Role::Artist => {
                session.reset_dialog();
                session.step = UserStep::AwaitingPortfolioUrl;
                return artist::show_portfolio(&bot, &pool, chat_id, profile_id).await;
            }
            _ => {}
        }
    }

    match session.step {
        UserStep::Registration => {
            bot.send_message(chat_id, "Please pick a role with the buttons above, or send /start.")
                .await?;
        }
        UserStep::RegFirstName | UserStep::RegLastName => {
            commands::registration_input(&bot, &pool, chat_id, session, &text).await?;
        }
        UserStep::EnteringDate | UserStep::EnteringTravelAddress | UserStep::EnteringClientNotes => {
            client::booking_input(&bot, &pool, chat_id, session, &text).await?;
        }
        UserStep::RatingComment | UserStep::RatingTip => {
            client::rating_input(&bot, &pool, chat_id, session, &text).await?;
        }
        UserStep::ServiceName
        | UserStep::ServicePrice
        | UserStep::ServiceDescription
        | UserStep::ServiceMaxPeople => {
            artist::service_input(&bot, &pool, chat_id, session, &text).await?;
        }
        UserStep::ServiceType | UserStep::ServiceTravel | UserStep::ServiceBridal => {
            bot.send_message(chat_id, "Please use the buttons above.").await?;
        }
        UserStep::EditingServicePrice => {
            artist::price_input(&bot, &pool, chat_id, session, &text).await?;
        }
        UserStep::NegotiatingPrice | UserStep::AcceptNotes | UserStep::DeclineNotes => {
            artist::negotiation_input(&bot, &pool, chat_id, session, &text).await?;
        }
        UserStep::EditingProfile => {
            commands::profile_input(&bot, &pool, chat_id, session, &text).await?;
        }
        UserStep::AwaitingPortfolioUrl => {
            artist::portfolio_input(&bot, &pool, chat_id, session, &text).await?;
        }
        UserStep::ConfirmingBooking => {
            bot.send_message(chat_id, "Please confirm or cancel with the buttons above.")
                .await?;
        }
        UserStep::MainMenu | UserStep::ArtistMenu => {
            if let Some(role) = session.role {
                bot.send_message(chat_id, "Pick an option from the menu.")
                    .reply_markup(ReplyMarkup::Keyboard(menu_for(role)))
                    .await?;
            } else {
                bot.send_message(chat_id, "Send /start to begin.").await?;
            }
        }
        UserStep::Chatting => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naira_groups_thousands() {
        assert_eq!(naira(0), "₦0");
        assert_eq!(naira(750), "₦750");
        assert_eq!(naira(15_000), "₦15,000");
        assert_eq!(naira(15_750), "₦15,750");
        assert_eq!(naira(1_234_567), "₦1,234,567");
    }

    #[test]
    fn price_parsing_accepts_formatted_input() {
        assert_eq!(parse_price("12000"), Some(12_000));
        assert_eq!(parse_price("12,000"), Some(12_000));
        assert_eq!(parse_price("₦12,000"), Some(12_000));
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn dash_means_skip() {
        assert_eq!(opt_text("-"), None);
        assert_eq!(opt_text("  "), None);
        assert_eq!(opt_text(" note "), Some("note".to_string()));
    }

    #[test]
    fn booking_date_round_trips() {
        let parsed = parse_booking_date("25.12.2025 14:00").expect("valid date");
        assert_eq!(format_dt(parsed), "25.12.2025 14:00");
        assert!(parse_booking_date("2025-12-25").is_none());
        assert!(parse_booking_date("yesterday").is_none());
    }
}
