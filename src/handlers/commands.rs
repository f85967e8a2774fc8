//! Registration and profile management.

use sqlx::PgPool;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ReplyMarkup},
};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Role;
use crate::stats;
use crate::store::{self, ProfileField};

use super::{menu_for, naira, UserSession, UserStep};

pub async fn start(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
) -> Result<()> {
    if let Some(profile) = store::profile_by_telegram(pool, chat_id.0).await? {
        session.profile_id = Some(profile.id);
        session.role = Some(profile.role());
        session.reset_dialog();
        let greeting = match profile.role() {
            Role::Artist => format!(
                "Welcome back, {}! Ready to create beautiful looks today?",
                profile.first_name
            ),
            Role::Client => format!(
                "Welcome back, {}! Ready to find your perfect makeup artist?",
                profile.first_name
            ),
        };
        bot.send_message(chat_id, greeting)
            .reply_markup(ReplyMarkup::Keyboard(menu_for(profile.role())))
            .await?;
        return Ok(());
    }

    session.step = UserStep::Registration;
    let keyboard = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("💄 I'm a makeup artist", "role:artist"),
        InlineKeyboardButton::callback("🙋 I'm a client", "role:client"),
    ]]);
    bot.send_message(
        chat_id,
        "Hi! I connect makeup artists with clients.\nHow will you use the platform?",
    )
    .reply_markup(ReplyMarkup::InlineKeyboard(keyboard))
    .await?;
    Ok(())
}

/// Callback arm of registration: the role was picked.
pub async fn register_role(
    bot: &Bot,
    chat_id: ChatId,
    session: &mut UserSession,
    role: Role,
) -> Result<()> {
    session.reg_role = Some(role);
    session.step = UserStep::RegFirstName;
    bot.send_message(chat_id, "Great. What's your first name?")
        .await?;
    Ok(())
}

pub async fn registration_input(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    text: &str,
) -> Result<()> {
    match session.step {
        UserStep::RegFirstName => {
            if text.len() < 2 {
                bot.send_message(chat_id, "The name needs at least 2 characters. Try again:")
                    .await?;
                return Ok(());
            }
            session.reg_first_name = Some(text.to_string());
            session.step = UserStep::RegLastName;
            bot.send_message(chat_id, "And your last name?").await?;
        }
        UserStep::RegLastName => {
            let role = session.reg_role.unwrap_or(Role::Client);
            let first_name = session.reg_first_name.clone().unwrap_or_default();
            let profile =
                store::create_profile(pool, chat_id.0, role, &first_name, text).await?;
            info!("registered profile {} as {}", profile.id, role.as_str());
            session.profile_id = Some(profile.id);
            session.role = Some(role);
            session.reset_dialog();
            let welcome = match role {
                Role::Artist => {
                    "You're in! Add your services under 🎨 My Services so clients can find you."
                }
                Role::Client => "You're in! Browse artists and book your first session.",
            };
            bot.send_message(chat_id, welcome)
                .reply_markup(ReplyMarkup::Keyboard(menu_for(role)))
                .await?;
        }
        _ => {}
    }
    Ok(())
}

fn profile_edit_keyboard(role: Role) -> InlineKeyboardMarkup {
    let mut rows = vec![
        vec![
            InlineKeyboardButton::callback("First name", "editfield:first_name"),
            InlineKeyboardButton::callback("Last name", "editfield:last_name"),
        ],
        vec![
            InlineKeyboardButton::callback("Phone", "editfield:phone"),
            InlineKeyboardButton::callback("City", "editfield:city"),
            InlineKeyboardButton::callback("State", "editfield:state"),
        ],
        vec![
            InlineKeyboardButton::callback("Bio", "editfield:bio"),
            InlineKeyboardButton::callback("Instagram", "editfield:instagram"),
            InlineKeyboardButton::callback("Facebook", "editfield:facebook"),
        ],
        vec![InlineKeyboardButton::callback("Photo link", "editfield:picture")],
    ];
    if role == Role::Artist {
        rows.push(vec![
            InlineKeyboardButton::callback("Bank", "editfield:bank_name"),
            InlineKeyboardButton::callback("Account no.", "editfield:account_number"),
            InlineKeyboardButton::callback("Account name", "editfield:account_name"),
        ]);
    }
    InlineKeyboardMarkup::new(rows)
}

pub fn field_from_key(key: &str) -> Option<ProfileField> {
    match key {
        "first_name" => Some(ProfileField::FirstName),
        "last_name" => Some(ProfileField::LastName),
        "phone" => Some(ProfileField::Phone),
        "city" => Some(ProfileField::City),
        "state" => Some(ProfileField::State),
        "bio" => Some(ProfileField::Bio),
        "instagram" => Some(ProfileField::Instagram),
        "facebook" => Some(ProfileField::Facebook),
        "bank_name" => Some(ProfileField::BankName),
        "account_number" => Some(ProfileField::AccountNumber),
        "account_name" => Some(ProfileField::AccountName),
        "picture" => Some(ProfileField::PictureUrl),
        _ => None,
    }
}

fn field_prompt(field: ProfileField) -> &'static str {
    match field {
        ProfileField::FirstName => "Send your first name:",
        ProfileField::LastName => "Send your last name:",
        ProfileField::Phone => "Send your phone number:",
        ProfileField::City => "Which city are you in?",
        ProfileField::State => "Which state are you in?",
        ProfileField::Bio => "Send your bio in one message:",
        ProfileField::Instagram => "Send your Instagram handle:",
        ProfileField::Facebook => "Send your Facebook page:",
        ProfileField::BankName => "Send your bank's name (for payouts):",
        ProfileField::AccountNumber => "Send your account number (for payouts):",
        ProfileField::AccountName => "Send the account holder name (for payouts):",
        ProfileField::PictureUrl => {
            "Send a link to your profile photo, like \"https://example.com/me.jpg\""
        }
    }
}

pub async fn show_profile(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    profile_id: i64,
    role: Role,
) -> Result<()> {
    let profile = store::profile_by_id(pool, profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;

    let badge = if profile.is_verified {
        "🏅 Verified"
    } else {
        "Not verified yet"
    };
    let mut lines = vec![
        format!("👤 *{}*", profile.display_name()),
        format!("Role: {}", profile.user_type),
        format!("Status: {}", badge),
    ];
    if let Some(phone) = &profile.phone_number {
        lines.push(format!("📞 {phone}"));
    }
    match (&profile.location_city, &profile.location_state) {
        (Some(city), Some(state)) => lines.push(format!("📍 {city}, {state}")),
        (Some(city), None) => lines.push(format!("📍 {city}")),
        (None, Some(state)) => lines.push(format!("📍 {state}")),
        (None, None) => {}
    }
    if let Some(bio) = &profile.bio {
        lines.push(format!("\n{bio}"));
    }
    if let Some(instagram) = &profile.instagram_handle {
        lines.push(format!("📷 Instagram: {instagram}"));
    }
    if let Some(facebook) = &profile.facebook_page {
        lines.push(format!("👥 Facebook: {facebook}"));
    }
    if let Some(url) = &profile.profile_picture_url {
        lines.push(format!("🖼 Photo: {url}"));
    }

    match role {
        Role::Artist => {
            let bookings = store::bookings_for(pool, Role::Artist, profile_id).await?;
            let ratings = store::ratings_for_artist(pool, profile_id).await?;
            let s = stats::artist_stats(&bookings, &ratings);
            lines.push(format!(
                "\n📊 {} bookings · ⭐ {:.1} · {} earned · {:.0}% completed",
                s.total_bookings,
                s.average_rating,
                naira(s.total_earnings),
                s.completion_rate
            ));
            match (&profile.bank_name, &profile.account_number) {
                (Some(bank), Some(number)) => lines.push(format!("🏦 {bank} · {number}")),
                _ => lines.push("🏦 Payout details not set".to_string()),
            }
        }
        Role::Client => {
            let bookings = store::bookings_for(pool, Role::Client, profile_id).await?;
            let ratings = store::ratings_by_client(pool, profile_id).await?;
            let s = stats::dashboard_stats(&bookings, &ratings);
            lines.push(format!(
                "\n📊 {} bookings ({} pending) · {} spent · {} review(s) left",
                s.total_bookings,
                s.pending_bookings,
                naira(s.total_revenue),
                ratings.len()
            ));
        }
    }

    bot.send_message(chat_id, lines.join("\n"))
        .parse_mode(teloxide::types::ParseMode::Markdown)
        .reply_markup(ReplyMarkup::InlineKeyboard(profile_edit_keyboard(role)))
        .await?;
    Ok(())
}

/// Callback arm: a field button was pressed.
pub async fn begin_profile_edit(
    bot: &Bot,
    chat_id: ChatId,
    session: &mut UserSession,
    field: ProfileField,
) -> Result<()> {
    session.edit_field = Some(field);
    session.step = UserStep::EditingProfile;
    bot.send_message(chat_id, field_prompt(field)).await?;
    Ok(())
}

pub async fn profile_input(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    session: &mut UserSession,
    text: &str,
) -> Result<()> {
    let Some(field) = session.edit_field else {
        session.reset_dialog();
        return Ok(());
    };
    let Some(profile_id) = session.profile_id else {
        return Ok(());
    };

    if field == ProfileField::PictureUrl {
        match Url::parse(text) {
            Ok(_) => {}
            Err(_) => {
                bot.send_message(
                    chat_id,
                    "That doesn't look like a link. Send it like \"https://example.com/me.jpg\"",
                )
                .await?;
                return Ok(());
            }
        }
    }

    store::update_profile_field(pool, profile_id, field, text).await?;
    let role = session.role.unwrap_or(Role::Client);
    session.reset_dialog();
    bot.send_message(chat_id, "Saved! ✅").await?;
    show_profile(bot, pool, chat_id, profile_id, role).await
}
