use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Marketplace roles. Stored in `profiles.user_type` as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Artist,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Artist => "artist",
            Role::Client => "client",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "artist" => Role::Artist,
            _ => Role::Client,
        }
    }
}

/// Booking lifecycle states. Stored as lowercase text, constrained by a
/// CHECK in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            "completed" => BookingStatus::Completed,
            _ => BookingStatus::Pending,
        }
    }

    /// Human label with the status emoji used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "🕐 Pending",
            BookingStatus::Confirmed => "✅ Confirmed",
            BookingStatus::Cancelled => "❌ Cancelled",
            BookingStatus::Completed => "🏁 Completed",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub telegram_id: i64,
    pub user_type: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub bio: Option<String>,
    pub instagram_handle: Option<String>,
    pub facebook_page: Option<String>,
    pub is_verified: bool,
    pub subscription_active: bool,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn role(&self) -> Role {
        Role::parse(&self.user_type)
    }

    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            "User".to_string()
        } else {
            name.to_string()
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub artist_id: i64,
    pub service_name: String,
    pub service_type: String,
    pub description: Option<String>,
    pub base_price: i64,
    pub max_people: i32,
    pub travel_required: bool,
    pub includes_bridal_shower: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub artist_id: i64,
    pub client_id: i64,
    pub service_id: i64,
    pub booking_date: DateTime<Utc>,
    pub status: String,
    /// Captured from the service's base price at creation; never updated.
    pub original_price: i64,
    pub negotiated_price: Option<i64>,
    pub platform_fee: Option<i64>,
    pub travel_address: Option<String>,
    pub client_notes: Option<String>,
    pub artist_notes: Option<String>,
    /// Set only by the server-verified payment flow.
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn status(&self) -> BookingStatus {
        BookingStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Rating {
    pub id: i64,
    pub booking_id: i64,
    pub artist_id: i64,
    pub client_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub tip_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub booking_id: Option<i64>,
    pub artist_id: i64,
    pub client_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PortfolioPhoto {
    pub id: i64,
    pub artist_id: i64,
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
}

/// The eight service categories the marketplace recognises.
pub const SERVICE_TYPES: [&str; 8] = [
    "Bridal Makeup",
    "Event Makeup",
    "Photoshoot Makeup",
    "Party Makeup",
    "Casual Makeup",
    "Special Effects",
    "Traditional Makeup",
    "Corporate Makeup",
];
