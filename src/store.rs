//! All database access.
//!
//! Mutating statements encode the authorization rule in their `WHERE` clause
//! (actor id plus expected current status) and report "no such row" when the
//! predicate fails, so a stale or hostile caller cannot move a booking the
//! lifecycle rules would reject. The pure checks in [`crate::lifecycle`] run
//! first for friendlier wording; these predicates are the gate that counts.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::error::Result;
use crate::models::{
    Booking, ChatMessage, Conversation, PortfolioPhoto, Profile, Rating, Role, Service,
};

// ---------------------------------------------------------------------------
// profiles

pub async fn profile_by_telegram(pool: &PgPool, telegram_id: i64) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE telegram_id = $1")
        .bind(telegram_id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn profile_by_id(pool: &PgPool, id: i64) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn create_profile(
    pool: &PgPool,
    telegram_id: i64,
    role: Role,
    first_name: &str,
    last_name: &str,
) -> Result<Profile> {
    let profile = sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (telegram_id, user_type, first_name, last_name)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (telegram_id) DO UPDATE SET first_name = $3, last_name = $4
         RETURNING *",
    )
    .bind(telegram_id)
    .bind(role.as_str())
    .bind(first_name)
    .bind(last_name)
    .fetch_one(pool)
    .await?;
    Ok(profile)
}

/// Profile columns a user may edit about themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FirstName,
    LastName,
    Phone,
    City,
    State,
    Bio,
    Instagram,
    Facebook,
    BankName,
    AccountNumber,
    AccountName,
    PictureUrl,
}

impl ProfileField {
    fn update_sql(self) -> &'static str {
        match self {
            ProfileField::FirstName => {
                "UPDATE profiles SET first_name = $1, updated_at = NOW() WHERE id = $2"
            }
            ProfileField::LastName => {
                "UPDATE profiles SET last_name = $1, updated_at = NOW() WHERE id = $2"
            }
            ProfileField::Phone => {
                "UPDATE profiles SET phone_number = $1, updated_at = NOW() WHERE id = $2"
            }
            ProfileField::City => {
                "UPDATE profiles SET location_city = $1, updated_at = NOW() WHERE id = $2"
            }
            ProfileField::State => {
                "UPDATE profiles SET location_state = $1, updated_at = NOW() WHERE id = $2"
            }
            ProfileField::Bio => {
                "UPDATE profiles SET bio = $1, updated_at = NOW() WHERE id = $2"
            }
            ProfileField::Instagram => {
                "UPDATE profiles SET instagram_handle = $1, updated_at = NOW() WHERE id = $2"
            }
            ProfileField::Facebook => {
                "UPDATE profiles SET facebook_page = $1, updated_at = NOW() WHERE id = $2"
            }
            ProfileField::BankName => {
                "UPDATE profiles SET bank_name = $1, updated_at = NOW() WHERE id = $2"
            }
            ProfileField::AccountNumber => {
                "UPDATE profiles SET account_number = $1, updated_at = NOW() WHERE id = $2"
            }
            ProfileField::AccountName => {
                "UPDATE profiles SET account_name = $1, updated_at = NOW() WHERE id = $2"
            }
            ProfileField::PictureUrl => {
                "UPDATE profiles SET profile_picture_url = $1, updated_at = NOW() WHERE id = $2"
            }
        }
    }
}

/// Owner-only by construction: the id comes from the caller's own session.
pub async fn update_profile_field(
    pool: &PgPool,
    profile_id: i64,
    field: ProfileField,
    value: &str,
) -> Result<()> {
    sqlx::query(field.update_sql())
        .bind(value)
        .bind(profile_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// One row per artist for the browse listing, with rating and completed
/// booking aggregates folded in.
#[derive(Debug, Clone, FromRow)]
pub struct ArtistSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub bio: Option<String>,
    pub is_verified: bool,
    pub average_rating: f64,
    pub ratings_count: i64,
    pub completed_bookings: i64,
}

impl ArtistSummary {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

pub async fn artist_directory(pool: &PgPool) -> Result<Vec<ArtistSummary>> {
    let artists = sqlx::query_as::<_, ArtistSummary>(
        r#"
        SELECT p.id, p.first_name, p.last_name, p.location_city, p.location_state,
               p.bio, p.is_verified,
               COALESCE(r.average_rating, 0)::FLOAT8 AS average_rating,
               COALESCE(r.ratings_count, 0) AS ratings_count,
               COALESCE(b.completed_bookings, 0) AS completed_bookings
        FROM profiles p
        LEFT JOIN (
            SELECT artist_id, AVG(rating) AS average_rating, COUNT(*) AS ratings_count
            FROM ratings GROUP BY artist_id
        ) r ON r.artist_id = p.id
        LEFT JOIN (
            SELECT artist_id, COUNT(*) AS completed_bookings
            FROM bookings WHERE status = 'completed' GROUP BY artist_id
        ) b ON b.artist_id = p.id
        WHERE p.user_type = 'artist'
        ORDER BY p.created_at
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(artists)
}

// ---------------------------------------------------------------------------
// services

pub async fn services_for_artist(pool: &PgPool, artist_id: i64) -> Result<Vec<Service>> {
    let services = sqlx::query_as::<_, Service>(
        "SELECT * FROM services WHERE artist_id = $1 ORDER BY created_at DESC",
    )
    .bind(artist_id)
    .fetch_all(pool)
    .await?;
    Ok(services)
}

pub async fn service_by_id(pool: &PgPool, id: i64) -> Result<Option<Service>> {
    let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(service)
}

#[allow(clippy::too_many_arguments)]
pub async fn create_service(
    pool: &PgPool,
    artist_id: i64,
    name: &str,
    service_type: &str,
    description: Option<&str>,
    base_price: i64,
    max_people: i32,
    travel_required: bool,
    includes_bridal_shower: bool,
) -> Result<Service> {
    let service = sqlx::query_as::<_, Service>(
        "INSERT INTO services (artist_id, service_name, service_type, description,
                               base_price, max_people, travel_required, includes_bridal_shower)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(artist_id)
    .bind(name)
    .bind(service_type)
    .bind(description)
    .bind(base_price)
    .bind(max_people)
    .bind(travel_required)
    .bind(includes_bridal_shower)
    .fetch_one(pool)
    .await?;
    Ok(service)
}

/// Only the owning artist can reprice; affects existing bookings not at all,
/// since they carry their own captured price.
pub async fn update_service_price(
    pool: &PgPool,
    service_id: i64,
    artist_id: i64,
    base_price: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE services SET base_price = $1, updated_at = NOW()
         WHERE id = $2 AND artist_id = $3",
    )
    .bind(base_price)
    .bind(service_id)
    .bind(artist_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_service(pool: &PgPool, service_id: i64, artist_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM services WHERE id = $1 AND artist_id = $2")
        .bind(service_id)
        .bind(artist_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// bookings

/// Creates a booking request. The insert itself captures the service's
/// current base price and forces the status to pending; the caller cannot
/// supply either. Returns None when the service does not belong to the
/// chosen artist.
pub async fn create_booking(
    pool: &PgPool,
    service_id: i64,
    artist_id: i64,
    client_id: i64,
    booking_date: DateTime<Utc>,
    travel_address: Option<&str>,
    client_notes: Option<&str>,
) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        "INSERT INTO bookings (artist_id, client_id, service_id, booking_date,
                               status, original_price, travel_address, client_notes)
         SELECT s.artist_id, $3, s.id, $4, 'pending', s.base_price, $5, $6
         FROM services s
         WHERE s.id = $1 AND s.artist_id = $2
         RETURNING *",
    )
    .bind(service_id)
    .bind(artist_id)
    .bind(client_id)
    .bind(booking_date)
    .bind(travel_address)
    .bind(client_notes)
    .fetch_optional(pool)
    .await?;
    Ok(booking)
}

pub async fn booking_by_id(pool: &PgPool, id: i64) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(booking)
}

pub async fn bookings_for(pool: &PgPool, role: Role, profile_id: i64) -> Result<Vec<Booking>> {
    let sql = match role {
        Role::Artist => "SELECT * FROM bookings WHERE artist_id = $1 ORDER BY created_at DESC",
        Role::Client => "SELECT * FROM bookings WHERE client_id = $1 ORDER BY created_at DESC",
    };
    let bookings = sqlx::query_as::<_, Booking>(sql)
        .bind(profile_id)
        .fetch_all(pool)
        .await?;
    Ok(bookings)
}

/// A booking joined with its service and both parties, for display and for
/// counterpart notifications.
#[derive(Debug, Clone, FromRow)]
pub struct BookingView {
    #[sqlx(flatten)]
    pub booking: Booking,
    pub service_name: String,
    pub service_type: String,
    pub artist_first_name: String,
    pub artist_last_name: String,
    pub artist_telegram_id: i64,
    pub client_first_name: String,
    pub client_last_name: String,
    pub client_telegram_id: i64,
}

impl BookingView {
    pub fn artist_name(&self) -> String {
        format!("{} {}", self.artist_first_name, self.artist_last_name).trim().to_string()
    }

    pub fn client_name(&self) -> String {
        format!("{} {}", self.client_first_name, self.client_last_name).trim().to_string()
    }
}

const BOOKING_VIEW_SELECT: &str = r#"
    SELECT b.*, s.service_name, s.service_type,
           pa.first_name AS artist_first_name, pa.last_name AS artist_last_name,
           pa.telegram_id AS artist_telegram_id,
           pc.first_name AS client_first_name, pc.last_name AS client_last_name,
           pc.telegram_id AS client_telegram_id
    FROM bookings b
    JOIN services s ON s.id = b.service_id
    JOIN profiles pa ON pa.id = b.artist_id
    JOIN profiles pc ON pc.id = b.client_id
"#;

pub async fn booking_views_for(
    pool: &PgPool,
    role: Role,
    profile_id: i64,
) -> Result<Vec<BookingView>> {
    let sql = match role {
        Role::Artist => {
            format!("{BOOKING_VIEW_SELECT} WHERE b.artist_id = $1 ORDER BY b.created_at DESC")
        }
        Role::Client => {
            format!("{BOOKING_VIEW_SELECT} WHERE b.client_id = $1 ORDER BY b.created_at DESC")
        }
    };
    let views = sqlx::query_as::<_, BookingView>(&sql)
        .bind(profile_id)
        .fetch_all(pool)
        .await?;
    Ok(views)
}

pub async fn booking_view_by_id(pool: &PgPool, booking_id: i64) -> Result<Option<BookingView>> {
    let sql = format!("{BOOKING_VIEW_SELECT} WHERE b.id = $1");
    let view = sqlx::query_as::<_, BookingView>(&sql)
        .bind(booking_id)
        .fetch_optional(pool)
        .await?;
    Ok(view)
}

/// pending → confirmed, by the assigned artist only. `original_price` is not
/// in the SET list; it never changes after insert.
pub async fn confirm_booking(
    pool: &PgPool,
    booking_id: i64,
    artist_id: i64,
    negotiated_price: Option<i64>,
    artist_notes: Option<&str>,
) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings
         SET status = 'confirmed',
             negotiated_price = COALESCE($1, negotiated_price),
             artist_notes = COALESCE($2, artist_notes),
             updated_at = NOW()
         WHERE id = $3 AND artist_id = $4 AND status = 'pending'
         RETURNING *",
    )
    .bind(negotiated_price)
    .bind(artist_notes)
    .bind(booking_id)
    .bind(artist_id)
    .fetch_optional(pool)
    .await?;
    Ok(booking)
}

/// pending → cancelled, by the assigned artist only.
pub async fn cancel_booking(
    pool: &PgPool,
    booking_id: i64,
    artist_id: i64,
    artist_notes: Option<&str>,
) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings
         SET status = 'cancelled',
             artist_notes = COALESCE($1, artist_notes),
             updated_at = NOW()
         WHERE id = $2 AND artist_id = $3 AND status = 'pending'
         RETURNING *",
    )
    .bind(artist_notes)
    .bind(booking_id)
    .bind(artist_id)
    .fetch_optional(pool)
    .await?;
    Ok(booking)
}

/// confirmed → completed, by either party to the booking.
pub async fn complete_booking(
    pool: &PgPool,
    booking_id: i64,
    party_id: i64,
) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings
         SET status = 'completed', updated_at = NOW()
         WHERE id = $1 AND (artist_id = $2 OR client_id = $2) AND status = 'confirmed'
         RETURNING *",
    )
    .bind(booking_id)
    .bind(party_id)
    .fetch_optional(pool)
    .await?;
    Ok(booking)
}

/// Records a verified payment. Idempotent: a booking already marked paid is
/// left alone and None comes back.
pub async fn mark_paid(pool: &PgPool, booking_id: i64, client_id: i64) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings
         SET paid_at = NOW(), updated_at = NOW()
         WHERE id = $1 AND client_id = $2 AND status = 'confirmed' AND paid_at IS NULL
         RETURNING *",
    )
    .bind(booking_id)
    .bind(client_id)
    .fetch_optional(pool)
    .await?;
    Ok(booking)
}

// ---------------------------------------------------------------------------
// ratings

/// Inserts a rating for a completed booking owned by this client. The SELECT
/// re-checks ownership and status; the unique constraint on booking_id makes
/// a second rating a no-op, reported as None.
pub async fn create_rating(
    pool: &PgPool,
    booking_id: i64,
    client_id: i64,
    stars: i32,
    comment: Option<&str>,
    tip_amount: Option<i64>,
) -> Result<Option<Rating>> {
    let rating = sqlx::query_as::<_, Rating>(
        "INSERT INTO ratings (booking_id, artist_id, client_id, rating, comment, tip_amount)
         SELECT b.id, b.artist_id, b.client_id, $2, $3, $4
         FROM bookings b
         WHERE b.id = $1 AND b.client_id = $5 AND b.status = 'completed'
         ON CONFLICT (booking_id) DO NOTHING
         RETURNING *",
    )
    .bind(booking_id)
    .bind(stars)
    .bind(comment)
    .bind(tip_amount)
    .bind(client_id)
    .fetch_optional(pool)
    .await?;
    Ok(rating)
}

pub async fn ratings_for_artist(pool: &PgPool, artist_id: i64) -> Result<Vec<Rating>> {
    let ratings = sqlx::query_as::<_, Rating>(
        "SELECT * FROM ratings WHERE artist_id = $1 ORDER BY created_at DESC",
    )
    .bind(artist_id)
    .fetch_all(pool)
    .await?;
    Ok(ratings)
}

pub async fn ratings_by_client(pool: &PgPool, client_id: i64) -> Result<Vec<Rating>> {
    let ratings = sqlx::query_as::<_, Rating>(
        "SELECT * FROM ratings WHERE client_id = $1 ORDER BY created_at DESC",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;
    Ok(ratings)
}

/// A rating joined with the reviewer and the booked service.
#[derive(Debug, Clone, FromRow)]
pub struct RatingView {
    #[sqlx(flatten)]
    pub rating: Rating,
    pub client_first_name: String,
    pub client_last_name: String,
    pub service_name: String,
}

pub async fn rating_views_for_artist(pool: &PgPool, artist_id: i64) -> Result<Vec<RatingView>> {
    let views = sqlx::query_as::<_, RatingView>(
        "SELECT r.*, p.first_name AS client_first_name, p.last_name AS client_last_name,
                s.service_name
         FROM ratings r
         JOIN profiles p ON p.id = r.client_id
         JOIN bookings b ON b.id = r.booking_id
         JOIN services s ON s.id = b.service_id
         WHERE r.artist_id = $1
         ORDER BY r.created_at DESC",
    )
    .bind(artist_id)
    .fetch_all(pool)
    .await?;
    Ok(views)
}

/// Completed bookings of this client that have no rating yet.
pub async fn unrated_completed_bookings(
    pool: &PgPool,
    client_id: i64,
) -> Result<Vec<BookingView>> {
    let sql = format!(
        "{BOOKING_VIEW_SELECT}
         LEFT JOIN ratings r ON r.booking_id = b.id
         WHERE b.client_id = $1 AND b.status = 'completed' AND r.id IS NULL
         ORDER BY b.booking_date DESC"
    );
    let views = sqlx::query_as::<_, BookingView>(&sql)
        .bind(client_id)
        .fetch_all(pool)
        .await?;
    Ok(views)
}

// ---------------------------------------------------------------------------
// conversations

/// Find-or-create keyed by booking id. The partial unique index on
/// `conversations.booking_id` settles the race: a concurrent insert loses the
/// conflict and both callers fetch the surviving row.
pub async fn find_or_create_conversation(pool: &PgPool, booking: &Booking) -> Result<Conversation> {
    sqlx::query(
        "INSERT INTO conversations (booking_id, artist_id, client_id)
         VALUES ($1, $2, $3)
         ON CONFLICT (booking_id) WHERE booking_id IS NOT NULL DO NOTHING",
    )
    .bind(booking.id)
    .bind(booking.artist_id)
    .bind(booking.client_id)
    .execute(pool)
    .await?;

    let conversation = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversations WHERE booking_id = $1",
    )
    .bind(booking.id)
    .fetch_one(pool)
    .await?;
    Ok(conversation)
}

/// A conversation joined with both participants.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationView {
    #[sqlx(flatten)]
    pub conversation: Conversation,
    pub artist_first_name: String,
    pub artist_last_name: String,
    pub artist_telegram_id: i64,
    pub client_first_name: String,
    pub client_last_name: String,
    pub client_telegram_id: i64,
}

impl ConversationView {
    pub fn counterpart_name(&self, profile_id: i64) -> String {
        if self.conversation.artist_id == profile_id {
            format!("{} {}", self.client_first_name, self.client_last_name).trim().to_string()
        } else {
            format!("{} {}", self.artist_first_name, self.artist_last_name).trim().to_string()
        }
    }

    pub fn counterpart_telegram_id(&self, profile_id: i64) -> i64 {
        if self.conversation.artist_id == profile_id {
            self.client_telegram_id
        } else {
            self.artist_telegram_id
        }
    }
}

const CONVERSATION_VIEW_SELECT: &str = r#"
    SELECT c.*, pa.first_name AS artist_first_name, pa.last_name AS artist_last_name,
           pa.telegram_id AS artist_telegram_id,
           pc.first_name AS client_first_name, pc.last_name AS client_last_name,
           pc.telegram_id AS client_telegram_id
    FROM conversations c
    JOIN profiles pa ON pa.id = c.artist_id
    JOIN profiles pc ON pc.id = c.client_id
"#;

pub async fn conversations_for(pool: &PgPool, profile_id: i64) -> Result<Vec<ConversationView>> {
    let sql = format!(
        "{CONVERSATION_VIEW_SELECT}
         WHERE c.artist_id = $1 OR c.client_id = $1
         ORDER BY c.created_at DESC"
    );
    let views = sqlx::query_as::<_, ConversationView>(&sql)
        .bind(profile_id)
        .fetch_all(pool)
        .await?;
    Ok(views)
}

/// The conversation, only if this profile participates in it.
pub async fn conversation_for_participant(
    pool: &PgPool,
    conversation_id: i64,
    profile_id: i64,
) -> Result<Option<ConversationView>> {
    let sql = format!(
        "{CONVERSATION_VIEW_SELECT}
         WHERE c.id = $1 AND (c.artist_id = $2 OR c.client_id = $2)"
    );
    let view = sqlx::query_as::<_, ConversationView>(&sql)
        .bind(conversation_id)
        .bind(profile_id)
        .fetch_optional(pool)
        .await?;
    Ok(view)
}

/// Appends a message; the SELECT guards that the sender participates. None
/// means the sender is not in this conversation.
pub async fn append_message(
    pool: &PgPool,
    conversation_id: i64,
    sender_id: i64,
    content: &str,
) -> Result<Option<ChatMessage>> {
    let message = sqlx::query_as::<_, ChatMessage>(
        "INSERT INTO messages (conversation_id, sender_id, content)
         SELECT c.id, $2, $3
         FROM conversations c
         WHERE c.id = $1 AND (c.artist_id = $2 OR c.client_id = $2)
         RETURNING *",
    )
    .bind(conversation_id)
    .bind(sender_id)
    .bind(content)
    .fetch_optional(pool)
    .await?;
    Ok(message)
}

pub async fn conversation_messages(
    pool: &PgPool,
    conversation_id: i64,
) -> Result<Vec<ChatMessage>> {
    let messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at",
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;
    Ok(messages)
}

// ---------------------------------------------------------------------------
// portfolio

pub const PORTFOLIO_CAP: i64 = 5;

/// Adds a portfolio entry unless the artist is at the cap. The guard lives in
/// the insert itself, so concurrent uploads cannot overshoot. None means the
/// cap was hit.
pub async fn add_portfolio_photo(
    pool: &PgPool,
    artist_id: i64,
    photo_url: &str,
) -> Result<Option<PortfolioPhoto>> {
    let photo = sqlx::query_as::<_, PortfolioPhoto>(
        "INSERT INTO portfolio_photos (artist_id, photo_url)
         SELECT $1, $2
         WHERE (SELECT COUNT(*) FROM portfolio_photos WHERE artist_id = $1) < $3
         RETURNING *",
    )
    .bind(artist_id)
    .bind(photo_url)
    .bind(PORTFOLIO_CAP)
    .fetch_optional(pool)
    .await?;
    Ok(photo)
}

pub async fn portfolio_for_artist(pool: &PgPool, artist_id: i64) -> Result<Vec<PortfolioPhoto>> {
    let photos = sqlx::query_as::<_, PortfolioPhoto>(
        "SELECT * FROM portfolio_photos WHERE artist_id = $1 ORDER BY created_at",
    )
    .bind(artist_id)
    .fetch_all(pool)
    .await?;
    Ok(photos)
}

pub async fn remove_portfolio_photo(pool: &PgPool, photo_id: i64, artist_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM portfolio_photos WHERE id = $1 AND artist_id = $2")
        .bind(photo_id)
        .bind(artist_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
