use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::Result;

pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Creates the schema on startup if it does not exist yet.
///
/// The access rules the handlers rely on live here: the status CHECK, the
/// one-rating-per-booking constraint, and the partial unique index that makes
/// conversation find-or-create race-safe.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id BIGSERIAL PRIMARY KEY,
            telegram_id BIGINT NOT NULL UNIQUE,
            user_type TEXT NOT NULL CHECK (user_type IN ('artist', 'client')),
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL DEFAULT '',
            phone_number TEXT,
            location_city TEXT,
            location_state TEXT,
            bio TEXT,
            instagram_handle TEXT,
            facebook_page TEXT,
            is_verified BOOLEAN NOT NULL DEFAULT FALSE,
            subscription_active BOOLEAN NOT NULL DEFAULT FALSE,
            bank_name TEXT,
            account_number TEXT,
            account_name TEXT,
            profile_picture_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS services (
            id BIGSERIAL PRIMARY KEY,
            artist_id BIGINT NOT NULL REFERENCES profiles(id),
            service_name TEXT NOT NULL,
            service_type TEXT NOT NULL,
            description TEXT,
            base_price BIGINT NOT NULL CHECK (base_price >= 0),
            max_people INTEGER NOT NULL DEFAULT 1,
            travel_required BOOLEAN NOT NULL DEFAULT FALSE,
            includes_bridal_shower BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id BIGSERIAL PRIMARY KEY,
            artist_id BIGINT NOT NULL REFERENCES profiles(id),
            client_id BIGINT NOT NULL REFERENCES profiles(id),
            service_id BIGINT NOT NULL REFERENCES services(id),
            booking_date TIMESTAMPTZ NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'confirmed', 'cancelled', 'completed')),
            original_price BIGINT NOT NULL CHECK (original_price >= 0),
            negotiated_price BIGINT CHECK (negotiated_price >= 0),
            platform_fee BIGINT CHECK (platform_fee >= 0),
            travel_address TEXT,
            client_notes TEXT,
            artist_notes TEXT,
            paid_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CHECK (artist_id <> client_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            id BIGSERIAL PRIMARY KEY,
            booking_id BIGINT NOT NULL UNIQUE REFERENCES bookings(id),
            artist_id BIGINT NOT NULL REFERENCES profiles(id),
            client_id BIGINT NOT NULL REFERENCES profiles(id),
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            comment TEXT,
            tip_amount BIGINT CHECK (tip_amount >= 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS conversations (
            id BIGSERIAL PRIMARY KEY,
            booking_id BIGINT REFERENCES bookings(id),
            artist_id BIGINT NOT NULL REFERENCES profiles(id),
            client_id BIGINT NOT NULL REFERENCES profiles(id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One conversation per booking; ad-hoc threads have NULL booking_id.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS conversations_booking_id_key
         ON conversations (booking_id) WHERE booking_id IS NOT NULL",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id BIGSERIAL PRIMARY KEY,
            conversation_id BIGINT NOT NULL REFERENCES conversations(id),
            sender_id BIGINT NOT NULL REFERENCES profiles(id),
            content TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS portfolio_photos (
            id BIGSERIAL PRIMARY KEY,
            artist_id BIGINT NOT NULL REFERENCES profiles(id),
            photo_url TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
