//! Booking lifecycle rules: pricing, state transitions and who may trigger
//! them.
//!
//! Everything here is pure (no pool, no bot) so the rules are testable on
//! their own. Handlers call these checks first for a fast rejection, and the
//! store re-encodes the same rules in the `WHERE` clause of every mutating
//! statement, which is the authoritative gate.
//!
//! The state machine:
//!
//! - pending → confirmed (assigned artist, may set a negotiated price)
//! - pending → cancelled (assigned artist)
//! - confirmed → completed (either party)
//!
//! Everything else is rejected and leaves the booking untouched.

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{Booking, BookingStatus, Role, Service};

/// Platform surcharge applied when no explicit fee is stored, in percent.
pub const PLATFORM_FEE_PERCENT: i64 = 5;

/// The identity a handler acts on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub profile_id: i64,
    pub role: Role,
}

/// Negotiated price when the artist set one, otherwise the price captured at
/// creation.
pub fn effective_price(booking: &Booking) -> i64 {
    booking.negotiated_price.unwrap_or(booking.original_price)
}

/// Default fee: 5% of the given price in integer naira, rounded half-up.
pub fn default_platform_fee(price: i64) -> i64 {
    (price * PLATFORM_FEE_PERCENT + 50) / 100
}

/// Stored fee override when present, otherwise the 5% default over the
/// effective price.
pub fn platform_fee(booking: &Booking) -> i64 {
    booking
        .platform_fee
        .unwrap_or_else(|| default_platform_fee(effective_price(booking)))
}

/// What the client owes: effective price plus platform fee. Every surface
/// that shows or charges money goes through this.
pub fn total_due(booking: &Booking) -> i64 {
    effective_price(booking) + platform_fee(booking)
}

impl BookingStatus {
    /// Whether `target` is reachable from `self` at all, for any actor.
    pub fn can_transition_to(&self, target: BookingStatus) -> bool {
        matches!(
            (self, target),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }
}

/// The role the actor plays on this booking, if they are a party to it.
pub fn party_role(booking: &Booking, actor: &Actor) -> Option<Role> {
    if actor.profile_id == booking.artist_id {
        Some(Role::Artist)
    } else if actor.profile_id == booking.client_id {
        Some(Role::Client)
    } else {
        None
    }
}

/// Checks both that the edge exists and that this actor may take it.
pub fn authorize_transition(
    booking: &Booking,
    actor: &Actor,
    target: BookingStatus,
) -> Result<()> {
    let current = booking.status();
    if !current.can_transition_to(target) {
        return Err(AppError::InvalidTransition(format!(
            "A {} booking cannot become {}.",
            current.as_str(),
            target.as_str()
        )));
    }

    let Some(role) = party_role(booking, actor) else {
        return Err(AppError::Forbidden(
            "You are not a party to this booking.".to_string(),
        ));
    };

    match target {
        // Only the assigned artist answers a request.
        BookingStatus::Confirmed | BookingStatus::Cancelled => {
            if role != Role::Artist {
                return Err(AppError::Forbidden(
                    "Only the artist can respond to a booking request.".to_string(),
                ));
            }
        }
        // Either party closes out a confirmed booking.
        BookingStatus::Completed => {}
        BookingStatus::Pending => unreachable!("no edge leads back to pending"),
    }

    Ok(())
}

/// The fields a legal transition is allowed to change. `original_price` is
/// deliberately absent: it is immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingPatch {
    pub status: BookingStatus,
    pub negotiated_price: Option<i64>,
    pub artist_notes: Option<String>,
}

/// pending → confirmed by the artist, optionally renegotiating the price.
pub fn accept(
    booking: &Booking,
    actor: &Actor,
    negotiated_price: Option<i64>,
    notes: Option<String>,
) -> Result<BookingPatch> {
    authorize_transition(booking, actor, BookingStatus::Confirmed)?;
    if let Some(price) = negotiated_price {
        if price < 0 {
            return Err(AppError::InvalidInput(
                "The negotiated price cannot be negative.".to_string(),
            ));
        }
    }
    Ok(BookingPatch {
        status: BookingStatus::Confirmed,
        negotiated_price,
        artist_notes: notes,
    })
}

/// pending → cancelled by the artist, optionally explaining why.
pub fn decline(booking: &Booking, actor: &Actor, notes: Option<String>) -> Result<BookingPatch> {
    authorize_transition(booking, actor, BookingStatus::Cancelled)?;
    Ok(BookingPatch {
        status: BookingStatus::Cancelled,
        negotiated_price: None,
        artist_notes: notes,
    })
}

/// confirmed → completed by either party. Prices stay as they are.
pub fn complete(booking: &Booking, actor: &Actor) -> Result<BookingPatch> {
    authorize_transition(booking, actor, BookingStatus::Completed)?;
    Ok(BookingPatch {
        status: BookingStatus::Completed,
        negotiated_price: None,
        artist_notes: None,
    })
}

/// Whether this actor may pay for this booking right now: the booking's
/// client, on a confirmed booking that has not been paid yet.
pub fn authorize_payment(booking: &Booking, actor: &Actor) -> Result<()> {
    if party_role(booking, actor) != Some(Role::Client) {
        return Err(AppError::Forbidden(
            "Only the client can pay for this booking.".to_string(),
        ));
    }
    if booking.status() != BookingStatus::Confirmed {
        return Err(AppError::InvalidTransition(
            "Only confirmed bookings can be paid.".to_string(),
        ));
    }
    if booking.paid_at.is_some() {
        return Err(AppError::InvalidInput(
            "This booking has already been paid.".to_string(),
        ));
    }
    Ok(())
}

/// Pre-write validation for a new booking request: the chosen service must
/// belong to the chosen artist, the date must not be in the past, and the
/// client cannot book themselves. Status is forced to pending and the
/// service's current base price is captured by the insert, not by the caller.
pub fn validate_booking_request(
    service: &Service,
    artist_id: i64,
    client_id: i64,
    booking_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<()> {
    if service.artist_id != artist_id {
        return Err(AppError::InvalidInput(
            "That service does not belong to the selected artist.".to_string(),
        ));
    }
    if client_id == artist_id {
        return Err(AppError::InvalidInput(
            "You cannot book your own service.".to_string(),
        ));
    }
    if booking_date < now {
        return Err(AppError::InvalidInput(
            "The booking date must not be in the past.".to_string(),
        ));
    }
    Ok(())
}

/// Whether the client may rate this booking: completed and theirs.
/// Uniqueness is not checked here; one-rating-per-booking is the store's
/// unique constraint.
pub fn authorize_rating(booking: &Booking, actor: &Actor) -> Result<()> {
    if party_role(booking, actor) != Some(Role::Client) {
        return Err(AppError::Forbidden(
            "Only the client can rate this booking.".to_string(),
        ));
    }
    if booking.status() != BookingStatus::Completed {
        return Err(AppError::InvalidTransition(
            "Only completed bookings can be rated.".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_stars(stars: i32) -> Result<()> {
    if !(1..=5).contains(&stars) {
        return Err(AppError::InvalidInput(
            "The rating must be between 1 and 5 stars.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn booking(status: BookingStatus) -> Booking {
        let t = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Booking {
            id: 1,
            artist_id: 10,
            client_id: 20,
            service_id: 30,
            booking_date: t,
            status: status.as_str().to_string(),
            original_price: 15_000,
            negotiated_price: None,
            platform_fee: None,
            travel_address: None,
            client_notes: None,
            artist_notes: None,
            paid_at: None,
            created_at: t,
            updated_at: t,
        }
    }

    fn artist() -> Actor {
        Actor { profile_id: 10, role: Role::Artist }
    }

    fn client() -> Actor {
        Actor { profile_id: 20, role: Role::Client }
    }

    fn stranger() -> Actor {
        Actor { profile_id: 99, role: Role::Artist }
    }

    #[test]
    fn effective_price_prefers_negotiated() {
        let mut b = booking(BookingStatus::Pending);
        assert_eq!(effective_price(&b), 15_000);
        b.negotiated_price = Some(12_000);
        assert_eq!(effective_price(&b), 12_000);
        // An explicit zero is a price, not an absent value.
        b.negotiated_price = Some(0);
        assert_eq!(effective_price(&b), 0);
    }

    #[test]
    fn fee_defaults_to_five_percent_half_up() {
        assert_eq!(default_platform_fee(15_000), 750);
        assert_eq!(default_platform_fee(12_000), 600);
        assert_eq!(default_platform_fee(0), 0);
        // 5% of 10 is 0.5, rounds up.
        assert_eq!(default_platform_fee(10), 1);
        // 5% of 9 is 0.45, rounds down.
        assert_eq!(default_platform_fee(9), 0);
    }

    #[test]
    fn fee_override_wins_over_default() {
        let mut b = booking(BookingStatus::Confirmed);
        assert_eq!(platform_fee(&b), 750);
        b.platform_fee = Some(100);
        assert_eq!(platform_fee(&b), 100);
        assert_eq!(total_due(&b), 15_100);
    }

    #[test]
    fn accepted_at_list_price() {
        // Client books at 15 000, artist accepts as-is.
        let b = booking(BookingStatus::Pending);
        let patch = accept(&b, &artist(), None, None).unwrap();
        assert_eq!(patch.status, BookingStatus::Confirmed);
        assert_eq!(effective_price(&b), 15_000);
        assert_eq!(platform_fee(&b), 750);
        assert_eq!(total_due(&b), 15_750);
    }

    #[test]
    fn accepted_with_negotiated_price() {
        let b = booking(BookingStatus::Pending);
        let patch = accept(&b, &artist(), Some(12_000), None).unwrap();
        assert_eq!(patch.negotiated_price, Some(12_000));
        let mut after = b.clone();
        after.status = patch.status.as_str().to_string();
        after.negotiated_price = patch.negotiated_price;
        assert_eq!(effective_price(&after), 12_000);
        assert_eq!(platform_fee(&after), 600);
        assert_eq!(total_due(&after), 12_600);
        // The captured price is untouched by acceptance.
        assert_eq!(after.original_price, 15_000);
    }

    #[test]
    fn negative_negotiated_price_rejected() {
        let b = booking(BookingStatus::Pending);
        assert!(accept(&b, &artist(), Some(-1), None).is_err());
    }

    #[test]
    fn decline_leaves_prices_untouched() {
        let b = booking(BookingStatus::Pending);
        let patch = decline(&b, &artist(), Some("fully booked".to_string())).unwrap();
        assert_eq!(patch.status, BookingStatus::Cancelled);
        assert_eq!(patch.negotiated_price, None);
        assert_eq!(b.original_price, 15_000);
    }

    #[test]
    fn only_the_assigned_artist_responds() {
        let b = booking(BookingStatus::Pending);
        assert!(accept(&b, &client(), None, None).is_err());
        assert!(accept(&b, &stranger(), None, None).is_err());
        assert!(decline(&b, &client(), None).is_err());
        // The status string is untouched by a rejected attempt.
        assert_eq!(b.status(), BookingStatus::Pending);
    }

    #[test]
    fn either_party_completes_confirmed() {
        let b = booking(BookingStatus::Confirmed);
        assert!(complete(&b, &artist()).is_ok());
        assert!(complete(&b, &client()).is_ok());
        assert!(complete(&b, &stranger()).is_err());
    }

    #[test]
    fn illegal_edges_rejected() {
        for (from, to) in [
            (BookingStatus::Pending, BookingStatus::Completed),
            (BookingStatus::Confirmed, BookingStatus::Cancelled),
            (BookingStatus::Confirmed, BookingStatus::Confirmed),
            (BookingStatus::Cancelled, BookingStatus::Confirmed),
            (BookingStatus::Cancelled, BookingStatus::Completed),
            (BookingStatus::Completed, BookingStatus::Pending),
            (BookingStatus::Completed, BookingStatus::Cancelled),
        ] {
            assert!(!from.can_transition_to(to), "{from:?} -> {to:?} must be illegal");
            let b = booking(from);
            assert!(authorize_transition(&b, &artist(), to).is_err());
        }
    }

    #[test]
    fn payment_requires_confirmed_unpaid_client() {
        let mut b = booking(BookingStatus::Confirmed);
        assert!(authorize_payment(&b, &client()).is_ok());
        assert!(authorize_payment(&b, &artist()).is_err());
        b.paid_at = Some(b.created_at);
        assert!(authorize_payment(&b, &client()).is_err());
        let pending = booking(BookingStatus::Pending);
        assert!(authorize_payment(&pending, &client()).is_err());
    }

    #[test]
    fn rating_requires_completed_booking() {
        let b = booking(BookingStatus::Completed);
        assert!(authorize_rating(&b, &client()).is_ok());
        assert!(authorize_rating(&b, &artist()).is_err());
        let confirmed = booking(BookingStatus::Confirmed);
        assert!(authorize_rating(&confirmed, &client()).is_err());
        assert!(validate_stars(4).is_ok());
        assert!(validate_stars(0).is_err());
        assert!(validate_stars(6).is_err());
    }

    #[test]
    fn booking_request_validation() {
        let t = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let service = Service {
            id: 30,
            artist_id: 10,
            service_name: "Bridal Glam".to_string(),
            service_type: "Bridal Makeup".to_string(),
            description: None,
            base_price: 15_000,
            max_people: 1,
            travel_required: false,
            includes_bridal_shower: false,
            created_at: t,
            updated_at: t,
        };
        let later = t + chrono::Duration::hours(1);
        assert!(validate_booking_request(&service, 10, 20, later, t).is_ok());
        // A present-moment booking is allowed.
        assert!(validate_booking_request(&service, 10, 20, t, t).is_ok());
        // Past date, foreign service, self-booking: all rejected.
        assert!(validate_booking_request(&service, 10, 20, t - chrono::Duration::hours(1), t).is_err());
        assert!(validate_booking_request(&service, 11, 20, later, t).is_err());
        assert!(validate_booking_request(&service, 10, 10, later, t).is_err());
    }
}
