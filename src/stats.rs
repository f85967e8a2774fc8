//! Read-only aggregates over an actor's bookings and ratings.
//!
//! These are recomputed from full fetches on every request, matching how the
//! dashboards work: no caching, no incremental maintenance. Re-running them
//! over the same rows yields the same numbers.

use crate::lifecycle::effective_price;
use crate::models::{Booking, BookingStatus, Rating};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardStats {
    pub total_bookings: usize,
    pub pending_bookings: usize,
    pub total_revenue: i64,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtistStats {
    pub total_bookings: usize,
    pub completed_bookings: usize,
    pub total_earnings: i64,
    pub tip_total: i64,
    pub average_rating: f64,
    /// Completed over total, in percent.
    pub completion_rate: f64,
}

/// Sum of effective prices across the given bookings.
pub fn total_revenue(bookings: &[Booking]) -> i64 {
    bookings.iter().map(effective_price).sum()
}

/// Arithmetic mean of the star values; 0.0 with no ratings.
pub fn average_rating(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(r.rating)).sum();
    sum as f64 / ratings.len() as f64
}

/// Sum of the tips attached to the given ratings.
pub fn tip_total(ratings: &[Rating]) -> i64 {
    ratings.iter().filter_map(|r| r.tip_amount).sum()
}

pub fn pending_count(bookings: &[Booking]) -> usize {
    bookings
        .iter()
        .filter(|b| b.status() == BookingStatus::Pending)
        .count()
}

pub fn completed_count(bookings: &[Booking]) -> usize {
    bookings
        .iter()
        .filter(|b| b.status() == BookingStatus::Completed)
        .count()
}

/// Completed over total, in percent; 0.0 with no bookings.
pub fn completion_rate(bookings: &[Booking]) -> f64 {
    if bookings.is_empty() {
        return 0.0;
    }
    completed_count(bookings) as f64 / bookings.len() as f64 * 100.0
}

pub fn dashboard_stats(bookings: &[Booking], ratings: &[Rating]) -> DashboardStats {
    DashboardStats {
        total_bookings: bookings.len(),
        pending_bookings: pending_count(bookings),
        total_revenue: total_revenue(bookings),
        average_rating: average_rating(ratings),
    }
}

pub fn artist_stats(bookings: &[Booking], ratings: &[Rating]) -> ArtistStats {
    ArtistStats {
        total_bookings: bookings.len(),
        completed_bookings: completed_count(bookings),
        total_earnings: total_revenue(bookings),
        tip_total: tip_total(ratings),
        average_rating: average_rating(ratings),
        completion_rate: completion_rate(bookings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn booking(id: i64, status: BookingStatus, original: i64, negotiated: Option<i64>) -> Booking {
        let t = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Booking {
            id,
            artist_id: 10,
            client_id: 20,
            service_id: 30,
            booking_date: t,
            status: status.as_str().to_string(),
            original_price: original,
            negotiated_price: negotiated,
            platform_fee: None,
            travel_address: None,
            client_notes: None,
            artist_notes: None,
            paid_at: None,
            created_at: t,
            updated_at: t,
        }
    }

    fn rating(id: i64, stars: i32, tip: Option<i64>) -> Rating {
        Rating {
            id,
            booking_id: id,
            artist_id: 10,
            client_id: 20,
            rating: stars,
            comment: None,
            tip_amount: tip,
            created_at: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn revenue_sums_effective_prices() {
        let bookings = vec![
            booking(1, BookingStatus::Completed, 15_000, None),
            booking(2, BookingStatus::Confirmed, 20_000, Some(12_000)),
        ];
        assert_eq!(total_revenue(&bookings), 27_000);
    }

    #[test]
    fn average_over_exactly_the_given_ratings() {
        assert_eq!(average_rating(&[]), 0.0);
        let ratings = vec![rating(1, 5, None), rating(2, 3, None)];
        assert_eq!(average_rating(&ratings), 4.0);
        // A new 4-star rating moves the mean accordingly.
        let with_new = vec![rating(1, 5, None), rating(2, 3, None), rating(3, 4, Some(2_000))];
        assert_eq!(average_rating(&with_new), 4.0);
        assert_eq!(tip_total(&with_new), 2_000);
    }

    #[test]
    fn tips_accumulate() {
        let ratings = vec![rating(1, 4, Some(2_000)), rating(2, 5, None), rating(3, 5, Some(500))];
        assert_eq!(tip_total(&ratings), 2_500);
    }

    #[test]
    fn dashboard_counts() {
        let bookings = vec![
            booking(1, BookingStatus::Pending, 10_000, None),
            booking(2, BookingStatus::Pending, 8_000, None),
            booking(3, BookingStatus::Completed, 15_000, Some(12_000)),
            booking(4, BookingStatus::Cancelled, 9_000, None),
        ];
        let stats = dashboard_stats(&bookings, &[]);
        assert_eq!(stats.total_bookings, 4);
        assert_eq!(stats.pending_bookings, 2);
        assert_eq!(stats.total_revenue, 10_000 + 8_000 + 12_000 + 9_000);

        // Idempotent under re-computation with no intervening writes.
        assert_eq!(dashboard_stats(&bookings, &[]), stats);
    }

    #[test]
    fn completion_rate_percent() {
        assert_eq!(completion_rate(&[]), 0.0);
        let bookings = vec![
            booking(1, BookingStatus::Completed, 1_000, None),
            booking(2, BookingStatus::Completed, 1_000, None),
            booking(3, BookingStatus::Confirmed, 1_000, None),
            booking(4, BookingStatus::Cancelled, 1_000, None),
        ];
        assert_eq!(completion_rate(&bookings), 50.0);
    }
}
