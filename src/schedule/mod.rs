//! Selection of upcoming deliveries.

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::warn;

use crate::portal::Delivery;

/// Wire format of a delivery date.
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no future deliveries found")]
    NoFutureDeliveries,
}

/// The `limit` chronologically nearest deliveries dated today or later.
pub fn nearest_deliveries(
    deliveries: &[Delivery],
    limit: usize,
) -> Result<Vec<Delivery>, SelectionError> {
    nearest_deliveries_as_of(deliveries, limit, Local::now().date_naive())
}

/// Deterministic core of [`nearest_deliveries`] with `today` injected.
///
/// A delivery whose date does not parse is logged and skipped so one
/// malformed record cannot block the others. Deliveries dated before `today`
/// are discarded; a delivery dated exactly `today` is kept. Ties keep their
/// input order.
pub fn nearest_deliveries_as_of(
    deliveries: &[Delivery],
    limit: usize,
    today: NaiveDate,
) -> Result<Vec<Delivery>, SelectionError> {
    let mut upcoming: Vec<(i64, &Delivery)> = Vec::new();

    for delivery in deliveries {
        let date = match NaiveDate::parse_from_str(&delivery.date, DATE_FORMAT) {
            Ok(date) => date,
            Err(error) => {
                warn!(
                    delivery_id = delivery.delivery_id,
                    date = %delivery.date,
                    %error,
                    "skipping delivery with unparseable date"
                );
                continue;
            }
        };

        let days_away = (date - today).num_days();
        if days_away < 0 {
            continue;
        }
        upcoming.push((days_away, delivery));
    }

    if upcoming.is_empty() {
        return Err(SelectionError::NoFutureDeliveries);
    }

    upcoming.sort_by_key(|(days_away, _)| *days_away);

    Ok(upcoming
        .into_iter()
        .take(limit)
        .map(|(_, delivery)| delivery.clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery(delivery_id: i64, date: &str) -> Delivery {
        Delivery {
            delivery_id,
            date: date.to_string(),
            hour_preference: String::new(),
            diet_calories_id: 0,
            address_id: 0,
            pickup_point_id: None,
            delivery_spot: String::new(),
            deleted: false,
            delivery_meals: Vec::new(),
        }
    }

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_nearest_filters_past_and_sorts_ascending() {
        let deliveries = vec![
            delivery(1, "2099-01-01"),
            delivery(2, "2000-01-01"),
            delivery(3, "2099-01-02"),
        ];

        let nearest = nearest_deliveries_as_of(&deliveries, 2, day("2050-06-15")).unwrap();

        let ids: Vec<i64> = nearest.iter().map(|d| d.delivery_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_limit_truncates_but_never_pads() {
        let deliveries = vec![
            delivery(1, "2050-06-20"),
            delivery(2, "2050-06-16"),
            delivery(3, "2050-06-18"),
        ];
        let today = day("2050-06-15");

        let all = nearest_deliveries_as_of(&deliveries, 10, today).unwrap();
        assert_eq!(all.len(), 3);
        let ids: Vec<i64> = all.iter().map(|d| d.delivery_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let capped = nearest_deliveries_as_of(&deliveries, 1, today).unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].delivery_id, 2);
    }

    // Pins the inclusion boundary: a delivery dated exactly today stays in.
    #[test]
    fn test_delivery_dated_today_is_kept() {
        let deliveries = vec![delivery(1, "2050-06-15"), delivery(2, "2050-06-14")];

        let nearest = nearest_deliveries_as_of(&deliveries, 5, day("2050-06-15")).unwrap();

        assert_eq!(nearest.len(), 1);
        assert_eq!(nearest[0].delivery_id, 1);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let deliveries = vec![
            delivery(7, "2050-06-16"),
            delivery(3, "2050-06-16"),
            delivery(5, "2050-06-16"),
        ];

        let nearest = nearest_deliveries_as_of(&deliveries, 5, day("2050-06-15")).unwrap();

        let ids: Vec<i64> = nearest.iter().map(|d| d.delivery_id).collect();
        assert_eq!(ids, vec![7, 3, 5]);
    }

    #[test]
    fn test_unparseable_date_is_skipped_not_fatal() {
        let deliveries = vec![
            delivery(1, "someday"),
            delivery(2, "2050-06-16"),
            delivery(3, "16.06.2050"),
        ];

        let nearest = nearest_deliveries_as_of(&deliveries, 5, day("2050-06-15")).unwrap();

        assert_eq!(nearest.len(), 1);
        assert_eq!(nearest[0].delivery_id, 2);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let result = nearest_deliveries_as_of(&[], 3, day("2050-06-15"));
        assert_eq!(result.unwrap_err(), SelectionError::NoFutureDeliveries);
    }

    #[test]
    fn test_all_past_dates_is_an_error() {
        let deliveries = vec![delivery(1, "2000-01-01"), delivery(2, "1999-12-31")];
        let result = nearest_deliveries_as_of(&deliveries, 3, day("2050-06-15"));
        assert_eq!(result.unwrap_err(), SelectionError::NoFutureDeliveries);
    }
}
