// Property-based tests for the change detector

use chrono::{Duration, NaiveDate, Utc};
use common::alert::is_novel_listing;
use common::models::{Listing, Vehicle};
use proptest::prelude::*;

fn vehicle(last: Option<(String, String)>) -> Vehicle {
    let (last_row_id, last_branch) = match last {
        Some((row, branch)) => (Some(row), Some(branch)),
        None => (None, None),
    };
    Vehicle {
        id: 1,
        manufacturer: "Toyota".to_string(),
        model: "Corolla".to_string(),
        year: "1996".to_string(),
        last_row_id,
        last_branch,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn listing(row_id: &str, branch: &str, date_listed: NaiveDate) -> Listing {
    Listing {
        row_id: row_id.to_string(),
        branch: branch.to_string(),
        year: "1996".to_string(),
        make: "Toyota".to_string(),
        model: "Corolla".to_string(),
        date_listed,
        listing_url: "https://example.com/listing".to_string(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 4, 15).unwrap()
}

prop_compose! {
    fn identity()(row in "[a-z0-9]{1,12}", branch in "[a-z0-9]{1,12}") -> (String, String) {
        (row, branch)
    }
}

// ============================================================================
// Property: cold start always alerts on a current listing
// ============================================================================

// For all vehicles with unset ledger state, the first non-empty fetched
// listing dated on/before today is always judged novel.
#[test]
fn property_cold_start_is_always_novel() {
    proptest!(|(id in identity(), days_ago in 0i64..3650)| {
        let v = vehicle(None);
        let l = listing(&id.0, &id.1, today() - Duration::days(days_ago));
        prop_assert!(is_novel_listing(&v, &l, today()));
    });
}

// ============================================================================
// Property: re-checking the same identity never alerts
// ============================================================================

// For all vehicles, re-evaluating the same (row_id, branch) identity on a
// subsequent cycle is never judged novel, regardless of the listing date.
#[test]
fn property_same_identity_is_never_novel() {
    proptest!(|(id in identity(), days_ago in 0i64..3650)| {
        let v = vehicle(Some(id.clone()));
        let l = listing(&id.0, &id.1, today() - Duration::days(days_ago));
        prop_assert!(!is_novel_listing(&v, &l, today()));
    });
}

// ============================================================================
// Property: future-dated listings never alert
// ============================================================================

// For all listings with a future listed-date, the result is never novel,
// regardless of ledger state.
#[test]
fn property_future_dated_is_never_novel() {
    proptest!(|(
        id in identity(),
        remembered in proptest::option::of(identity()),
        days_ahead in 1i64..3650,
    )| {
        let v = vehicle(remembered);
        let l = listing(&id.0, &id.1, today() + Duration::days(days_ahead));
        prop_assert!(!is_novel_listing(&v, &l, today()));
    });
}

// ============================================================================
// Property: any identity change alerts
// ============================================================================

// A current listing whose identity differs from the remembered pair in
// either component is always judged novel.
#[test]
fn property_differing_identity_is_novel() {
    proptest!(|(remembered in identity(), fetched in identity(), days_ago in 0i64..365)| {
        prop_assume!(remembered != fetched);

        let v = vehicle(Some(remembered));
        let l = listing(&fetched.0, &fetched.1, today() - Duration::days(days_ago));
        prop_assert!(is_novel_listing(&v, &l, today()));
    });
}

// ============================================================================
// Property: the decision is deterministic
// ============================================================================

// Evaluating the same inputs twice gives the same answer; the detector holds
// no state of its own.
#[test]
fn property_detector_is_deterministic() {
    proptest!(|(
        id in identity(),
        remembered in proptest::option::of(identity()),
        day_offset in -3650i64..3650,
    )| {
        let v = vehicle(remembered);
        let l = listing(&id.0, &id.1, today() + Duration::days(day_offset));
        prop_assert_eq!(
            is_novel_listing(&v, &l, today()),
            is_novel_listing(&v, &l, today())
        );
    });
}
