// Change detector: decides whether a fetched listing should trigger alerts

use crate::models::{Listing, Vehicle};
use chrono::NaiveDate;

/// Decide whether `listing` is novel and alert-worthy for `vehicle`.
///
/// A listing is novel when it is dated on or before `today` and its
/// (row_id, branch) identity differs from what the ledger remembers. A
/// vehicle with an empty ledger record alerts on the first listing seen
/// (cold start); re-evaluating the same identity on later cycles never
/// alerts again.
///
/// Past-dated listings stay eligible: a listing posted while the watcher was
/// down must still produce an alert once the watcher catches up. Only
/// future-dated listings are rejected.
///
/// Pure decision logic over already-fetched data; fetch failures are the
/// caller's concern.
pub fn is_novel_listing(vehicle: &Vehicle, listing: &Listing, today: NaiveDate) -> bool {
    if listing.date_listed > today {
        return false;
    }

    match vehicle.last_listing_identity() {
        None => true,
        Some((last_row, last_branch)) => {
            last_row != listing.row_id || last_branch != listing.branch
        }
    }
}
