//! Expiry-driven status derivation.
//!
//! Both operands are calendar dates, so the day difference is exact: a
//! purchase expiring on the reference date is zero days from expiry and
//! reported as [`PurchaseStatus::Warning`], not expired.

use chrono::NaiveDate;

use crate::purchase::{Purchase, PurchaseStatus};

/// Purchases this many days or fewer from expiry are in the warning window.
pub const WARNING_WINDOW_DAYS: i64 = 7;

/// Purchases this many days or fewer from expiry (but not due today) trigger
/// a renewal reminder.
pub const REMINDER_WINDOW_DAYS: i64 = 3;

/// Whole days from `today` until `expiry`; negative once expired.
pub fn days_until_expiry(expiry: NaiveDate, today: NaiveDate) -> i64 {
  (expiry - today).num_days()
}

pub fn purchase_status(expiry: NaiveDate, today: NaiveDate) -> PurchaseStatus {
  match days_until_expiry(expiry, today) {
    d if d < 0 => PurchaseStatus::Expired,
    d if d <= WARNING_WINDOW_DAYS => PurchaseStatus::Warning,
    _ => PurchaseStatus::Active,
  }
}

/// Expiry within the next week (today inclusive), excluding purchases whose
/// stored status already says expired.
pub fn is_expiring_soon(purchase: &Purchase, today: NaiveDate) -> bool {
  let days = days_until_expiry(purchase.expiry_date, today);
  (0..=WARNING_WINDOW_DAYS).contains(&days)
    && purchase.status != PurchaseStatus::Expired
}

/// Purchases due for a renewal reminder: one to three days left and not
/// stored as expired. Sorted by expiry date.
pub fn expiry_alerts(purchases: &[Purchase], today: NaiveDate) -> Vec<&Purchase> {
  let mut due: Vec<&Purchase> = purchases
    .iter()
    .filter(|p| {
      let days = days_until_expiry(p.expiry_date, today);
      (1..=REMINDER_WINDOW_DAYS).contains(&days)
        && p.status != PurchaseStatus::Expired
    })
    .collect();
  due.sort_by_key(|p| p.expiry_date);
  due
}
