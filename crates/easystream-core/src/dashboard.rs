//! Dashboard statistics computed from an in-memory snapshot of the tables.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
  client::Client, purchase::Purchase, service::Service, status::is_expiring_soon,
};

/// A client whose latest purchase is older than this many days is inactive.
pub const INACTIVITY_DAYS: u64 = 30;

/// Aggregate figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
  pub total_clients:    usize,
  pub total_purchases:  usize,
  pub total_services:   usize,
  /// Purchases dated today.
  pub today_sales:      usize,
  pub today_revenue:    Decimal,
  /// Clients registered today.
  pub today_clients:    usize,
  /// Purchases in the reference month.
  pub monthly_sales:    usize,
  pub monthly_revenue:  Decimal,
  pub expiring_soon:    usize,
  pub inactive_clients: usize,
}

impl DashboardStats {
  pub fn compute(
    clients: &[Client],
    purchases: &[Purchase],
    services: &[Service],
    today: NaiveDate,
  ) -> Self {
    let (today_sales, today_revenue) =
      tally(purchases.iter().filter(|p| p.purchase_date == today));
    let (monthly_sales, monthly_revenue) =
      tally(purchases.iter().filter(|p| same_month(p.purchase_date, today)));

    Self {
      total_clients: clients.len(),
      total_purchases: purchases.len(),
      total_services: services.len(),
      today_sales,
      today_revenue,
      today_clients: clients
        .iter()
        .filter(|c| c.registration_date == today)
        .count(),
      monthly_sales,
      monthly_revenue,
      expiring_soon: purchases
        .iter()
        .filter(|p| is_expiring_soon(p, today))
        .count(),
      inactive_clients: inactive_clients(clients, purchases, today).len(),
    }
  }
}

fn tally<'a>(purchases: impl Iterator<Item = &'a Purchase>) -> (usize, Decimal) {
  purchases.fold((0, Decimal::ZERO), |(n, sum), p| (n + 1, sum + p.value))
}

pub(crate) fn same_month(date: NaiveDate, reference: NaiveDate) -> bool {
  date.year() == reference.year() && date.month() == reference.month()
}

/// Clients with no purchases, or whose most recent purchase is more than
/// [`INACTIVITY_DAYS`] before `today`.
pub fn inactive_clients<'a>(
  clients: &'a [Client],
  purchases: &[Purchase],
  today: NaiveDate,
) -> Vec<&'a Client> {
  let mut latest: HashMap<&str, NaiveDate> = HashMap::new();
  for p in purchases {
    latest
      .entry(p.client_id.as_str())
      .and_modify(|d| *d = (*d).max(p.purchase_date))
      .or_insert(p.purchase_date);
  }

  let cutoff = today - Days::new(INACTIVITY_DAYS);
  clients
    .iter()
    .filter(|c| match latest.get(c.id.as_str()) {
      None => true,
      Some(last) => *last < cutoff,
    })
    .collect()
}
