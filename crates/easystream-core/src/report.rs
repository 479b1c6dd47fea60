//! Revenue aggregation and the plain-text monthly report.

use std::{
  collections::{HashMap, HashSet},
  fmt,
};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{client::Client, dashboard::same_month, purchase::Purchase};

/// Display name used when a purchase refers to a client that no longer
/// exists.
pub const UNKNOWN_CLIENT: &str = "Client not found";

/// Number of clients listed in a report's ranking.
pub const TOP_CLIENTS: usize = 5;

/// Resolve a client id to a display name.
pub fn client_name<'a>(clients: &'a [Client], client_id: &str) -> &'a str {
  clients
    .iter()
    .find(|c| c.id == client_id)
    .map_or(UNKNOWN_CLIENT, |c| c.name.as_str())
}

// ─── Aggregations ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSales {
  pub service_name: String,
  pub count:        usize,
}

/// Sales count per service name, in order of first appearance.
pub fn sales_by_service(purchases: &[Purchase]) -> Vec<ServiceSales> {
  let mut position: HashMap<&str, usize> = HashMap::new();
  let mut sales: Vec<ServiceSales> = Vec::new();

  for p in purchases {
    match position.get(p.service_name.as_str()) {
      Some(&i) => sales[i].count += 1,
      None => {
        position.insert(&p.service_name, sales.len());
        sales.push(ServiceSales { service_name: p.service_name.clone(), count: 1 });
      }
    }
  }
  sales
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRevenue {
  pub client_id: String,
  pub name:      String,
  pub total:     Decimal,
}

/// The `limit` clients with the highest summed purchase value, highest first.
/// Ties keep the order in which the clients first appear in `purchases`.
pub fn top_clients_by_revenue(
  purchases: &[Purchase],
  clients: &[Client],
  limit: usize,
) -> Vec<ClientRevenue> {
  let mut position: HashMap<&str, usize> = HashMap::new();
  let mut totals: Vec<(&str, Decimal)> = Vec::new();

  for p in purchases {
    match position.get(p.client_id.as_str()) {
      Some(&i) => totals[i].1 += p.value,
      None => {
        position.insert(&p.client_id, totals.len());
        totals.push((&p.client_id, p.value));
      }
    }
  }

  // Stable sort keeps first-appearance order among equal totals.
  totals.sort_by(|a, b| b.1.cmp(&a.1));
  totals
    .into_iter()
    .take(limit)
    .map(|(id, total)| ClientRevenue {
      client_id: id.to_owned(),
      name: client_name(clients, id).to_owned(),
      total,
    })
    .collect()
}

// ─── Monthly report ──────────────────────────────────────────────────────────

/// Sales summary for the calendar month containing the reference date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
  pub year:           i32,
  pub month:          u32,
  pub sales:          usize,
  pub revenue:        Decimal,
  pub clients_served: usize,
  pub by_service:     Vec<ServiceSales>,
  pub top_clients:    Vec<ClientRevenue>,
}

impl MonthlyReport {
  pub fn build(purchases: &[Purchase], clients: &[Client], today: NaiveDate) -> Self {
    let monthly: Vec<Purchase> = purchases
      .iter()
      .filter(|p| same_month(p.purchase_date, today))
      .cloned()
      .collect();

    let clients_served = monthly
      .iter()
      .map(|p| p.client_id.as_str())
      .collect::<HashSet<_>>()
      .len();

    Self {
      year: today.year(),
      month: today.month(),
      sales: monthly.len(),
      revenue: monthly.iter().map(|p| p.value).sum(),
      clients_served,
      by_service: sales_by_service(&monthly),
      top_clients: top_clients_by_revenue(&monthly, clients, TOP_CLIENTS),
    }
  }

  /// Suggested file name for a downloaded report.
  pub fn file_name(&self) -> String {
    format!("monthly_report_{}_{}.txt", self.month, self.year)
  }
}

impl fmt::Display for MonthlyReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let title = format!("MONTHLY REPORT - {:04}-{:02}", self.year, self.month);
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "=".repeat(title.len()))?;
    writeln!(f)?;
    writeln!(f, "SUMMARY:")?;
    writeln!(f, "- Total sales: {}", self.sales)?;
    writeln!(f, "- Total revenue: {:.2}", self.revenue)?;
    writeln!(f, "- Clients served: {}", self.clients_served)?;
    writeln!(f)?;
    writeln!(f, "SALES BY SERVICE:")?;
    if self.by_service.is_empty() {
      writeln!(f, "  No data available")?;
    }
    for s in &self.by_service {
      writeln!(f, "  - {}: {} sale(s)", s.service_name, s.count)?;
    }
    writeln!(f)?;
    writeln!(f, "TOP CLIENTS:")?;
    if self.top_clients.is_empty() {
      writeln!(f, "  No data available")?;
    }
    for c in &self.top_clients {
      writeln!(f, "  - {}: {:.2}", c.name, c.total)?;
    }
    Ok(())
  }
}
