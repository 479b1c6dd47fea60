use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
  Result,
  purchase::{Purchase, PurchaseIndex, PurchaseStatus},
  service::normalize_code,
  store::RecordStore,
};

use super::{
  Filter, add_record, all_records, delete_record, get_record, query_records,
  update_record,
};

/// Criteria for [`Purchases::filter`]. Every present criterion must hold.
///
/// The free-text `q` needs client names and is only applied by
/// [`Panel::purchase_views`](crate::Panel::purchase_views).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseFilter {
  /// Case-insensitive substring of the client name, service name or id.
  #[serde(default)]
  pub q:       Option<String>,
  /// Service code, compared after normalisation.
  #[serde(default)]
  pub service: Filter<String>,
  /// Stored status.
  #[serde(default)]
  pub status:  Filter<PurchaseStatus>,
  /// Earliest purchase date, inclusive.
  pub start:   Option<NaiveDate>,
  /// Latest purchase date, inclusive.
  pub end:     Option<NaiveDate>,
}

impl PurchaseFilter {
  pub fn matches(&self, p: &Purchase) -> bool {
    self
      .service
      .as_option()
      .is_none_or(|code| p.service_code == normalize_code(code))
      && self.status.as_option().is_none_or(|s| p.status == *s)
      && self.start.is_none_or(|start| p.purchase_date >= start)
      && self.end.is_none_or(|end| p.purchase_date <= end)
  }

  /// Whether `q` matches the purchase. `client_name` is `None` for orphans,
  /// which then only match on their own fields. A blank `q` matches all.
  pub fn matches_text(&self, p: &Purchase, client_name: Option<&str>) -> bool {
    let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
      return true;
    };
    let q = q.to_lowercase();
    client_name.is_some_and(|name| name.to_lowercase().contains(&q))
      || p.service_name.to_lowercase().contains(&q)
      || p.id.to_lowercase().contains(&q)
  }
}

/// Typed access to the `purchases` table.
#[derive(Debug)]
pub struct Purchases<'a, S> {
  store: &'a S,
}

impl<'a, S: RecordStore> Purchases<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  pub async fn add(&self, purchase: Purchase) -> Result<()> {
    add_record(self.store, purchase).await
  }

  pub async fn get(&self, id: &str) -> Result<Option<Purchase>> {
    get_record(self.store, id).await
  }

  pub async fn get_all(&self) -> Result<Vec<Purchase>> {
    all_records(self.store).await
  }

  pub async fn update(&self, purchase: Purchase) -> Result<()> {
    update_record(self.store, purchase).await
  }

  pub async fn delete(&self, id: &str) -> Result<bool> {
    delete_record::<S, Purchase>(self.store, id).await
  }

  pub async fn list_by_client(&self, client_id: &str) -> Result<Vec<Purchase>> {
    query_records(self.store, PurchaseIndex::ClientId, client_id).await
  }

  pub async fn list_by_service(&self, code: Filter<String>) -> Result<Vec<Purchase>> {
    match code {
      Filter::All => self.get_all().await,
      Filter::Only(code) => {
        query_records(self.store, PurchaseIndex::ServiceCode, &normalize_code(&code))
          .await
      }
    }
  }

  pub async fn list_by_status(
    &self,
    status: Filter<PurchaseStatus>,
  ) -> Result<Vec<Purchase>> {
    match status {
      Filter::All => self.get_all().await,
      Filter::Only(s) => {
        query_records(self.store, PurchaseIndex::Status, s.as_str()).await
      }
    }
  }

  /// Purchases dated within `start..=end`.
  pub async fn list_by_date_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<Purchase>> {
    let mut purchases = self.get_all().await?;
    purchases.retain(|p| p.purchase_date >= start && p.purchase_date <= end);
    Ok(purchases)
  }

  /// Combined filter; a concrete service narrows the scan through its index.
  pub async fn filter(&self, filter: &PurchaseFilter) -> Result<Vec<Purchase>> {
    let mut purchases = self.list_by_service(filter.service.clone()).await?;
    purchases.retain(|p| filter.matches(p));
    Ok(purchases)
  }
}
