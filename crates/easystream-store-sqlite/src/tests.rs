//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::{Days, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use easystream_core::{
  Error as CoreError, Panel,
  client::{Client, ClientIndex, ClientStatus, NewClient},
  purchase::{NewPurchase, Purchase, PurchaseIndex, PurchaseStatus},
  record::Table,
  repo::{Clients, Filter, Services},
  service::Service,
  setting::Setting,
  store::{RecordStore, StoreError, Violation},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn day(n: u64) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() + Days::new(n) }

fn service(id: &str, code: &str) -> Service {
  Service {
    id:         id.into(),
    code:       code.into(),
    name:       code.to_uppercase(),
    price:      Decimal::new(3990, 2),
    duration:   30,
    created_at: None,
  }
}

fn purchase(id: &str, client: &str, code: &str) -> Purchase {
  Purchase {
    id:            id.into(),
    client_id:     client.into(),
    service_id:    "1".into(),
    service_code:  code.into(),
    service_name:  code.to_uppercase(),
    value:         Decimal::new(1990, 2),
    purchase_date: day(0),
    expiry_date:   day(30),
    status:        PurchaseStatus::Active,
    ggmax_link:    String::new(),
    code:          String::new(),
    password:      String::new(),
    notes:         String::new(),
    created_at:    None,
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn schema_is_stamped() {
  let s = store().await;
  assert_eq!(s.schema_version().await.unwrap(), 1);
}

// ─── Basic operations ────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_returns_an_equal_copy() {
  let s = store().await;
  let netflix = service("1", "netflix");
  s.add(netflix.clone()).await.unwrap();

  let fetched: Option<Service> = s.get("1").await.unwrap();
  assert_eq!(fetched, Some(netflix));
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  let fetched: Option<Client> = s.get("nope").await.unwrap();
  assert!(fetched.is_none());
}

#[tokio::test]
async fn add_rejects_duplicate_key() {
  let s = store().await;
  s.add(service("1", "netflix")).await.unwrap();

  let err = s.add(service("1", "disney")).await.unwrap_err();
  assert_eq!(err.violation(), Some(Violation::DuplicateKey));

  let kept: Service = s.get("1").await.unwrap().unwrap();
  assert_eq!(kept.code, "netflix");
}

#[tokio::test]
async fn unique_code_is_enforced_on_add_and_update() {
  let s = store().await;
  s.add(service("1", "netflix")).await.unwrap();
  s.add(service("2", "disney")).await.unwrap();

  let err = s.add(service("3", "netflix")).await.unwrap_err();
  assert_eq!(err.violation(), Some(Violation::UniqueIndex));

  // An upsert must not replace the row that owns the code.
  let err = s.update(service("2", "netflix")).await.unwrap_err();
  assert_eq!(err.violation(), Some(Violation::UniqueIndex));
  let all: Vec<Service> = s.get_all().await.unwrap();
  assert_eq!(all.len(), 2);

  s.update(service("1", "netflix")).await.unwrap();
}

#[tokio::test]
async fn update_inserts_then_replaces() {
  let s = store().await;
  s.update(Setting::new("theme", json!("dark"))).await.unwrap();
  s.update(Setting::new("theme", json!("light"))).await.unwrap();

  let all: Vec<Setting> = s.get_all().await.unwrap();
  assert_eq!(all, vec![Setting::new("theme", json!("light"))]);
}

#[tokio::test]
async fn update_rewrites_index_columns() {
  let s = store().await;
  let mut client = Client::new("c1".into(), "Ana".into(), "111".into(), day(0));
  s.add(client.clone()).await.unwrap();

  client.status = ClientStatus::Inactive;
  s.update(client).await.unwrap();

  let active: Vec<Client> = s.query_by_index(ClientIndex::Status, "active").await.unwrap();
  let inactive: Vec<Client> =
    s.query_by_index(ClientIndex::Status, "inactive").await.unwrap();
  assert!(active.is_empty());
  assert_eq!(inactive.len(), 1);
}

#[tokio::test]
async fn delete_reports_true_even_when_absent() {
  let s = store().await;
  s.add(service("1", "netflix")).await.unwrap();

  assert!(s.delete::<Service>("1").await.unwrap());
  assert!(s.delete::<Service>("1").await.unwrap());
  let gone: Option<Service> = s.get("1").await.unwrap();
  assert!(gone.is_none());
}

#[tokio::test]
async fn query_by_index_and_clear() {
  let s = store().await;
  s.add(purchase("p1", "c1", "netflix")).await.unwrap();
  s.add(purchase("p2", "c1", "disney")).await.unwrap();
  s.add(purchase("p3", "c2", "netflix")).await.unwrap();

  let c1: Vec<Purchase> = s.query_by_index(PurchaseIndex::ClientId, "c1").await.unwrap();
  assert_eq!(c1.len(), 2);
  let netflix: Vec<Purchase> =
    s.query_by_index(PurchaseIndex::ServiceCode, "netflix").await.unwrap();
  assert_eq!(netflix.len(), 2);
  let due: Vec<Purchase> = s
    .query_by_index(PurchaseIndex::ExpiryDate, &day(30).to_string())
    .await
    .unwrap();
  assert_eq!(due.len(), 3);

  s.clear::<Purchase>().await.unwrap();
  let all: Vec<Purchase> = s.get_all().await.unwrap();
  assert!(all.is_empty());
}

#[tokio::test]
async fn tables_are_independent() {
  let s = store().await;
  s.add(service("1", "netflix")).await.unwrap();
  s.add(Client::new("1".into(), "Ana".into(), "111".into(), day(0)))
    .await
    .unwrap();

  s.clear::<Service>().await.unwrap();
  let clients: Vec<Client> = s.get_all().await.unwrap();
  assert_eq!(clients.len(), 1);
}

// ─── Through the repositories ────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_code_is_resignalled_by_the_repository() {
  let s = store().await;
  let repo = Services::new(&s);
  repo.add(service("1", "netflix")).await.unwrap();

  let err = repo.add(service("2", "netflix")).await.unwrap_err();
  assert!(matches!(err, CoreError::UniqueConstraint { table: Table::Services, .. }));
  assert_eq!(repo.find_by_code("netflix").await.unwrap().unwrap().id, "1");
}

#[tokio::test]
async fn duplicate_client_is_resignalled_by_the_repository() {
  let s = store().await;
  let repo = Clients::new(&s);
  let client = Client::new("c1".into(), "Ana".into(), "111".into(), day(0));
  repo.add(client.clone()).await.unwrap();

  assert!(matches!(
    repo.add(client).await,
    Err(CoreError::DuplicateKey { table: Table::Clients, .. })
  ));
  assert_eq!(repo.list_by_status(Filter::All).await.unwrap().len(), 1);
}

// ─── Panel workflows ─────────────────────────────────────────────────────────

#[tokio::test]
async fn panel_round_trips_a_snapshot() {
  let now = Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap();
  let panel = Panel::new(Arc::new(store().await));
  panel.seed_default_services(now).await.unwrap();
  let client = panel
    .register_client(
      NewClient { name: "Ana".into(), whats_app: "111".into(), ..Default::default() },
      now,
    )
    .await
    .unwrap();
  panel
    .record_purchase(
      NewPurchase {
        client_id:     client.id.clone(),
        service_ids:   vec!["1".into()],
        total_value:   Decimal::new(3990, 2),
        purchase_date: now.date_naive(),
        expiry_date:   now.date_naive() + Days::new(30),
        ggmax_link:    String::new(),
        code:          String::new(),
        password:      String::new(),
        notes:         String::new(),
      },
      now,
    )
    .await
    .unwrap();
  panel.settings().set("theme", json!("dark")).await.unwrap();

  let exported = panel.export_snapshot(now).await.unwrap();

  let restored = Panel::new(Arc::new(store().await));
  restored.import_snapshot(exported.clone()).await.unwrap();
  let again = restored.export_snapshot(now).await.unwrap();
  assert_eq!(again, exported);

  let stored = restored.clients().get(&client.id).await.unwrap().unwrap();
  assert_eq!(stored.total_purchases, 1);
}

#[tokio::test]
async fn panel_blocks_deleting_a_referenced_service() {
  let now = Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap();
  let s = Arc::new(store().await);
  let panel = Panel::new(Arc::clone(&s));
  panel.seed_default_services(now).await.unwrap();
  s.add(purchase("p1", "c1", "netflix")).await.unwrap();

  assert!(matches!(
    panel.delete_service("1").await,
    Err(CoreError::ServiceInUse { purchases: 1, .. })
  ));
  assert!(panel.delete_service("2").await.unwrap());
}
