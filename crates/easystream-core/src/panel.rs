//! The multi-table workflows of the admin panel.
//!
//! Repositories each touch a single table. Anything that reads or writes more
//! than one table lives here. None of these workflows is atomic: a failure
//! between two steps leaves the earlier step applied, and the error is
//! returned to the caller. The client purchase cache in particular may lag
//! behind the purchase table when its update step fails.
//!
//! Every date-relative workflow takes the reference instant explicitly; the
//! reference calendar date is its UTC date.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  catalog::{self, DEFAULT_DURATION_DAYS},
  client::{Client, NewClient, non_blank},
  dashboard::DashboardStats,
  purchase::{NewPurchase, Purchase, PurchaseStatus},
  record::{Record, Table},
  repo::{
    Clients, PurchaseFilter, Purchases, Services, Settings, add_record,
    clear_records, get_record, update_record,
  },
  report::{MonthlyReport, client_name},
  service::Service,
  setting::{self, Setting},
  snapshot::{SCHEMA_VERSION, Snapshot},
  status,
  store::RecordStore,
};

/// Days granted by a renewal.
pub const RENEWAL_DAYS: u32 = DEFAULT_DURATION_DAYS;

/// Outcome of [`Panel::delete_client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDeletion {
  /// Purchases deleted together with the client.
  pub purchases_removed:  usize,
  /// Purchases left behind, now pointing at a missing client.
  pub purchases_orphaned: usize,
}

/// A purchase prepared for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseView {
  #[serde(flatten)]
  pub purchase:       Purchase,
  /// The owning client's name, or [`report::UNKNOWN_CLIENT`](crate::report::UNKNOWN_CLIENT).
  pub client_name:    String,
  /// Status derived from the expiry date at the reference instant.
  pub current_status: PurchaseStatus,
  pub days_left:      i64,
}

/// The admin panel over a shared record store.
#[derive(Debug)]
pub struct Panel<S> {
  store: Arc<S>,
}

impl<S> Clone for Panel<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: RecordStore> Panel<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  pub fn clients(&self) -> Clients<'_, S> { Clients::new(&self.store) }

  pub fn purchases(&self) -> Purchases<'_, S> { Purchases::new(&self.store) }

  pub fn services(&self) -> Services<'_, S> { Services::new(&self.store) }

  pub fn settings(&self) -> Settings<'_, S> { Settings::new(&self.store) }

  // ─── Catalog ───────────────────────────────────────────────────────────────

  /// Install the default catalog when the services table is empty. Returns
  /// the number of services inserted.
  pub async fn seed_default_services(&self, now: DateTime<Utc>) -> Result<usize> {
    let services = self.services();
    if !services.get_all().await?.is_empty() {
      debug!("service catalog already present, skipping seed");
      return Ok(0);
    }

    let defaults = catalog::default_services();
    let count = defaults.len();
    for mut service in defaults {
      service.created_at = Some(now);
      services.add(service).await?;
    }
    info!(count, "seeded default service catalog");
    Ok(count)
  }

  /// Delete a service unless a purchase still references its code.
  pub async fn delete_service(&self, id: &str) -> Result<bool> {
    self.services().delete(id).await
  }

  // ─── Clients ───────────────────────────────────────────────────────────────

  pub async fn register_client(
    &self,
    input: NewClient,
    now: DateTime<Utc>,
  ) -> Result<Client> {
    let name = input.name.trim();
    let whats_app = input.whats_app.trim();
    if name.is_empty() || whats_app.is_empty() {
      return Err(Error::InvalidRecord(
        "a client needs a name and a WhatsApp number".into(),
      ));
    }

    let mut client = Client::new(
      Uuid::new_v4().to_string(),
      name.to_owned(),
      whats_app.to_owned(),
      now.date_naive(),
    );
    client.email = non_blank(input.email);
    client.cpf = non_blank(input.cpf);
    client.address = non_blank(input.address);
    client.notes = non_blank(input.notes);

    self.clients().add(client.clone()).await?;
    Ok(client)
  }

  /// Save edits to a client. The purchase cache is kept from the stored
  /// record; it only changes through [`Panel::record_purchase_for`].
  pub async fn update_client(&self, mut client: Client) -> Result<Client> {
    let clients = self.clients();
    let stored = clients
      .get(&client.id)
      .await?
      .ok_or_else(|| Error::ClientNotFound(client.id.clone()))?;

    client.total_purchases = stored.total_purchases;
    client.last_purchase = stored.last_purchase;
    clients.update(client.clone()).await?;
    Ok(client)
  }

  /// Number of purchases owned by a client, for the warning shown before
  /// deleting it.
  pub async fn client_purchase_count(&self, client_id: &str) -> Result<usize> {
    Ok(self.purchases().list_by_client(client_id).await?.len())
  }

  /// Delete a client, optionally deleting its purchases first. Without
  /// `cascade` the purchases stay and resolve to a placeholder name.
  pub async fn delete_client(
    &self,
    client_id: &str,
    cascade: bool,
  ) -> Result<ClientDeletion> {
    let purchases = self.purchases();
    let owned = purchases.list_by_client(client_id).await?;

    let mut outcome = ClientDeletion { purchases_removed: 0, purchases_orphaned: 0 };
    if cascade {
      for p in &owned {
        purchases.delete(&p.id).await?;
        outcome.purchases_removed += 1;
      }
    } else {
      outcome.purchases_orphaned = owned.len();
    }

    self.clients().delete(client_id).await?;
    info!(
      client_id,
      removed = outcome.purchases_removed,
      orphaned = outcome.purchases_orphaned,
      "deleted client"
    );
    Ok(outcome)
  }

  /// Update the cached purchase count and last purchase date of a client.
  ///
  /// This is the only writer of those two fields. A missing client is not an
  /// error: orphaned purchases are legal, so the update is skipped.
  pub async fn record_purchase_for(
    &self,
    client_id: &str,
    count: u32,
    on: NaiveDate,
  ) -> Result<Option<Client>> {
    let clients = self.clients();
    let Some(mut client) = clients.get(client_id).await? else {
      warn!(client_id, "purchase recorded for a missing client, cache not updated");
      return Ok(None);
    };

    client.total_purchases += count;
    client.last_purchase = Some(client.last_purchase.map_or(on, |last| last.max(on)));
    clients.update(client.clone()).await?;
    Ok(Some(client))
  }

  // ─── Purchases ─────────────────────────────────────────────────────────────

  /// Record one purchase per selected service.
  ///
  /// The charged total is split evenly between the services, rounded to
  /// cents. Service identity, code and name are copied onto each purchase.
  pub async fn record_purchase(
    &self,
    input: NewPurchase,
    now: DateTime<Utc>,
  ) -> Result<Vec<Purchase>> {
    if input.service_ids.is_empty() {
      return Err(Error::InvalidRecord("select at least one service".into()));
    }
    let count = service_count(input.service_ids.len())?;
    if input.total_value < Decimal::ZERO {
      return Err(Error::InvalidRecord("purchase value must not be negative".into()));
    }
    if input.expiry_date < input.purchase_date {
      return Err(Error::InvalidRecord(
        "expiry date must not precede the purchase date".into(),
      ));
    }
    if self.clients().get(&input.client_id).await?.is_none() {
      return Err(Error::ClientNotFound(input.client_id));
    }

    let services = self.services();
    let mut selected: Vec<Service> = Vec::with_capacity(input.service_ids.len());
    for id in &input.service_ids {
      let service = services
        .get(id)
        .await?
        .ok_or_else(|| Error::ServiceNotFound(id.clone()))?;
      selected.push(service);
    }

    let share = (input.total_value / Decimal::from(selected.len())).round_dp(2);
    let status = status::purchase_status(input.expiry_date, now.date_naive());

    let purchases = self.purchases();
    let mut created = Vec::with_capacity(selected.len());
    for service in selected {
      let purchase = Purchase {
        id: Uuid::new_v4().to_string(),
        client_id: input.client_id.clone(),
        service_id: service.id,
        service_code: service.code,
        service_name: service.name,
        value: share,
        purchase_date: input.purchase_date,
        expiry_date: input.expiry_date,
        status,
        ggmax_link: input.ggmax_link.clone(),
        code: input.code.clone(),
        password: input.password.clone(),
        notes: input.notes.clone(),
        created_at: Some(now),
      };
      purchases.add(purchase.clone()).await?;
      created.push(purchase);
    }

    self
      .record_purchase_for(&input.client_id, count, now.date_naive())
      .await?;
    Ok(created)
  }

  /// Renew a purchase as a new one starting today and running
  /// [`RENEWAL_DAYS`] days. The original purchase is left untouched.
  pub async fn renew_purchase(&self, id: &str, now: DateTime<Utc>) -> Result<Purchase> {
    let purchases = self.purchases();
    let original = purchases
      .get(id)
      .await?
      .ok_or_else(|| Error::PurchaseNotFound(id.to_owned()))?;

    let today = now.date_naive();
    let renewed = original.renewal(Uuid::new_v4().to_string(), today, RENEWAL_DAYS);
    purchases.add(renewed.clone()).await?;
    debug!(from = id, to = %renewed.id, "renewed purchase");

    self.record_purchase_for(&renewed.client_id, 1, today).await?;
    Ok(renewed)
  }

  /// Purchases matching `filter`, newest first, with client names resolved
  /// and status derived at `now`. The filter's free text is matched here,
  /// against the resolved client name as well as the purchase itself.
  pub async fn purchase_views(
    &self,
    filter: &PurchaseFilter,
    now: DateTime<Utc>,
  ) -> Result<Vec<PurchaseView>> {
    let clients = self.clients();
    let purchases = self.purchases();
    let (clients, mut matching) =
      tokio::try_join!(clients.get_all(), purchases.filter(filter))?;

    matching.retain(|p| {
      let owner = clients.iter().find(|c| c.id == p.client_id);
      filter.matches_text(p, owner.map(|c| c.name.as_str()))
    });
    matching.sort_by(|a, b| {
      b.purchase_date
        .cmp(&a.purchase_date)
        .then_with(|| a.id.cmp(&b.id))
    });

    let today = now.date_naive();
    Ok(
      matching
        .into_iter()
        .map(|purchase| PurchaseView {
          client_name: client_name(&clients, &purchase.client_id).to_owned(),
          current_status: purchase.current_status(today),
          days_left: status::days_until_expiry(purchase.expiry_date, today),
          purchase,
        })
        .collect(),
    )
  }

  /// Purchases due for a renewal reminder at `now`, soonest first.
  pub async fn expiry_alerts(&self, now: DateTime<Utc>) -> Result<Vec<Purchase>> {
    let purchases = self.purchases().get_all().await?;
    Ok(
      status::expiry_alerts(&purchases, now.date_naive())
        .into_iter()
        .cloned()
        .collect(),
    )
  }

  // ─── Reporting ─────────────────────────────────────────────────────────────

  pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardStats> {
    let clients = self.clients();
    let purchases = self.purchases();
    let services = self.services();
    let (clients, purchases, services) = tokio::try_join!(
      clients.get_all(),
      purchases.get_all(),
      services.get_all()
    )?;
    Ok(DashboardStats::compute(&clients, &purchases, &services, now.date_naive()))
  }

  pub async fn monthly_report(&self, now: DateTime<Utc>) -> Result<MonthlyReport> {
    let clients = self.clients();
    let purchases = self.purchases();
    let (clients, purchases) =
      tokio::try_join!(clients.get_all(), purchases.get_all())?;
    Ok(MonthlyReport::build(&purchases, &clients, now.date_naive()))
  }

  // ─── Bulk transfer ─────────────────────────────────────────────────────────

  /// Read all four tables into a snapshot stamped with `now`. Credential
  /// settings are left out.
  pub async fn export_snapshot(&self, now: DateTime<Utc>) -> Result<Snapshot> {
    let clients = self.clients();
    let purchases = self.purchases();
    let services = self.services();
    let settings = self.settings();
    let (clients, purchases, services, settings) = tokio::try_join!(
      clients.get_all(),
      purchases.get_all(),
      services.get_all(),
      settings.get_all()
    )?;

    let mut snapshot = Snapshot {
      clients,
      purchases,
      services,
      settings,
      exported_at: Some(now),
      schema_version: SCHEMA_VERSION,
    };
    snapshot.strip_credentials();
    Ok(snapshot)
  }

  /// Replace every table with the snapshot's contents.
  ///
  /// The snapshot is validated before anything is cleared, so a
  /// [`Error::MalformedSnapshot`] leaves the store untouched. Once clearing
  /// has started, any failure is returned as [`Error::ImportInterrupted`]
  /// and the store is partially restored.
  ///
  /// Service codes are normalised on the way in. Credentials in the snapshot
  /// are ignored and the stored password hash is kept.
  pub async fn import_snapshot(
    &self,
    mut snapshot: Snapshot,
  ) -> Result<[(Table, usize); 4]> {
    snapshot.normalize_codes();
    snapshot.strip_credentials();
    snapshot.validate()?;
    let counts = snapshot.counts();
    let kept = self.credentials().await?;

    let store = self.store();
    for table in Table::ALL {
      clear_table(store, table)
        .await
        .map_err(|e| interrupted(table, e))?;
    }

    restore(store, snapshot.clients).await?;
    restore(store, snapshot.purchases).await?;
    restore(store, snapshot.services).await?;
    restore(store, snapshot.settings).await?;
    reinstate(store, kept)
      .await
      .map_err(|e| interrupted(Table::Settings, e))?;

    info!(
      clients = counts[0].1,
      purchases = counts[1].1,
      services = counts[2].1,
      settings = counts[3].1,
      "imported snapshot"
    );
    Ok(counts)
  }

  /// Empty all four tables, keeping the stored password hash.
  pub async fn clear_all(&self) -> Result<()> {
    let kept = self.credentials().await?;
    let store = self.store();
    for table in Table::ALL {
      clear_table(store, table).await?;
    }
    reinstate(store, kept).await?;
    warn!("all tables cleared");
    Ok(())
  }

  async fn credentials(&self) -> Result<Option<Setting>> {
    get_record(self.store(), setting::PASSWORD_HASH).await
  }
}

async fn reinstate<S: RecordStore>(store: &S, credentials: Option<Setting>) -> Result<()> {
  match credentials {
    Some(stored) => update_record(store, stored).await,
    None => Ok(()),
  }
}

fn service_count(len: usize) -> Result<u32> {
  u32::try_from(len)
    .map_err(|_| Error::InvalidRecord("too many services in one purchase".into()))
}

async fn clear_table<S: RecordStore>(store: &S, table: Table) -> Result<()> {
  match table {
    Table::Clients => clear_records::<S, Client>(store).await,
    Table::Purchases => clear_records::<S, Purchase>(store).await,
    Table::Services => clear_records::<S, Service>(store).await,
    Table::Settings => clear_records::<S, Setting>(store).await,
  }
}

async fn restore<S: RecordStore, R: Record>(store: &S, records: Vec<R>) -> Result<()> {
  for record in records {
    add_record(store, record)
      .await
      .map_err(|e| interrupted(R::TABLE, e))?;
  }
  Ok(())
}

fn interrupted(table: Table, source: Error) -> Error {
  warn!(%table, error = %source, "import interrupted, store is partially restored");
  Error::ImportInterrupted { table, source: Box::new(source) }
}
