use crate::{
  Result,
  client::{Client, ClientIndex, ClientStatus},
  store::RecordStore,
};

use super::{
  Filter, add_record, all_records, delete_record, get_record, query_records,
  update_record,
};

/// Typed access to the `clients` table.
#[derive(Debug)]
pub struct Clients<'a, S> {
  store: &'a S,
}

impl<'a, S: RecordStore> Clients<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  pub async fn add(&self, client: Client) -> Result<()> {
    add_record(self.store, client).await
  }

  pub async fn get(&self, id: &str) -> Result<Option<Client>> {
    get_record(self.store, id).await
  }

  pub async fn get_all(&self) -> Result<Vec<Client>> {
    all_records(self.store).await
  }

  pub async fn update(&self, client: Client) -> Result<()> {
    update_record(self.store, client).await
  }

  /// Removes only the client row. Purchases are left to the caller; see
  /// [`Panel::delete_client`](crate::panel::Panel::delete_client).
  pub async fn delete(&self, id: &str) -> Result<bool> {
    delete_record::<S, Client>(self.store, id).await
  }

  /// Case-insensitive substring search over name and WhatsApp number.
  pub async fn search_by_text(&self, query: &str) -> Result<Vec<Client>> {
    let mut clients = self.get_all().await?;
    clients.retain(|c| c.matches_text(query));
    Ok(clients)
  }

  pub async fn list_by_status(&self, status: Filter<ClientStatus>) -> Result<Vec<Client>> {
    match status {
      Filter::All => self.get_all().await,
      Filter::Only(s) => query_records(self.store, ClientIndex::Status, s.as_str()).await,
    }
  }
}
