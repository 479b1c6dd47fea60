use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  purchase::{Purchase, PurchaseIndex},
  service::{NewService, Service, normalize_code},
  store::RecordStore,
};

use super::{
  add_record, all_records, delete_record, get_record, query_records, update_record,
};

/// Typed access to the `services` table.
#[derive(Debug)]
pub struct Services<'a, S> {
  store: &'a S,
}

impl<'a, S: RecordStore> Services<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Validate and insert a catalog entry. The code is normalised first.
  pub async fn add(&self, mut service: Service) -> Result<()> {
    service.code = normalize_code(&service.code);
    service.validate()?;
    add_record(self.store, service).await
  }

  /// Create a catalog entry with a fresh identity.
  pub async fn add_new(&self, input: NewService, now: DateTime<Utc>) -> Result<Service> {
    let service = Service {
      id:         Uuid::new_v4().to_string(),
      code:       normalize_code(&input.code),
      name:       input.name.trim().to_owned(),
      price:      input.price,
      duration:   input.duration,
      created_at: Some(now),
    };
    self.add(service.clone()).await?;
    Ok(service)
  }

  pub async fn get(&self, id: &str) -> Result<Option<Service>> {
    get_record(self.store, id).await
  }

  pub async fn get_all(&self) -> Result<Vec<Service>> {
    all_records(self.store).await
  }

  pub async fn update(&self, mut service: Service) -> Result<()> {
    service.code = normalize_code(&service.code);
    service.validate()?;
    update_record(self.store, service).await
  }

  /// Delete a catalog entry unless a purchase still carries its code.
  ///
  /// Deleting an unknown id succeeds.
  pub async fn delete(&self, id: &str) -> Result<bool> {
    let Some(service) = self.get(id).await? else {
      return delete_record::<S, Service>(self.store, id).await;
    };

    let purchases: Vec<Purchase> =
      query_records(self.store, PurchaseIndex::ServiceCode, &service.code).await?;
    if !purchases.is_empty() {
      return Err(Error::ServiceInUse {
        code:      service.code,
        purchases: purchases.len(),
      });
    }

    delete_record::<S, Service>(self.store, id).await
  }

  /// First service whose code matches, compared after normalisation.
  pub async fn find_by_code(&self, code: &str) -> Result<Option<Service>> {
    let code = normalize_code(code);
    Ok(
      self
        .get_all()
        .await?
        .into_iter()
        .find(|s| normalize_code(&s.code) == code),
    )
  }

  /// Case-insensitive substring search over name and code.
  pub async fn search(&self, query: &str) -> Result<Vec<Service>> {
    let mut services = self.get_all().await?;
    services.retain(|s| s.matches_text(query));
    Ok(services)
  }
}
