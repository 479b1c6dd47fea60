//! Router tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use chrono::Utc;
use easystream_core::{Panel, memory::MemoryStore, setting};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn seeded_panel() -> Arc<Panel<MemoryStore>> {
  let panel = Arc::new(Panel::new(Arc::new(MemoryStore::new())));
  panel.seed_default_services(Utc::now()).await.unwrap();
  panel
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
  let mut req = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      req = req.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  router.clone().oneshot(req.body(body).unwrap()).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

async fn create_client(router: &Router, name: &str, whats_app: &str) -> String {
  let resp = send(
    router,
    "POST",
    "/clients",
    Some(json!({ "name": name, "whatsApp": whats_app })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  json_body(resp).await["id"].as_str().unwrap().to_owned()
}

fn purchase_body(client_id: &str, service_ids: &[&str], total: f64) -> Value {
  let today = Utc::now().date_naive();
  json!({
    "clientId": client_id,
    "serviceIds": service_ids,
    "totalValue": total,
    "purchaseDate": today.to_string(),
    "expiryDate": (today + chrono::Days::new(30)).to_string(),
  })
}

// ─── Clients ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn client_search_matches_name_and_whatsapp() {
  let router = api_router(seeded_panel().await);
  create_client(&router, "Ana Silva", "111").await;
  create_client(&router, "Carlos", "229ana").await;
  create_client(&router, "Bruno", "333").await;

  let resp = send(&router, "GET", "/clients?q=ana", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let names: Vec<String> = json_body(resp)
    .await
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["name"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(names, ["Ana Silva", "Carlos"]);

  let resp = send(&router, "GET", "/clients?status=all", None).await;
  assert_eq!(json_body(resp).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn missing_client_is_404() {
  let router = api_router(seeded_panel().await);
  let resp = send(&router, "GET", "/clients/nope", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert_eq!(json_body(resp).await["kind"], "not_found");
}

#[tokio::test]
async fn blank_client_is_rejected() {
  let router = api_router(seeded_panel().await);
  let resp = send(&router, "POST", "/clients", Some(json!({"name": " ", "whatsApp": "1"}))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(resp).await["kind"], "invalid_record");
}

#[tokio::test]
async fn deleting_a_client_reports_orphans() {
  let router = api_router(seeded_panel().await);
  let id = create_client(&router, "Ana", "111").await;
  let resp = send(&router, "POST", "/purchases", Some(purchase_body(&id, &["1"], 39.9))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = send(&router, "DELETE", &format!("/clients/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(
    json_body(resp).await,
    json!({"purchasesRemoved": 0, "purchasesOrphaned": 1})
  );

  let resp = send(&router, "GET", "/purchases", None).await;
  let views = json_body(resp).await;
  assert_eq!(views[0]["clientName"], "Client not found");
}

// ─── Services ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_service_code_is_409() {
  let router = api_router(seeded_panel().await);
  let resp = send(
    &router,
    "POST",
    "/services",
    Some(json!({"code": "Netflix", "name": "Another Netflix", "price": 10.0})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  assert_eq!(json_body(resp).await["kind"], "unique_constraint");
}

#[tokio::test]
async fn referenced_service_cannot_be_deleted() {
  let router = api_router(seeded_panel().await);
  let id = create_client(&router, "Ana", "111").await;
  send(&router, "POST", "/purchases", Some(purchase_body(&id, &["1"], 39.9))).await;

  let resp = send(&router, "DELETE", "/services/1", None).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  assert_eq!(json_body(resp).await["kind"], "service_in_use");

  let resp = send(&router, "DELETE", "/services/2", None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  let resp = send(&router, "GET", "/services/2", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn service_lookup_by_code() {
  let router = api_router(seeded_panel().await);
  let resp = send(&router, "GET", "/services?code=netflix", None).await;
  let found = json_body(resp).await;
  assert_eq!(found.as_array().unwrap().len(), 1);
  assert_eq!(found[0]["price"], json!(39.9));
}

// ─── Purchases ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn purchase_then_renew_updates_the_client() {
  let router = api_router(seeded_panel().await);
  let id = create_client(&router, "Ana", "111").await;

  let resp = send(&router, "POST", "/purchases", Some(purchase_body(&id, &["1", "2"], 60.0))).await;
  let created = json_body(resp).await;
  assert_eq!(created.as_array().unwrap().len(), 2);
  assert_eq!(created[0]["value"], json!(30.0));
  let first = created[0]["id"].as_str().unwrap().to_owned();

  let resp = send(&router, "POST", &format!("/purchases/{first}/renew"), None).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let renewed = json_body(resp).await;
  assert_ne!(renewed["id"], json!(first));
  assert_eq!(renewed["status"], "active");

  let client = json_body(send(&router, "GET", &format!("/clients/{id}"), None).await).await;
  assert_eq!(client["totalPurchases"], 3);

  let resp = send(&router, "GET", &format!("/clients/{id}/purchases"), None).await;
  assert_eq!(json_body(resp).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn purchase_list_filters_by_service() {
  let router = api_router(seeded_panel().await);
  let id = create_client(&router, "Ana", "111").await;
  send(&router, "POST", "/purchases", Some(purchase_body(&id, &["1", "2"], 60.0))).await;

  let resp = send(&router, "GET", "/purchases?service=disney&status=all", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let views = json_body(resp).await;
  assert_eq!(views.as_array().unwrap().len(), 1);
  assert_eq!(views[0]["serviceCode"], "disney");
  assert_eq!(views[0]["currentStatus"], "active");
}

#[tokio::test]
async fn purchase_list_searches_free_text() {
  let router = api_router(seeded_panel().await);
  let ana = create_client(&router, "Ana Silva", "111").await;
  let bruno = create_client(&router, "Bruno", "222").await;
  send(&router, "POST", "/purchases", Some(purchase_body(&ana, &["1"], 39.9))).await;
  send(&router, "POST", "/purchases", Some(purchase_body(&bruno, &["2"], 34.9))).await;

  let views = json_body(send(&router, "GET", "/purchases?q=SILVA", None).await).await;
  assert_eq!(views.as_array().unwrap().len(), 1);
  assert_eq!(views[0]["clientName"], "Ana Silva");

  let views = json_body(send(&router, "GET", "/purchases?q=disney", None).await).await;
  assert_eq!(views.as_array().unwrap().len(), 1);
  assert_eq!(views[0]["clientName"], "Bruno");

  let id = views[0]["id"].as_str().unwrap().to_owned();
  let uri = format!("/purchases?q={}", &id[..8]);
  let views = json_body(send(&router, "GET", &uri, None).await).await;
  assert_eq!(views[0]["id"], json!(id));
}

#[tokio::test]
async fn purchase_service_filter_ignores_case() {
  let router = api_router(seeded_panel().await);
  let id = create_client(&router, "Ana", "111").await;
  send(&router, "POST", "/purchases", Some(purchase_body(&id, &["1", "2"], 60.0))).await;

  let views = json_body(send(&router, "GET", "/purchases?service=Netflix", None).await).await;
  assert_eq!(views.as_array().unwrap().len(), 1);
  assert_eq!(views[0]["serviceCode"], "netflix");
}

#[tokio::test]
async fn renewing_a_missing_purchase_is_404() {
  let router = api_router(seeded_panel().await);
  let resp = send(&router, "POST", "/purchases/nope/renew", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ─── Views ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_counts() {
  let router = api_router(seeded_panel().await);
  let id = create_client(&router, "Ana", "111").await;
  send(&router, "POST", "/purchases", Some(purchase_body(&id, &["1"], 30.0))).await;

  let stats = json_body(send(&router, "GET", "/dashboard", None).await).await;
  assert_eq!(stats["totalClients"], 1);
  assert_eq!(stats["totalServices"], 16);
  assert_eq!(stats["todaySales"], 1);
  assert_eq!(stats["todayRevenue"], json!(30.0));
}

#[tokio::test]
async fn monthly_report_as_text_download() {
  let router = api_router(seeded_panel().await);
  let resp = send(&router, "GET", "/reports/monthly?format=text", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_owned();
  assert!(disposition.contains("monthly_report_"));

  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let text = String::from_utf8(bytes.to_vec()).unwrap();
  assert!(text.starts_with("MONTHLY REPORT - "));
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn settings_round_trip_and_hide_the_password() {
  let router = api_router(seeded_panel().await);
  let resp = send(&router, "PUT", "/settings/theme", Some(json!("dark"))).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  let value = json_body(send(&router, "GET", "/settings/theme", None).await).await;
  assert_eq!(value, json!("dark"));

  let resp = send(&router, "GET", "/settings/password_hash", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ─── Backup ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn backup_round_trip() {
  let router = api_router(seeded_panel().await);
  let id = create_client(&router, "Ana", "111").await;
  send(&router, "POST", "/purchases", Some(purchase_body(&id, &["1"], 39.9))).await;

  let exported = json_body(send(&router, "GET", "/backup", None).await).await;
  assert_eq!(exported["schemaVersion"], 1);

  let fresh = api_router(Arc::new(Panel::new(Arc::new(MemoryStore::new()))));
  let resp = send(&fresh, "POST", "/backup", Some(exported.clone())).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(
    json_body(resp).await,
    json!({"clients": 1, "purchases": 1, "services": 16, "settings": 0})
  );

  let again = json_body(send(&fresh, "GET", "/backup", None).await).await;
  assert_eq!(again["clients"], exported["clients"]);
  assert_eq!(again["purchases"], exported["purchases"]);
  assert_eq!(again["services"], exported["services"]);
}

#[tokio::test]
async fn malformed_backup_is_400_and_changes_nothing() {
  let router = api_router(seeded_panel().await);
  let resp = router
    .clone()
    .oneshot(
      Request::builder()
        .method("POST")
        .uri("/backup")
        .body(Body::from("{ not json"))
        .unwrap(),
    )
    .await
    .unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(resp).await["kind"], "malformed_snapshot");

  let services = json_body(send(&router, "GET", "/services", None).await).await;
  assert_eq!(services.as_array().unwrap().len(), 16);
}

#[tokio::test]
async fn backup_routes_leave_the_password_alone() {
  let panel = seeded_panel().await;
  panel
    .settings()
    .set(setting::PASSWORD_HASH, json!("$argon2id$stored"))
    .await
    .unwrap();
  let router = api_router(Arc::clone(&panel));

  let exported = json_body(send(&router, "GET", "/backup", None).await).await;
  assert!(!exported.to_string().contains("password_hash"));

  let mut planted = exported.clone();
  planted["settings"] = json!([{"key": "password_hash", "value": "$argon2id$planted"}]);
  let resp = send(&router, "POST", "/backup", Some(planted)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["settings"], 0);

  let resp = send(&router, "DELETE", "/data", None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  assert_eq!(
    panel.settings().password_hash().await.unwrap().as_deref(),
    Some("$argon2id$stored")
  );
}

#[tokio::test]
async fn clearing_all_data() {
  let router = api_router(seeded_panel().await);
  let resp = send(&router, "DELETE", "/data", None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  let services = json_body(send(&router, "GET", "/services", None).await).await;
  assert!(services.as_array().unwrap().is_empty());
}
