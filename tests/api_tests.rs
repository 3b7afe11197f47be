//! HTTP surface tests driving the router with `tower::ServiceExt::oneshot`.

mod test_utils;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{Datelike, Utc};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use servyre_it::server::{AppState, create_app};

use test_utils::{Taxonomy, setup_test_db, taxonomy, test_config};

struct TestApp {
    router: Router,
    taxonomy: Taxonomy,
    _uploads: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let db = setup_test_db().await.unwrap();
        let taxonomy = taxonomy(&db).await.unwrap();
        let uploads = TempDir::new().unwrap();
        let state = AppState::new(test_config(uploads.path()), db);
        Self {
            router: create_app(state),
            taxonomy,
            _uploads: uploads,
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, bytes) = self.send(method, uri, token, body).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn login(&self, role: &str) -> String {
        let (status, body) = self
            .json("POST", "/api/auth/dev-login", None, Some(json!({ "role": role })))
            .await;
        assert_eq!(status, StatusCode::OK, "dev login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    fn ticket_body(&self, title: &str) -> Value {
        json!({
            "title": title,
            "description": "La impresora del segundo piso no responde",
            "categoryId": self.taxonomy.category.id,
            "priorityId": self.taxonomy.priority.id,
            "departmentId": self.taxonomy.department.id,
            "userName": "Ana López",
            "userEmail": "ana.lopez@servyre.com"
        })
    }
}

#[tokio::test]
async fn dev_login_sets_cookie_and_identifies_caller() {
    let app = TestApp::new().await;

    let (status, headers, _) = app
        .send("POST", "/api/auth/dev-login", None, Some(json!({ "role": "technician" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("servyre_session="));

    let token = app.login("technician").await;
    let (status, me) = app.json("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["openId"], "dev-technician");
    assert_eq!(me["role"], "technician");

    let (status, _) = app.json("GET", "/api/auth/me", Some("forged.token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ticket_flow_over_http() {
    let app = TestApp::new().await;
    let admin = app.login("admin").await;
    let user = app.login("user").await;

    let (status, created) = app
        .json("POST", "/api/tickets", Some(&user), Some(app.ticket_body("Impresora")))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["folio"], "SRV - 1000");
    let id = created["ticketId"].as_i64().unwrap();

    let (status, mine) = app.json("GET", "/api/tickets/mine", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["ticketNumber"], "TKT-SRV-1000");
    assert_eq!(mine[0]["commentCount"], 0);

    let (status, _) = app.json("GET", "/api/tickets", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .json(
            "POST",
            &format!("/api/tickets/{id}/comments"),
            Some(&user),
            Some(json!({ "content": "Sigue sin funcionar", "isInternal": true })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .json(
            "PATCH",
            &format!("/api/tickets/{id}"),
            Some(&admin),
            Some(json!({ "statusId": app.taxonomy.resolved.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, ticket) = app
        .json("GET", &format!("/api/tickets/{id}"), Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(ticket["resolvedAt"].is_string());

    let (status, notifications) = app
        .json("GET", "/api/notifications/unread", Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notifications[0]["type"], "ticket_resolved");

    let (status, marked) = app
        .json("POST", "/api/notifications/read-all", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marked["updated"], 1);

    let (status, _, _) = app
        .send("DELETE", &format!("/api/tickets/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .json("GET", &format!("/api/tickets/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn validation_errors_are_problem_json() {
    let app = TestApp::new().await;
    let user = app.login("user").await;

    let mut body = app.ticket_body("Impresora");
    body["userEmail"] = json!("a@gmail.com");
    let (status, error) = app.json("POST", "/api/tickets", Some(&user), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_FAILED");

    let (status, error) = app
        .json("POST", "/api/tickets", Some(&user), Some(json!({ "title": 1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_FAILED");

    let (status, headers, bytes) = app.send("GET", "/api/tickets/abc", Some(&user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers[header::CONTENT_TYPE], "application/problem+json");
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["code"], "VALIDATION_FAILED");
    assert!(error["details"]["reason"].is_string());
}

#[tokio::test]
async fn admin_console_endpoints() {
    let app = TestApp::new().await;
    let admin = app.login("admin").await;
    let user = app.login("user").await;

    let (status, _) = app.json("GET", "/api/admin/dashboard", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.json("POST", "/api/tickets", Some(&user), Some(app.ticket_body("Monitor")))
        .await;
    let (status, stats) = app.json("GET", "/api/admin/dashboard", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalTickets"], 1);
    assert_eq!(stats["openTickets"], 1);
    assert_eq!(stats["resolutionRate"], "0.00");

    let (status, priority) = app
        .json(
            "POST",
            "/api/admin/priorities",
            Some(&admin),
            Some(json!({ "name": "critical", "displayName": "Crítica", "level": 90, "color": "#DC2626" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .json(
            "POST",
            "/api/admin/priorities",
            Some(&admin),
            Some(json!({ "name": "critical", "displayName": "Otra", "level": 95, "color": "#DC2626" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app
        .json(
            "PATCH",
            &format!("/api/admin/priorities/{}", priority["id"]),
            Some(&admin),
            Some(json!({ "color": "red" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = app
        .json(
            "POST",
            "/api/admin/users",
            Some(&admin),
            Some(json!({ "name": "Luis Pérez", "email": "luis@servyre.com", "role": "technician" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["openId"].as_str().unwrap().starts_with("manual-"));

    let (status, technicians) = app.json("GET", "/api/data/technicians", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(technicians.as_array().unwrap().len(), 1);

    let (status, _, _) = app
        .send("DELETE", &format!("/api/admin/users/{}", created["id"]), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, technicians) = app.json("GET", "/api/data/technicians", Some(&user), None).await;
    assert!(technicians.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn report_download_is_a_pdf_attachment() {
    let app = TestApp::new().await;
    let admin = app.login("admin").await;
    let now = Utc::now();

    let (status, headers, bytes) = app
        .send(
            "GET",
            &format!("/api/admin/reports/{}/{}", now.year(), now.month()),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains(&format!("reporte-tickets-{}-{}.pdf", now.month(), now.year())));
    assert!(bytes.starts_with(b"%PDF-1.4"));

    let (status, generated) = app
        .json(
            "POST",
            "/api/admin/reports",
            Some(&admin),
            Some(json!({ "month": now.month(), "year": now.year() })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated["success"], true);
    assert!(generated["size"].as_u64().unwrap() > 0);

    let (status, _) = app
        .json("GET", "/api/admin/reports/1999/1/data", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
