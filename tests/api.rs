//! HTTP-level tests: the full actix app over the in-memory store.

use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};
use std::sync::Arc;

use portal_backend::{
    config::RaffleConfig,
    external::{ConsoleTransport, Notifier},
    handlers,
    middlewares::AuthMiddleware,
    models::raffle_check_in_code,
    services::*,
    store::MemoryStore,
    utils::JwtService,
};

const SECRET: &str = "integration-test-secret";

macro_rules! init_app {
    () => {{
        let store = Arc::new(MemoryStore::new());
        let notifier = Notifier::new(Arc::new(ConsoleTransport));
        let raffles = RaffleService::new(store.clone(), notifier.clone(), &RaffleConfig::default());
        let events = EventService::new(store.clone(), notifier);
        let employees = EmployeeService::new(store.clone());
        let modules = ModuleConfigService::new(store);
        test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(JwtService::new(SECRET)))
                .app_data(web::Data::new(raffles))
                .app_data(web::Data::new(events))
                .app_data(web::Data::new(employees))
                .app_data(web::Data::new(modules))
                .route("/health", web::get().to(handlers::health))
                .service(web::scope("/api/v1").configure(handlers::api_config)),
        )
        .await
    }};
}

macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

fn bearer() -> (&'static str, String) {
    let token = JwtService::new(SECRET)
        .issue_token("op-1", "ops@example.com", "admin", 3600)
        .unwrap();
    ("Authorization", format!("Bearer {token}"))
}

fn post(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header(bearer())
        .set_json(body)
}

fn put(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::put()
        .uri(uri)
        .insert_header(bearer())
        .set_json(body)
}

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri).insert_header(bearer())
}

#[actix_web::test]
async fn test_requests_without_token_are_rejected() {
    let app = init_app!();

    let health = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(health.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/v1/raffles").to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/raffles")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);

    let (status, body) = send!(app, get("/api/v1/raffles"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn test_check_in_draw_and_claim_flow() {
    let app = init_app!();

    let (status, employee) = send!(
        app,
        post(
            "/api/v1/employees",
            json!({
                "employee_code": "E-1",
                "name": "Jane Doe",
                "email": "jane@example.com",
                "department": "R&D",
                "position": "Engineer",
                "join_date": "2021-04-01"
            })
        )
    );
    assert_eq!(status, StatusCode::OK);
    let employee_id = employee["data"]["id"].as_str().unwrap().to_string();

    let (_, event) = send!(
        app,
        post(
            "/api/v1/events",
            json!({
                "name": "Gala",
                "date": "2099-12-01T18:00:00Z",
                "location": "Main hall"
            })
        )
    );
    let event_id = event["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(event["data"]["status"], "upcoming");

    let (status, raffle) = send!(
        app,
        post(
            "/api/v1/raffles",
            json!({
                "name": "Gala raffle",
                "event_id": event_id,
                "prizes": [{"name": "Headphones", "description": "Noise cancelling"}]
            })
        )
    );
    assert_eq!(status, StatusCode::OK);
    let raffle_id = raffle["data"]["id"].as_str().unwrap().to_string();

    let (_, added) = send!(
        app,
        post(
            &format!("/api/v1/raffles/{raffle_id}/participants"),
            json!({"employee_ids": [employee_id]})
        )
    );
    assert_eq!(added["data"]["added"].as_array().unwrap().len(), 1);

    // 尚无人出席
    let (status, body) = send!(app, post(&format!("/api/v1/raffles/{raffle_id}/draw"), json!({})));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "NO_ELIGIBLE_PARTICIPANTS");

    let (status, _) = send!(
        app,
        post(
            &format!("/api/v1/events/{event_id}/guests"),
            json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "guest_type": "employee",
                "employee_id": employee_id
            })
        )
    );
    assert_eq!(status, StatusCode::OK);

    let code = raffle_check_in_code(
        raffle_id.parse().unwrap(),
        employee_id.parse().unwrap(),
    );
    let (status, checked) = send!(
        app,
        post(&format!("/api/v1/events/{event_id}/scan"), json!({"payload": code}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checked["data"]["newly_checked_in"], true);
    assert_eq!(checked["data"]["raffle_attendance_updated"], true);

    let (status, drawn) = send!(app, post(&format!("/api/v1/raffles/{raffle_id}/draw"), json!({})));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(drawn["data"]["winner"], employee_id.as_str());

    let (status, body) = send!(app, post(&format!("/api/v1/raffles/{raffle_id}/draw"), json!({})));
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "STATE_CONFLICT");

    let (status, outcome) = send!(
        app,
        post(&format!("/api/v1/raffles/{raffle_id}/claim"), json!({"claimed": true}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["data"]["outcome"], "claimed");

    let (_, raffle) = send!(app, get(&format!("/api/v1/raffles/{raffle_id}")));
    assert_eq!(raffle["data"]["status"], "completed");
    assert_eq!(raffle["data"]["claim_state"]["state"], "no_pending_winner");
    assert_eq!(raffle["data"]["participants"][0]["won_prize"], true);
}

#[actix_web::test]
async fn test_scan_rejects_code_from_other_event() {
    let app = init_app!();

    let mut ids = Vec::new();
    for name in ["First", "Second"] {
        let (_, event) = send!(
            app,
            post(
                "/api/v1/events",
                json!({"name": name, "date": "2099-01-01T10:00:00Z", "location": "Hall"})
            )
        );
        ids.push(event["data"]["id"].as_str().unwrap().to_string());
    }

    let (_, guest) = send!(
        app,
        post(
            &format!("/api/v1/events/{}/guests", ids[1]),
            json!({"name": "Vendor", "email": "vendor@example.com", "guest_type": "external"})
        )
    );
    let guest_id = guest["data"]["guest_id"].as_str().unwrap();

    let payload = format!(r#"{{"eventId":"{}","guestId":"{guest_id}"}}"#, ids[1]);
    let (status, body) = send!(
        app,
        post(&format!("/api/v1/events/{}/scan", ids[0]), json!({"payload": payload}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let (status, body) = send!(
        app,
        post(&format!("/api/v1/events/{}/scan", ids[1]), json!({"payload": payload}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["raffle_attendance_updated"], false);
}

#[actix_web::test]
async fn test_module_settings_round_trip() {
    let app = init_app!();
    let module_id = "6a1f5f0e-8d6e-4b8a-9a57-3f3c9d1c2b10";

    let (status, body) = send!(app, get(&format!("/api/v1/modules/{module_id}/config")));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["settings"], json!([]));

    let invalid = json!({"settings": [
        {"key": "mode", "label": "Mode", "value": {"type": "enum", "options": [], "value": null}}
    ]});
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/modules/{module_id}/config"))
        .insert_header(bearer())
        .set_json(invalid);
    let (status, _) = send!(app, req);
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let valid = json!({"settings": [
        {"key": "mode", "label": "Mode", "required": true,
         "value": {"type": "enum", "options": ["draw", "lottery"], "value": "draw"}}
    ]});
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/modules/{module_id}/config"))
        .insert_header(bearer())
        .set_json(valid);
    let (status, body) = send!(app, req);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["settings"][0]["input"], "select");
    assert_eq!(body["data"]["settings"][0]["key"], "mode");
}

#[actix_web::test]
async fn test_event_edit_rsvp_and_employee_history() {
    let app = init_app!();

    let (_, employee) = send!(
        app,
        post(
            "/api/v1/employees",
            json!({
                "employee_code": "E-7",
                "name": "Kim Lee",
                "email": "kim@example.com",
                "department": "Ops",
                "position": "Lead",
                "join_date": "2020-02-03"
            })
        )
    );
    let employee_id = employee["data"]["id"].as_str().unwrap().to_string();

    let (_, event) = send!(
        app,
        post(
            "/api/v1/events",
            json!({"name": "Offsite", "date": "2099-06-01T09:00:00Z", "location": "Lodge"})
        )
    );
    let event_id = event["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(event["data"]["status"], "upcoming");

    let (status, moved) = send!(
        app,
        put(
            &format!("/api/v1/events/{event_id}"),
            json!({"date": "2020-06-01T09:00:00Z"})
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["data"]["status"], "completed");
    assert_eq!(moved["data"]["name"], "Offsite");

    let (status, listed) = send!(app, get("/api/v1/events"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"][0]["id"], event_id.as_str());

    let (_, guest) = send!(
        app,
        post(
            &format!("/api/v1/events/{event_id}/guests"),
            json!({
                "name": "Kim Lee",
                "email": "kim@example.com",
                "guest_type": "employee",
                "employee_id": employee_id
            })
        )
    );
    let guest_id = guest["data"]["guest_id"].as_str().unwrap().to_string();
    assert_eq!(guest["data"]["status"], "pending");

    let (status, rsvp) = send!(
        app,
        put(
            &format!("/api/v1/events/{event_id}/guests/{guest_id}/rsvp"),
            json!({"status": "confirmed"})
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rsvp["data"]["status"], "confirmed");

    let (status, _) = send!(
        app,
        post(
            &format!("/api/v1/events/{event_id}/check-in"),
            json!({"employee_id": employee_id})
        )
    );
    assert_eq!(status, StatusCode::OK);

    let (status, history) = send!(app, get(&format!("/api/v1/employees/{employee_id}/history")));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["data"][0]["type"], "event");
    assert_eq!(history["data"][0]["title"], "Offsite");
}
