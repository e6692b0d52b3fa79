#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[actix_web::test]
async fn tenants_list_is_empty_on_a_fresh_database() {
    let state = common::state().await;
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/tenants").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn created_tenants_are_listed_with_their_unit() {
    let state = common::state().await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/tenants")
        .set_json(json!({
            "full_name": "Wanjiru Mwangi",
            "unit_name": "A1",
            "rent_amount_kes": 15000
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    common::tenant(&state, "Baraka Odhiambo", None, 9000).await;

    let req = test::TestRequest::get().uri("/api/tenants").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!([
            {"id": 2, "full_name": "Baraka Odhiambo", "unit_name": null, "rent_amount_kes": 9000},
            {"id": 1, "full_name": "Wanjiru Mwangi", "unit_name": "A1", "rent_amount_kes": 15000}
        ])
    );
}

#[actix_web::test]
async fn occupied_unit_cannot_be_assigned_twice() {
    let state = common::state().await;
    common::tenant(&state, "Wanjiru Mwangi", Some("A1"), 15000).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/tenants")
        .set_json(json!({
            "full_name": "Kevin Njoroge",
            "unit_name": "A1",
            "rent_amount_kes": 15000
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unit A1 is already assigned to another tenant");
}

#[actix_web::test]
async fn payment_is_recorded_from_browser_shaped_body() {
    let state = common::state().await;
    let tenant = common::tenant(&state, "Wanjiru Mwangi", Some("A1"), 15000).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/payments")
        .set_json(json!({
            "tenant_id": tenant.id.to_string(),
            "amount_paid": 12000.5,
            "date_paid": "2025-03-01",
            "notes": "M-Pesa"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["tenant_id"], tenant.id);
    assert_eq!(body["amount_paid"], "12000.5");
    assert_eq!(body["date_paid"], "2025-03-01");
    assert_eq!(body["notes"], "M-Pesa");
}

#[actix_web::test]
async fn unknown_tenant_is_a_404_with_error_text() {
    let state = common::state().await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/payments")
        .set_json(json!({
            "tenant_id": 42,
            "amount_paid": 100,
            "date_paid": "2025-03-01",
            "notes": ""
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Tenant not found"}));
}

#[actix_web::test]
async fn unparsable_amount_is_rejected() {
    let state = common::state().await;
    let tenant = common::tenant(&state, "Wanjiru Mwangi", None, 15000).await;
    let app = test_app!(state);

    // parseFloat("") is NaN, which JSON.stringify turns into null
    let req = test::TestRequest::post()
        .uri("/api/payments")
        .set_json(json!({"tenant_id": tenant.id, "amount_paid": null, "date_paid": "2025-03-01"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Amount paid must be a non-negative number");
}

#[actix_web::test]
async fn malformed_json_uses_error_shape() {
    let state = common::state().await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/payments")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[actix_web::test]
async fn status_preview_matches_badge_rules() {
    let state = common::state().await;
    let tenant = common::tenant(&state, "Wanjiru Mwangi", Some("A1"), 15000).await;
    let app = test_app!(state);

    let cases = [
        ("15000", "Paid exact rent (Ksh 15,000)", "bg-success"),
        ("12000", "Underpayment by Ksh 3,000", "bg-warning"),
        ("18000", "Overpayment by Ksh 3,000", "bg-danger"),
    ];
    for (amount, message, class) in cases {
        let uri = format!("/api/payments/status?tenant_id={}&amount={}", tenant.id, amount);
        let req = test::TestRequest::get().uri(&uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], message);
        assert_eq!(body["badge_class"], class);
    }
}

#[actix_web::test]
async fn status_preview_is_empty_without_tenant_or_amount() {
    let state = common::state().await;
    let tenant = common::tenant(&state, "Wanjiru Mwangi", None, 15000).await;
    let app = test_app!(state);

    for uri in [
        "/api/payments/status?tenant_id=&amount=15000".to_owned(),
        format!("/api/payments/status?tenant_id={}&amount=", tenant.id),
        format!("/api/payments/status?tenant_id={}&amount=0", tenant.id),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], Value::Null);
        assert_eq!(body["message"], Value::Null);
        assert_eq!(body["badge_class"], Value::Null);
    }
}

#[actix_web::test]
async fn payments_list_carries_status() {
    let state = common::state().await;
    let tenant = common::tenant(&state, "Wanjiru Mwangi", Some("A1"), 15000).await;
    let app = test_app!(state);

    for (amount, date) in [(18000, "2025-02-01"), (15000, "2025-03-01")] {
        let req = test::TestRequest::post()
            .uri("/api/payments")
            .set_json(json!({"tenant_id": tenant.id, "amount_paid": amount, "date_paid": date}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/api/payments").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["date_paid"], "2025-03-01");
    assert_eq!(rows[0]["badge"]["message"], "Paid exact rent (Ksh 15,000)");
    assert_eq!(rows[1]["badge"]["message"], "Overpayment by Ksh 3,000");
    assert_eq!(rows[1]["amount_display"], "18,000");
}

#[actix_web::test]
async fn status_preview_echoes_the_inputs_it_answers() {
    let state = common::state().await;
    let tenant = common::tenant(&state, "Wanjiru Mwangi", Some("A1"), 15000).await;
    let app = test_app!(state);

    // responses to older keystrokes must be recognisable as such
    for amount in ["1500", "15000"] {
        let uri = format!("/api/payments/status?tenant_id={}&amount={}", tenant.id, amount);
        let req = test::TestRequest::get().uri(&uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["tenant_id"], tenant.id.to_string());
        assert_eq!(body["amount"], amount);
    }

    let req = test::TestRequest::get()
        .uri("/api/payments/status?tenant_id=&amount=")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["tenant_id"], "");
    assert_eq!(body["amount"], "");
}

#[actix_web::test]
async fn server_failure_on_submit_uses_form_fallback_text() {
    let state = common::state().await;
    let tenant = common::tenant(&state, "Wanjiru Mwangi", Some("A1"), 15000).await;
    let app = test_app!(state);
    state.db_pool.close().await;

    let req = test::TestRequest::post()
        .uri("/api/payments")
        .set_json(json!({"tenant_id": tenant.id, "amount_paid": 15000, "date_paid": "2025-03-01"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Failed to record payment"}));
}
