use actix_web::{
    error::JsonPayloadError,
    get, post,
    web::{self, Data},
    HttpRequest, HttpResponse, Responder,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    db,
    errors::{ApiError, AppError},
    form::{PaymentBackend, SUBMIT_FALLBACK},
    payment::{self, PaymentStatus},
    structs::{NewTenant, PaymentRequest, PaymentView},
    AppState,
};

const DEFAULT_PAYMENT_LIMIT: i64 = 50;
const MAX_PAYMENT_LIMIT: i64 = 500;

/// Malformed JSON bodies get the same `{error}` shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        log::warn!("Rejected JSON payload: {}", err);
        ApiError::from(AppError::Validation(format!("Invalid request body: {}", err))).into()
    })
}

#[get("/api/tenants")]
pub async fn list_tenants_handler(state: Data<AppState>) -> Result<impl Responder, ApiError> {
    let tenants = db::get_all_tenants(&state).await.map_err(|e| {
        log::error!("Failed to get tenants: {}", e);
        AppError::DatabaseError(e)
    })?;
    Ok(HttpResponse::Ok().json(tenants))
}

#[post("/api/tenants")]
pub async fn create_tenant_handler(
    state: Data<AppState>,
    web::Json(body): web::Json<NewTenant>,
) -> Result<impl Responder, ApiError> {
    let tenant = db::create_tenant(&state, body).await?;
    Ok(HttpResponse::Created().json(tenant))
}

#[derive(Deserialize)]
pub struct PaymentListQuery {
    limit: Option<i64>,
}

#[get("/api/payments")]
pub async fn list_payments_handler(
    state: Data<AppState>,
    query: web::Query<PaymentListQuery>,
) -> Result<impl Responder, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAYMENT_LIMIT)
        .clamp(1, MAX_PAYMENT_LIMIT);
    let payments = db::get_recent_payments(&state, limit).await.map_err(|e| {
        log::error!("Failed to get payments: {}", e);
        AppError::DatabaseError(e)
    })?;
    let views: Vec<PaymentView> = payments.into_iter().map(PaymentView::from).collect();
    Ok(HttpResponse::Ok().json(views))
}

#[post("/api/payments")]
pub async fn create_payment_handler(
    state: Data<AppState>,
    web::Json(body): web::Json<PaymentRequest>,
) -> Result<impl Responder, ApiError> {
    let payment = state.record_payment(body).await.map_err(|e| {
        log::warn!("Payment not recorded: {}", e);
        ApiError::from(e).or_server_message(SUBMIT_FALLBACK)
    })?;
    Ok(HttpResponse::Created().json(payment))
}

#[derive(Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    tenant_id: String,
    #[serde(default)]
    amount: String,
}

/// Echoes the inputs it was computed for, so a page can discard answers to
/// requests it has since superseded.
#[derive(Serialize)]
pub struct StatusResponse {
    pub tenant_id: String,
    pub amount: String,
    pub status: Option<PaymentStatus>,
    pub message: Option<String>,
    pub badge_class: Option<&'static str>,
}

/// Badge preview for the payment form while the user types.
#[get("/api/payments/status")]
pub async fn payment_status_handler(
    state: Data<AppState>,
    query: web::Query<StatusQuery>,
) -> Result<impl Responder, ApiError> {
    let tenant = match query.tenant_id.trim().parse::<i64>() {
        Ok(id) => db::get_tenant_by_id(&state, id).await?,
        Err(_) => None,
    };
    let paid = payment::parse_amount(&query.amount).unwrap_or(Decimal::ZERO);

    let response = match (payment::status_for(tenant.as_ref(), paid), tenant) {
        (Some(status), Some(tenant)) => StatusResponse {
            tenant_id: query.tenant_id.clone(),
            amount: query.amount.clone(),
            status: Some(status),
            message: Some(status.label(tenant.rent_amount_kes)),
            badge_class: Some(status.badge_class()),
        },
        _ => StatusResponse {
            tenant_id: query.tenant_id.clone(),
            amount: query.amount.clone(),
            status: None,
            message: None,
            badge_class: None,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}
