use actix_files::NamedFile;
use actix_session::Session;
use actix_web::{
    get,
    http::{Method, StatusCode},
    post,
    web::{self, Data},
    Either, HttpResponse, Responder,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tera::Context;

use crate::{
    db,
    errors::AppError,
    form::{Field, Notice, PaymentForm},
    payment,
    structs::PaymentView,
    AppState,
};

const FLASH_KEY: &str = "flash";
const PAYMENT_FORM_PATH: &str = "/dashboard/payments/add";
const OVERVIEW_PAYMENT_LIMIT: i64 = 20;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

#[get("/")]
pub async fn index_handler(state: Data<AppState>) -> Result<impl Responder, AppError> {
    let tenants = db::get_all_tenants(&state).await.map_err(|e| {
        log::error!("Failed to get tenants: {}", e);
        AppError::DatabaseError(e)
    })?;

    let payments = db::get_recent_payments(&state, OVERVIEW_PAYMENT_LIMIT)
        .await
        .map_err(|e| {
            log::error!("Failed to get payments: {}", e);
            AppError::DatabaseError(e)
        })?;
    let payments: Vec<PaymentView> = payments.into_iter().map(PaymentView::from).collect();

    let mut context = Context::new();
    context.insert("title", "Overview");
    context.insert("tenants", &tenants);
    context.insert("payments", &payments);

    let rendered = state.layout.render("home.html", context)?;
    Ok(html(StatusCode::OK, rendered))
}

#[derive(Serialize)]
struct TenantOption<'a> {
    id: i64,
    full_name: &'a str,
    unit_name: &'a str,
    rent_amount_kes: i64,
    selected: bool,
}

fn form_context(form: &PaymentForm, notice: Option<&Notice>) -> Context {
    let selected_id = form.selected_tenant().map(|t| t.id);
    let options: Vec<TenantOption> = form
        .tenants()
        .iter()
        .map(|t| TenantOption {
            id: t.id,
            full_name: &t.full_name,
            unit_name: t.unit_name.as_deref().unwrap_or("N/A"),
            rent_amount_kes: t.rent_amount_kes,
            selected: Some(t.id) == selected_id,
        })
        .collect();

    let mut context = Context::new();
    context.insert("title", "Record Tenant Payment");
    context.insert("draft", form.draft());
    context.insert("tenant_options", &options);
    context.insert("can_submit", &form.can_submit());
    context.insert("badge", &form.badge());
    context.insert("notice", &notice);
    if let Some(tenant) = form.selected_tenant() {
        context.insert("selected_unit", tenant.unit_name.as_deref().unwrap_or("N/A"));
        context.insert(
            "selected_rent",
            &payment::format_ksh(Decimal::from(tenant.rent_amount_kes)),
        );
    }
    context
}

#[get("/dashboard/payments/add")]
pub async fn payment_form_handler(
    state: Data<AppState>,
    session: Session,
) -> Result<impl Responder, AppError> {
    let notice = match session.remove_as::<Notice>(FLASH_KEY) {
        Some(Ok(notice)) => Some(notice),
        Some(Err(raw)) => {
            log::warn!("Discarding unreadable flash message: {}", raw);
            None
        }
        None => None,
    };

    let form = PaymentForm::mount(state.get_ref(), today()).await;
    let rendered = state
        .layout
        .render("payments/add.html", form_context(&form, notice.as_ref()))?;
    Ok(html(StatusCode::OK, rendered))
}

/// Form fallback for browsers without scripts. Success redirects back to a
/// fresh form; failure re-renders with the user's input intact.
#[post("/dashboard/payments/add")]
pub async fn payment_form_submit_handler(
    web::Form(fields): web::Form<Vec<(String, String)>>,
    state: Data<AppState>,
    session: Session,
) -> Result<impl Responder, AppError> {
    let mut form = PaymentForm::mount(state.get_ref(), today()).await;
    for (name, value) in &fields {
        match name.parse::<Field>() {
            Ok(field) => form.change(field, value),
            Err(e) => log::debug!("Ignoring form input: {}", e),
        }
    }

    let notice = form.submit(state.get_ref(), today()).await;
    if notice.is_success() {
        session.insert(FLASH_KEY, &notice).map_err(|e| {
            log::error!("Failed to store flash message: {}", e);
            AppError::SessionError(e.to_string())
        })?;
        return Ok(HttpResponse::SeeOther()
            .append_header(("Location", PAYMENT_FORM_PATH))
            .body(notice.message().to_owned()));
    }

    let rendered = state
        .layout
        .render("payments/add.html", form_context(&form, Some(&notice)))?;
    Ok(html(StatusCode::UNPROCESSABLE_ENTITY, rendered))
}

pub async fn default_handler(req_method: Method) -> Result<impl Responder, std::io::Error> {
    match req_method {
        Method::GET => {
            let file = NamedFile::open("static/404.html")?
                .customize()
                .with_status(StatusCode::NOT_FOUND);
            Ok(Either::Left(file))
        }
        _ => Ok(Either::Right(HttpResponse::MethodNotAllowed().finish())),
    }
}
