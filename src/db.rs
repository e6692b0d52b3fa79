use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
    SqlitePool,
};

use crate::{
    errors::AppError,
    form::PaymentBackend,
    payment,
    structs::{NewPayment, NewTenant, Payment, PaymentRequest, PaymentSummary, Tenant, Unit},
    AppState,
};

const TENANT_COLUMNS: &str = "SELECT t.id, t.full_name, u.name AS unit_name, t.rent_amount_kes \
     FROM tenants t LEFT JOIN units u ON u.id = t.unit_id";

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .read_only(false)
        .busy_timeout(std::time::Duration::from_secs(5));

    SqlitePool::connect_with(opts).await
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

pub async fn get_all_tenants(state: &AppState) -> Result<Vec<Tenant>, sqlx::Error> {
    let query = format!("{} ORDER BY t.full_name, t.id", TENANT_COLUMNS);
    let tenants = sqlx::query_as::<_, Tenant>(&query)
        .fetch_all(&state.db_pool)
        .await?;
    log::debug!("Loaded {} tenants", tenants.len());
    Ok(tenants)
}

pub async fn get_tenant_by_id(state: &AppState, id: i64) -> Result<Option<Tenant>, sqlx::Error> {
    let query = format!("{} WHERE t.id = $1", TENANT_COLUMNS);
    sqlx::query_as::<_, Tenant>(&query)
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await
}

/// Returns the unit called `name`, creating it on first use.
pub async fn upsert_unit(state: &AppState, name: &str) -> Result<Unit, sqlx::Error> {
    let now = chrono::Utc::now().to_string();
    sqlx::query_as::<_, Unit>(
        "INSERT INTO units (name, created_at, updated_at) VALUES ($1, $2, $3) \
         ON CONFLICT(name) DO UPDATE SET updated_at = excluded.updated_at RETURNING *",
    )
    .bind(name)
    .bind(&now)
    .bind(&now)
    .fetch_one(&state.db_pool)
    .await
}

pub async fn create_tenant(state: &AppState, new: NewTenant) -> Result<Tenant, AppError> {
    let new = new.validate()?;
    let unit_id = match &new.unit_name {
        Some(name) => Some(upsert_unit(state, name).await?.id),
        None => None,
    };

    let now = chrono::Utc::now().to_string();
    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO tenants (full_name, unit_id, rent_amount_kes, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&new.full_name)
    .bind(unit_id)
    .bind(new.rent_amount_kes)
    .bind(&now)
    .bind(&now)
    .fetch_one(&state.db_pool)
    .await;

    let id = match inserted {
        Ok(id) => id,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            let unit = new.unit_name.unwrap_or_default();
            return Err(AppError::Conflict(format!(
                "Unit {} is already assigned to another tenant",
                unit
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let tenant = get_tenant_by_id(state, id)
        .await?
        .ok_or(AppError::InternalServerError)?;
    log::info!("Tenant created: {:?}", tenant);
    Ok(tenant)
}

pub async fn create_payment(state: &AppState, new: &NewPayment) -> Result<Payment, sqlx::Error> {
    let created_at = chrono::Utc::now().to_string();
    let payment = sqlx::query_as::<_, Payment>(
        "INSERT INTO payments (tenant_id, amount_paid, date_paid, notes, created_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(new.tenant_id)
    .bind(new.amount_paid.to_string())
    .bind(new.date_paid.format(payment::DATE_FORMAT).to_string())
    .bind(&new.notes)
    .bind(&created_at)
    .fetch_one(&state.db_pool)
    .await?;
    log::info!("Payment created: {:?}", payment);
    Ok(payment)
}

pub async fn get_recent_payments(
    state: &AppState,
    limit: i64,
) -> Result<Vec<PaymentSummary>, sqlx::Error> {
    sqlx::query_as::<_, PaymentSummary>(
        "SELECT p.id, p.tenant_id, t.full_name, u.name AS unit_name, t.rent_amount_kes, \
                p.amount_paid, p.date_paid, p.notes \
         FROM payments p \
         JOIN tenants t ON t.id = p.tenant_id \
         LEFT JOIN units u ON u.id = t.unit_id \
         ORDER BY p.date_paid DESC, p.id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(&state.db_pool)
    .await
}

#[async_trait]
impl PaymentBackend for AppState {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, AppError> {
        Ok(get_all_tenants(self).await?)
    }

    async fn record_payment(&self, request: PaymentRequest) -> Result<Payment, AppError> {
        let new = request.validate()?;
        if get_tenant_by_id(self, new.tenant_id).await?.is_none() {
            return Err(AppError::NotFound("Tenant not found".into()));
        }
        Ok(create_payment(self, &new).await?)
    }
}
