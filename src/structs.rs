use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::{
    errors::AppError,
    payment::{self, Badge},
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Tenant {
    pub id: i64,
    pub full_name: String,
    pub unit_name: Option<String>,
    pub rent_amount_kes: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Unit {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewTenant {
    pub full_name: String,
    #[serde(default)]
    pub unit_name: Option<String>,
    pub rent_amount_kes: i64,
}

impl NewTenant {
    pub fn validate(self) -> Result<NewTenant, AppError> {
        let full_name = self.full_name.trim().to_owned();
        if full_name.is_empty() {
            return Err(AppError::Validation("Full name is required".into()));
        }
        if self.rent_amount_kes < 0 {
            return Err(AppError::Validation("Rent amount must not be negative".into()));
        }
        let unit_name = self
            .unit_name
            .map(|u| u.trim().to_owned())
            .filter(|u| !u.is_empty());

        Ok(NewTenant {
            full_name,
            unit_name,
            rent_amount_kes: self.rent_amount_kes,
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct Payment {
    pub id: i64,
    pub tenant_id: i64,
    pub amount_paid: String,
    pub date_paid: String,
    pub notes: Option<String>,
    pub created_at: String,
}

/// A payment joined with the tenant it belongs to, for listings.
#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct PaymentSummary {
    pub id: i64,
    pub tenant_id: i64,
    pub full_name: String,
    pub unit_name: Option<String>,
    pub rent_amount_kes: i64,
    pub amount_paid: String,
    pub date_paid: String,
    pub notes: Option<String>,
}

impl PaymentSummary {
    pub fn badge(&self) -> Option<Badge> {
        let paid = Decimal::from_str(&self.amount_paid).ok()?;
        if paid <= Decimal::ZERO {
            return None;
        }
        let status = payment::compute_status(paid, self.rent_amount_kes);
        Some(Badge::new(status, self.rent_amount_kes))
    }
}

/// A [`PaymentSummary`] with its display fields filled in.
#[derive(Serialize, Debug, Clone)]
pub struct PaymentView {
    #[serde(flatten)]
    pub summary: PaymentSummary,
    pub amount_display: String,
    pub rent_display: String,
    pub badge: Option<Badge>,
}

impl From<PaymentSummary> for PaymentView {
    fn from(summary: PaymentSummary) -> Self {
        let amount_display = Decimal::from_str(&summary.amount_paid)
            .map(payment::format_ksh)
            .unwrap_or_else(|_| summary.amount_paid.clone());
        PaymentView {
            amount_display,
            rent_display: payment::format_ksh(Decimal::from(summary.rent_amount_kes)),
            badge: summary.badge(),
            summary,
        }
    }
}

/// Body of `POST /api/payments`.
///
/// Browsers post the tenant id straight from a `<select>`, so it may arrive as
/// a string. `amount_paid` is `null` when the amount field could not be parsed.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    #[serde(default, deserialize_with = "de_tenant_id")]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub amount_paid: Option<Decimal>,
    #[serde(default)]
    pub date_paid: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A payment that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub tenant_id: i64,
    pub amount_paid: Decimal,
    pub date_paid: NaiveDate,
    pub notes: Option<String>,
}

impl PaymentRequest {
    pub fn validate(self) -> Result<NewPayment, AppError> {
        let tenant_id = self
            .tenant_id
            .ok_or_else(|| AppError::Validation("Tenant is required".into()))?;

        let amount_paid = match self.amount_paid {
            Some(amount) if amount >= Decimal::ZERO => amount,
            _ => {
                return Err(AppError::Validation(
                    "Amount paid must be a non-negative number".into(),
                ))
            }
        };

        let date_paid = NaiveDate::parse_from_str(self.date_paid.trim(), payment::DATE_FORMAT)
            .map_err(|_| {
                AppError::Validation("Date paid must be a valid date (YYYY-MM-DD)".into())
            })?;

        let notes = self
            .notes
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());

        Ok(NewPayment {
            tenant_id,
            amount_paid,
            date_paid,
            notes,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TenantIdRepr {
    Int(i64),
    Text(String),
}

fn de_tenant_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<TenantIdRepr>::deserialize(deserializer)?;
    Ok(match repr {
        Some(TenantIdRepr::Int(id)) => Some(id),
        Some(TenantIdRepr::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
