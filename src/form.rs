//! Payment entry form controller.
//!
//! Holds the draft the user is typing, the tenant list it picks from and the
//! selection derived from it. Rendering is left to the templates; this module
//! only decides what they show and what gets submitted.

use std::str::FromStr;

use actix_web::ResponseError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    errors::AppError,
    payment::{self, Badge, PaymentStatus},
    structs::{Payment, PaymentRequest, Tenant},
};

pub const SUBMIT_SUCCESS: &str = "Payment recorded successfully";
pub const SUBMIT_FALLBACK: &str = "Failed to record payment";

/// Where the form gets its tenants from and sends its payments to.
#[async_trait]
pub trait PaymentBackend {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, AppError>;
    async fn record_payment(&self, request: PaymentRequest) -> Result<Payment, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentDraft {
    pub tenant_id: String,
    pub amount: String,
    pub date: String,
    pub notes: String,
}

impl PaymentDraft {
    pub fn new(today: NaiveDate) -> Self {
        PaymentDraft {
            tenant_id: String::new(),
            amount: String::new(),
            date: today.format(payment::DATE_FORMAT).to_string(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TenantId,
    Amount,
    Date,
    Notes,
}

impl FromStr for Field {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tenantId" | "tenant_id" => Ok(Field::TenantId),
            "amount" => Ok(Field::Amount),
            "date" => Ok(Field::Date),
            "notes" => Ok(Field::Notes),
            other => Err(AppError::Validation(format!("Unknown form field: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Notice {
    Success(String),
    Failure(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Failure(m) => m,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Success(_))
    }
}

#[derive(Debug, Clone)]
pub struct PaymentForm {
    draft: PaymentDraft,
    tenants: Vec<Tenant>,
    selected: Option<Tenant>,
    loading: bool,
}

impl PaymentForm {
    pub fn new(today: NaiveDate) -> Self {
        PaymentForm {
            draft: PaymentDraft::new(today),
            tenants: Vec::new(),
            selected: None,
            loading: true,
        }
    }

    /// Builds the form and requests the tenant list.
    pub async fn mount<B>(backend: &B, today: NaiveDate) -> Self
    where
        B: PaymentBackend + ?Sized,
    {
        let mut form = PaymentForm::new(today);
        form.tenants_loaded(backend.list_tenants().await);
        form
    }

    /// A failed tenant request leaves the form usable with an empty list.
    pub fn tenants_loaded(&mut self, result: Result<Vec<Tenant>, AppError>) {
        self.tenants = result.unwrap_or_else(|e| {
            log::warn!("Failed to load tenants, continuing with none: {}", e);
            Vec::new()
        });
        self.loading = false;
        self.refresh_selection();
    }

    pub fn change(&mut self, field: Field, value: &str) {
        match field {
            Field::TenantId => {
                self.draft.tenant_id = value.to_owned();
                self.refresh_selection();
            }
            Field::Amount => self.draft.amount = value.to_owned(),
            Field::Date => self.draft.date = value.to_owned(),
            Field::Notes => self.draft.notes = value.to_owned(),
        }
    }

    fn refresh_selection(&mut self) {
        let wanted = self.draft.tenant_id.trim().parse::<i64>().ok();
        self.selected = wanted.and_then(|id| self.tenants.iter().find(|t| t.id == id).cloned());
    }

    pub fn draft(&self) -> &PaymentDraft {
        &self.draft
    }

    pub fn tenants(&self) -> &[Tenant] {
        &self.tenants
    }

    pub fn selected_tenant(&self) -> Option<&Tenant> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_submit(&self) -> bool {
        !self.loading
    }

    pub fn status(&self) -> Option<PaymentStatus> {
        let paid = payment::parse_amount(&self.draft.amount).unwrap_or(Decimal::ZERO);
        payment::status_for(self.selected.as_ref(), paid)
    }

    pub fn badge(&self) -> Option<Badge> {
        let tenant = self.selected.as_ref()?;
        self.status().map(|status| Badge::new(status, tenant.rent_amount_kes))
    }

    pub fn request(&self) -> PaymentRequest {
        let amount_paid = if self.draft.amount.trim().is_empty() {
            None
        } else {
            payment::parse_amount(&self.draft.amount)
        };
        PaymentRequest {
            tenant_id: self.draft.tenant_id.trim().parse().ok(),
            amount_paid,
            date_paid: self.draft.date.clone(),
            notes: Some(self.draft.notes.clone()),
        }
    }

    /// Sends the draft. Success resets the form; failure leaves every field
    /// as the user typed it.
    pub async fn submit<B>(&mut self, backend: &B, today: NaiveDate) -> Notice
    where
        B: PaymentBackend + ?Sized,
    {
        let outcome = backend.record_payment(self.request()).await;
        self.apply_outcome(outcome, today)
    }

    pub fn apply_outcome(
        &mut self,
        outcome: Result<Payment, AppError>,
        today: NaiveDate,
    ) -> Notice {
        match outcome {
            Ok(payment) => {
                log::info!("Payment {} recorded for tenant {}", payment.id, payment.tenant_id);
                self.draft = PaymentDraft::new(today);
                self.selected = None;
                Notice::Success(SUBMIT_SUCCESS.to_owned())
            }
            Err(e) => {
                log::warn!("Payment submission rejected: {}", e);
                if e.status_code().is_server_error() {
                    Notice::Failure(SUBMIT_FALLBACK.to_owned())
                } else {
                    Notice::Failure(e.to_string())
                }
            }
        }
    }
}
