//! Payment status derivation and Ksh formatting.
//!
//! Everything here is pure so it can be shared by the form controller, the
//! JSON status preview and the payment listings.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::structs::Tenant;

/// Wire and storage format for payment dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How a payment compares with the tenant's expected rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum PaymentStatus {
    ExactMatch,
    /// Carries `rent - paid`.
    Underpayment(Decimal),
    /// Carries `paid - rent`.
    Overpayment(Decimal),
}

pub fn compute_status(paid: Decimal, rent: i64) -> PaymentStatus {
    let difference = paid - Decimal::from(rent);
    if difference.is_zero() {
        PaymentStatus::ExactMatch
    } else if difference.is_sign_negative() {
        PaymentStatus::Underpayment(difference.abs())
    } else {
        PaymentStatus::Overpayment(difference)
    }
}

/// Status shown next to the amount field. Absent until a tenant is selected
/// and a positive amount has been entered.
pub fn status_for(tenant: Option<&Tenant>, paid: Decimal) -> Option<PaymentStatus> {
    let tenant = tenant?;
    if paid <= Decimal::ZERO {
        return None;
    }
    Some(compute_status(paid, tenant.rent_amount_kes))
}

impl PaymentStatus {
    pub fn label(&self, rent: i64) -> String {
        match self {
            PaymentStatus::ExactMatch => {
                format!("Paid exact rent (Ksh {})", format_ksh(Decimal::from(rent)))
            }
            PaymentStatus::Underpayment(amount) => {
                format!("Underpayment by Ksh {}", format_ksh(*amount))
            }
            PaymentStatus::Overpayment(amount) => {
                format!("Overpayment by Ksh {}", format_ksh(*amount))
            }
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            PaymentStatus::ExactMatch => "bg-success",
            PaymentStatus::Underpayment(_) => "bg-warning",
            PaymentStatus::Overpayment(_) => "bg-danger",
        }
    }
}

/// A rendered status: what the page shows in the badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub status: PaymentStatus,
    pub message: String,
    pub badge_class: &'static str,
}

impl Badge {
    pub fn new(status: PaymentStatus, rent: i64) -> Self {
        Badge {
            message: status.label(rent),
            badge_class: status.badge_class(),
            status,
        }
    }
}

/// Formats an amount the way an en-US locale would: comma thousands
/// separators, at most three fraction digits, no trailing zeros.
pub fn format_ksh(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Parses the raw amount field. Empty input counts as zero, matching an
/// untouched numeric input; anything unparsable yields `None`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}
