//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{Currency, EngineError, Money, Operation, ResultEngine};

/// Parse a UUID from storage or input and report it as an unknown id.
pub(crate) fn parse_uuid(value: &str, op: Operation) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::not_found(op, value))
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    Currency::try_from(value)
}

/// Amounts entering the ledger must be positive and in the ledger currency.
pub(crate) fn ensure_positive_amount(
    op: Operation,
    ledger: Currency,
    amount: Money,
    label: &str,
) -> ResultEngine<()> {
    if amount.currency() != ledger {
        return Err(EngineError::validation(
            op,
            format!(
                "ledger currency is {}, got {}",
                ledger.code(),
                amount.currency().code()
            ),
        ));
    }
    if !amount.is_positive() {
        return Err(EngineError::validation(op, format!("{label} must be > 0")));
    }
    Ok(())
}

/// Stored rows must be in the ledger currency for aggregates to stay exact.
pub(crate) fn ensure_ledger_currency(
    op: Operation,
    ledger: Currency,
    actual: Currency,
) -> ResultEngine<()> {
    if ledger != actual {
        return Err(EngineError::validation(
            op,
            format!(
                "ledger currency is {}, got {}",
                ledger.code(),
                actual.code()
            ),
        ));
    }
    Ok(())
}

/// A due date may be today or later (UTC calendar).
pub(crate) fn ensure_due_date(op: Operation, due_date: Option<NaiveDate>) -> ResultEngine<()> {
    if let Some(due) = due_date
        && due < Utc::now().date_naive()
    {
        return Err(EngineError::validation(
            op,
            format!("due date {due} is in the past"),
        ));
    }
    Ok(())
}

pub(crate) fn normalize_required_text(
    op: Operation,
    value: &str,
    label: &str,
) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation(
            op,
            format!("{label} must not be empty"),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Phones are compared on digits and a leading `+` only.
pub(crate) fn normalize_phone(value: Option<&str>) -> Option<String> {
    let raw = value?.trim();
    let mut out = String::with_capacity(raw.len());
    for (i, c) in raw.chars().enumerate() {
        if c.is_ascii_digit() || (i == 0 && c == '+') {
            out.push(c);
        }
    }
    (out.chars().any(|c| c.is_ascii_digit())).then_some(out)
}
