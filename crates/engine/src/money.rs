use std::{fmt, ops::Neg};

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, Operation, ResultEngine};

/// Signed money amount represented as **integer minor units** plus the
/// [`Currency`] they belong to.
///
/// Use this type for **all** monetary values in the engine (Lekka amounts,
/// pool targets, contributions, balances) to avoid floating-point drift.
///
/// Arithmetic is checked: adding amounts of different currencies, or
/// overflowing `i64`, yields `None` instead of a wrong number.
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::new(2000_00, Currency::Inr);
/// assert_eq!(amount.minor(), 200000);
/// assert_eq!(amount.to_string(), "2000.00 INR");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more decimals than the currency has):
///
/// ```rust
/// use engine::{Currency, Money};
///
/// assert_eq!(Money::parse("10", Currency::Inr).unwrap().minor(), 1000);
/// assert_eq!(Money::parse("10,5", Currency::Inr).unwrap().minor(), 1050);
/// assert!(Money::parse("12.345", Currency::Inr).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.minor
    }

    #[must_use]
    pub const fn currency(self) -> Currency {
        self.currency
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.minor == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.minor > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.minor < 0
    }

    /// Checked addition (returns `None` on currency mismatch or overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        if self.currency != rhs.currency {
            return None;
        }
        self.minor
            .checked_add(rhs.minor)
            .map(|minor| Money::new(minor, self.currency))
    }

    /// Checked subtraction (returns `None` on currency mismatch or overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        if self.currency != rhs.currency {
            return None;
        }
        self.minor
            .checked_sub(rhs.minor)
            .map(|minor| Money::new(minor, self.currency))
    }

    /// Sums amounts of `currency`; `None` if any item has another currency or
    /// the total overflows.
    pub fn checked_sum<I>(currency: Currency, items: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        items
            .into_iter()
            .try_fold(Money::zero(currency), Money::checked_add)
    }

    /// Parses a decimal string in major units into minor units of `currency`.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    pub fn parse(s: &str, currency: Currency) -> ResultEngine<Money> {
        let err = |reason: &str| EngineError::validation(Operation::ParseAmount, reason);

        let trimmed = s.trim();
        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped.trim())
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped.trim())
        } else {
            (false, trimmed)
        };
        if rest.is_empty() {
            return Err(err("empty amount"));
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let major_str = parts.next().ok_or_else(|| err("invalid amount"))?;
        let frac_str = parts.next().unwrap_or("");
        if parts.next().is_some() {
            return Err(err("invalid amount"));
        }
        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(err("invalid amount"));
        }
        if !frac_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(err("invalid amount"));
        }

        let digits = usize::from(currency.minor_units());
        if frac_str.len() > digits {
            return Err(err("too many decimals"));
        }

        let major: i64 = major_str.parse().map_err(|_| err("amount too large"))?;
        let frac: i64 = if frac_str.is_empty() {
            0
        } else {
            let padded = format!("{frac_str:0<digits$}");
            padded.parse().map_err(|_| err("invalid amount"))?
        };

        let total = major
            .checked_mul(currency.scale())
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(|| err("amount too large"))?;

        Ok(Money::new(if negative { -total } else { total }, currency))
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money::new(-self.minor, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let abs = self.minor.unsigned_abs();
        let scale = self.currency.scale().unsigned_abs();
        let digits = usize::from(self.currency.minor_units());
        let major = abs / scale;
        let minor = abs % scale;
        write!(f, "{sign}{major}.{minor:0digits$} {}", self.currency.code())
    }
}
