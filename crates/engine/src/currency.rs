use serde::{Deserialize, Serialize};

use crate::{EngineError, Operation};

/// ISO currency code tagged on every [`Money`](crate::Money) value.
///
/// A running engine keeps its ledger in a single currency (default `INR`);
/// the tag travels with each amount so stored rows can be checked against it.
///
/// ## Minor units
///
/// Amounts are stored as an `i64` number of **minor units**. `minor_units()`
/// returns how many decimal digits separate major from minor units.
///
/// Example: INR has 2 minor units (paise), so `2000.00 INR` ⇄ `200000`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Eur,
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Inr | Currency::Eur | Currency::Usd => 2,
        }
    }

    /// `10^minor_units`, the number of minor units in one major unit.
    #[must_use]
    pub const fn scale(self) -> i64 {
        10i64.pow(self.minor_units() as u32)
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Currency::Inr),
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(EngineError::validation(
                Operation::ParseAmount,
                format!("unsupported currency: {other}"),
            )),
        }
    }
}
