//! Commodity-denominated token amounts.
//!
//! Quantities are fixed-point integers (u128) in the commodity's smallest
//! unit to avoid floating-point errors. An `Amount` is only meaningful
//! together with its denomination, so the two travel as one value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A commodity denomination: a short ticker code plus a descriptive label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commodity {
    /// Short ticker code, e.g. "GOLD".
    pub code: String,
    /// Human-readable label, e.g. "Gold bullion".
    pub display_name: String,
}

impl Commodity {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// A quantity of a named commodity.
///
/// Internally stored as raw units (u128) for precision.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    quantity: u128,
    commodity: Commodity,
}

impl Amount {
    pub fn new(quantity: u128, commodity: Commodity) -> Self {
        Self {
            quantity,
            commodity,
        }
    }

    pub fn quantity(&self) -> u128 {
        self.quantity
    }

    pub fn commodity(&self) -> &Commodity {
        &self.commodity
    }

    pub fn is_zero(&self) -> bool {
        self.quantity == 0
    }

    /// Add two amounts of the same commodity. `None` on overflow or when
    /// the denominations differ.
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if self.commodity != other.commodity {
            return None;
        }
        let quantity = self.quantity.checked_add(other.quantity)?;
        Some(Self {
            quantity,
            commodity: self.commodity.clone(),
        })
    }

    /// Subtract an amount of the same commodity. `None` on underflow or
    /// when the denominations differ.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if self.commodity != other.commodity {
            return None;
        }
        let quantity = self.quantity.checked_sub(other.quantity)?;
        Some(Self {
            quantity,
            commodity: self.commodity.clone(),
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.commodity.code)
    }
}
