//! Rupiah amounts.

use serde::{Deserialize, Serialize};

/// An amount in whole rupiah.
///
/// Rupiah has no minor unit in practice, so prices and totals are plain
/// integers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rupiah(i64);

impl Rupiah {
    /// Creates an amount from whole rupiah.
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns zero rupiah.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in whole rupiah.
    pub fn amount(&self) -> i64 {
        self.0
    }

    /// Multiplies by a quantity, saturating at the bounds of `i64`.
    pub fn multiply(&self, quantity: i64) -> Rupiah {
        Rupiah(self.0.saturating_mul(quantity))
    }

    /// Multiplies by a quantity, or `None` on overflow.
    pub fn checked_multiply(&self, quantity: i64) -> Option<Rupiah> {
        self.0.checked_mul(quantity).map(Rupiah)
    }

    /// Adds two amounts, or `None` on overflow.
    pub fn checked_add(&self, other: Rupiah) -> Option<Rupiah> {
        self.0.checked_add(other.0).map(Rupiah)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

/// Formats as `Rp 12.500`, with `.` as the thousands separator.
impl std::fmt::Display for Rupiah {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }

        if self.0 < 0 {
            write!(f, "-Rp {grouped}")
        } else {
            write!(f, "Rp {grouped}")
        }
    }
}

// Plain `+` saturates. Totals that are persisted go through the checked
// methods instead.

impl std::ops::Add for Rupiah {
    type Output = Rupiah;

    fn add(self, rhs: Self) -> Self::Output {
        Rupiah(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::AddAssign for Rupiah {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl std::iter::Sum for Rupiah {
    fn sum<I: Iterator<Item = Rupiah>>(iter: I) -> Self {
        iter.fold(Rupiah::zero(), |acc, x| acc + x)
    }
}
