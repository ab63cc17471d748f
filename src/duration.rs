use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// a count of months split into whole years and remaining months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MonthSpan {
    pub years: u32,
    pub months: u32,
}

impl MonthSpan {
    pub fn from_months(total: u32) -> Self {
        Self {
            years: total / 12,
            months: total % 12,
        }
    }

    /// truncates toward zero; negative counts give an empty span
    pub fn from_fractional_months(total: Decimal) -> Self {
        let whole = total.trunc().to_u32().unwrap_or(0);
        Self::from_months(whole)
    }

    pub fn total_months(&self) -> u32 {
        self.years * 12 + self.months
    }

    pub fn is_empty(&self) -> bool {
        self.total_months() == 0
    }
}

impl fmt::Display for MonthSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "moins d'un mois");
        }

        let mut parts = Vec::with_capacity(2);
        if self.years > 0 {
            let plural = if self.years > 1 { "s" } else { "" };
            parts.push(format!("{} an{}", self.years, plural));
        }
        if self.months > 0 {
            parts.push(format!("{} mois", self.months));
        }

        write!(f, "{}", parts.join(" et "))
    }
}

impl From<u32> for MonthSpan {
    fn from(total: u32) -> Self {
        MonthSpan::from_months(total)
    }
}
