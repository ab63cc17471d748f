use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// highest share of income a lender accepts for the monthly payment
pub const DEFAULT_MAX_DEBT_RATIO: Decimal = dec!(0.35);

/// inputs of a single loan quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanInputs {
    pub principal: Money,
    pub nominal_rate: Rate,
    pub term_years: u32,
    pub insurance_rate: Rate,
}

impl LoanInputs {
    pub fn new(principal: Money, nominal_rate: Rate, term_years: u32, insurance_rate: Rate) -> Self {
        Self {
            principal,
            nominal_rate,
            term_years,
            insurance_rate,
        }
    }

    pub fn quote(&self) -> LoanQuote {
        price_loan(self.principal, self.nominal_rate, self.term_years, self.insurance_rate)
    }
}

/// monthly payments and cost of a loan for one term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub principal: Money,
    pub term_years: u32,
    pub nominal_rate: Rate,
    pub monthly_payment_with_insurance: Money,
    pub monthly_payment_without_insurance: Money,
    pub monthly_insurance: Money,
    pub total_credit_cost: Money,
    pub minimum_qualifying_salary: Money,
}

impl LoanQuote {
    pub fn term_months(&self) -> u32 {
        self.term_years.saturating_mul(12)
    }

    pub fn monthly_rate(&self) -> Decimal {
        self.nominal_rate.monthly_rate().as_decimal()
    }

    /// interest paid over the full term, insurance excluded
    pub fn total_interest(&self) -> Money {
        self.monthly_payment_without_insurance * Decimal::from(self.term_months()) - self.principal
    }

    pub fn total_insurance(&self) -> Money {
        self.monthly_insurance * Decimal::from(self.term_months())
    }
}

/// price a fixed-rate loan
///
/// `term_years` must be positive. A zero nominal rate falls back to straight-line
/// repayment, which is the limit of the annuity formula as the rate goes to zero.
/// Insurance is charged flat on the initial principal every month and is never
/// amortized.
pub fn price_loan(principal: Money, nominal_rate: Rate, term_years: u32, insurance_rate: Rate) -> LoanQuote {
    let months = term_years.saturating_mul(12);
    let monthly_rate = nominal_rate.monthly_rate().as_decimal();

    let payment_excl = annuity_payment(principal, monthly_rate, months);
    let insurance = Money::from_decimal(principal.as_decimal() * insurance_rate.as_decimal() / dec!(12));
    let payment_with = payment_excl + insurance;

    LoanQuote {
        principal,
        term_years,
        nominal_rate,
        monthly_payment_with_insurance: payment_with,
        monthly_payment_without_insurance: payment_excl,
        monthly_insurance: insurance,
        total_credit_cost: payment_with * Decimal::from(months) - principal,
        minimum_qualifying_salary: payment_with / DEFAULT_MAX_DEBT_RATIO,
    }
}

/// level payment that repays `principal` over `months` at `monthly_rate`
pub fn annuity_payment(principal: Money, monthly_rate: Decimal, months: u32) -> Money {
    if months == 0 {
        return principal;
    }

    if monthly_rate.is_zero() {
        return principal / Decimal::from(months);
    }

    // P * r / (1 - (1 + r)^-n)
    let denominator = Decimal::ONE - discount_factor(monthly_rate, months);

    Money::from_decimal(principal.as_decimal() * monthly_rate / denominator)
}

/// balance still owed when `months` level payments remain; needs `monthly_rate > 0`
pub fn annuity_present_value(payment: Money, monthly_rate: Decimal, months: u32) -> Money {
    if months == 0 {
        return Money::ZERO;
    }

    if monthly_rate.is_zero() {
        return payment * Decimal::from(months);
    }

    let value = payment.as_decimal() * (Decimal::ONE - discount_factor(monthly_rate, months)) / monthly_rate;

    Money::from_decimal(value)
}

/// `(1 + r)^-n`; a power too large for `Decimal` discounts to zero
fn discount_factor(monthly_rate: Decimal, months: u32) -> Decimal {
    (Decimal::ONE + monthly_rate)
        .checked_powi(months as i64)
        .and_then(|compound| Decimal::ONE.checked_div(compound))
        .unwrap_or(Decimal::ZERO)
}
