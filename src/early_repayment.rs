use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::pricing::{annuity_payment, annuity_present_value, LoanQuote};

/// how a prepayment is absorbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepaymentMode {
    /// keep the payment, shorten the loan
    ReduceTerm,
    /// keep the end date, lower the payment
    ReducePayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyRepaymentInputs {
    /// monthly payment before the prepayment, insurance excluded
    pub payment_excl_insurance: Money,
    pub original_term_months: u32,
    /// monthly nominal rate as a fraction; must be positive
    pub monthly_rate: Decimal,
    /// whole years elapsed when the lump sum is paid
    pub repayment_year: u32,
    pub lump_sum: Money,
    pub mode: RepaymentMode,
}

impl EarlyRepaymentInputs {
    /// prepayment on a priced loan
    pub fn from_quote(quote: &LoanQuote, repayment_year: u32, lump_sum: Money, mode: RepaymentMode) -> Self {
        Self {
            payment_excl_insurance: quote.monthly_payment_without_insurance,
            original_term_months: quote.term_months(),
            monthly_rate: quote.monthly_rate(),
            repayment_year,
            lump_sum,
            mode,
        }
    }

    /// months still due when the lump sum is paid
    pub fn remaining_months(&self) -> u32 {
        self.original_term_months.saturating_sub(self.repayment_year.saturating_mul(12))
    }

    /// the loan has matured by the repayment year
    pub fn is_matured(&self) -> bool {
        self.repayment_year.saturating_mul(12) >= self.original_term_months
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyRepaymentResult {
    pub mode: RepaymentMode,
    pub outstanding_principal_at_repayment: Money,
    pub lump_sum_applied: Money,
    pub new_principal: Money,
    pub original_remaining_term_months: u32,
    pub new_remaining_term_months: u32,
    pub original_monthly_payment: Money,
    pub new_monthly_payment: Money,
    pub interest_saved: Money,
}

impl EarlyRepaymentResult {
    pub fn months_saved(&self) -> u32 {
        self.original_remaining_term_months
            .saturating_sub(self.new_remaining_term_months)
    }

    pub fn monthly_payment_reduction(&self) -> Money {
        (self.original_monthly_payment - self.new_monthly_payment).max(Money::ZERO)
    }

    pub fn is_settled(&self) -> bool {
        self.new_principal.is_zero()
    }
}

/// apply a lump sum to a loan part-way through its schedule
///
/// The balance at the repayment date is the present value of the payments still
/// due. With [`RepaymentMode::ReduceTerm`] the payment is kept and the loan
/// shortened; with [`RepaymentMode::ReducePayment`] the end date is kept and the
/// payment lowered.
///
/// Callers skip loans that have matured by `repayment_year` and loans priced at
/// a zero rate; see [`simulate_for_quotes`].
pub fn simulate_early_repayment(inputs: &EarlyRepaymentInputs) -> EarlyRepaymentResult {
    let rate = inputs.monthly_rate;
    let payment = inputs.payment_excl_insurance;
    let remaining = inputs.remaining_months();

    let outstanding = annuity_present_value(payment, rate, remaining);
    let lump_sum = inputs.lump_sum.max(Money::ZERO).min(outstanding);
    let new_principal = (outstanding - lump_sum).max(Money::ZERO);

    let (new_term, new_payment) = if !new_principal.is_positive() {
        (0, Money::ZERO)
    } else {
        match inputs.mode {
            RepaymentMode::ReduceTerm => (
                months_to_repay(new_principal, rate, payment).unwrap_or(remaining),
                payment,
            ),
            RepaymentMode::ReducePayment => {
                (remaining, annuity_payment(new_principal, rate, remaining))
            }
        }
    };

    let original_interest = schedule_interest(payment, remaining, outstanding);
    let new_interest = schedule_interest(new_payment, new_term, new_principal);

    EarlyRepaymentResult {
        mode: inputs.mode,
        outstanding_principal_at_repayment: outstanding,
        lump_sum_applied: lump_sum,
        new_principal,
        original_remaining_term_months: remaining,
        new_remaining_term_months: new_term,
        original_monthly_payment: payment,
        new_monthly_payment: new_payment,
        // a rounded-up final month can outweigh a very small lump sum
        interest_saved: (original_interest - new_interest).max(Money::ZERO),
    }
}

/// whole months needed to repay `principal` with a level `payment`
///
/// Inverse of the annuity formula, rounded up. `None` when the payment does not
/// cover the first month's interest.
pub fn months_to_repay(principal: Money, monthly_rate: Decimal, payment: Money) -> Option<u32> {
    if !principal.is_positive() {
        return Some(0);
    }
    if !payment.is_positive() {
        return None;
    }

    if monthly_rate.is_zero() {
        return (principal.as_decimal() / payment.as_decimal()).ceil().to_u32();
    }

    let remaining_share = Decimal::ONE - principal.as_decimal() * monthly_rate / payment.as_decimal();
    if remaining_share <= Decimal::ZERO {
        return None;
    }

    let months = -remaining_share.ln() / (Decimal::ONE + monthly_rate).ln();
    // drop series noise so an exact month count does not round up
    months.round_dp(6).ceil().to_u32()
}

/// interest paid over a level schedule
fn schedule_interest(payment: Money, months: u32, principal: Money) -> Money {
    payment * Decimal::from(months) - principal
}

/// prepayment outcome for one term of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRepayment {
    pub term_years: u32,
    pub nominal_rate: Rate,
    pub result: EarlyRepaymentResult,
}

/// run the same prepayment over several quotes
///
/// Quotes whose term has ended by `repayment_year` are skipped, as are
/// zero-rate quotes.
pub fn simulate_for_quotes<'a, I>(
    quotes: I,
    repayment_year: u32,
    lump_sum: Money,
    mode: RepaymentMode,
) -> Vec<TermRepayment>
where
    I: IntoIterator<Item = &'a LoanQuote>,
{
    quotes
        .into_iter()
        .filter(|quote| !quote.nominal_rate.is_zero())
        .map(|quote| (quote, EarlyRepaymentInputs::from_quote(quote, repayment_year, lump_sum, mode)))
        .filter(|(_, inputs)| !inputs.is_matured())
        .map(|(quote, inputs)| TermRepayment {
            term_years: quote.term_years,
            nominal_rate: quote.nominal_rate,
            result: simulate_early_repayment(&inputs),
        })
        .collect()
}
