use chrono::{Datelike, Months, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::duration::MonthSpan;

/// one buyer's monthly figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Person {
    pub net_salary: Money,
    pub savings: Money,
    pub monthly_savings: Money,
}

impl Person {
    pub fn new(net_salary: Money, savings: Money, monthly_savings: Money) -> Self {
        Self {
            net_salary,
            savings,
            monthly_savings,
        }
    }
}

/// buyers financing the project together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Household {
    pub members: Vec<Person>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdTotals {
    pub monthly_income: Money,
    pub savings: Money,
    pub monthly_savings: Money,
}

impl Household {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, person: Person) -> Self {
        self.members.push(person);
        self
    }

    pub fn totals(&self) -> HouseholdTotals {
        HouseholdTotals {
            monthly_income: self.members.iter().map(|p| p.net_salary).sum(),
            savings: self.members.iter().map(|p| p.savings).sum(),
            monthly_savings: self.members.iter().map(|p| p.monthly_savings).sum(),
        }
    }
}

/// inputs of the headline financing figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancingInputs {
    pub property_price: Money,
    pub notary_fee_rate: Rate,
    pub contribution_target_rate: Rate,
    pub total_savings: Money,
    pub monthly_savings_capacity: Money,
}

/// headline figures of a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancingSummary {
    pub property_price: Money,
    pub total_project_cost: Money,
    pub notary_fees: Money,
    pub contribution_target: Money,
    /// larger of the target and the available savings
    pub contribution_used: Money,
    pub total_savings: Money,
    pub loan_amount: Money,
    pub needs_loan: bool,
    /// savings still missing to reach the target, zero when reached
    pub contribution_shortfall: Money,
    /// amount put aside each month towards the shortfall
    pub monthly_savings_capacity: Money,
}

pub fn summarize_financing(inputs: &FinancingInputs) -> FinancingSummary {
    let notary_fees = inputs.property_price.share(inputs.notary_fee_rate);
    let total_project_cost = inputs.property_price + notary_fees;
    let contribution_target = inputs.property_price.share(inputs.contribution_target_rate);
    let contribution_used = contribution_target.max(inputs.total_savings);
    let loan_amount = total_project_cost - contribution_used;

    FinancingSummary {
        property_price: inputs.property_price,
        total_project_cost,
        notary_fees,
        contribution_target,
        contribution_used,
        total_savings: inputs.total_savings,
        loan_amount,
        needs_loan: loan_amount > inputs.total_savings,
        contribution_shortfall: (contribution_target - inputs.total_savings).max(Money::ZERO),
        monthly_savings_capacity: inputs.monthly_savings_capacity,
    }
}

/// when the savings will reach the contribution target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsProjection {
    pub months_to_target: Decimal,
    pub span: MonthSpan,
    /// first day of the month the target is reached
    pub target_date: NaiveDate,
}

/// project the time needed to close the contribution shortfall
///
/// `None` when there is no shortfall, or when nothing is saved each month.
pub fn project_savings(summary: &FinancingSummary, time_provider: &SafeTimeProvider) -> Option<SavingsProjection> {
    if !summary.contribution_shortfall.is_positive() {
        return None;
    }

    let months_to_target = summary.contribution_shortfall.ratio_to(summary.monthly_savings_capacity)?;
    let span = MonthSpan::from_fractional_months(months_to_target);

    let today = time_provider.now().date_naive();
    let target_date = today
        .with_day(1)?
        .checked_add_months(Months::new(span.total_months()))?;

    Some(SavingsProjection {
        months_to_target,
        span,
        target_date,
    })
}

impl SavingsProjection {
    /// whole months, as used for the span and the target date
    pub fn whole_months(&self) -> u32 {
        self.months_to_target.trunc().to_u32().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn inputs(price: i64, savings: i64, monthly: i64) -> FinancingInputs {
        FinancingInputs {
            property_price: Money::from_major(price),
            notary_fee_rate: Rate::from_percentage(dec!(7.5)),
            contribution_target_rate: Rate::from_percentage(dec!(20)),
            total_savings: Money::from_major(savings),
            monthly_savings_capacity: Money::from_major(monthly),
        }
    }

    #[test]
    fn test_reference_summary() {
        let summary = summarize_financing(&inputs(300_000, 35_000, 700));

        assert_eq!(summary.total_project_cost, Money::from_major(322_500));
        assert_eq!(summary.notary_fees, Money::from_major(22_500));
        assert_eq!(summary.contribution_target, Money::from_major(60_000));
        assert_eq!(summary.contribution_used, Money::from_major(60_000));
        assert_eq!(summary.loan_amount, Money::from_major(262_500));
        assert!(summary.needs_loan);
        assert_eq!(summary.contribution_shortfall, Money::from_major(25_000));
    }

    #[test]
    fn test_savings_above_target_are_used() {
        let summary = summarize_financing(&inputs(100_000, 90_000, 0));

        assert_eq!(summary.contribution_used, Money::from_major(90_000));
        assert_eq!(summary.loan_amount, Money::from_major(17_500));
        assert!(!summary.needs_loan);
        assert_eq!(summary.contribution_shortfall, Money::ZERO);
    }

    #[test]
    fn test_projection_target_date() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 11, 15, 0, 0, 0).unwrap(),
        ));
        let summary = summarize_financing(&inputs(300_000, 35_000, 700));

        let projection = project_savings(&summary, &time).unwrap();

        // 25 000 / 700 = 35.71 months
        assert_eq!(projection.whole_months(), 35);
        assert_eq!(projection.span.to_string(), "2 ans et 11 mois");
        assert_eq!(projection.target_date, NaiveDate::from_ymd_opt(2027, 10, 1).unwrap());
    }

    #[test]
    fn test_projection_follows_input_capacity() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 11, 15, 0, 0, 0).unwrap(),
        ));
        let summary = summarize_financing(&inputs(300_000, 35_000, 1_000));
        assert_eq!(summary.monthly_savings_capacity, Money::from_major(1_000));

        let projection = project_savings(&summary, &time).unwrap();

        assert_eq!(projection.months_to_target, dec!(25));
        assert_eq!(projection.span.to_string(), "2 ans et 1 mois");
        assert_eq!(projection.target_date, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
    }

    #[test]
    fn test_projection_omitted_without_capacity() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
        let summary = summarize_financing(&inputs(300_000, 35_000, 0));

        assert!(project_savings(&summary, &time).is_none());
    }

    #[test]
    fn test_projection_omitted_without_shortfall() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
        let summary = summarize_financing(&inputs(100_000, 90_000, 500));

        assert!(project_savings(&summary, &time).is_none());
    }

    #[test]
    fn test_household_totals() {
        let household = Household::new()
            .with_member(Person::new(
                Money::from_major(2_000),
                Money::from_major(15_000),
                Money::from_major(700),
            ))
            .with_member(Person::new(Money::ZERO, Money::from_major(20_000), Money::ZERO));

        let totals = household.totals();
        assert_eq!(totals.monthly_income, Money::from_major(2_000));
        assert_eq!(totals.savings, Money::from_major(35_000));
        assert_eq!(totals.monthly_savings, Money::from_major(700));
    }
}
