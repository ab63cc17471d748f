use hourglass_rs::{SafeTimeProvider, TimeSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::comparison::{ScenarioCache, ScenarioKey, ScenarioRow};
use crate::config::SimulatorConfig;
use crate::decimal::Money;
use crate::early_repayment::{simulate_for_quotes, RepaymentMode, TermRepayment};
use crate::errors::{Result, SimulatorError};
use crate::summary::{
    project_savings, summarize_financing, FinancingInputs, FinancingSummary, Household,
    HouseholdTotals, SavingsProjection,
};

/// everything shown for one property price and household
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub totals: HouseholdTotals,
    pub summary: FinancingSummary,
    pub projection: Option<SavingsProjection>,
    pub needs_loan: bool,
    /// one row per configured term; empty when no loan is needed
    pub scenarios: Vec<ScenarioRow>,
}

impl Evaluation {
    pub fn json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

/// financing simulator over a fixed configuration
pub struct FinancingSimulator {
    config: SimulatorConfig,
    time: SafeTimeProvider,
    cache: ScenarioCache,
}

impl FinancingSimulator {
    pub fn builder() -> SimulatorBuilder {
        SimulatorBuilder::new()
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn cache(&self) -> &ScenarioCache {
        &self.cache
    }

    /// summarise the purchase and, when a loan is needed, compare terms
    pub fn evaluate(&mut self, property_price: Money, household: &Household) -> Result<Evaluation> {
        if property_price < self.config.minimum_property_price {
            return Err(SimulatorError::PropertyPriceTooLow {
                minimum: self.config.minimum_property_price,
                provided: property_price,
            });
        }
        validate_household(household)?;

        let totals = household.totals();
        let summary = summarize_financing(&FinancingInputs {
            property_price,
            notary_fee_rate: self.config.notary_fee_rate,
            contribution_target_rate: self.config.contribution_target_rate,
            total_savings: totals.savings,
            monthly_savings_capacity: totals.monthly_savings,
        });
        let projection = project_savings(&summary, &self.time);

        debug!(
            price = %property_price,
            loan_amount = %summary.loan_amount,
            needs_loan = summary.needs_loan,
            "financing summarised"
        );

        let scenarios = if summary.needs_loan {
            self.cache.compare(ScenarioKey {
                loan_amount: summary.loan_amount,
                rates: self.config.rates_by_term.clone(),
                insurance_rate: self.config.insurance_rate,
                monthly_income: totals.monthly_income,
                policy: self.config.debt_ratio,
            })
        } else {
            Vec::new()
        };

        Ok(Evaluation {
            totals,
            summary,
            projection,
            needs_loan: summary.needs_loan,
            scenarios,
        })
    }

    /// apply one lump sum to every term of an evaluation still running in `repayment_year`
    pub fn early_repayment(
        &self,
        evaluation: &Evaluation,
        repayment_year: u32,
        lump_sum: Money,
        mode: RepaymentMode,
    ) -> Result<Vec<TermRepayment>> {
        if !evaluation.needs_loan {
            return Err(SimulatorError::LoanNotRequired);
        }
        if lump_sum.is_negative() {
            return Err(SimulatorError::InvalidAmount {
                field: "lump_sum",
                amount: lump_sum,
            });
        }

        let results = simulate_for_quotes(
            evaluation.scenarios.iter().map(|row| &row.quote),
            repayment_year,
            lump_sum,
            mode,
        );

        info!(
            repayment_year,
            lump_sum = %lump_sum,
            mode = ?mode,
            terms = results.len(),
            "early repayment simulated"
        );

        Ok(results)
    }
}

fn validate_household(household: &Household) -> Result<()> {
    for person in &household.members {
        for (field, amount) in [
            ("net_salary", person.net_salary),
            ("savings", person.savings),
            ("monthly_savings", person.monthly_savings),
        ] {
            if amount.is_negative() {
                return Err(SimulatorError::InvalidAmount { field, amount });
            }
        }
    }
    Ok(())
}

/// builder for simulators
pub struct SimulatorBuilder {
    config: Option<SimulatorConfig>,
    time_source: Option<TimeSource>,
}

impl SimulatorBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            time_source: None,
        }
    }

    pub fn config(mut self, config: SimulatorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// clock used for savings target dates; system time when unset
    pub fn time_source(mut self, source: TimeSource) -> Self {
        self.time_source = Some(source);
        self
    }

    pub fn build(self) -> Result<FinancingSimulator> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let source = self.time_source.unwrap_or(TimeSource::System);

        Ok(FinancingSimulator {
            config,
            time: SafeTimeProvider::new(source),
            cache: ScenarioCache::new(),
        })
    }
}

impl Default for SimulatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::Person;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn simulator() -> FinancingSimulator {
        FinancingSimulator::builder()
            .time_source(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()))
            .build()
            .unwrap()
    }

    fn household(salary: i64, savings: i64, monthly: i64) -> Household {
        Household::new().with_member(Person::new(
            Money::from_major(salary),
            Money::from_major(savings),
            Money::from_major(monthly),
        ))
    }

    #[test]
    fn test_price_below_minimum_rejected() {
        let mut sim = simulator();
        let result = sim.evaluate(Money::from_major(40_000), &household(2_000, 10_000, 0));

        assert!(matches!(result, Err(SimulatorError::PropertyPriceTooLow { .. })));
    }

    #[test]
    fn test_negative_household_amount_rejected() {
        let mut sim = simulator();
        let result = sim.evaluate(Money::from_major(200_000), &household(-1, 10_000, 0));

        assert!(matches!(
            result,
            Err(SimulatorError::InvalidAmount { field: "net_salary", .. })
        ));
    }

    #[test]
    fn test_no_scenarios_without_loan() {
        let mut sim = simulator();
        let evaluation = sim.evaluate(Money::from_major(100_000), &household(2_000, 90_000, 0)).unwrap();

        assert!(!evaluation.needs_loan);
        assert!(evaluation.scenarios.is_empty());
        assert!(sim.cache().is_empty());

        let repayment = sim.early_repayment(&evaluation, 5, Money::from_major(10_000), RepaymentMode::ReduceTerm);
        assert!(matches!(repayment, Err(SimulatorError::LoanNotRequired)));
    }

    #[test]
    fn test_repeated_evaluation_hits_cache() {
        let mut sim = simulator();
        let people = household(4_500, 35_000, 700);

        let first = sim.evaluate(Money::from_major(300_000), &people).unwrap();
        let second = sim.evaluate(Money::from_major(300_000), &people).unwrap();

        assert_eq!(first, second);
        assert_eq!(sim.cache().len(), 1);
        assert_eq!(sim.cache().hits(), 1);
    }

    #[test]
    fn test_negative_lump_sum_rejected() {
        let mut sim = simulator();
        let evaluation = sim.evaluate(Money::from_major(300_000), &household(4_500, 35_000, 700)).unwrap();

        let result = sim.early_repayment(&evaluation, 5, Money::from_major(-1), RepaymentMode::ReduceTerm);
        assert!(matches!(result, Err(SimulatorError::InvalidAmount { field: "lump_sum", .. })));
    }

    #[test]
    fn test_far_repayment_year_yields_no_terms() {
        let mut sim = simulator();
        let evaluation = sim.evaluate(Money::from_major(300_000), &household(4_500, 35_000, 700)).unwrap();

        let results = sim
            .early_repayment(&evaluation, 400_000_000, Money::from_major(10_000), RepaymentMode::ReduceTerm)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_projection_uses_household_monthly_savings() {
        let mut sim = simulator();
        let evaluation = sim.evaluate(Money::from_major(300_000), &household(4_500, 35_000, 1_000)).unwrap();

        assert_eq!(evaluation.summary.monthly_savings_capacity, Money::from_major(1_000));
        let projection = evaluation.projection.unwrap();
        assert_eq!(projection.whole_months(), 25);
    }

    #[test]
    fn test_unbounded_rates_rejected_at_build() {
        let mut config = SimulatorConfig::default();
        config.rates_by_term.set(25, crate::decimal::Rate::from_percentage(dec!(400)));
        assert!(FinancingSimulator::builder().config(config).build().is_err());

        let mut config = SimulatorConfig::default();
        config.rates_by_term.set(10_000, crate::decimal::Rate::from_percentage(dec!(3.16)));
        assert!(FinancingSimulator::builder().config(config).build().is_err());
    }

    #[test]
    fn test_steepest_allowed_config_evaluates() {
        let mut config = SimulatorConfig::default();
        config.rates_by_term = crate::config::RatesByTerm::new()
            .with_rate(crate::config::MAX_TERM_YEARS, crate::decimal::Rate::from_percentage(dec!(100)));
        let mut sim = FinancingSimulator::builder().config(config).build().unwrap();

        let evaluation = sim.evaluate(Money::from_major(300_000), &household(4_500, 35_000, 700)).unwrap();
        assert_eq!(evaluation.scenarios.len(), 1);
        assert!(!evaluation.scenarios[0].verdict.is_feasible());
    }

    #[test]
    fn test_invalid_config_rejected_at_build() {
        let mut config = SimulatorConfig::default();
        config.contribution_target_rate = crate::decimal::Rate::from_percentage(dec!(120));

        let result = FinancingSimulator::builder().config(config).build();
        assert!(result.is_err());
    }
}
