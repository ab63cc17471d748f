use std::collections::{HashMap, VecDeque};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DebtRatioPolicy, RatesByTerm};
use crate::decimal::{Money, Rate};
use crate::pricing::{price_loan, LoanQuote};

/// feasibility of a scenario against the debt-ratio policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Feasible,
    /// between the soft and the hard limit
    Caution,
    /// above the hard limit; carries the missing monthly income
    Infeasible { salary_shortfall: Money },
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Feasible => "Feasible",
            Verdict::Caution => "Caution",
            Verdict::Infeasible { .. } => "High / infeasible",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Verdict::Feasible => "Feasible: the debt ratio is within the usual limits".to_string(),
            Verdict::Caution => {
                "Caution: the debt ratio is between the soft and the hard limit".to_string()
            }
            Verdict::Infeasible { salary_shortfall } => format!(
                "High / infeasible: {} more monthly income is needed",
                salary_shortfall.round_dp(0)
            ),
        }
    }

    pub fn is_feasible(&self) -> bool {
        !matches!(self, Verdict::Infeasible { .. })
    }
}

/// one line of the comparison table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRow {
    pub quote: LoanQuote,
    pub debt_ratio_pct: Decimal,
    pub verdict: Verdict,
}

/// debt ratio in percent; zero when there is no income to divide by
pub fn debt_ratio_pct(monthly_payment: Money, monthly_income: Money) -> Decimal {
    monthly_payment
        .ratio_to(monthly_income)
        .map(|ratio| ratio * Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

/// classify a debt ratio; both thresholds are exclusive
pub fn classify(
    debt_ratio_pct: Decimal,
    monthly_payment: Money,
    monthly_income: Money,
    policy: &DebtRatioPolicy,
) -> Verdict {
    if debt_ratio_pct > policy.max_pct {
        Verdict::Infeasible {
            salary_shortfall: policy.minimum_salary(monthly_payment) - monthly_income,
        }
    } else if debt_ratio_pct > policy.caution_pct {
        Verdict::Caution
    } else {
        Verdict::Feasible
    }
}

/// quote `loan_amount` for every term of `rates`, in the mapping's order
pub fn compare_scenarios(
    loan_amount: Money,
    rates: &RatesByTerm,
    insurance_rate: Rate,
    monthly_income: Money,
    policy: &DebtRatioPolicy,
) -> Vec<ScenarioRow> {
    rates
        .iter()
        .map(|entry| {
            let quote = price_loan(loan_amount, entry.rate, entry.term_years, insurance_rate);
            let payment = quote.monthly_payment_with_insurance;
            let ratio = debt_ratio_pct(payment, monthly_income);

            ScenarioRow {
                quote,
                debt_ratio_pct: ratio,
                verdict: classify(ratio, payment, monthly_income, policy),
            }
        })
        .collect()
}

/// full input tuple of `compare_scenarios`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScenarioKey {
    pub loan_amount: Money,
    pub rates: RatesByTerm,
    pub insurance_rate: Rate,
    pub monthly_income: Money,
    pub policy: DebtRatioPolicy,
}

/// entries kept by [`ScenarioCache::new`]
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// memoised comparison tables keyed by exact inputs
///
/// Holds at most `capacity` tables; the oldest one is evicted first.
#[derive(Debug)]
pub struct ScenarioCache {
    entries: HashMap<ScenarioKey, Vec<ScenarioRow>>,
    order: VecDeque<ScenarioKey>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl ScenarioCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// a capacity of zero is raised to one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn compare(&mut self, key: ScenarioKey) -> Vec<ScenarioRow> {
        if let Some(rows) = self.entries.get(&key) {
            self.hits += 1;
            debug!(loan_amount = %key.loan_amount, hits = self.hits, "scenario cache hit");
            return rows.clone();
        }

        self.misses += 1;
        debug!(loan_amount = %key.loan_amount, terms = key.rates.len(), "scenario cache miss");

        let rows = compare_scenarios(
            key.loan_amount,
            &key.rates,
            key.insurance_rate,
            key.monthly_income,
            &key.policy,
        );

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                debug!(loan_amount = %oldest.loan_amount, "scenario cache eviction");
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, rows.clone());
        rows
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl Default for ScenarioCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(35.0), "Caution")]
    #[case(dec!(35.01), "High / infeasible")]
    #[case(dec!(33.0), "Feasible")]
    #[case(dec!(33.01), "Caution")]
    #[case(dec!(0), "Feasible")]
    fn test_verdict_boundaries(#[case] ratio: Decimal, #[case] expected: &str) {
        let policy = DebtRatioPolicy::default();
        let verdict = classify(ratio, Money::from_major(1_000), Money::from_major(2_000), &policy);

        assert_eq!(verdict.label(), expected);
    }

    #[test]
    fn test_infeasible_carries_shortfall() {
        let policy = DebtRatioPolicy::default();
        let payment = Money::from_major(1_400);
        let income = Money::from_major(3_000);
        let ratio = debt_ratio_pct(payment, income);

        let verdict = classify(ratio, payment, income, &policy);
        assert_eq!(
            verdict,
            Verdict::Infeasible {
                salary_shortfall: Money::from_major(1_000)
            }
        );
        assert!(!verdict.is_feasible());
        assert!(verdict.message().contains("1000"));
    }

    #[test]
    fn test_zero_income_gives_zero_ratio() {
        assert_eq!(debt_ratio_pct(Money::from_major(900), Money::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_rows_follow_mapping_order() {
        let rates = RatesByTerm::new()
            .with_rate(25, Rate::from_percentage(dec!(3.28)))
            .with_rate(15, Rate::from_percentage(dec!(3.09)))
            .with_rate(20, Rate::from_percentage(dec!(3.16)));

        let rows = compare_scenarios(
            Money::from_major(262_500),
            &rates,
            Rate::from_percentage(dec!(0.34)),
            Money::from_major(4_500),
            &DebtRatioPolicy::default(),
        );

        let terms: Vec<u32> = rows.iter().map(|r| r.quote.term_years).collect();
        assert_eq!(terms, vec![25, 15, 20]);
    }

    #[test]
    fn test_verdicts_on_realistic_table() {
        let rows = compare_scenarios(
            Money::from_major(262_500),
            &RatesByTerm::default(),
            Rate::from_percentage(dec!(0.34)),
            Money::from_major(4_500),
            &DebtRatioPolicy::default(),
        );

        assert_eq!(rows.len(), 3);
        // 15 years is the most expensive monthly
        assert!(matches!(rows[0].verdict, Verdict::Infeasible { .. }));
        // 25 years stays under the soft limit
        assert_eq!(rows[2].verdict, Verdict::Feasible);
        assert!(rows[0].debt_ratio_pct > rows[1].debt_ratio_pct);
        assert!(rows[1].debt_ratio_pct > rows[2].debt_ratio_pct);
    }

    #[test]
    fn test_cache_returns_same_rows() {
        let mut cache = ScenarioCache::new();
        let key = ScenarioKey {
            loan_amount: Money::from_major(200_000),
            rates: RatesByTerm::default(),
            insurance_rate: Rate::from_percentage(dec!(0.34)),
            monthly_income: Money::from_major(4_000),
            policy: DebtRatioPolicy::default(),
        };

        let first = cache.compare(key.clone());
        let second = cache.compare(key.clone());

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);

        let other = ScenarioKey {
            monthly_income: Money::from_major(5_000),
            ..key
        };
        cache.compare(other);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_evicts_oldest_when_full() {
        let mut cache = ScenarioCache::with_capacity(2);
        let key = |income: i64| ScenarioKey {
            loan_amount: Money::from_major(200_000),
            rates: RatesByTerm::default(),
            insurance_rate: Rate::from_percentage(dec!(0.34)),
            monthly_income: Money::from_major(income),
            policy: DebtRatioPolicy::default(),
        };

        cache.compare(key(3_000));
        cache.compare(key(4_000));
        cache.compare(key(5_000));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.misses(), 3);

        // the newest entries survive, the first one was dropped
        cache.compare(key(5_000));
        assert_eq!(cache.hits(), 1);
        cache.compare(key(3_000));
        assert_eq!(cache.misses(), 4);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_default_cache_capacity() {
        assert_eq!(ScenarioCache::new().capacity(), DEFAULT_CACHE_CAPACITY);
        assert_eq!(ScenarioCache::with_capacity(0).capacity(), 1);
    }
}
