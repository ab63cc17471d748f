use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{Result, SimulatorError};

/// longest loan term a configuration may quote
pub const MAX_TERM_YEARS: u32 = 50;

/// highest nominal annual rate a configuration may quote, in percent
pub const MAX_NOMINAL_RATE_PCT: Decimal = dec!(100);

/// simulator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub notary_fee_rate: Rate,
    pub contribution_target_rate: Rate,
    pub insurance_rate: Rate,
    pub rates_by_term: RatesByTerm,
    pub debt_ratio: DebtRatioPolicy,
    pub minimum_property_price: Money,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            notary_fee_rate: Rate::from_percentage(dec!(7.5)),
            contribution_target_rate: Rate::from_percentage(dec!(20)),
            insurance_rate: Rate::from_percentage(dec!(0.34)),
            rates_by_term: RatesByTerm::default(),
            debt_ratio: DebtRatioPolicy::default(),
            minimum_property_price: Money::from_major(50_000),
        }
    }
}

impl SimulatorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// check every rate sits in the range the input form allows
    pub fn validate(&self) -> Result<()> {
        check_range("notary_fee_rate", self.notary_fee_rate, dec!(0), dec!(15))?;
        check_range("contribution_target_rate", self.contribution_target_rate, dec!(0), dec!(100))?;
        check_range("insurance_rate", self.insurance_rate, dec!(0), dec!(2))?;

        if self.rates_by_term.is_empty() {
            return Err(SimulatorError::InvalidConfiguration {
                message: "at least one loan term is required".to_string(),
            });
        }

        for entry in self.rates_by_term.iter() {
            if entry.term_years == 0 || entry.term_years > MAX_TERM_YEARS {
                return Err(SimulatorError::InvalidConfiguration {
                    message: format!(
                        "loan term must be between 1 and {} years, got {}",
                        MAX_TERM_YEARS, entry.term_years
                    ),
                });
            }
            check_range("nominal rate", entry.rate, Decimal::ZERO, MAX_NOMINAL_RATE_PCT)?;
        }

        self.debt_ratio.validate()?;

        if self.minimum_property_price.is_negative() {
            return Err(SimulatorError::InvalidConfiguration {
                message: format!("negative minimum property price: {}", self.minimum_property_price),
            });
        }

        Ok(())
    }
}

fn check_range(name: &str, rate: Rate, min_pct: Decimal, max_pct: Decimal) -> Result<()> {
    let pct = rate.as_percentage();
    if pct < min_pct || pct > max_pct {
        return Err(SimulatorError::InvalidConfiguration {
            message: format!("{} must be between {}% and {}%, got {}", name, min_pct, max_pct, rate),
        });
    }
    Ok(())
}

/// nominal rate offered for one loan term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermRate {
    pub term_years: u32,
    pub rate: Rate,
}

/// ordered mapping from term (years) to nominal rate; insertion order is kept
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatesByTerm(Vec<TermRate>);

impl RatesByTerm {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// add or replace the rate of a term; a replaced term keeps its position
    pub fn with_rate(mut self, term_years: u32, rate: Rate) -> Self {
        self.set(term_years, rate);
        self
    }

    pub fn set(&mut self, term_years: u32, rate: Rate) {
        match self.0.iter_mut().find(|entry| entry.term_years == term_years) {
            Some(entry) => entry.rate = rate,
            None => self.0.push(TermRate { term_years, rate }),
        }
    }

    pub fn rate_for(&self, term_years: u32) -> Option<Rate> {
        self.0
            .iter()
            .find(|entry| entry.term_years == term_years)
            .map(|entry| entry.rate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TermRate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for RatesByTerm {
    /// market rates excluding insurance for 15, 20 and 25 years
    fn default() -> Self {
        RatesByTerm::new()
            .with_rate(15, Rate::from_percentage(dec!(3.09)))
            .with_rate(20, Rate::from_percentage(dec!(3.16)))
            .with_rate(25, Rate::from_percentage(dec!(3.28)))
    }
}

/// debt-ratio thresholds, in percent of monthly income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebtRatioPolicy {
    /// soft limit; above it the scenario needs caution
    pub caution_pct: Decimal,
    /// hard limit; above it the scenario is not financeable
    pub max_pct: Decimal,
}

impl Default for DebtRatioPolicy {
    fn default() -> Self {
        Self {
            caution_pct: dec!(33),
            max_pct: dec!(35),
        }
    }
}

impl DebtRatioPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.caution_pct <= Decimal::ZERO || self.max_pct <= Decimal::ZERO {
            return Err(SimulatorError::InvalidConfiguration {
                message: "debt ratio thresholds must be positive".to_string(),
            });
        }
        if self.caution_pct > self.max_pct {
            return Err(SimulatorError::InvalidConfiguration {
                message: format!(
                    "caution threshold {}% above maximum {}%",
                    self.caution_pct, self.max_pct
                ),
            });
        }
        Ok(())
    }

    /// income needed so that `monthly_payment` stays at the maximum ratio
    pub fn minimum_salary(&self, monthly_payment: Money) -> Money {
        monthly_payment / (self.max_pct / Decimal::ONE_HUNDRED)
    }
}
