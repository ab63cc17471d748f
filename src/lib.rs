pub mod comparison;
pub mod config;
pub mod decimal;
pub mod duration;
pub mod early_repayment;
pub mod errors;
pub mod pricing;
pub mod simulator;
pub mod summary;

// re-export key types
pub use comparison::{compare_scenarios, ScenarioCache, ScenarioKey, ScenarioRow, Verdict, DEFAULT_CACHE_CAPACITY};
pub use config::{DebtRatioPolicy, RatesByTerm, SimulatorConfig, TermRate};
pub use decimal::{Money, Rate};
pub use duration::MonthSpan;
pub use early_repayment::{
    simulate_early_repayment, simulate_for_quotes, EarlyRepaymentInputs, EarlyRepaymentResult,
    RepaymentMode, TermRepayment,
};
pub use errors::{Result, SimulatorError};
pub use pricing::{price_loan, LoanInputs, LoanQuote};
pub use simulator::{Evaluation, FinancingSimulator, SimulatorBuilder};
pub use summary::{
    project_savings, summarize_financing, FinancingInputs, FinancingSummary, Household,
    HouseholdTotals, Person, SavingsProjection,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
