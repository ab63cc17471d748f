/// compare terms - one loan quoted over several durations
use home_financing_rs::{
    FinancingSimulator, Household, Money, Person, Rate, SimulatorConfig, TimeSource,
};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    println!("=== term comparison example ===\n");

    let mut config = SimulatorConfig::default();
    config.rates_by_term.set(10, Rate::from_percentage(dec!(2.95)));

    let mut simulator = FinancingSimulator::builder()
        .config(config)
        .time_source(TimeSource::System)
        .build()?;

    let household = Household::new()
        .with_member(Person::new(Money::from_major(2_000), Money::from_major(15_000), Money::from_major(700)))
        .with_member(Person::new(Money::from_major(2_400), Money::from_major(20_000), Money::ZERO));

    let evaluation = simulator.evaluate(Money::from_major(280_000), &household)?;
    let summary = &evaluation.summary;

    println!("total project cost: {} (notary fees {})", summary.total_project_cost.round_dp(0), summary.notary_fees.round_dp(0));
    println!("contribution used:  {}", summary.contribution_used.round_dp(0));
    println!("amount to borrow:   {}", summary.loan_amount.round_dp(0));

    if let Some(projection) = &evaluation.projection {
        println!("target contribution reached in {} ({})", projection.span, projection.target_date.format("%m/%Y"));
    }

    if !evaluation.needs_loan {
        println!("\nsavings cover the project, no loan needed");
        return Ok(());
    }

    println!("\n{:>6} {:>7} {:>12} {:>12} {:>8}  verdict", "years", "rate", "payment", "cost", "ratio");
    for row in &evaluation.scenarios {
        println!(
            "{:>6} {:>7} {:>12} {:>12} {:>7}%  {}",
            row.quote.term_years,
            row.quote.nominal_rate.to_string(),
            row.quote.monthly_payment_with_insurance.round_dp(2),
            row.quote.total_credit_cost.round_dp(0),
            row.debt_ratio_pct.round_dp(1),
            row.verdict.message(),
        );
    }

    // same inputs again come from the cache
    simulator.evaluate(Money::from_major(280_000), &household)?;
    println!("\ncache hits: {}", simulator.cache().hits());

    Ok(())
}
