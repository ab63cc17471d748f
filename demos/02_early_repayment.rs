/// early repayment - effect of a lump sum on each term
use home_financing_rs::{
    FinancingSimulator, Household, Money, MonthSpan, Person, RepaymentMode,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== early repayment example ===\n");

    let mut simulator = FinancingSimulator::builder().build()?;
    let household = Household::new().with_member(Person::new(
        Money::from_major(5_000),
        Money::from_major(40_000),
        Money::from_major(1_000),
    ));

    let evaluation = simulator.evaluate(Money::from_major(320_000), &household)?;
    let lump_sum = Money::from_major(25_000);

    for mode in [RepaymentMode::ReduceTerm, RepaymentMode::ReducePayment] {
        println!("{:?}: {} paid after 8 years", mode, lump_sum);

        for entry in simulator.early_repayment(&evaluation, 8, lump_sum, mode)? {
            let result = entry.result;
            println!(
                "  {} years: balance {} -> {}, remaining {}, payment {}, interest saved {}",
                entry.term_years,
                result.outstanding_principal_at_repayment.round_dp(0),
                result.new_principal.round_dp(0),
                MonthSpan::from_months(result.new_remaining_term_months),
                result.new_monthly_payment.round_dp(2),
                result.interest_saved.round_dp(0),
            );
        }
        println!();
    }

    Ok(())
}
