/// quick start - minimal example to get started
use home_financing_rs::{FinancingSimulator, Household, Money, Person};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // default rates, notary fees and contribution target
    let mut simulator = FinancingSimulator::builder().build()?;

    let household = Household::new().with_member(Person::new(
        Money::from_major(3_200),
        Money::from_major(35_000),
        Money::from_major(700),
    ));

    let evaluation = simulator.evaluate(Money::from_major(300_000), &household)?;

    // print the full evaluation
    println!("{}", evaluation.json());

    Ok(())
}
