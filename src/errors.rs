use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("property price too low: minimum {minimum}, provided {provided}")]
    PropertyPriceTooLow {
        minimum: Money,
        provided: Money,
    },

    #[error("invalid amount for {field}: {amount}")]
    InvalidAmount {
        field: &'static str,
        amount: Money,
    },

    #[error("no loan required: savings cover the project")]
    LoanNotRequired,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimulatorError>;
