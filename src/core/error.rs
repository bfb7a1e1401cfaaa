use thiserror::Error;

pub const MIN_MONTHLY_AMOUNT: u64 = 500;
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Rejected input at the edge of the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Minimum monthly investment is {min}, got {0}", min = MIN_MONTHLY_AMOUNT)]
    AmountBelowMinimum(i64),

    #[error("horizon must be at most {max} years, got {0}", max = MAX_HORIZON_YEARS)]
    HorizonTooLong(i64),

    #[error("stepUp must be a finite value >= 0, got {0}")]
    InvalidStepUp(f64),

    #[error("{name} must be a finite percentage, got {value}")]
    NonFiniteRate { name: &'static str, value: f64 },

    #[error("target must be a finite amount, got {0}")]
    NonFiniteTarget(f64),
}

pub type InputResult<T> = Result<T, InputError>;
