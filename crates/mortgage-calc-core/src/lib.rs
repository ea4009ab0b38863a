pub mod error;
pub mod format;
pub mod inputs;
pub mod payment;
pub mod session;
pub mod types;

#[cfg(feature = "schedule")]
pub mod schedule;

pub use error::MortgageError;
pub use inputs::{parse_amount, LoanField, LoanInputs};
pub use payment::{analyze_payment, calculate_payment, PaymentBreakdown};
pub use session::CalculatorSession;
pub use types::*;

/// Standard result type for all mortgage-calc operations
pub type MortgageResult<T> = Result<T, MortgageError>;
