pub mod libmcq;

pub use libmcq::eval::{evaluate_mcq, run, EvalConfig, EvalOutcome, EvalResult, EvalSummary};
pub use libmcq::model::{AnswerSource, ModelError};
pub use libmcq::parse::{option_to_number, parse_response, Choice};
pub use libmcq::Error;
