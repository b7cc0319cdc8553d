//! Retry-validated subprocess execution
//!
//! This crate runs an external command, inspects its combined stdout/stderr
//! text against a set of expected conditions, and retries with a fixed pause
//! until every condition holds or the attempt budget is exhausted. It knows
//! nothing about what the commands mean; callers supply the command, the
//! conditions, and the budget.

#![warn(missing_docs)]

pub mod command;
pub mod condition;
pub mod error;
pub mod validator;

pub use command::Command;
pub use condition::Expectation;
pub use error::{Error, Result};
pub use validator::{RetryPolicy, Validated, Validator};
