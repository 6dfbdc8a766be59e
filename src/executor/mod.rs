//! Expression evaluation and row operators.
//!
//! Uses the Volcano/Iterator model where each operator produces
//! rows one at a time. Expressions may evaluate to generators, which
//! `GeneratorOperator` expands into one row per generated value.

mod error;
mod eval;
mod function;
mod generator;
mod operators;
mod session;
mod types;

pub use error::{ExecuteError, ExecuteResult};
pub use eval::{check_arity, eval_to_string, value_to_string, BindVar, Column, Datum, Expression, Literal};
pub use function::{Blame, BlameGenerator, BlameLine};
pub use generator::{Generator, ValuesGenerator};
pub use operators::{GeneratorOperator, Operator, Row, ScanOperator};
pub use session::{Session, Warning};
pub use types::DataType;
