//! Volcano-style operators for query execution.
//!
//! Each operator implements the iterator model where rows are pulled
//! one at a time through the tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::error::{ExecuteError, ExecuteResult};
use super::eval::{Datum, Expression};
use super::generator::{Generator, ValuesGenerator};
use super::session::Session;

/// A row in the query execution pipeline.
pub type Row = BTreeMap<String, Value>;

/// Trait for all query operators.
pub trait Operator: Send {
    /// Get the next row, or None if exhausted.
    fn next_row(&mut self) -> ExecuteResult<Option<Row>>;

    /// Reset the operator to start over.
    fn reset(&mut self) -> ExecuteResult<()>;
}

/// Scan operator - yields rows held in memory.
pub struct ScanOperator {
    rows: Vec<Row>,
    position: usize,
}

impl ScanOperator {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, position: 0 }
    }
}

impl Operator for ScanOperator {
    fn next_row(&mut self) -> ExecuteResult<Option<Row>> {
        if self.position < self.rows.len() {
            let row = self.rows[self.position].clone();
            self.position += 1;
            Ok(Some(row))
        } else {
            Ok(None)
        }
    }

    fn reset(&mut self) -> ExecuteResult<()> {
        self.position = 0;
        Ok(())
    }
}

/// Generator operator - expands a generator-valued expression into rows.
///
/// For every input row the expression is evaluated once; each value the
/// resulting generator yields becomes an output row made of the input
/// columns plus `alias`. A NULL result yields no rows. JSON arrays are
/// expanded the same way.
pub struct GeneratorOperator {
    source: Box<dyn Operator>,
    expr: Arc<dyn Expression>,
    alias: String,
    session: Arc<Session>,
    current: Option<(Row, Box<dyn Generator>)>,
}

impl GeneratorOperator {
    pub fn new(
        source: Box<dyn Operator>,
        expr: Arc<dyn Expression>,
        alias: impl Into<String>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            source,
            expr,
            alias: alias.into(),
            session,
            current: None,
        }
    }

    fn close_current(&mut self) -> ExecuteResult<()> {
        if let Some((_, mut generator)) = self.current.take() {
            generator.close()?;
        }
        Ok(())
    }
}

impl Operator for GeneratorOperator {
    fn next_row(&mut self) -> ExecuteResult<Option<Row>> {
        loop {
            if let Some((row, generator)) = &mut self.current {
                match generator.next_value()? {
                    Some(value) => {
                        let mut out = row.clone();
                        out.insert(self.alias.clone(), value);
                        return Ok(Some(out));
                    }
                    None => {
                        self.close_current()?;
                        continue;
                    }
                }
            }

            let Some(row) = self.source.next_row()? else {
                return Ok(None);
            };

            let generator: Box<dyn Generator> = match self.expr.eval(&self.session, &row)? {
                Datum::Null => continue,
                Datum::Generator(generator) => generator,
                Datum::Value(Value::Array(items)) => Box::new(ValuesGenerator::new(items)),
                Datum::Value(other) => {
                    return Err(ExecuteError::TypeMismatch {
                        expected: "generator".to_string(),
                        actual: other.to_string(),
                    })
                }
            };
            self.current = Some((row, generator));
        }
    }

    fn reset(&mut self) -> ExecuteResult<()> {
        self.close_current()?;
        self.source.reset()
    }
}

impl Drop for GeneratorOperator {
    fn drop(&mut self) {
        if let Err(e) = self.close_current() {
            tracing::warn!(error = %e, "failed to close generator");
        }
    }
}
