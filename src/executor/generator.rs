//! Pull-based value generators.
//!
//! An expression may evaluate to a generator instead of a single value. The
//! consumer pulls values one at a time and must call `close` when it is done,
//! whether or not the generator was exhausted.

use serde_json::Value;

use super::error::ExecuteResult;

/// A stateful cursor over values.
pub trait Generator: Send {
    /// Get the next value, or None if exhausted.
    fn next_value(&mut self) -> ExecuteResult<Option<Value>>;

    /// Release held resources. Calling it more than once is allowed.
    fn close(&mut self) -> ExecuteResult<()>;
}

/// Generator over values already in memory (e.g. a JSON array).
pub struct ValuesGenerator {
    values: std::vec::IntoIter<Value>,
}

impl ValuesGenerator {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }
}

impl Generator for ValuesGenerator {
    fn next_value(&mut self) -> ExecuteResult<Option<Value>> {
        Ok(self.values.next())
    }

    fn close(&mut self) -> ExecuteResult<()> {
        self.values = Vec::new().into_iter();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_generator() {
        let mut generator = ValuesGenerator::new(vec![json!(1), json!(2)]);
        assert_eq!(generator.next_value().unwrap(), Some(json!(1)));

        generator.close().unwrap();
        assert_eq!(generator.next_value().unwrap(), None);
        generator.close().unwrap();
    }
}
