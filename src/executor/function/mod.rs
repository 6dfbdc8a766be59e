//! Built-in functions callable from queries.

mod blame;

pub use blame::{Blame, BlameGenerator, BlameLine};
