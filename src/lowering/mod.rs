//! Lowering
//!
//! Takes the desugared tree down to blocks of stack machine instructions (stages seven
//! to ten). The main interfaces are [lower_expressions], [lower_statements],
//! [group_blocks] and [link] followed by [relabel].

mod blocks;
mod expressions;
mod flow;
mod statements;

pub use blocks::group_blocks;
pub use expressions::{code, lower_expressions};
pub use flow::{link, relabel};
pub use statements::lower_statements;
