//! Tree to tree passes (stages one to six)

mod fold;
mod negate;
mod resolve;
mod returns;
mod split;
mod unscript;

pub use fold::fold;
pub use negate::eliminate_negation;
pub use resolve::resolve;
pub use returns::normalize_returns;
pub use split::split_declarations;
pub use unscript::{unscript, ENTRY_POINT};
