//! Common types
//!
//! Small types used throughout the crate.

mod label;
mod register;
mod span;

pub use label::{Label, LabelGenerator};
pub use register::{Register, RegisterGenerator};
pub use span::{Span, Spanned};
