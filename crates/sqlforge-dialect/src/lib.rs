//! SQL dialects and push-down rendering
//!
//! Renders rex trees as SQL text for a target engine, rewriting constructs the
//! engine cannot express (TRIM variants, SUBSTRING forms, null ordering,
//! OFFSET/FETCH) into equivalents it can.

use thiserror::Error;

mod dialect;
pub mod profiles;
mod render;
mod writer;

pub use dialect::{
    DatabaseProduct, Dialect, DialectBuilder, Feature, LimitStyle, NullCollation, TrimStyle, Version,
};
pub use render::SqlRenderer;
pub use writer::{Frame, SqlWriter};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DialectError {
    #[error("Unknown database product: {0}")]
    UnknownProduct(String),

    #[error("Invalid dialect version: {0}")]
    InvalidVersion(String),
}

impl Dialect {
    pub fn renderer(&self) -> SqlRenderer<'_> {
        SqlRenderer::new(self)
    }
}
