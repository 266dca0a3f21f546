//! Operand-count contracts

use serde::{Deserialize, Serialize};

use crate::IrError;

/// Describes how many operands an operator can take.
///
/// Each bound is `-1` when the range is open on that side. Fixed bounds are
/// never negative and never inverted: [`ArityRange::new`] reports a bad pair
/// as an error, the `const` constructors refuse one with a panic (a compile
/// error in const context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawArity")]
pub struct ArityRange {
    min: i32,
    max: i32,
}

#[derive(Deserialize)]
struct RawArity {
    min: i32,
    max: i32,
}

impl TryFrom<RawArity> for ArityRange {
    type Error = IrError;

    fn try_from(raw: RawArity) -> Result<Self, Self::Error> {
        ArityRange::new(raw.min, raw.max)
    }
}

impl ArityRange {
    pub fn new(min: i32, max: i32) -> Result<Self, IrError> {
        if min < -1 || max < -1 || (min >= 0 && max >= 0 && min > max) {
            return Err(IrError::InvalidArity { min, max });
        }
        Ok(Self { min, max })
    }

    pub const fn exactly(count: i32) -> Self {
        assert!(count >= 0, "operand count must not be negative");
        Self { min: count, max: count }
    }

    pub const fn between(min: i32, max: i32) -> Self {
        assert!(min >= 0 && min <= max, "arity bounds must satisfy 0 <= min <= max");
        Self { min, max }
    }

    pub const fn at_least(min: i32) -> Self {
        assert!(min >= 0, "lower arity bound must not be negative");
        Self { min, max: -1 }
    }

    pub const fn at_most(max: i32) -> Self {
        assert!(max >= 0, "upper arity bound must not be negative");
        Self { min: -1, max }
    }

    pub const fn unbounded() -> Self {
        Self { min: -1, max: -1 }
    }

    /// Returns whether `count` is a valid number of operands.
    pub fn is_valid_count(&self, count: usize) -> bool {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        (self.min < 0 || count >= i64::from(self.min))
            && (self.max < 0 || count <= i64::from(self.max))
    }

    /// Lower bound, -1 if there is none.
    pub fn lower_bound(&self) -> i32 {
        self.min
    }

    /// Upper bound, -1 if there is none.
    pub fn upper_bound(&self) -> i32 {
        self.max
    }
}
