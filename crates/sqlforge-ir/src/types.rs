//! Type system for SQLForge IR
//!
//! Types are assigned upstream by the type-inference collaborator; this crate
//! only reads them.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeName {
    Boolean,

    // Exact numerics
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Decimal { precision: u8, scale: u8 },

    // Approximate numerics
    Real,
    Double,

    // Text
    Char,
    Varchar,

    // Temporal
    Date,
    Time,
    Timestamp,
    IntervalDayTime,
    IntervalYearMonth,

    // Special
    Null,
    /// Flag operands such as the BOTH/LEADING/TRAILING argument of TRIM
    Symbol,
    Any,
}

impl TypeName {
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            TypeName::TinyInt | TypeName::SmallInt | TypeName::Integer | TypeName::BigInt
        )
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, TypeName::Real | TypeName::Double)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integral() || self.is_approximate() || matches!(self, TypeName::Decimal { .. })
    }

    pub fn is_character(&self) -> bool {
        matches!(self, TypeName::Char | TypeName::Varchar)
    }

    pub fn is_datetime(&self) -> bool {
        matches!(self, TypeName::Date | TypeName::Time | TypeName::Timestamp)
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, TypeName::IntervalDayTime | TypeName::IntervalYearMonth)
    }

    /// Rank used by numeric promotion; wider types rank higher.
    fn numeric_rank(&self) -> Option<u8> {
        match self {
            TypeName::TinyInt => Some(1),
            TypeName::SmallInt => Some(2),
            TypeName::Integer => Some(3),
            TypeName::BigInt => Some(4),
            TypeName::Decimal { .. } => Some(5),
            TypeName::Real => Some(6),
            TypeName::Double => Some(7),
            _ => None,
        }
    }

    /// Least restrictive of two numeric types, `None` if either is not numeric.
    pub fn promote(self, other: TypeName) -> Option<TypeName> {
        let (a, b) = (self.numeric_rank()?, other.numeric_rank()?);
        match (self, other) {
            (
                TypeName::Decimal { precision: p1, scale: s1 },
                TypeName::Decimal { precision: p2, scale: s2 },
            ) => Some(TypeName::Decimal {
                precision: p1.max(p2),
                scale: s1.max(s2),
            }),
            _ if a >= b => Some(self),
            _ => Some(other),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Boolean => write!(f, "BOOLEAN"),
            TypeName::TinyInt => write!(f, "TINYINT"),
            TypeName::SmallInt => write!(f, "SMALLINT"),
            TypeName::Integer => write!(f, "INTEGER"),
            TypeName::BigInt => write!(f, "BIGINT"),
            TypeName::Decimal { precision, scale } => write!(f, "DECIMAL({}, {})", precision, scale),
            TypeName::Real => write!(f, "REAL"),
            TypeName::Double => write!(f, "DOUBLE"),
            TypeName::Char => write!(f, "CHAR"),
            TypeName::Varchar => write!(f, "VARCHAR"),
            TypeName::Date => write!(f, "DATE"),
            TypeName::Time => write!(f, "TIME"),
            TypeName::Timestamp => write!(f, "TIMESTAMP"),
            TypeName::IntervalDayTime => write!(f, "INTERVAL DAY TO SECOND"),
            TypeName::IntervalYearMonth => write!(f, "INTERVAL YEAR TO MONTH"),
            TypeName::Null => write!(f, "NULL"),
            TypeName::Symbol => write!(f, "SYMBOL"),
            TypeName::Any => write!(f, "ANY"),
        }
    }
}

/// A fully inferred SQL type: a type name plus nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SqlType {
    pub name: TypeName,
    #[serde(default)]
    pub nullable: bool,
}

impl SqlType {
    pub const fn new(name: TypeName, nullable: bool) -> Self {
        Self { name, nullable }
    }

    pub const fn not_null(name: TypeName) -> Self {
        Self::new(name, false)
    }

    pub const fn nullable(name: TypeName) -> Self {
        Self::new(name, true)
    }

    pub fn with_nullable(self, nullable: bool) -> Self {
        Self { nullable, ..self }
    }

    /// The type this value would have if forced into a nullable representation.
    pub fn nullify(self) -> Self {
        self.with_nullable(true)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} NOT NULL", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promote_numeric() {
        assert_eq!(TypeName::Integer.promote(TypeName::BigInt), Some(TypeName::BigInt));
        assert_eq!(TypeName::Double.promote(TypeName::Integer), Some(TypeName::Double));
        assert_eq!(TypeName::Varchar.promote(TypeName::Integer), None);
    }

    #[test]
    fn test_nullify_keeps_name() {
        let ty = SqlType::not_null(TypeName::Integer).nullify();
        assert_eq!(ty, SqlType::nullable(TypeName::Integer));
    }
}
