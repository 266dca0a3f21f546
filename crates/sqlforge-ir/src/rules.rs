//! Return-type and operand-type rules attached to operator descriptors
//!
//! These are declarative: the type-inference collaborator decides which rule
//! applies, the rules only say what the answer is for a given operand list.

use serde::{Deserialize, Serialize};

use crate::types::{SqlType, TypeName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnTypeRule {
    /// Fixed type, nullable if any operand is nullable (e.g. `BIGINT_NULLABLE`)
    Fixed(TypeName),
    /// Fixed type that is never null
    FixedNotNull(TypeName),
    /// Type of the first operand
    FirstOperand,
    /// Least restrictive numeric type of all operands
    LeastRestrictive,
    /// BOOLEAN, nullable if any operand is nullable
    Boolean,
    /// BOOLEAN NOT NULL (IS NULL and friends)
    BooleanNotNull,
}

impl ReturnTypeRule {
    pub fn infer(&self, operands: &[SqlType]) -> SqlType {
        let any_nullable = operands.iter().any(|t| t.nullable);
        match self {
            ReturnTypeRule::Fixed(name) => SqlType::new(*name, any_nullable),
            ReturnTypeRule::FixedNotNull(name) => SqlType::not_null(*name),
            ReturnTypeRule::FirstOperand => operands
                .first()
                .copied()
                .unwrap_or(SqlType::nullable(TypeName::Null)),
            ReturnTypeRule::LeastRestrictive => {
                let name = operands
                    .iter()
                    .map(|t| t.name)
                    .try_fold(None::<TypeName>, |acc, name| match acc {
                        None => Some(Some(name)),
                        Some(prev) => prev.promote(name).map(Some),
                    })
                    .flatten()
                    .unwrap_or(TypeName::Any);
                SqlType::new(name, any_nullable)
            }
            ReturnTypeRule::Boolean => SqlType::new(TypeName::Boolean, any_nullable),
            ReturnTypeRule::BooleanNotNull => SqlType::not_null(TypeName::Boolean),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperandTypeRule {
    Niladic,
    Any,
    Numeric,
    NumericOrInterval,
    /// numeric / numeric, interval / numeric
    Division,
    Comparable,
    Boolean,
    Character,
    /// flag symbol, trim characters, source string
    Trim,
    /// source string, start position, optional length
    Substring,
}

fn is_null(ty: &SqlType) -> bool {
    ty.name == TypeName::Null
}

fn numeric(ty: &SqlType) -> bool {
    ty.name.is_numeric() || is_null(ty)
}

fn character(ty: &SqlType) -> bool {
    ty.name.is_character() || is_null(ty)
}

impl OperandTypeRule {
    /// Whether the operand types satisfy this rule.
    pub fn check(&self, operands: &[SqlType]) -> bool {
        match self {
            OperandTypeRule::Niladic => operands.is_empty(),
            OperandTypeRule::Any => true,
            OperandTypeRule::Numeric => operands.iter().all(numeric),
            OperandTypeRule::NumericOrInterval => operands
                .iter()
                .all(|t| numeric(t) || t.name.is_interval()),
            OperandTypeRule::Division => match operands {
                [l, r] => (numeric(l) || l.name.is_interval()) && numeric(r),
                _ => false,
            },
            OperandTypeRule::Comparable => match operands {
                [l, r] => {
                    is_null(l)
                        || is_null(r)
                        || l.name == r.name
                        || l.name.promote(r.name).is_some()
                        || (l.name.is_character() && r.name.is_character())
                }
                _ => false,
            },
            OperandTypeRule::Boolean => operands
                .iter()
                .all(|t| t.name == TypeName::Boolean || is_null(t)),
            OperandTypeRule::Character => operands.iter().all(character),
            OperandTypeRule::Trim => match operands {
                [flag, chars, source] => {
                    flag.name == TypeName::Symbol && character(chars) && character(source)
                }
                _ => false,
            },
            OperandTypeRule::Substring => match operands {
                [source, start] => character(source) && start.name.is_integral(),
                [source, start, length] => {
                    character(source) && start.name.is_integral() && length.name.is_integral()
                }
                _ => false,
            },
        }
    }

    /// Whether the rule admits numeric or temporal (interval) operands only.
    pub fn accepts_numeric_or_temporal(&self) -> bool {
        matches!(
            self,
            OperandTypeRule::Numeric | OperandTypeRule::NumericOrInterval | OperandTypeRule::Division
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_bigint_ignores_operand_types() {
        let rule = ReturnTypeRule::Fixed(TypeName::BigInt);
        let ty = rule.infer(&[
            SqlType::not_null(TypeName::Double),
            SqlType::nullable(TypeName::Integer),
        ]);
        assert_eq!(ty, SqlType::nullable(TypeName::BigInt));

        let ty = rule.infer(&[
            SqlType::not_null(TypeName::Decimal { precision: 10, scale: 2 }),
            SqlType::not_null(TypeName::Integer),
        ]);
        assert_eq!(ty, SqlType::not_null(TypeName::BigInt));
    }

    #[test]
    fn test_least_restrictive() {
        let ty = ReturnTypeRule::LeastRestrictive.infer(&[
            SqlType::not_null(TypeName::Integer),
            SqlType::not_null(TypeName::Double),
        ]);
        assert_eq!(ty, SqlType::not_null(TypeName::Double));
    }

    #[test]
    fn test_division_operands() {
        let rule = OperandTypeRule::Division;
        assert!(rule.check(&[
            SqlType::not_null(TypeName::BigInt),
            SqlType::not_null(TypeName::Integer),
        ]));
        assert!(rule.check(&[
            SqlType::not_null(TypeName::IntervalDayTime),
            SqlType::not_null(TypeName::Integer),
        ]));
        assert!(!rule.check(&[
            SqlType::not_null(TypeName::Varchar),
            SqlType::not_null(TypeName::Integer),
        ]));
    }

    #[test]
    fn test_substring_operands() {
        let s = SqlType::not_null(TypeName::Varchar);
        let i = SqlType::not_null(TypeName::Integer);
        assert!(OperandTypeRule::Substring.check(&[s, i]));
        assert!(OperandTypeRule::Substring.check(&[s, i, i]));
        assert!(!OperandTypeRule::Substring.check(&[i, i]));
    }
}
