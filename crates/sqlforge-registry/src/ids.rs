//! Identities of the standard operators

pub const OR: &str = "OR";
pub const AND: &str = "AND";
pub const NOT: &str = "NOT";

pub const IS_NULL: &str = "IS_NULL";
pub const IS_NOT_NULL: &str = "IS_NOT_NULL";

pub const EQUALS: &str = "EQUALS";
pub const NOT_EQUALS: &str = "NOT_EQUALS";
pub const LESS_THAN: &str = "LESS_THAN";
pub const LESS_THAN_OR_EQUAL: &str = "LESS_THAN_OR_EQUAL";
pub const GREATER_THAN: &str = "GREATER_THAN";
pub const GREATER_THAN_OR_EQUAL: &str = "GREATER_THAN_OR_EQUAL";

pub const PLUS: &str = "PLUS";
pub const MINUS: &str = "MINUS";
pub const TIMES: &str = "TIMES";
pub const DIVIDE: &str = "DIVIDE";
pub const MOD: &str = "MOD";
pub const UNARY_MINUS: &str = "UNARY_MINUS";
pub const DATETIME_DIVIDE: &str = "DATETIME_DIVIDE";

pub const TRIM: &str = "TRIM";
pub const SUBSTRING: &str = "SUBSTRING";
pub const UPPER: &str = "UPPER";
pub const LOWER: &str = "LOWER";
pub const CHAR_LENGTH: &str = "CHAR_LENGTH";

pub const ABS: &str = "ABS";
pub const PI: &str = "PI";

pub const NULL_INDICATOR: &str = "NULL_INDICATOR";
