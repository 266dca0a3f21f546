//! Built-in dialect profiles

use sqlforge_ir::{ArityRange, IrError, OperandTypeRule, OperatorDescriptor, ReturnTypeRule, SqlKind, Syntax, TypeName};
use sqlforge_registry::ids;
use std::sync::{Arc, LazyLock};

use crate::dialect::{
    DatabaseProduct, Dialect, DialectBuilder, Feature, LimitStyle, NullCollation, TrimStyle, Version,
};

/// Hive got `NULLS FIRST` / `NULLS LAST` in 2.1.
const HIVE_NATIVE_NULLS: Version = Version::new(2, 1);

pub static ANSI: LazyLock<Dialect> = LazyLock::new(ansi);
pub static HIVE: LazyLock<Dialect> = LazyLock::new(|| hive_with(None));
pub static SPARK: LazyLock<Dialect> = LazyLock::new(spark);
pub static MYSQL: LazyLock<Dialect> = LazyLock::new(|| mysql_with(None));
pub static POSTGRESQL: LazyLock<Dialect> = LazyLock::new(postgresql);
pub static BIGQUERY: LazyLock<Dialect> = LazyLock::new(bigquery);

static PI_FUNCTION: LazyLock<Arc<OperatorDescriptor>> =
    LazyLock::new(|| Arc::new(pi_function().expect("PI() override descriptor is valid")));

/// `PI()`, for engines where PI is an ordinary function.
pub fn pi_function() -> Result<OperatorDescriptor, IrError> {
    OperatorDescriptor::builder("PI_FUNCTION", "PI", SqlKind::OtherFunction)
        .syntax(Syntax::Function)
        .returns(ReturnTypeRule::FixedNotNull(TypeName::Double))
        .operands(OperandTypeRule::Niladic)
        .arity(ArityRange::exactly(0))
        .build()
}

fn with_pi_function(builder: DialectBuilder) -> DialectBuilder {
    builder.override_operator(ids::PI, Arc::clone(&PI_FUNCTION))
}

pub fn ansi() -> Dialect {
    Dialect::builder(DatabaseProduct::Ansi)
        .null_collation(NullCollation::High)
        .features([
            Feature::NativeNullsOrdering,
            Feature::NativeOffsetFetch,
            Feature::SubstringFromFor,
            Feature::BooleanSortKeys,
            Feature::AliasWithAs,
        ])
        .build()
}

pub fn hive(major: u32, minor: u32) -> Dialect {
    hive_with(Some(Version::new(major, minor)))
}

/// Unknown versions are treated as pre-2.1.
fn hive_with(version: Option<Version>) -> Dialect {
    let mut builder = Dialect::builder(DatabaseProduct::Hive)
        .version(version)
        .null_collation(NullCollation::Low)
        .feature(Feature::BooleanSortKeys)
        .identifier_quote(Some('`'))
        .trim_style(TrimStyle::FunctionCall)
        .limit_style(LimitStyle::LimitComma);
    if version.is_some_and(|v| v >= HIVE_NATIVE_NULLS) {
        builder = builder.feature(Feature::NativeNullsOrdering);
    }
    with_pi_function(builder).build()
}

pub fn spark() -> Dialect {
    let builder = Dialect::builder(DatabaseProduct::Spark)
        .null_collation(NullCollation::Low)
        .features([Feature::NativeNullsOrdering, Feature::BooleanSortKeys, Feature::AliasWithAs])
        .identifier_quote(Some('`'))
        .trim_style(TrimStyle::FunctionCall)
        .limit_style(LimitStyle::LimitOffset);
    with_pi_function(builder).build()
}

pub fn mysql(major: u32, minor: u32) -> Dialect {
    mysql_with(Some(Version::new(major, minor)))
}

fn mysql_with(version: Option<Version>) -> Dialect {
    let builder = Dialect::builder(DatabaseProduct::MySql)
        .version(version)
        .null_collation(NullCollation::Low)
        .feature(Feature::AliasWithAs)
        .identifier_quote(Some('`'))
        .trim_style(TrimStyle::Standard)
        .limit_style(LimitStyle::LimitComma);
    with_pi_function(builder).build()
}

pub fn postgresql() -> Dialect {
    let builder = Dialect::builder(DatabaseProduct::PostgreSql)
        .null_collation(NullCollation::High)
        .features([
            Feature::NativeNullsOrdering,
            Feature::SubstringFromFor,
            Feature::BooleanSortKeys,
            Feature::AliasWithAs,
        ])
        .identifier_quote(Some('"'))
        .limit_style(LimitStyle::LimitOffset);
    with_pi_function(builder).build()
}

pub fn bigquery() -> Dialect {
    Dialect::builder(DatabaseProduct::BigQuery)
        .null_collation(NullCollation::Low)
        .features([Feature::NativeNullsOrdering, Feature::BooleanSortKeys, Feature::AliasWithAs])
        .identifier_quote(Some('`'))
        .trim_style(TrimStyle::SourceThenChars)
        .limit_style(LimitStyle::LimitOffset)
        .build()
}

impl Dialect {
    /// Default profile for a product, with the version applied where the
    /// profile depends on it.
    pub fn for_product(product: DatabaseProduct, version: Option<Version>) -> Dialect {
        match product {
            DatabaseProduct::Ansi => ansi(),
            DatabaseProduct::Hive => hive_with(version),
            DatabaseProduct::Spark => spark(),
            DatabaseProduct::MySql => mysql_with(version),
            DatabaseProduct::PostgreSql => postgresql(),
            DatabaseProduct::BigQuery => bigquery(),
        }
    }

    /// Shared, version-less profile for a product.
    pub fn standard(product: DatabaseProduct) -> &'static Dialect {
        match product {
            DatabaseProduct::Ansi => &ANSI,
            DatabaseProduct::Hive => &HIVE,
            DatabaseProduct::Spark => &SPARK,
            DatabaseProduct::MySql => &MYSQL,
            DatabaseProduct::PostgreSql => &POSTGRESQL,
            DatabaseProduct::BigQuery => &BIGQUERY,
        }
    }
}
