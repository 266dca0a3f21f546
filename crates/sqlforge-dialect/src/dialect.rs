//! Dialect profiles
//!
//! A [`Dialect`] is plain data: capability flags, the engine's null collation,
//! operator overrides and a few spelling choices. One generic renderer reads
//! it; there is no per-dialect rendering code.

use serde::{Deserialize, Serialize};
use sqlforge_ir::{CallNode, OperatorDescriptor, OperatorId, RexNode, SortKey, Direction, NullDirection};
use sqlforge_registry::{ids, OperatorTable};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::DialectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProduct {
    Ansi,
    Hive,
    Spark,
    MySql,
    PostgreSql,
    BigQuery,
}

impl DatabaseProduct {
    pub fn name(&self) -> &'static str {
        match self {
            DatabaseProduct::Ansi => "ansi",
            DatabaseProduct::Hive => "hive",
            DatabaseProduct::Spark => "spark",
            DatabaseProduct::MySql => "mysql",
            DatabaseProduct::PostgreSql => "postgresql",
            DatabaseProduct::BigQuery => "bigquery",
        }
    }
}

impl fmt::Display for DatabaseProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatabaseProduct {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ansi" | "calcite" => Ok(DatabaseProduct::Ansi),
            "hive" => Ok(DatabaseProduct::Hive),
            "spark" => Ok(DatabaseProduct::Spark),
            "mysql" => Ok(DatabaseProduct::MySql),
            "postgresql" | "postgres" => Ok(DatabaseProduct::PostgreSql),
            "bigquery" => Ok(DatabaseProduct::BigQuery),
            other => Err(DialectError::UnknownProduct(other.to_string())),
        }
    }
}

/// Where an engine puts NULLs when ORDER BY says nothing about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullCollation {
    /// Nulls first in both directions
    First,
    /// Nulls last in both directions
    Last,
    /// Nulls compare below every value
    Low,
    /// Nulls compare above every value
    High,
}

impl NullCollation {
    /// Whether the engine's default already yields the requested null placement.
    pub fn is_default_order(&self, nulls_first: bool, descending: bool) -> bool {
        let asc = !descending;
        let nulls_last = !nulls_first;
        match self {
            NullCollation::First => nulls_first,
            NullCollation::Last => nulls_last,
            NullCollation::Low => (asc && nulls_first) || (descending && nulls_last),
            NullCollation::High => (asc && nulls_last) || (descending && nulls_first),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// `ORDER BY x NULLS FIRST | NULLS LAST`
    NativeNullsOrdering,
    /// `OFFSET n ROWS FETCH NEXT m ROWS ONLY`
    NativeOffsetFetch,
    /// `SUBSTRING(s FROM p FOR l)`
    SubstringFromFor,
    /// Boolean expressions may be used directly as sort keys
    BooleanSortKeys,
    /// `expr AS alias` rather than `expr alias`
    AliasWithAs,
}

/// Spelling of TRIM accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimStyle {
    /// `TRIM(BOTH chars FROM source)`
    Standard,
    /// `TRIM(source)`, `LTRIM(source)`, `RTRIM(source)`; other characters
    /// through `REGEXP_REPLACE`
    FunctionCall,
    /// `TRIM(source, chars)`, `LTRIM(source, chars)`, `RTRIM(source, chars)`
    SourceThenChars,
}

/// Single-clause row limiting used when OFFSET/FETCH is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStyle {
    /// `LIMIT count OFFSET offset`
    LimitOffset,
    /// `LIMIT offset, count`
    LimitComma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DialectError::InvalidVersion(s.to_string());
        let mut parts = s.trim().splitn(3, '.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = match parts.next() {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 0,
        };
        Ok(Version::new(major, minor))
    }
}

/// A target engine's syntax and feature profile.
#[derive(Debug, Clone)]
pub struct Dialect {
    product: DatabaseProduct,
    version: Option<Version>,
    null_collation: NullCollation,
    features: BTreeSet<Feature>,
    overrides: HashMap<OperatorId, Arc<OperatorDescriptor>>,
    identifier_quote: Option<char>,
    trim_style: TrimStyle,
    limit_style: LimitStyle,
}

impl Dialect {
    pub fn builder(product: DatabaseProduct) -> DialectBuilder {
        DialectBuilder {
            dialect: Dialect {
                product,
                version: None,
                null_collation: NullCollation::High,
                features: BTreeSet::new(),
                overrides: HashMap::new(),
                identifier_quote: Some('"'),
                trim_style: TrimStyle::Standard,
                limit_style: LimitStyle::LimitOffset,
            },
        }
    }

    /// A builder seeded with this profile, for deriving variants of it.
    pub fn to_builder(&self) -> DialectBuilder {
        DialectBuilder { dialect: self.clone() }
    }

    pub fn product(&self) -> DatabaseProduct {
        self.product
    }

    pub fn version(&self) -> Option<Version> {
        self.version
    }

    pub fn null_collation(&self) -> NullCollation {
        self.null_collation
    }

    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied()
    }

    pub fn identifier_quote(&self) -> Option<char> {
        self.identifier_quote
    }

    pub fn trim_style(&self) -> TrimStyle {
        self.trim_style
    }

    pub fn limit_style(&self) -> LimitStyle {
        self.limit_style
    }

    /// The descriptor this dialect substitutes for the given logical operator.
    pub fn operator_override(&self, id: &OperatorId) -> Option<&Arc<OperatorDescriptor>> {
        self.overrides.get(id)
    }

    /// Synthesizes a sort key that forces NULLs to the requested end.
    ///
    /// Returns `None` when no rewrite is needed: the engine supports
    /// `NULLS FIRST/LAST` natively, its collation already puts NULLs where
    /// they were asked for, or `key` is itself a synthesized indicator.
    /// Otherwise the result is a 0/1 null indicator over `key`, to be sorted
    /// descending when `nulls_first` (ascending otherwise) ahead of `key`.
    pub fn emulate_null_ordering(&self, key: &RexNode, nulls_first: bool, descending: bool) -> Option<RexNode> {
        if self.has(Feature::NativeNullsOrdering) {
            return None;
        }
        if key.is_call_to(&OperatorId::new(ids::NULL_INDICATOR)) {
            return None;
        }
        if self.null_collation.is_default_order(nulls_first, descending) {
            return None;
        }

        let indicator = OperatorTable::standard().get(ids::NULL_INDICATOR)?;
        match CallNode::infer(indicator, vec![key.clone()]) {
            Ok(call) => {
                tracing::debug!(
                    dialect = %self.product,
                    nulls_first,
                    descending,
                    "emulating null direction with a null indicator"
                );
                Some(RexNode::Call(call))
            }
            Err(e) => {
                tracing::warn!(error = %e, "null indicator could not be built");
                None
            }
        }
    }

    /// Rewrites one sort key, `None` if it can be rendered as is.
    pub fn emulate_sort_key(&self, key: &SortKey) -> Option<Vec<SortKey>> {
        let nulls_first = match key.nulls {
            NullDirection::First => true,
            NullDirection::Last => false,
            NullDirection::Unspecified => return None,
        };
        let indicator = self.emulate_null_ordering(&key.expr, nulls_first, key.is_descending())?;
        let indicator_direction = if nulls_first { Direction::Desc } else { Direction::Asc };

        Some(vec![
            SortKey::new(indicator, indicator_direction, NullDirection::Unspecified),
            SortKey::new(key.expr.clone(), key.direction, NullDirection::Unspecified),
        ])
    }

    /// Rewrites a whole ORDER BY list so that every key is renderable here.
    ///
    /// Applying this to its own output returns the output unchanged.
    pub fn emulate_order_by(&self, keys: &[SortKey]) -> Vec<SortKey> {
        let native = self.has(Feature::NativeNullsOrdering);
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(rewritten) = self.emulate_sort_key(key) {
                out.extend(rewritten);
            } else if !native && key.nulls != NullDirection::Unspecified {
                // The collation already places nulls as requested; the
                // engine has no syntax to say so.
                out.push(SortKey::new(key.expr.clone(), key.direction, NullDirection::Unspecified));
            } else {
                out.push(key.clone());
            }
        }
        out
    }
}

pub struct DialectBuilder {
    dialect: Dialect,
}

impl DialectBuilder {
    pub fn version(mut self, version: Option<Version>) -> Self {
        self.dialect.version = version;
        self
    }

    pub fn null_collation(mut self, collation: NullCollation) -> Self {
        self.dialect.null_collation = collation;
        self
    }

    pub fn feature(mut self, feature: Feature) -> Self {
        self.dialect.features.insert(feature);
        self
    }

    pub fn features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        self.dialect.features.extend(features);
        self
    }

    pub fn override_operator(mut self, logical: &str, op: Arc<OperatorDescriptor>) -> Self {
        self.dialect.overrides.insert(OperatorId::new(logical), op);
        self
    }

    pub fn identifier_quote(mut self, quote: Option<char>) -> Self {
        self.dialect.identifier_quote = quote;
        self
    }

    pub fn trim_style(mut self, style: TrimStyle) -> Self {
        self.dialect.trim_style = style;
        self
    }

    pub fn limit_style(mut self, style: LimitStyle) -> Self {
        self.dialect.limit_style = style;
        self
    }

    pub fn build(self) -> Dialect {
        self.dialect
    }
}
