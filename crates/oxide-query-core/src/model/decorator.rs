//! Scalar function decorators.
//!
//! An expression carries an ordered list of decorators in application
//! order: the first one wraps the base text directly and the last one ends
//! up outermost.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CompileError;

/// Parameter keys read by the decorator renderer.
pub mod param {
    /// SUBSTRING start position (optional, defaults to 1).
    pub const START: &str = "start";
    /// SUBSTRING length, or CAST length.
    pub const LENGTH: &str = "length";
    /// COALESCE fallback expression list.
    pub const EXPRESSIONS: &str = "expressions";
    /// ROUND significant digits.
    pub const DIGITS: &str = "digits";
    /// DATEPART unit.
    pub const UNIT: &str = "unit";
    /// CAST target type.
    pub const TYPE: &str = "type";
    /// CAST precision.
    pub const PRECISION: &str = "precision";
    /// CAST scale.
    pub const SCALE: &str = "scale";
}

/// The kind of function a decorator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorKind {
    Lower,
    Upper,
    LTrim,
    RTrim,
    /// Trims both ends.
    Trim,
    Substring,
    Coalesce,
    /// Truncates a date-time to its date.
    Date,
    Length,
    Round,
    DatePart,
    Avg,
    Count,
    Max,
    Min,
    StdDev,
    Sum,
    Var,
    Cast,
}

impl DecoratorKind {
    /// Returns the name used in error messages.
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Lower => "LOWER",
            Self::Upper => "UPPER",
            Self::LTrim => "LTRIM",
            Self::RTrim => "RTRIM",
            Self::Trim => "TRIM",
            Self::Substring => "SUBSTRING",
            Self::Coalesce => "COALESCE",
            Self::Date => "DATE",
            Self::Length => "LEN",
            Self::Round => "ROUND",
            Self::DatePart => "DATEPART",
            Self::Avg => "AVG",
            Self::Count => "COUNT",
            Self::Max => "MAX",
            Self::Min => "MIN",
            Self::StdDev => "STDEV",
            Self::Sum => "SUM",
            Self::Var => "VAR",
            Self::Cast => "CAST",
        }
    }

    /// Returns `true` for aggregate functions.
    #[must_use]
    pub const fn is_aggregate(self) -> bool {
        matches!(
            self,
            Self::Avg | Self::Count | Self::Max | Self::Min | Self::StdDev | Self::Sum | Self::Var
        )
    }
}

/// Abstract scalar type a CAST can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastType {
    Boolean,
    Byte,
    Char,
    DateTime,
    Double,
    Decimal,
    Guid,
    Int16,
    Int32,
    Int64,
    Single,
    String,
}

impl CastType {
    /// Every cast type, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Boolean,
        Self::Byte,
        Self::Char,
        Self::DateTime,
        Self::Double,
        Self::Decimal,
        Self::Guid,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Single,
        Self::String,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::Char => "Char",
            Self::DateTime => "DateTime",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Guid => "Guid",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Single => "Single",
            Self::String => "String",
        }
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CastType {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cast| cast.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CompileError::InvalidDecoratorParameter {
                decorator: DecoratorKind::Cast.sql_name(),
                parameter: param::TYPE,
                reason: format!("unknown cast type '{s}'"),
            })
    }
}

/// A decorator parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoratorArg {
    Int(i64),
    Text(String),
    Cast(CastType),
}

impl fmt::Display for DecoratorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Cast(c) => write!(f, "{c}"),
        }
    }
}

/// One function wrapper with its named parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    /// Function kind.
    pub kind: DecoratorKind,
    /// Named parameters.
    pub params: BTreeMap<String, DecoratorArg>,
}

impl Decorator {
    /// Creates a decorator without parameters.
    #[must_use]
    pub const fn new(kind: DecoratorKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }

    /// Adds a named parameter.
    #[must_use]
    pub fn with(mut self, key: &str, arg: DecoratorArg) -> Self {
        self.params.insert(String::from(key), arg);
        self
    }

    /// Looks up a named parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&DecoratorArg> {
        self.params.get(key)
    }

    /// SUBSTRING; `start` defaults to the first character when absent.
    #[must_use]
    pub fn substring(start: Option<i64>, length: i64) -> Self {
        let decorator =
            Self::new(DecoratorKind::Substring).with(param::LENGTH, DecoratorArg::Int(length));
        match start {
            Some(start) => decorator.with(param::START, DecoratorArg::Int(start)),
            None => decorator,
        }
    }

    /// COALESCE with a raw fallback expression list.
    #[must_use]
    pub fn coalesce(expressions: &str) -> Self {
        Self::new(DecoratorKind::Coalesce).with(
            param::EXPRESSIONS,
            DecoratorArg::Text(String::from(expressions)),
        )
    }

    #[must_use]
    pub fn round(digits: i64) -> Self {
        Self::new(DecoratorKind::Round).with(param::DIGITS, DecoratorArg::Int(digits))
    }

    #[must_use]
    pub fn date_part(unit: &str) -> Self {
        Self::new(DecoratorKind::DatePart).with(param::UNIT, DecoratorArg::Text(String::from(unit)))
    }

    #[must_use]
    pub fn cast(cast: CastType) -> Self {
        Self::new(DecoratorKind::Cast).with(param::TYPE, DecoratorArg::Cast(cast))
    }

    #[must_use]
    pub fn cast_with_length(cast: CastType, length: u32) -> Self {
        Self::cast(cast).with(param::LENGTH, DecoratorArg::Int(i64::from(length)))
    }

    #[must_use]
    pub fn cast_with_precision(cast: CastType, precision: u8, scale: u8) -> Self {
        Self::cast(cast)
            .with(param::PRECISION, DecoratorArg::Int(i64::from(precision)))
            .with(param::SCALE, DecoratorArg::Int(i64::from(scale)))
    }
}

impl From<DecoratorKind> for Decorator {
    fn from(kind: DecoratorKind) -> Self {
        Self::new(kind)
    }
}
