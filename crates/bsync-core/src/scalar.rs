//! # Scalar Kinds: Leaf Value Families and Their Canonical Text
//!
//! A schema descriptor may declare that a node type is a scalar leaf of one
//! of eleven value families. This module defines the closed `ScalarKind`
//! enum, the typed input `ScalarValue`, and the single formatting path from
//! one to the other.
//!
//! ## Canonical Forms
//!
//! | Kind | Accepted value | Text |
//! |---|---|---|
//! | boolean | `Boolean` | `true` / `false` |
//! | integer | `Integer` | decimal digits |
//! | non-negative integer | `Integer` ≥ 0 | decimal digits |
//! | decimal | `Float` (finite) | fixed point, six fractional digits |
//! | float | `Float` | general form, six significant digits |
//! | string | `String` | unchanged |
//! | date | `Date` | `CCYY-MM-DD` |
//! | time | `Time` | `hh:mm:ss[.fff]` |
//! | date-time | `DateTime` / `ZonedDateTime` | `CCYY-MM-DDThh:mm:ss[.fff][±hh:mm]` |
//! | month-day | `Date` | `MM-DD` |
//! | year | `Integer` | `CCYY` |
//!
//! Formatting is write-only: nothing in bsync parses these strings back.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScalarError;
use crate::temporal;

/// Significant digits used by the general float form.
const FLOAT_SIGNIFICANT_DIGITS: usize = 6;

/// Fractional digits used by the fixed-point decimal form.
const DECIMAL_FRACTION_DIGITS: usize = 6;

/// The leaf value family a node type declares.
///
/// Descriptor data uses the XML Schema spellings (`xs:boolean`,
/// `xs:gMonthDay`, ...). `xs:int` is accepted as an alias of `xs:integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScalarKind {
    #[serde(rename = "xs:boolean")]
    Boolean,
    #[serde(rename = "xs:integer", alias = "xs:int")]
    Integer,
    #[serde(rename = "xs:nonNegativeInteger")]
    NonNegativeInteger,
    #[serde(rename = "xs:decimal")]
    Decimal,
    #[serde(rename = "xs:float")]
    Float,
    #[serde(rename = "xs:string")]
    String,
    #[serde(rename = "xs:date")]
    Date,
    #[serde(rename = "xs:time")]
    Time,
    #[serde(rename = "xs:dateTime")]
    DateTime,
    #[serde(rename = "xs:gMonthDay")]
    MonthDay,
    #[serde(rename = "xs:gYear")]
    Year,
}

impl ScalarKind {
    /// All kinds, in declaration order.
    pub const ALL: [ScalarKind; 11] = [
        ScalarKind::Boolean,
        ScalarKind::Integer,
        ScalarKind::NonNegativeInteger,
        ScalarKind::Decimal,
        ScalarKind::Float,
        ScalarKind::String,
        ScalarKind::Date,
        ScalarKind::Time,
        ScalarKind::DateTime,
        ScalarKind::MonthDay,
        ScalarKind::Year,
    ];

    /// The XML Schema built-in type name for this kind.
    pub fn xsd_name(&self) -> &'static str {
        match self {
            ScalarKind::Boolean => "xs:boolean",
            ScalarKind::Integer => "xs:integer",
            ScalarKind::NonNegativeInteger => "xs:nonNegativeInteger",
            ScalarKind::Decimal => "xs:decimal",
            ScalarKind::Float => "xs:float",
            ScalarKind::String => "xs:string",
            ScalarKind::Date => "xs:date",
            ScalarKind::Time => "xs:time",
            ScalarKind::DateTime => "xs:dateTime",
            ScalarKind::MonthDay => "xs:gMonthDay",
            ScalarKind::Year => "xs:gYear",
        }
    }

    /// Human-readable label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ScalarKind::Boolean => "boolean",
            ScalarKind::Integer => "integer",
            ScalarKind::NonNegativeInteger => "non-negative integer",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
            ScalarKind::Date => "date",
            ScalarKind::Time => "time",
            ScalarKind::DateTime => "date-time",
            ScalarKind::MonthDay => "month-day",
            ScalarKind::Year => "year",
        }
    }

    /// Returns true for kinds whose values are calendar or clock values.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ScalarKind::Date | ScalarKind::Time | ScalarKind::DateTime | ScalarKind::MonthDay
        )
    }

    /// Validate `value` against this kind and render its canonical text.
    ///
    /// # Errors
    ///
    /// Returns `ScalarError::TypeMismatch` if the value belongs to another
    /// family, and `ScalarError::OutOfRange` for negative non-negative
    /// integers and non-finite decimals.
    pub fn format(&self, value: &ScalarValue) -> Result<String, ScalarError> {
        match (self, value) {
            (ScalarKind::Boolean, ScalarValue::Boolean(b)) => {
                Ok(if *b { "true" } else { "false" }.to_string())
            }
            (ScalarKind::Integer, ScalarValue::Integer(i)) => Ok(i.to_string()),
            (ScalarKind::NonNegativeInteger, ScalarValue::Integer(i)) => {
                if *i < 0 {
                    Err(self.out_of_range(value))
                } else {
                    Ok(i.to_string())
                }
            }
            (ScalarKind::Decimal, ScalarValue::Float(f)) => {
                if f.is_finite() {
                    Ok(format!("{:.*}", DECIMAL_FRACTION_DIGITS, f))
                } else {
                    Err(self.out_of_range(value))
                }
            }
            (ScalarKind::Float, ScalarValue::Float(f)) => Ok(format_general(*f)),
            (ScalarKind::String, ScalarValue::String(s)) => Ok(s.clone()),
            (ScalarKind::Date, ScalarValue::Date(d)) => Ok(temporal::format_date(d)),
            (ScalarKind::Time, ScalarValue::Time(t)) => Ok(temporal::format_time(t)),
            (ScalarKind::DateTime, ScalarValue::DateTime(dt)) => {
                Ok(temporal::format_date_time(dt))
            }
            (ScalarKind::DateTime, ScalarValue::ZonedDateTime(dt)) => {
                Ok(temporal::format_zoned_date_time(dt))
            }
            (ScalarKind::MonthDay, ScalarValue::Date(d)) => Ok(temporal::format_month_day(d)),
            (ScalarKind::Year, ScalarValue::Integer(y)) => Ok(temporal::format_year(*y)),
            _ => Err(ScalarError::TypeMismatch {
                expected: *self,
                found: value.type_name(),
            }),
        }
    }

    fn out_of_range(&self, value: &ScalarValue) -> ScalarError {
        ScalarError::OutOfRange {
            kind: *self,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScalarKind {
    type Err = String;

    /// Parse either the XML Schema name (`xs:date`) or the label (`date`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "xs:int" {
            return Ok(ScalarKind::Integer);
        }
        ScalarKind::ALL
            .iter()
            .copied()
            .find(|k| k.xsd_name() == s || k.label() == s)
            .ok_or_else(|| format!("unknown scalar kind: {s:?}"))
    }
}

/// A typed value supplied to a scalar leaf at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    /// A date-time without offset, rendered without a zone designator.
    DateTime(NaiveDateTime),
    /// A date-time with a fixed UTC offset, rendered with `±hh:mm`.
    ZonedDateTime(DateTime<FixedOffset>),
}

impl ScalarValue {
    /// Runtime type name used in type-mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Boolean(_) => "boolean",
            ScalarValue::Integer(_) => "integer",
            ScalarValue::Float(_) => "float",
            ScalarValue::String(_) => "string",
            ScalarValue::Date(_) => "date",
            ScalarValue::Time(_) => "time",
            ScalarValue::DateTime(_) => "date-time",
            ScalarValue::ZonedDateTime(_) => "zoned date-time",
        }
    }

    /// Returns the string slice if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Boolean(b) => write!(f, "{b}"),
            ScalarValue::Integer(i) => write!(f, "{i}"),
            ScalarValue::Float(v) => write!(f, "{v}"),
            ScalarValue::String(s) => write!(f, "{s:?}"),
            ScalarValue::Date(d) => write!(f, "{d}"),
            ScalarValue::Time(t) => write!(f, "{t}"),
            ScalarValue::DateTime(dt) => write!(f, "{dt}"),
            ScalarValue::ZonedDateTime(dt) => write!(f, "{dt}"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Boolean(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Integer(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Integer(i64::from(v))
    }
}

impl From<u32> for ScalarValue {
    fn from(v: u32) -> Self {
        ScalarValue::Integer(i64::from(v))
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::String(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::String(v)
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(v: NaiveDate) -> Self {
        ScalarValue::Date(v)
    }
}

impl From<NaiveTime> for ScalarValue {
    fn from(v: NaiveTime) -> Self {
        ScalarValue::Time(v)
    }
}

impl From<NaiveDateTime> for ScalarValue {
    fn from(v: NaiveDateTime) -> Self {
        ScalarValue::DateTime(v)
    }
}

impl From<DateTime<FixedOffset>> for ScalarValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        ScalarValue::ZonedDateTime(v)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(v: DateTime<Utc>) -> Self {
        ScalarValue::ZonedDateTime(v.fixed_offset())
    }
}

/// Render a float in general notation with six significant digits.
///
/// Uses fixed notation when the decimal exponent is in `-4..6` and scientific
/// notation (`1.5E+07`) otherwise; trailing fractional zeros are dropped.
/// Non-finite values use the XML Schema lexical forms `INF`, `-INF`, `NaN`.
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to the significant digits first fixes the exponent, so
    // 999999.5 lands in scientific notation just like it would after rounding.
    let scientific = format!("{:.*e}", FLOAT_SIGNIFICANT_DIGITS - 1, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= FLOAT_SIGNIFICANT_DIGITS as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}E{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (FLOAT_SIGNIFICANT_DIGITS as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
