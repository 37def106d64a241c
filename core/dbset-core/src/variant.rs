//! Variant — dynamically typed value box
//!
//! Every accessor is total: a source that cannot be converted yields the
//! destination type's zero value instead of an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;

/// Text form used for date-times (`rrrr-mm-dd hh24:mi:ss`).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single nullable value held by a row, param or macro.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    #[default]
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Bytes(Vec<u8>),
    /// Sequence value, used by list macros (`in (&ids)`).
    List(Vec<Variant>),
}

impl Variant {
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Variant::Bytes(value.into())
    }

    pub fn list<T: Into<Variant>>(values: impl IntoIterator<Item = T>) -> Self {
        Variant::List(values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Variant::Null)
    }

    pub fn is_not_null(&self) -> bool {
        !self.is_null()
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Variant::List(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Variant::Int8(_)
                | Variant::Int16(_)
                | Variant::Int32(_)
                | Variant::Int64(_)
                | Variant::UInt8(_)
                | Variant::UInt16(_)
                | Variant::UInt32(_)
                | Variant::UInt64(_)
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Variant::Float32(_) | Variant::Float64(_))
    }

    /// Short name of the held kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Variant::Null => "Null",
            Variant::Bool(_) => "Bool",
            Variant::Int8(_) => "Int8",
            Variant::Int16(_) => "Int16",
            Variant::Int32(_) => "Int32",
            Variant::Int64(_) => "Int64",
            Variant::UInt8(_) => "UInt8",
            Variant::UInt16(_) => "UInt16",
            Variant::UInt32(_) => "UInt32",
            Variant::UInt64(_) => "UInt64",
            Variant::Float32(_) => "Float32",
            Variant::Float64(_) => "Float64",
            Variant::Text(_) => "Text",
            Variant::DateTime(_) => "DateTime",
            Variant::Bytes(_) => "Bytes",
            Variant::List(_) => "List",
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Variant::Null | Variant::List(_) => 0,
            Variant::Bool(v) => i64::from(*v),
            Variant::Int8(v) => i64::from(*v),
            Variant::Int16(v) => i64::from(*v),
            Variant::Int32(v) => i64::from(*v),
            Variant::Int64(v) => *v,
            Variant::UInt8(v) => i64::from(*v),
            Variant::UInt16(v) => i64::from(*v),
            Variant::UInt32(v) => i64::from(*v),
            Variant::UInt64(v) => i64::try_from(*v).unwrap_or_default(),
            Variant::Float32(v) => *v as i64,
            Variant::Float64(v) => *v as i64,
            Variant::Text(s) => parse_int(s),
            Variant::DateTime(dt) => dt.and_utc().timestamp(),
            Variant::Bytes(b) => std::str::from_utf8(b).map(parse_int).unwrap_or_default(),
        }
    }

    pub fn as_i8(&self) -> i8 {
        i8::try_from(self.as_int()).unwrap_or_default()
    }

    pub fn as_i16(&self) -> i16 {
        i16::try_from(self.as_int()).unwrap_or_default()
    }

    pub fn as_i32(&self) -> i32 {
        i32::try_from(self.as_int()).unwrap_or_default()
    }

    pub fn as_i64(&self) -> i64 {
        self.as_int()
    }

    pub fn as_u64(&self) -> u64 {
        match self {
            Variant::UInt64(v) => *v,
            other => u64::try_from(other.as_int()).unwrap_or_default(),
        }
    }

    pub fn as_u32(&self) -> u32 {
        u32::try_from(self.as_u64()).unwrap_or_default()
    }

    pub fn as_u16(&self) -> u16 {
        u16::try_from(self.as_u64()).unwrap_or_default()
    }

    pub fn as_u8(&self) -> u8 {
        u8::try_from(self.as_u64()).unwrap_or_default()
    }

    pub fn as_float64(&self) -> f64 {
        match self {
            Variant::Null | Variant::List(_) => 0.0,
            Variant::Bool(v) => f64::from(u8::from(*v)),
            Variant::Float32(v) => f64::from(*v),
            Variant::Float64(v) => *v,
            Variant::UInt64(v) => *v as f64,
            Variant::Text(s) => parse_float(s),
            Variant::Bytes(b) => std::str::from_utf8(b).map(parse_float).unwrap_or_default(),
            other => other.as_int() as f64,
        }
    }

    pub fn as_float32(&self) -> f32 {
        self.as_float64() as f32
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Variant::Null => false,
            Variant::Bool(v) => *v,
            Variant::Float32(_) | Variant::Float64(_) => self.as_float64() != 0.0,
            Variant::Text(s) => parse_bool(s),
            Variant::Bytes(b) => !b.is_empty(),
            Variant::List(l) => !l.is_empty(),
            Variant::DateTime(_) => true,
            other => other.as_int() != 0,
        }
    }

    pub fn as_string(&self) -> String {
        match self {
            Variant::Null => String::new(),
            Variant::Bool(v) => v.to_string(),
            Variant::Int8(v) => v.to_string(),
            Variant::Int16(v) => v.to_string(),
            Variant::Int32(v) => v.to_string(),
            Variant::Int64(v) => v.to_string(),
            Variant::UInt8(v) => v.to_string(),
            Variant::UInt16(v) => v.to_string(),
            Variant::UInt32(v) => v.to_string(),
            Variant::UInt64(v) => v.to_string(),
            Variant::Float32(v) => v.to_string(),
            Variant::Float64(v) => v.to_string(),
            Variant::Text(s) => s.clone(),
            Variant::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Variant::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Variant::List(_) => self.join_list(),
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Variant::DateTime(dt) => Some(*dt),
            Variant::Text(s) => parse_datetime(s),
            Variant::Bytes(b) => std::str::from_utf8(b).ok().and_then(parse_datetime),
            Variant::Float32(_) | Variant::Float64(_) => {
                from_timestamp(self.as_float64().trunc() as i64)
            }
            v if v.is_integer() => from_timestamp(v.as_int()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            Variant::Bytes(b) => b.clone(),
            Variant::Null => Vec::new(),
            other => other.as_string().into_bytes(),
        }
    }

    /// The untyped value itself.
    pub fn as_value(&self) -> Variant {
        self.clone()
    }

    pub fn as_list(&self) -> Option<&[Variant]> {
        match self {
            Variant::List(l) => Some(l),
            _ => None,
        }
    }

    /// Comma-joined list with text elements single-quoted: `'x', 'y'` / `1, 2, 3`.
    /// Scalars render as a one-element list.
    pub fn join_list(&self) -> String {
        match self {
            Variant::List(items) => items
                .iter()
                .map(|item| match item {
                    Variant::Text(s) => format!("'{s}'"),
                    other => other.as_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            Variant::Text(s) => format!("'{s}'"),
            other => other.as_string(),
        }
    }

    /// Text spliced into SQL by a macro: lists are joined, scalars stringified.
    pub fn macro_text(&self) -> String {
        if self.is_list() {
            self.join_list()
        } else {
            self.as_string()
        }
    }

    /// SQL literal for diagnostic rendering of parameterized statements.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Variant::Null => "null".to_string(),
            Variant::Bool(v) => {
                if *v {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
            Variant::Float32(v) => format!("{v:.6}"),
            Variant::Float64(v) => format!("{v:.6}"),
            Variant::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Variant::DateTime(dt) => format!(
                "to_date('{}','rrrr-mm-dd hh24:mi:ss')",
                dt.format(DATETIME_FORMAT)
            ),
            Variant::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            Variant::List(items) => items
                .iter()
                .map(Variant::to_sql_literal)
                .collect::<Vec<_>>()
                .join(", "),
            other => other.as_string(),
        }
    }

    /// Equality used by `locate`: integers compare across widths, numerics
    /// compare by value, everything else must match kind and value.
    pub fn matches(&self, other: &Variant) -> bool {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => a == b,
            _ if self.is_numeric() && other.is_numeric() => {
                self.as_float64() == other.as_float64()
            }
            _ => self == other,
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            Variant::Int8(v) => Some(i128::from(*v)),
            Variant::Int16(v) => Some(i128::from(*v)),
            Variant::Int32(v) => Some(i128::from(*v)),
            Variant::Int64(v) => Some(i128::from(*v)),
            Variant::UInt8(v) => Some(i128::from(*v)),
            Variant::UInt16(v) => Some(i128::from(*v)),
            Variant::UInt32(v) => Some(i128::from(*v)),
            Variant::UInt64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }
}

fn parse_int(s: &str) -> i64 {
    let t = s.trim();
    t.parse::<i64>()
        .ok()
        .or_else(|| {
            t.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f as i64)
        })
        .unwrap_or_default()
}

fn parse_float(s: &str) -> f64 {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| !f.is_nan())
        .unwrap_or_default()
}

fn parse_bool(s: &str) -> bool {
    let t = s.trim().to_ascii_lowercase();
    match t.as_str() {
        "true" | "t" | "yes" | "y" | "on" => true,
        "false" | "f" | "no" | "n" | "off" | "" => false,
        _ => parse_float(&t) != 0.0,
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let t = s.trim();
    NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(t).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(t, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn from_timestamp(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Variant {
                fn from(value: $ty) -> Self {
                    Variant::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    String => Text,
    NaiveDateTime => DateTime,
}

impl From<isize> for Variant {
    fn from(value: isize) -> Self {
        Variant::Int64(value as i64)
    }
}

impl From<usize> for Variant {
    fn from(value: usize) -> Self {
        Variant::UInt64(value as u64)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::Text(value.to_string())
    }
}

impl From<&String> for Variant {
    fn from(value: &String) -> Self {
        Variant::Text(value.clone())
    }
}

impl From<&Variant> for Variant {
    fn from(value: &Variant) -> Self {
        value.clone()
    }
}

impl<T: Into<Variant>> From<Option<T>> for Variant {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Variant::Null,
        }
    }
}

impl<T: Into<Variant>> From<Vec<T>> for Variant {
    fn from(values: Vec<T>) -> Self {
        Variant::list(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_string_to_int() {
        assert_eq!(Variant::from("42").as_int(), 42);
        assert_eq!(Variant::from(" 7 ").as_i32(), 7);
        assert_eq!(Variant::from("3.9").as_int(), 3);
        assert_eq!(Variant::from("abc").as_int(), 0);
    }

    #[test]
    fn narrowing_overflow_yields_zero() {
        assert_eq!(Variant::Int64(300).as_i8(), 0);
        assert_eq!(Variant::Int64(100).as_i8(), 100);
        assert_eq!(Variant::Int64(-1).as_u64(), 0);
    }

    #[test]
    fn null_accessors_are_zero() {
        let v = Variant::Null;
        assert_eq!(v.as_int(), 0);
        assert_eq!(v.as_float64(), 0.0);
        assert_eq!(v.as_string(), "");
        assert!(!v.as_bool());
        assert!(v.as_datetime().is_none());
        assert!(v.is_null());
    }

    #[test]
    fn bool_conversions() {
        assert!(Variant::from("true").as_bool());
        assert!(Variant::from("Y").as_bool());
        assert!(Variant::from("1").as_bool());
        assert!(!Variant::from("0").as_bool());
        assert!(Variant::Int32(5).as_bool());
        assert_eq!(Variant::Bool(true).as_int(), 1);
    }

    #[test]
    fn float_conversions() {
        assert_eq!(Variant::from("2.5").as_float64(), 2.5);
        assert_eq!(Variant::Int16(3).as_float64(), 3.0);
        assert_eq!(Variant::Float64(2.0).as_string(), "2");
    }

    #[test]
    fn datetime_round_trip_through_text() {
        let v = Variant::from("2024-03-01 10:20:30");
        let dt = v.as_datetime().unwrap();
        assert_eq!(Variant::DateTime(dt).as_string(), "2024-03-01 10:20:30");
        assert!(Variant::from("2024-03-01").as_datetime().is_some());
        assert!(Variant::from("not a date").as_datetime().is_none());
    }

    #[test]
    fn join_list_quotes_text() {
        assert_eq!(Variant::from(vec![1, 2, 3]).join_list(), "1, 2, 3");
        assert_eq!(Variant::from(vec!["x", "y"]).join_list(), "'x', 'y'");
        assert_eq!(Variant::Int32(9).macro_text(), "9");
        assert_eq!(Variant::from("users").macro_text(), "users");
    }

    #[test]
    fn sql_literals() {
        assert_eq!(Variant::Null.to_sql_literal(), "null");
        assert_eq!(Variant::from("O'Brien").to_sql_literal(), "'O''Brien'");
        assert_eq!(Variant::Int64(10).to_sql_literal(), "10");
        assert_eq!(Variant::Float64(1.5).to_sql_literal(), "1.500000");
        assert_eq!(Variant::bytes(vec![0xAB, 0x01]).to_sql_literal(), "X'AB01'");
        let dt = Variant::from("2024-01-02 03:04:05").as_datetime().unwrap();
        assert_eq!(
            Variant::DateTime(dt).to_sql_literal(),
            "to_date('2024-01-02 03:04:05','rrrr-mm-dd hh24:mi:ss')"
        );
    }

    #[test]
    fn matches_across_integer_widths() {
        assert!(Variant::Int32(7).matches(&Variant::Int64(7)));
        assert!(Variant::UInt8(7).matches(&Variant::Int64(7)));
        assert!(Variant::Float64(7.0).matches(&Variant::Int32(7)));
        assert!(!Variant::from("7").matches(&Variant::Int32(7)));
        assert!(Variant::from("a").matches(&Variant::from("a")));
    }

    #[test]
    fn option_into_variant() {
        assert_eq!(Variant::from(None::<i32>), Variant::Null);
        assert_eq!(Variant::from(Some(3i32)), Variant::Int32(3));
    }
}
