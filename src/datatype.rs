// used for timestamps of the date-like kinds
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
// used for decimal numbers
use bigdecimal::BigDecimal;
// used to check that numeric tokens are written in canonical form
use regex::Regex;
// used when values are rendered into a decode result
use serde::{Serialize, Serializer};

// used when parsing a token into a number
use std::str::FromStr;
// used to print out readable forms of a value
use std::fmt;

pub const DEFAULT_TEXT_LEN: usize = 255;
pub const LONG_TEXT_LEN: usize = 65535;
pub const ADDRESS_LEN: usize = 128;

lazy_static::lazy_static! {
    static ref INTEGER_TOKEN: Regex = Regex::new(r"^(0|-?[1-9][0-9]*)$").unwrap();
    static ref FLOAT_TOKEN: Regex =
        Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$").unwrap();
    static ref DECIMAL_TOKEN: Regex =
        Regex::new(r"^-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?$").unwrap();
    static ref YEAR_MONTH_TOKEN: Regex = Regex::new(r"^([0-9]{4})-([0-9]{2})$").unwrap();
    static ref YEAR_TOKEN: Regex = Regex::new(r"^[0-9]{4}$").unwrap();
}

// four digit years, the range RFC 3339 can render
const YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

const BOOLEAN_FALSE: [&str; 3] = ["0", "f", "false"];
const BOOLEAN_TRUE: [&str; 3] = ["1", "t", "true"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

// ------------- Primitive -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Number,
    String,
    Date,
    Structured,
}
impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Primitive::Boolean => write!(f, "boolean"),
            Primitive::Number => write!(f, "number"),
            Primitive::String => write!(f, "string"),
            Primitive::Date => write!(f, "date"),
            Primitive::Structured => write!(f, "structured"),
        }
    }
}

// ------------- Capabilities -------------
/// The capability flags that decide which filter keywords a type generates.
/// The absent-value capability lives on [`DataType`] since it carries a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities {
    pub enumerable: bool,
    pub fragmentable: bool,
    pub comparable: bool,
    pub searchable: bool,
}

// ------------- TypeKind -------------
/// Concrete kinds along with their bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeKind {
    Boolean,
    Integer { min: i64, max: i64 },
    Float { min: f64, max: f64 },
    Decimal,
    Text { max_len: usize },
    Date { date: bool, time: bool },
    Structured,
}
impl TypeKind {
    pub fn primitive(&self) -> Primitive {
        match self {
            TypeKind::Boolean => Primitive::Boolean,
            TypeKind::Integer { .. } | TypeKind::Float { .. } | TypeKind::Decimal => Primitive::Number,
            TypeKind::Text { .. } => Primitive::String,
            TypeKind::Date { .. } => Primitive::Date,
            TypeKind::Structured => Primitive::Structured,
        }
    }
    pub fn capabilities(&self) -> Capabilities {
        match self {
            TypeKind::Boolean => Capabilities {
                enumerable: true,
                ..Capabilities::default()
            },
            TypeKind::Integer { .. } | TypeKind::Float { .. } | TypeKind::Decimal => Capabilities {
                comparable: true,
                ..Capabilities::default()
            },
            TypeKind::Text { .. } => Capabilities {
                enumerable: true,
                fragmentable: true,
                searchable: true,
                ..Capabilities::default()
            },
            TypeKind::Date { .. } => Capabilities {
                comparable: true,
                searchable: true,
                ..Capabilities::default()
            },
            TypeKind::Structured => Capabilities::default(),
        }
    }
}

// ------------- Value -------------
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal(BigDecimal),
    String(String),
    Date(DateTime<Utc>),
    Structured(serde_json::Value),
}
impl Value {
    pub fn primitive(&self) -> Primitive {
        match self {
            Value::Boolean(_) => Primitive::Boolean,
            Value::Integer(_) | Value::Float(_) | Value::Decimal(_) => Primitive::Number,
            Value::String(_) => Primitive::String,
            Value::Date(_) => Primitive::Date,
            Value::Structured(_) => Primitive::Structured,
        }
    }
}
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Structured(j) => write!(f, "{}", j),
        }
    }
}
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            // arbitrary precision would be lost as a JSON number
            Value::Decimal(d) => serializer.serialize_str(&d.to_string()),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(_) => serializer.serialize_str(&self.to_string()),
            Value::Structured(j) => j.serialize(serializer),
        }
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}
impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Date(t)
    }
}

// ------------- DataType -------------
/// An immutable type descriptor, one per declared attribute type.
///
/// The name is the declared type name (`STRING`, `BIGINT`, `DATEONLY`, ...),
/// the kind fixes the primitive, the bounds and the capability flags.
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    name: &'static str,
    kind: TypeKind,
    capabilities: Capabilities,
    absent_value: Option<Value>,
}

impl DataType {
    pub fn new(name: &'static str, kind: TypeKind) -> Self {
        Self {
            name,
            kind,
            capabilities: kind.capabilities(),
            absent_value: None,
        }
    }
    pub fn boolean() -> Self {
        Self::new("BOOLEAN", TypeKind::Boolean)
    }
    pub fn integer(max: i64) -> Self {
        let max = max.checked_abs().unwrap_or(i64::MAX);
        Self::new("INTEGER", TypeKind::Integer { min: -max, max })
    }
    pub fn float(min: f64, max: f64) -> Self {
        Self::new("FLOAT", TypeKind::Float { min, max })
    }
    pub fn decimal() -> Self {
        Self::new("DECIMAL", TypeKind::Decimal)
    }
    pub fn string(max_len: usize) -> Self {
        Self::new("STRING", TypeKind::Text { max_len })
    }
    pub fn datetime() -> Self {
        Self::new("DATETIME", TypeKind::Date { date: true, time: true })
    }
    pub fn dateonly() -> Self {
        Self::new("DATEONLY", TypeKind::Date { date: true, time: false })
    }
    pub fn timeonly() -> Self {
        Self::new("TIMEONLY", TypeKind::Date { date: false, time: true })
    }
    pub fn json() -> Self {
        Self::new("JSON", TypeKind::Structured)
    }
    /// Declares the value that stands for "nothing here", which makes a
    /// `has` keyword legal for properties of this type. Returns `None` if
    /// the marker is not itself a valid value of the type.
    pub fn with_absent_value(mut self, value: Value) -> Option<Self> {
        if !self.is_valid(&value) {
            return None;
        }
        self.absent_value = Some(value);
        Some(self)
    }
    // capability flags are fixed per kind outside of tests
    #[cfg(test)]
    pub(crate) fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }
    pub fn primitive(&self) -> Primitive {
        self.kind.primitive()
    }
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
    pub fn is_enumerable(&self) -> bool {
        self.capabilities.enumerable
    }
    pub fn is_fragmentable(&self) -> bool {
        self.capabilities.fragmentable
    }
    pub fn is_comparable(&self) -> bool {
        self.capabilities.comparable
    }
    pub fn is_searchable(&self) -> bool {
        self.capabilities.searchable
    }
    pub fn absent_value(&self) -> Option<&Value> {
        self.absent_value.as_ref()
    }
    pub fn has_absent_value(&self) -> bool {
        self.absent_value.is_some()
    }
    pub fn is_absent(&self, value: &Value) -> bool {
        self.absent_value.as_ref() == Some(value)
    }
    pub fn default_value(&self) -> Value {
        match self.kind {
            TypeKind::Boolean => Value::Boolean(false),
            TypeKind::Integer { .. } => Value::Integer(0),
            TypeKind::Float { .. } => Value::Float(0.0),
            TypeKind::Decimal => Value::Decimal(BigDecimal::from(0)),
            TypeKind::Text { .. } => Value::String(String::new()),
            TypeKind::Date { date, time } => {
                let now = Utc::now();
                Value::Date(normalize_moment(&now, date, time).unwrap_or(now))
            }
            TypeKind::Structured => Value::Structured(serde_json::Value::Null),
        }
    }

    /// True iff the value has this type's kind and satisfies its bounds.
    pub fn is_valid(&self, value: &Value) -> bool {
        match (&self.kind, value) {
            (TypeKind::Boolean, Value::Boolean(_)) => true,
            (TypeKind::Integer { min, max }, Value::Integer(i)) => min <= i && i <= max,
            (TypeKind::Float { min, max }, Value::Float(x)) => x.is_finite() && *min <= *x && *x <= *max,
            (TypeKind::Decimal, Value::Decimal(_)) => true,
            (TypeKind::Text { max_len }, Value::String(s)) => s.chars().count() <= *max_len,
            (TypeKind::Date { date, time }, Value::Date(t)) => {
                YEARS.contains(&t.year()) && normalize_moment(t, *date, *time).as_ref() == Some(t)
            }
            (TypeKind::Structured, Value::Structured(_)) => true,
            _ => false,
        }
    }

    /// True iff the token converts losslessly into a valid value.
    pub fn is_valid_string(&self, token: &str) -> bool {
        self.from_string(token).is_some()
    }

    /// Converts a token into a value, `None` when `is_valid_string` does not hold.
    pub fn from_string(&self, token: &str) -> Option<Value> {
        let value = match self.kind {
            TypeKind::Boolean => {
                let lowered = token.to_lowercase();
                if BOOLEAN_FALSE.contains(&lowered.as_str()) {
                    Value::Boolean(false)
                } else if BOOLEAN_TRUE.contains(&lowered.as_str()) {
                    Value::Boolean(true)
                } else {
                    return None;
                }
            }
            TypeKind::Integer { .. } => {
                if !INTEGER_TOKEN.is_match(token) {
                    return None;
                }
                Value::Integer(i64::from_str(token).ok()?)
            }
            TypeKind::Float { .. } => {
                if !FLOAT_TOKEN.is_match(token) {
                    return None;
                }
                Value::Float(f64::from_str(token).ok()?)
            }
            TypeKind::Decimal => {
                if !DECIMAL_TOKEN.is_match(token) {
                    return None;
                }
                Value::Decimal(BigDecimal::from_str(token).ok()?)
            }
            TypeKind::Text { .. } => Value::String(token.to_owned()),
            TypeKind::Date { date, time } => {
                let moment = if date {
                    parse_timestamp(token)?
                } else {
                    parse_time_of_day(token).or_else(|| parse_timestamp(token))?
                };
                Value::Date(normalize_moment(&moment, date, time)?)
            }
            TypeKind::Structured => Value::Structured(serde_json::from_str(token).ok()?),
        };
        if self.is_valid(&value) { Some(value) } else { None }
    }

    /// Renders a value as a token; the inverse of `from_string` for the values it produces.
    pub fn to_token(&self, value: &Value) -> String {
        match (&self.kind, value) {
            (TypeKind::Date { date: true, time: false }, Value::Date(t)) => t.format("%Y-%m-%d").to_string(),
            (TypeKind::Date { date: false, time: true }, Value::Date(t)) => t.format("%H:%M:%S%.f").to_string(),
            _ => value.to_string(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.declaration())
    }
}

// ------------- Time parsing -------------
fn epoch_day() -> NaiveDate {
    NaiveDate::default()
}

/// Accepts RFC 3339, naive date times, dates, year-months and years (all UTC).
pub fn parse_timestamp(token: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(token) {
        return Some(t.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(token, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    let day = if let Ok(day) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        day
    } else if let Some(captures) = YEAR_MONTH_TOKEN.captures(token) {
        let year = captures[1].parse::<i32>().ok()?;
        let month = captures[2].parse::<u32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, 1)?
    } else if YEAR_TOKEN.is_match(token) {
        NaiveDate::from_ymd_opt(token.parse::<i32>().ok()?, 1, 1)?
    } else {
        return None;
    };
    Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?))
}

fn parse_time_of_day(token: &str) -> Option<DateTime<Utc>> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(token, format).ok())
        .map(|time| Utc.from_utc_datetime(&epoch_day().and_time(time)))
}

// Date-only moments sit at midnight, time-only moments on the epoch day.
fn normalize_moment(moment: &DateTime<Utc>, date: bool, time: bool) -> Option<DateTime<Utc>> {
    match (date, time) {
        (true, false) => Some(Utc.from_utc_datetime(&moment.date_naive().and_hms_opt(0, 0, 0)?)),
        (false, true) => Some(Utc.from_utc_datetime(&epoch_day().and_time(moment.time()))),
        _ => Some(*moment),
    }
}
