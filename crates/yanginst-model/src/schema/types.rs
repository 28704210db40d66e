//! Leaf types and scalar checks.

use regex::Regex;
use serde_json::Value;

/// Inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: T) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Built-in integer families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntBase {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl IntBase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            _ => return None,
        })
    }

    pub fn bounds(self) -> Bounds<i128> {
        match self {
            Self::Int8 => Bounds::new(i8::MIN as i128, i8::MAX as i128),
            Self::Int16 => Bounds::new(i16::MIN as i128, i16::MAX as i128),
            Self::Int32 => Bounds::new(i32::MIN as i128, i32::MAX as i128),
            Self::Int64 => Bounds::new(i64::MIN as i128, i64::MAX as i128),
            Self::Uint8 => Bounds::new(0, u8::MAX as i128),
            Self::Uint16 => Bounds::new(0, u16::MAX as i128),
            Self::Uint32 => Bounds::new(0, u32::MAX as i128),
            Self::Uint64 => Bounds::new(0, u64::MAX as i128),
        }
    }

    /// 64-bit values are encoded as JSON strings.
    pub fn is_wide(self) -> bool {
        matches!(self, Self::Int64 | Self::Uint64)
    }
}

/// A compiled `pattern` restriction. Matches the whole value.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeafType {
    String {
        length: Option<Bounds<u64>>,
        pattern: Option<Pattern>,
    },
    Boolean,
    Integer {
        base: IntBase,
        range: Option<Bounds<i128>>,
    },
    Decimal64 {
        fraction_digits: u8,
        range: Option<Bounds<f64>>,
    },
    Enumeration {
        names: Vec<String>,
    },
    Leafref {
        path: Vec<String>,
        require_instance: bool,
    },
}

impl LeafType {
    pub fn string() -> Self {
        LeafType::String {
            length: None,
            pattern: None,
        }
    }

    pub fn boolean() -> Self {
        LeafType::Boolean
    }

    pub fn integer(base: IntBase) -> Self {
        LeafType::Integer { base, range: None }
    }

    pub fn int32() -> Self {
        Self::integer(IntBase::Int32)
    }

    pub fn uint16() -> Self {
        Self::integer(IntBase::Uint16)
    }

    pub fn decimal64(fraction_digits: u8) -> Self {
        LeafType::Decimal64 {
            fraction_digits,
            range: None,
        }
    }

    pub fn enumeration<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LeafType::Enumeration {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// `target` is an absolute schema path such as `/interfaces/interface/name`.
    pub fn leafref(target: &str) -> Self {
        LeafType::Leafref {
            path: split_schema_path(target),
            require_instance: true,
        }
    }

    pub fn base_name(&self) -> &'static str {
        match self {
            LeafType::String { .. } => "string",
            LeafType::Boolean => "boolean",
            LeafType::Integer { base, .. } => base.as_str(),
            LeafType::Decimal64 { .. } => "decimal64",
            LeafType::Enumeration { .. } => "enumeration",
            LeafType::Leafref { .. } => "leafref",
        }
    }

    /// Whether `raw` has the JSON shape this type is encoded with.
    ///
    /// Only the shape is checked here; ranges, lengths and patterns are
    /// checked by [`LeafType::check`].
    pub fn accepts_raw(&self, raw: &Value) -> bool {
        match self {
            LeafType::String { .. } | LeafType::Enumeration { .. } => raw.is_string(),
            LeafType::Boolean => raw.is_boolean(),
            LeafType::Integer { base, .. } => {
                raw.is_i64() || raw.is_u64() || (base.is_wide() && raw.is_string())
            }
            LeafType::Decimal64 { .. } => raw.is_number() || raw.is_string(),
            LeafType::Leafref { .. } => !raw.is_object() && !raw.is_array(),
        }
    }

    /// Check a scalar against the type's restrictions.
    ///
    /// Returns a human readable reason on failure. Leafref instance checks
    /// need the whole document and are done by the validator.
    pub fn check(&self, raw: &Value) -> Result<(), String> {
        match self {
            LeafType::String { length, pattern } => {
                let s = raw.as_str().ok_or_else(|| "expected a string".to_string())?;
                if let Some(length) = length {
                    let n = s.chars().count() as u64;
                    if !length.contains(n) {
                        return Err(format!(
                            "length {n} not in {}..{}",
                            length.min, length.max
                        ));
                    }
                }
                if let Some(pattern) = pattern {
                    if !pattern.is_match(s) {
                        return Err(format!("{s:?} does not match pattern {:?}", pattern.source()));
                    }
                }
                Ok(())
            }
            LeafType::Boolean => {
                if raw.is_boolean() {
                    Ok(())
                } else {
                    Err("expected a boolean".to_string())
                }
            }
            LeafType::Integer { base, range } => {
                let n = integer_value(raw).ok_or_else(|| format!("expected {}", base.as_str()))?;
                if !base.bounds().contains(n) {
                    return Err(format!("{n} out of {} range", base.as_str()));
                }
                if let Some(range) = range {
                    if !range.contains(n) {
                        return Err(format!("{n} not in {}..{}", range.min, range.max));
                    }
                }
                Ok(())
            }
            LeafType::Decimal64 {
                fraction_digits,
                range,
            } => {
                let text = decimal_text(raw).ok_or_else(|| "expected decimal64".to_string())?;
                let n: f64 = text
                    .parse()
                    .map_err(|_| format!("{text:?} is not a decimal number"))?;
                let digits = text.split_once('.').map(|(_, f)| f.len()).unwrap_or(0);
                if digits > *fraction_digits as usize {
                    return Err(format!(
                        "{text} has more than {fraction_digits} fraction digits"
                    ));
                }
                if let Some(range) = range {
                    if !range.contains(n) {
                        return Err(format!("{n} not in {}..{}", range.min, range.max));
                    }
                }
                Ok(())
            }
            LeafType::Enumeration { names } => {
                let s = raw.as_str().ok_or_else(|| "expected an enum name".to_string())?;
                if names.iter().any(|n| n == s) {
                    Ok(())
                } else {
                    Err(format!("{s:?} is not one of {names:?}"))
                }
            }
            LeafType::Leafref { .. } => Ok(()),
        }
    }

    /// The value a freshly created leaf of this type gets.
    pub fn zero(&self) -> Value {
        match self {
            LeafType::String { .. } | LeafType::Leafref { .. } => Value::String(String::new()),
            LeafType::Boolean => Value::Bool(false),
            LeafType::Integer { base, range } => {
                let bounds = range.unwrap_or_else(|| base.bounds());
                let n = 0i128.clamp(bounds.min, bounds.max);
                if base.is_wide() {
                    Value::String(n.to_string())
                } else {
                    // i128 -> i64 cannot fail for non-wide bases
                    Value::from(n as i64)
                }
            }
            LeafType::Decimal64 { range, .. } => {
                let n = range.map(|r| 0f64.clamp(r.min, r.max)).unwrap_or(0.0);
                serde_json::Number::from_f64(n)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::from(0))
            }
            LeafType::Enumeration { names } => names
                .first()
                .map(|n| Value::String(n.clone()))
                .unwrap_or(Value::Null),
        }
    }
}

pub(crate) fn split_schema_path(target: &str) -> Vec<String> {
    target
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn integer_value(raw: &Value) -> Option<i128> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        Value::String(s) => s.parse::<i128>().ok(),
        _ => None,
    }
}

fn decimal_text(raw: &Value) -> Option<String> {
    match raw {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
