//! Conversion of raw request values into typed engine values
//!
//! Every conversion failure message is produced here so that all endpoints
//! report bad values the same way. Call sites only add their own context
//! prefix through [`ConversionError::with_context`].

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RestError;

/// Date format shared by query parameters and typed values,
/// e.g. `2013-04-23T13:42:43.000+0200`
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// `valueInfo` object of a typed variable value
pub type ValueInfo = serde_json::Map<String, Value>;

// ============================================================================
// Types
// ============================================================================

/// Declared type of a variable value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Integer,
    Short,
    Long,
    Double,
    Boolean,
    Date,
    Object,
    Bytes,
    Null,
}

impl TypeTag {
    /// Resolve a REST type name, ignoring case
    pub fn from_name(name: &str) -> Result<Self, ConversionError> {
        let tag = match name.to_ascii_lowercase().as_str() {
            "string" => TypeTag::String,
            "integer" => TypeTag::Integer,
            "short" => TypeTag::Short,
            "long" => TypeTag::Long,
            "double" => TypeTag::Double,
            "boolean" => TypeTag::Boolean,
            "date" => TypeTag::Date,
            "object" => TypeTag::Object,
            "bytes" => TypeTag::Bytes,
            "null" => TypeTag::Null,
            _ => return Err(ConversionError::UnsupportedType(name.to_string())),
        };
        Ok(tag)
    }

    /// Canonical REST name
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::String => "String",
            TypeTag::Integer => "Integer",
            TypeTag::Short => "Short",
            TypeTag::Long => "Long",
            TypeTag::Double => "Double",
            TypeTag::Boolean => "Boolean",
            TypeTag::Date => "Date",
            TypeTag::Object => "Object",
            TypeTag::Bytes => "Bytes",
            TypeTag::Null => "Null",
        }
    }

    /// Name of the representation a raw value is converted to
    pub fn target(self) -> &'static str {
        match self {
            TypeTag::String => "String",
            TypeTag::Integer => "i32",
            TypeTag::Short => "i16",
            TypeTag::Long => "i64",
            TypeTag::Double => "f64",
            TypeTag::Boolean => "bool",
            TypeTag::Date => "date",
            TypeTag::Object => "object",
            TypeTag::Bytes => "bytes",
            TypeTag::Null => "null",
        }
    }
}

/// Primitive value types usable in variable sort criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Integer,
    Short,
    Long,
    Double,
    Boolean,
    Date,
}

impl ValueType {
    pub fn from_name(name: &str) -> Result<Self, ConversionError> {
        match TypeTag::from_name(name)? {
            TypeTag::String => Ok(ValueType::String),
            TypeTag::Integer => Ok(ValueType::Integer),
            TypeTag::Short => Ok(ValueType::Short),
            TypeTag::Long => Ok(ValueType::Long),
            TypeTag::Double => Ok(ValueType::Double),
            TypeTag::Boolean => Ok(ValueType::Boolean),
            TypeTag::Date => Ok(ValueType::Date),
            _ => Err(ConversionError::UnsupportedType(name.to_string())),
        }
    }
}

/// A value converted to its engine representation
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    String(String),
    Integer(i32),
    Short(i16),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Date(DateTime<FixedOffset>),
    Object {
        serialization_format: String,
        object_type_name: String,
        value: String,
    },
    Bytes(Vec<u8>),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Null => f.write_str("null"),
            TypedValue::String(v) => f.write_str(v),
            TypedValue::Integer(v) => write!(f, "{v}"),
            TypedValue::Short(v) => write!(f, "{v}"),
            TypedValue::Long(v) => write!(f, "{v}"),
            TypedValue::Double(v) => write!(f, "{v}"),
            TypedValue::Boolean(v) => write!(f, "{v}"),
            TypedValue::Date(v) => write!(f, "{}", v.to_rfc3339()),
            TypedValue::Object { value, .. } => f.write_str(value),
            TypedValue::Bytes(v) => write!(f, "{}", STANDARD.encode(v)),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A raw value that could not be converted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("Cannot convert value \"{raw}\" of type '{declared}' to {target}")]
    Typed {
        raw: String,
        declared: &'static str,
        target: &'static str,
    },

    #[error("Cannot convert value \"{raw}\" to type {target}")]
    Untyped { raw: String, target: &'static str },

    #[error("Unsupported value type '{0}'")]
    UnsupportedType(String),

    #[error("Must provide '{key}' in valueInfo for value of type '{declared}'")]
    MissingValueInfo {
        key: &'static str,
        declared: &'static str,
    },
}

impl ConversionError {
    fn typed(raw: &str, tag: TypeTag) -> Self {
        ConversionError::Typed {
            raw: raw.to_string(),
            declared: tag.name(),
            target: tag.target(),
        }
    }

    /// Prefix the message with the failing operation, e.g. `Cannot deliver message`
    pub fn with_context(self, context: impl fmt::Display) -> RestError {
        RestError::Conversion {
            message: format!("{context}: {self}"),
            source: self,
        }
    }
}

// ============================================================================
// Coercer
// ============================================================================

/// Converts raw strings and JSON values into [`TypedValue`]s
#[derive(Debug, Clone)]
pub struct Coercer {
    date_format: String,
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl Coercer {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Convert a raw string to the declared type.
    ///
    /// `Object` values carry metadata and must go through [`Coercer::coerce_object`].
    pub fn coerce(&self, raw: &str, tag: TypeTag) -> Result<TypedValue, ConversionError> {
        let fail = |_: std::num::ParseIntError| ConversionError::typed(raw, tag);
        match tag {
            TypeTag::String => Ok(TypedValue::String(raw.to_string())),
            TypeTag::Integer => raw.parse().map(TypedValue::Integer).map_err(fail),
            TypeTag::Short => raw.parse().map(TypedValue::Short).map_err(fail),
            TypeTag::Long => raw.parse().map(TypedValue::Long).map_err(fail),
            TypeTag::Double => raw
                .parse()
                .map(TypedValue::Double)
                .map_err(|_| ConversionError::typed(raw, tag)),
            TypeTag::Boolean => parse_bool(raw)
                .map(TypedValue::Boolean)
                .ok_or_else(|| ConversionError::typed(raw, tag)),
            TypeTag::Date => DateTime::parse_from_str(raw, &self.date_format)
                .map(TypedValue::Date)
                .map_err(|_| ConversionError::typed(raw, tag)),
            TypeTag::Bytes => STANDARD
                .decode(raw)
                .map(TypedValue::Bytes)
                .map_err(|_| ConversionError::typed(raw, tag)),
            TypeTag::Null => Ok(TypedValue::Null),
            TypeTag::Object => Err(ConversionError::MissingValueInfo {
                key: "serializationDataFormat",
                declared: TypeTag::Object.name(),
            }),
        }
    }

    /// Convert a serialized object value; both metadata keys are required
    pub fn coerce_object(
        &self,
        raw: &str,
        value_info: Option<&ValueInfo>,
    ) -> Result<TypedValue, ConversionError> {
        let lookup = |key: &'static str| {
            value_info
                .and_then(|info| info.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(ConversionError::MissingValueInfo {
                    key,
                    declared: TypeTag::Object.name(),
                })
        };
        Ok(TypedValue::Object {
            serialization_format: lookup("serializationDataFormat")?,
            object_type_name: lookup("objectTypeName")?,
            value: raw.to_string(),
        })
    }

    /// Parse a date query parameter, which carries no declared type
    pub fn parse_date(&self, raw: &str) -> Result<DateTime<FixedOffset>, ConversionError> {
        DateTime::parse_from_str(raw, &self.date_format).map_err(|_| ConversionError::Untyped {
            raw: raw.to_string(),
            target: TypeTag::Date.target(),
        })
    }

    /// Parse an untyped scalar query parameter
    pub fn parse_untyped<T: std::str::FromStr>(
        &self,
        raw: &str,
        tag: TypeTag,
    ) -> Result<T, ConversionError> {
        raw.parse().map_err(|_| ConversionError::Untyped {
            raw: raw.to_string(),
            target: tag.target(),
        })
    }

    /// Parse an untyped boolean query parameter
    pub fn parse_flag(&self, raw: &str) -> Result<bool, ConversionError> {
        parse_bool(raw).ok_or_else(|| ConversionError::Untyped {
            raw: raw.to_string(),
            target: TypeTag::Boolean.target(),
        })
    }

    /// Type a filter value that came without a declared type.
    ///
    /// Integer, decimal and boolean literals are converted; anything else stays a string.
    pub fn infer(&self, raw: &str) -> TypedValue {
        if let Ok(v) = raw.parse::<i32>() {
            return TypedValue::Integer(v);
        }
        if let Ok(v) = raw.parse::<i64>() {
            return TypedValue::Long(v);
        }
        if is_decimal_literal(raw)
            && let Ok(v) = raw.parse::<f64>()
        {
            return TypedValue::Double(v);
        }
        match parse_bool(raw) {
            Some(v) => TypedValue::Boolean(v),
            None => TypedValue::String(raw.to_string()),
        }
    }

    /// Convert a JSON value with an optional declared type name
    pub fn coerce_json(
        &self,
        value: &Value,
        type_name: Option<&str>,
        value_info: Option<&ValueInfo>,
    ) -> Result<TypedValue, ConversionError> {
        let Some(type_name) = type_name else {
            return untyped_json(value);
        };
        let tag = TypeTag::from_name(type_name)?;

        match value {
            Value::Null => Ok(TypedValue::Null),
            Value::String(raw) if tag == TypeTag::Object => self.coerce_object(raw, value_info),
            Value::String(raw) => self.coerce(raw, tag),
            other if tag == TypeTag::Object => self.coerce_object(&other.to_string(), value_info),
            Value::Number(_) | Value::Bool(_) => self.coerce(&value.to_string(), tag),
            Value::Array(_) | Value::Object(_) => Err(ConversionError::typed(&value.to_string(), tag)),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn is_decimal_literal(raw: &str) -> bool {
    !raw.is_empty()
        && raw.chars().any(|c| c.is_ascii_digit())
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

fn untyped_json(value: &Value) -> Result<TypedValue, ConversionError> {
    match value {
        Value::Null => Ok(TypedValue::Null),
        Value::Bool(v) => Ok(TypedValue::Boolean(*v)),
        Value::String(v) => Ok(TypedValue::String(v.clone())),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(i32::try_from(v)
                    .map(TypedValue::Integer)
                    .unwrap_or(TypedValue::Long(v)))
            } else {
                n.as_f64()
                    .map(TypedValue::Double)
                    .ok_or_else(|| ConversionError::Untyped {
                        raw: n.to_string(),
                        target: TypeTag::Double.target(),
                    })
            }
        }
        Value::Array(_) | Value::Object(_) => Err(ConversionError::Untyped {
            raw: value.to_string(),
            target: "primitive value",
        }),
    }
}

// ============================================================================
// Variable values
// ============================================================================

/// A typed variable value as sent by clients: `{ "value": .., "type": .., "valueInfo": .. }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableValueDto {
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_info: Option<ValueInfo>,
}

impl VariableValueDto {
    pub fn to_typed(&self, coercer: &Coercer) -> Result<TypedValue, ConversionError> {
        coercer.coerce_json(&self.value, self.type_name.as_deref(), self.value_info.as_ref())
    }
}

/// Convert a whole variable map, failing on the first bad value
pub fn typed_variables(
    variables: &BTreeMap<String, VariableValueDto>,
    coercer: &Coercer,
) -> Result<Vec<(String, TypedValue)>, ConversionError> {
    variables
        .iter()
        .map(|(name, dto)| Ok((name.clone(), dto.to_typed(coercer)?)))
        .collect()
}
