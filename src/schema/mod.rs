//! Structural validation of untyped JSON against declared shapes.
//!
//! Caller input and remote responses go through the same primitive: a
//! [`Shape`] describes what a value must look like, [`validate`] checks and
//! normalizes a value against it, and [`conform`] additionally deserializes
//! the normalized value into a typed Rust struct.

pub mod registry;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Path reported for violations on the value itself rather than a field.
pub const ROOT_PATH: &str = "<root>";

/// A value that does not match its declared shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema violation at `{path}`: expected {expected}, found {actual}")]
pub struct SchemaViolation {
    /// Dotted field path, with array indices in brackets (`results[2].id`).
    pub path: String,
    pub expected: String,
    pub actual: String,
}

/// Declared structure of a JSON value.
#[derive(Debug, Clone)]
pub enum Shape {
    Any,
    Bool,
    Integer { min: Option<i64>, max: Option<i64> },
    Number { min: Option<f64>, max: Option<f64> },
    String(StringFormat),
    Array(Box<Shape>),
    /// Object with arbitrary keys, every value sharing one shape.
    Record(Box<Shape>),
    /// `null` or the inner shape. The key itself must still be present
    /// unless the field is declared optional.
    Nullable(Box<Shape>),
    Object(ObjectShape),
}

#[derive(Debug, Clone, Copy)]
pub enum StringFormat {
    Any,
    NonEmpty,
    Email,
    /// Comma-separated `field` or `field:asc` / `field:desc` entries.
    SortKey,
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// The key may be omitted entirely.
    Optional,
    /// List field; an omitted key normalizes to `[]`.
    DefaultEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFields {
    /// Accept and drop keys that are not declared.
    Permissive,
    /// Reject keys that are not declared.
    Strict,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub presence: Presence,
}

#[derive(Debug, Clone)]
pub struct ObjectShape {
    pub fields: Vec<Field>,
    pub unknown: UnknownFields,
}

// ── Shape builders ─────────────────────────────────────────────────────────

pub fn object(fields: Vec<Field>) -> Shape {
    Shape::Object(ObjectShape { fields, unknown: UnknownFields::Permissive })
}

pub fn strict_object(fields: Vec<Field>) -> Shape {
    Shape::Object(ObjectShape { fields, unknown: UnknownFields::Strict })
}

pub fn nullable(shape: Shape) -> Shape {
    Shape::Nullable(Box::new(shape))
}

pub fn array(item: Shape) -> Shape {
    Shape::Array(Box::new(item))
}

pub fn record(value: Shape) -> Shape {
    Shape::Record(Box::new(value))
}

pub fn string() -> Shape {
    Shape::String(StringFormat::Any)
}

pub fn one_of(values: &'static [&'static str]) -> Shape {
    Shape::String(StringFormat::OneOf(values))
}

pub fn boolean() -> Shape {
    Shape::Bool
}

/// Non-negative integer.
pub fn count() -> Shape {
    Shape::Integer { min: Some(0), max: None }
}

/// Calendar year, bounded to what an `i32` holds.
pub fn year() -> Shape {
    Shape::Integer { min: Some(i32::MIN as i64), max: Some(i32::MAX as i64) }
}

/// Non-negative integer that fits a `u32`, for page numbers and sizes.
pub fn small_count() -> Shape {
    Shape::Integer { min: Some(0), max: Some(u32::MAX as i64) }
}

/// Non-negative real number.
pub fn metric() -> Shape {
    Shape::Number { min: Some(0.0), max: None }
}

/// Relevance score in `[0, 1]`.
pub fn score() -> Shape {
    Shape::Number { min: Some(0.0), max: Some(1.0) }
}

pub fn field(name: &'static str, shape: Shape) -> Field {
    Field { name, shape, presence: Presence::Required }
}

pub fn optional(name: &'static str, shape: Shape) -> Field {
    Field { name, shape, presence: Presence::Optional }
}

/// List field that defaults to empty when omitted.
pub fn list(name: &'static str, item: Shape) -> Field {
    Field { name, shape: array(item), presence: Presence::DefaultEmpty }
}

impl Shape {
    /// Human-readable description used in violation messages.
    pub fn describe(&self) -> String {
        match self {
            Shape::Any => "any value".into(),
            Shape::Bool => "boolean".into(),
            Shape::Integer { min, max } => describe_range("integer", *min, *max),
            Shape::Number { min, max } => describe_range("number", *min, *max),
            Shape::String(format) => match format {
                StringFormat::Any => "string".into(),
                StringFormat::NonEmpty => "non-empty string".into(),
                StringFormat::Email => "email address".into(),
                StringFormat::SortKey => "sort key (`field` or `field:asc|desc`)".into(),
                StringFormat::OneOf(values) => format!("one of {}", values.join("|")),
            },
            Shape::Array(item) => format!("array of {}", item.describe()),
            Shape::Record(value) => format!("map of {}", value.describe()),
            Shape::Nullable(inner) => format!("{} or null", inner.describe()),
            Shape::Object(_) => "object".into(),
        }
    }
}

fn describe_range<T: std::fmt::Display>(kind: &str, min: Option<T>, max: Option<T>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("{kind} in [{lo}, {hi}]"),
        (Some(lo), None) => format!("{kind} >= {lo}"),
        (None, Some(hi)) => format!("{kind} <= {hi}"),
        (None, None) => kind.to_string(),
    }
}

// ── Validation ─────────────────────────────────────────────────────────────

/// Check `value` against `shape` and return the normalized value.
///
/// Normalization only fills defaults for omitted list fields, drops
/// undeclared keys of permissive objects and collapses integral floats
/// (`2.0`) to integers. Nothing else is coerced.
pub fn validate(shape: &Shape, value: Value) -> Result<Value, SchemaViolation> {
    check(shape, value, "")
}

/// Validate `value` against `shape` and deserialize it into `T`.
///
/// Either the whole value conforms and a fully built `T` comes back, or the
/// call fails; partially accepted values are never returned.
pub fn conform<T: DeserializeOwned>(shape: &Shape, value: Value) -> Result<T, SchemaViolation> {
    let normalized = validate(shape, value)?;
    serde_json::from_value(normalized).map_err(|e| SchemaViolation {
        path: ROOT_PATH.to_string(),
        expected: std::any::type_name::<T>().to_string(),
        actual: e.to_string(),
    })
}

fn check(shape: &Shape, value: Value, path: &str) -> Result<Value, SchemaViolation> {
    match shape {
        Shape::Any => Ok(value),
        Shape::Nullable(inner) => match value {
            Value::Null => Ok(Value::Null),
            other => check(inner, other, path),
        },
        Shape::Bool => {
            if value.is_boolean() {
                Ok(value)
            } else {
                Err(violation(path, shape, &value))
            }
        }
        Shape::Integer { min, max } => {
            let n = value.as_number().and_then(integral);
            match n {
                Some(n) if min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi) => {
                    Ok(Value::from(n))
                }
                _ => Err(violation(path, shape, &value)),
            }
        }
        Shape::Number { min, max } => match value.as_f64() {
            Some(n) if min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi) => {
                Ok(value)
            }
            _ => Err(violation(path, shape, &value)),
        },
        Shape::String(format) => match value.as_str() {
            Some(s) if format.accepts(s) => Ok(value),
            _ => Err(violation(path, shape, &value)),
        },
        Shape::Array(item) => match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| check(item, v, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Err(violation(path, shape, &other)),
        },
        Shape::Record(inner) => match value {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, v) in map {
                    let checked = check(inner, v, &child_path(path, &key))?;
                    out.insert(key, checked);
                }
                Ok(Value::Object(out))
            }
            other => Err(violation(path, shape, &other)),
        },
        Shape::Object(object) => match value {
            Value::Object(map) => check_object(object, map, path),
            other => Err(violation(path, shape, &other)),
        },
    }
}

fn check_object(
    object: &ObjectShape,
    mut map: Map<String, Value>,
    path: &str,
) -> Result<Value, SchemaViolation> {
    if object.unknown == UnknownFields::Strict {
        if let Some(key) = map
            .keys()
            .find(|key| !object.fields.iter().any(|f| f.name == key.as_str()))
        {
            let known: Vec<&str> = object.fields.iter().map(|f| f.name).collect();
            return Err(SchemaViolation {
                path: child_path(path, key),
                expected: format!("one of the fields {}", known.join(", ")),
                actual: "unrecognized field".into(),
            });
        }
    }

    let mut out = Map::with_capacity(object.fields.len());
    for field in &object.fields {
        let field_path = child_path(path, field.name);
        match map.remove(field.name) {
            Some(v) => {
                let checked = check(&field.shape, v, &field_path)?;
                out.insert(field.name.to_string(), checked);
            }
            None => match field.presence {
                Presence::Required => {
                    return Err(SchemaViolation {
                        path: field_path,
                        expected: field.shape.describe(),
                        actual: "missing field".into(),
                    })
                }
                Presence::Optional => {}
                Presence::DefaultEmpty => {
                    out.insert(field.name.to_string(), Value::Array(Vec::new()));
                }
            },
        }
    }
    Ok(Value::Object(out))
}

fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn violation(path: &str, shape: &Shape, found: &Value) -> SchemaViolation {
    SchemaViolation {
        path: if path.is_empty() { ROOT_PATH.to_string() } else { path.to_string() },
        expected: shape.describe(),
        actual: describe_value(found),
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) if s.chars().count() > 40 => {
            let head: String = s.chars().take(40).collect();
            format!("string {head:?}...")
        }
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".into(),
        Value::Object(_) => "object".into(),
    }
}

impl StringFormat {
    fn accepts(&self, s: &str) -> bool {
        match self {
            StringFormat::Any => true,
            StringFormat::NonEmpty => !s.trim().is_empty(),
            StringFormat::Email => is_email(s),
            StringFormat::SortKey => is_sort_key(s),
            StringFormat::OneOf(values) => values.contains(&s),
        }
    }
}

/// Loose address check: a non-empty local part, one `@`, and a dotted domain.
pub fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !s.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn is_sort_key(s: &str) -> bool {
    !s.is_empty()
        && s.split(',').all(|part| {
            let (name, direction) = match part.split_once(':') {
                Some((name, dir)) => (name, Some(dir)),
                None => (part, None),
            };
            !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
                && matches!(direction, None | Some("asc") | Some("desc"))
        })
}
