//! Attribute values.
//!
//! Stored payloads are plain JSON scalars; the declared [`AttrKind`] of an
//! attribute decides how a scalar is read back. Every conversion goes through
//! the JSON form, so an `Int` can become a `Float` and an RFC 3339 string can
//! become a `Time`, while a fractional number never becomes an `Int`.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value as Json};

use crate::errors::KvGraphError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Str,
    Int,
    Uint,
    Float,
    Bool,
    Time,
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttrKind::Str => "str",
            AttrKind::Int => "int",
            AttrKind::Uint => "uint",
            AttrKind::Float => "float",
            AttrKind::Bool => "bool",
            AttrKind::Time => "time",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Time(DateTime<Utc>),
}

impl AttrValue {
    pub fn kind(&self) -> AttrKind {
        match self {
            AttrValue::Str(_) => AttrKind::Str,
            AttrValue::Int(_) => AttrKind::Int,
            AttrValue::Uint(_) => AttrKind::Uint,
            AttrValue::Float(_) => AttrKind::Float,
            AttrValue::Bool(_) => AttrKind::Bool,
            AttrValue::Time(_) => AttrKind::Time,
        }
    }

    pub fn to_json(&self) -> Result<Json, KvGraphError> {
        Ok(match self {
            AttrValue::Str(s) => Json::String(s.clone()),
            AttrValue::Int(v) => Json::from(*v),
            AttrValue::Uint(v) => Json::from(*v),
            AttrValue::Float(v) => Number::from_f64(*v).map(Json::Number).ok_or_else(|| {
                KvGraphError::encoding(format!("float {v} has no JSON representation"))
            })?,
            AttrValue::Bool(b) => Json::Bool(*b),
            AttrValue::Time(t) => Json::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        })
    }

    /// Reads a stored scalar as the given kind.
    pub fn from_json(value: &Json, kind: AttrKind) -> Result<Self, KvGraphError> {
        let converted = match (kind, value) {
            (AttrKind::Str, Json::String(s)) => Some(AttrValue::Str(s.clone())),
            (AttrKind::Int, Json::Number(n)) => n.as_i64().map(AttrValue::Int),
            (AttrKind::Uint, Json::Number(n)) => n.as_u64().map(AttrValue::Uint),
            (AttrKind::Float, Json::Number(n)) => n.as_f64().map(AttrValue::Float),
            (AttrKind::Bool, Json::Bool(b)) => Some(AttrValue::Bool(*b)),
            (AttrKind::Time, Json::String(s)) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| AttrValue::Time(t.with_timezone(&Utc))),
            _ => None,
        };
        converted.ok_or_else(|| KvGraphError::decoding(format!("cannot read {value} as {kind}")))
    }

    /// Best-effort reading of a scalar with no declared kind.
    pub fn infer(value: &Json) -> Option<Self> {
        match value {
            Json::String(s) => Some(AttrValue::Str(s.clone())),
            Json::Bool(b) => Some(AttrValue::Bool(*b)),
            Json::Number(n) => n
                .as_i64()
                .map(AttrValue::Int)
                .or_else(|| n.as_u64().map(AttrValue::Uint))
                .or_else(|| n.as_f64().map(AttrValue::Float)),
            _ => None,
        }
    }

    /// Converts to `kind` through the stored representation.
    pub fn coerce(self, kind: AttrKind) -> Result<Self, KvGraphError> {
        if self.kind() == kind {
            return Ok(self);
        }
        let json = self.to_json()?;
        AttrValue::from_json(&json, kind)
            .map_err(|_| KvGraphError::encoding(format!("cannot store {json} as {kind}")))
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value.into())
    }
}

impl From<u64> for AttrValue {
    fn from(value: u64) -> Self {
        AttrValue::Uint(value)
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Uint(value.into())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(value: DateTime<Utc>) -> Self {
        AttrValue::Time(value)
    }
}

macro_rules! try_from_attr {
    ($ty:ty, $kind:ident) => {
        impl TryFrom<AttrValue> for $ty {
            type Error = KvGraphError;

            fn try_from(value: AttrValue) -> Result<Self, Self::Error> {
                match value.coerce(AttrKind::$kind) {
                    Ok(AttrValue::$kind(v)) => Ok(v),
                    _ => Err(KvGraphError::decoding(format!(
                        "expected {} value",
                        AttrKind::$kind
                    ))),
                }
            }
        }
    };
}

try_from_attr!(String, Str);
try_from_attr!(i64, Int);
try_from_attr!(u64, Uint);
try_from_attr!(f64, Float);
try_from_attr!(bool, Bool);
try_from_attr!(DateTime<Utc>, Time);
