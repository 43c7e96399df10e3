use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value as Json};

use crate::{
    codec::{Payload, single_char},
    errors::KvGraphError,
    value::{AttrKind, AttrValue},
};

pub const SOURCE_KEY: &str = "_s";
pub const TARGET_KEY: &str = "_t";
pub const BIDIRECTIONAL_KEY: &str = "_b";
pub const WEIGHT_KEY: &str = "_w";

/// An edge between two vertex hashes.
///
/// Whether the edge is directed is decided by the graph's traits; `source` and
/// `target` keep the orientation the edge was added with either way.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub bidirectional: bool,
    pub weight: Option<f64>,
    attributes: BTreeMap<char, AttrValue>,
}

impl Edge {
    pub fn new<S: Into<String>, T: Into<String>>(source: S, target: T) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            bidirectional: false,
            weight: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_attribute<V: Into<AttrValue>>(mut self, code: char, value: V) -> Self {
        self.attributes.insert(code, value.into());
        self
    }

    pub fn set_attribute<V: Into<AttrValue>>(&mut self, code: char, value: V) {
        self.attributes.insert(code, value.into());
    }

    pub fn attribute(&self, code: char) -> Option<&AttrValue> {
        self.attributes.get(&code)
    }

    pub fn attributes(&self) -> &BTreeMap<char, AttrValue> {
        &self.attributes
    }

    pub fn str_attr(&self, code: char) -> Option<String> {
        self.typed(code, AttrKind::Str).and_then(|v| v.try_into().ok())
    }

    pub fn int_attr(&self, code: char) -> Option<i64> {
        self.typed(code, AttrKind::Int).and_then(|v| v.try_into().ok())
    }

    pub fn uint_attr(&self, code: char) -> Option<u64> {
        self.typed(code, AttrKind::Uint).and_then(|v| v.try_into().ok())
    }

    pub fn float_attr(&self, code: char) -> Option<f64> {
        self.typed(code, AttrKind::Float).and_then(|v| v.try_into().ok())
    }

    pub fn bool_attr(&self, code: char) -> Option<bool> {
        self.typed(code, AttrKind::Bool).and_then(|v| v.try_into().ok())
    }

    pub fn time_attr(&self, code: char) -> Option<DateTime<Utc>> {
        self.typed(code, AttrKind::Time).and_then(|v| v.try_into().ok())
    }

    fn typed(&self, code: char, kind: AttrKind) -> Option<AttrValue> {
        self.attributes
            .get(&code)
            .and_then(|v| v.clone().coerce(kind).ok())
    }

    pub(crate) fn to_payload(&self) -> Result<Payload, KvGraphError> {
        let mut payload = Map::with_capacity(self.attributes.len() + 4);
        payload.insert(SOURCE_KEY.into(), Json::String(self.source.clone()));
        payload.insert(TARGET_KEY.into(), Json::String(self.target.clone()));
        payload.insert(BIDIRECTIONAL_KEY.into(), Json::Bool(self.bidirectional));
        if let Some(weight) = self.weight {
            payload.insert(WEIGHT_KEY.into(), AttrValue::Float(weight).to_json()?);
        }
        for (code, value) in &self.attributes {
            payload.insert(code.to_string(), value.to_json()?);
        }
        Ok(payload)
    }

    pub(crate) fn from_payload(payload: &Payload) -> Result<Self, KvGraphError> {
        let endpoint = |key: &str| {
            payload
                .get(key)
                .and_then(Json::as_str)
                .map(str::to_string)
                .ok_or_else(|| KvGraphError::decoding(format!("edge record lacks `{key}`")))
        };
        let mut edge = Edge::new(endpoint(SOURCE_KEY)?, endpoint(TARGET_KEY)?);
        edge.bidirectional = payload
            .get(BIDIRECTIONAL_KEY)
            .and_then(Json::as_bool)
            .unwrap_or(false);
        edge.weight = payload
            .get(WEIGHT_KEY)
            .map(|w| AttrValue::from_json(w, AttrKind::Float))
            .transpose()?
            .and_then(|w| match w {
                AttrValue::Float(w) => Some(w),
                _ => None,
            });
        for (key, stored) in payload {
            let Some(code) = single_char(key) else {
                continue;
            };
            match AttrValue::infer(stored) {
                Some(value) => {
                    edge.attributes.insert(code, value);
                }
                None => {
                    return Err(KvGraphError::decoding(format!(
                        "edge attribute '{code}' holds a non-scalar value {stored}"
                    )));
                }
            }
        }
        Ok(edge)
    }
}
