//! Record <-> compact payload conversion.
//!
//! A payload is a JSON object keyed by single-character attribute codes. Keys
//! that are not a single character (the reserved edge keys) or that the schema
//! does not know are skipped on decode, so records written by a newer schema
//! stay readable.

use serde_json::{Map, Value as Json};

use crate::{
    errors::KvGraphError,
    record::Record,
    registry::ResolvedSchema,
    value::AttrValue,
};

pub type Payload = Map<String, Json>;

pub fn encode<R: Record>(record: &R, schema: &ResolvedSchema) -> Result<Vec<u8>, KvGraphError> {
    let payload = to_payload(record, schema)?;
    serde_json::to_vec(&payload).map_err(|e| KvGraphError::encoding(e.to_string()))
}

pub fn to_payload<R: Record>(record: &R, schema: &ResolvedSchema) -> Result<Payload, KvGraphError> {
    let mut payload = Map::with_capacity(schema.attributes().len());
    for attr in schema.attributes() {
        let Some(value) = record.attribute(attr.name) else {
            tracing::warn!(
                type_path = schema.type_path(),
                attribute = attr.name,
                "codec.encode.missing_attribute"
            );
            continue;
        };
        let value = value.coerce(attr.kind).map_err(|e| {
            KvGraphError::encoding(format!("{}.{}: {e}", schema.type_path(), attr.name))
        })?;
        payload.insert(attr.code.to_string(), value.to_json()?);
    }
    Ok(payload)
}

pub fn decode<R: Record>(
    bytes: &[u8],
    schema: &ResolvedSchema,
    record: &mut R,
) -> Result<(), KvGraphError> {
    let payload = parse_payload(bytes)?;
    apply_payload(&payload, schema, record)
}

pub fn parse_payload(bytes: &[u8]) -> Result<Payload, KvGraphError> {
    match serde_json::from_slice(bytes) {
        Ok(Json::Object(map)) => Ok(map),
        Ok(other) => Err(KvGraphError::decoding(format!(
            "expected an object payload, found {other}"
        ))),
        Err(e) => Err(KvGraphError::decoding(e.to_string())),
    }
}

pub fn serialize_payload(payload: &Payload) -> Result<Vec<u8>, KvGraphError> {
    serde_json::to_vec(payload).map_err(|e| KvGraphError::encoding(e.to_string()))
}

pub fn apply_payload<R: Record>(
    payload: &Payload,
    schema: &ResolvedSchema,
    record: &mut R,
) -> Result<(), KvGraphError> {
    for (key, stored) in payload {
        let Some(code) = single_char(key) else {
            continue;
        };
        let Some(attr) = schema.by_code(code) else {
            tracing::debug!(
                type_path = schema.type_path(),
                code = %code,
                "codec.decode.unknown_code"
            );
            continue;
        };
        let value = AttrValue::from_json(stored, attr.kind).map_err(|e| {
            KvGraphError::decoding(format!("{}.{}: {e}", schema.type_path(), attr.name))
        })?;
        record.set_attribute(attr.name, value)?;
    }
    Ok(())
}

pub(crate) fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
