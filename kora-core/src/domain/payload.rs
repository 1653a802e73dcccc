//! Payload — a typed view over a backend JSON document that keeps the original.
//!
//! The backend owns these documents. We read the fields we render, but the
//! analyze and save calls must send the document back exactly as received,
//! including fields this crate does not model.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::ops::Deref;

#[derive(Debug, Clone)]
pub struct Payload<T> {
    value: T,
    raw: Value,
}

impl<T: DeserializeOwned> Payload<T> {
    pub fn from_raw(raw: Value) -> Result<Self, serde_json::Error> {
        let value = T::deserialize(&raw)?;
        Ok(Self { value, raw })
    }
}

impl<T> Payload<T> {
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }
}

impl<T> Deref for Payload<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> Serialize for Payload<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Payload<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Payload::from_raw(raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Narrow {
        a: i64,
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = json!({"a": 1, "extra": {"nested": [1, 2, 3]}});
        let payload: Payload<Narrow> = Payload::from_raw(raw.clone()).unwrap();
        assert_eq!(payload.a, 1);
        assert_eq!(serde_json::to_value(&payload).unwrap(), raw);
    }

    #[test]
    fn type_mismatch_is_an_error() {
        assert!(Payload::<Narrow>::from_raw(json!({"a": "x"})).is_err());
    }
}
