//! Verbose JSON payload codec.

use serde_json::{Map, Value};

use crate::codec::Codec;
use crate::constants::round_centi;
use crate::error::{DecodeError, EncodeError};
use crate::reading::Reading;

const FIELDS: [&str; 3] = ["temperatura", "humedad", "direccion_viento"];

/// Codec for the self-describing JSON format
#[derive(Debug, Clone, Copy, Default)]
pub struct VerboseCodec;

impl Codec for VerboseCodec {
    fn name(&self) -> &'static str {
        "verbose"
    }

    fn encode(&self, reading: &Reading) -> Result<Vec<u8>, EncodeError> {
        let temperature = round_centi(reading.temperature);
        if !temperature.is_finite() {
            return Err(EncodeError::NonFiniteTemperature(reading.temperature));
        }
        let reading = Reading {
            temperature,
            ..*reading
        };
        Ok(serde_json::to_vec(&reading)?)
    }

    fn decode(&self, payload: &[u8]) -> Result<Reading, DecodeError> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| DecodeError::MalformedPayload(e.to_string()))?;
        let object: &Map<String, Value> = value
            .as_object()
            .ok_or_else(|| DecodeError::MalformedPayload("expected a JSON object".to_string()))?;

        if let Some(missing) = FIELDS.into_iter().find(|f| !object.contains_key(*f)) {
            return Err(DecodeError::MissingField(missing));
        }

        serde_json::from_value(value).map_err(|e| DecodeError::MalformedPayload(e.to_string()))
    }
}
