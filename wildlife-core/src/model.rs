use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::{FetchError, location::Resolution};

/// Outcome of one fetch. Either the upstream payload or the reason it is
/// missing, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(T),
    Failure(FetchError),
}

/// A payload that knows the placeholder keys its failure shape carries.
pub trait Payload: Serialize {
    fn placeholders() -> Map<String, Value>;
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Failure(err) => Some(err),
        }
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Envelope::Success(p) => Some(p),
            Envelope::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, FetchError> {
        match self {
            Envelope::Success(p) => Ok(p),
            Envelope::Failure(err) => Err(err),
        }
    }
}

impl<T> From<Result<T, FetchError>> for Envelope<T> {
    fn from(res: Result<T, FetchError>) -> Self {
        match res {
            Ok(p) => Envelope::Success(p),
            Err(err) => Envelope::Failure(err),
        }
    }
}

impl<T: Payload> Envelope<T> {
    /// The mapping downstream consumers read by key.
    pub fn to_value(&self) -> Value {
        match self {
            Envelope::Success(p) => serde_json::to_value(p).unwrap_or(Value::Null),
            Envelope::Failure(err) => Value::Object(failure_fields::<T>(err)),
        }
    }

    /// Pretty JSON handed to an agent tool call.
    pub fn to_tool_output(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            let fallback: Envelope<T> = Envelope::Failure(FetchError::Unexpected(e.to_string()));
            fallback.to_value().to_string()
        })
    }
}

fn failure_fields<T: Payload>(err: &FetchError) -> Map<String, Value> {
    let mut fields = T::placeholders();
    fields.insert("error".to_string(), Value::String(err.to_string()));
    fields
}

impl<T: Payload> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Envelope::Success(p) => p.serialize(serializer),
            Envelope::Failure(err) => failure_fields::<T>(err).serialize(serializer),
        }
    }
}

/// One page of a species search, exactly as the upstream returned it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SpeciesPage {
    body: Map<String, Value>,
}

impl SpeciesPage {
    pub fn new(body: Map<String, Value>) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }

    /// Occurrence records; empty when the key is absent or not a list.
    pub fn results(&self) -> &[Value] {
        self.body
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count(&self) -> u64 {
        self.body.get("count").and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn end_of_records(&self) -> Option<bool> {
        self.body.get("endOfRecords").and_then(Value::as_bool)
    }
}

impl Payload for SpeciesPage {
    fn placeholders() -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("results".to_string(), json!([]));
        fields.insert("count".to_string(), json!(0));
        fields
    }
}

/// A forecast body plus the location lookup that chose its coordinates.
///
/// Only the body is serialized; the resolution is local knowledge.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateReport {
    resolution: Resolution,
    body: Map<String, Value>,
}

impl ClimateReport {
    pub fn new(resolution: Resolution, body: Map<String, Value>) -> Self {
        Self { resolution, body }
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn current_weather(&self) -> Option<&Map<String, Value>> {
        self.body.get("current_weather").and_then(Value::as_object)
    }

    pub fn daily(&self) -> Option<&Map<String, Value>> {
        self.body.get("daily").and_then(Value::as_object)
    }

    pub fn current_temperature(&self) -> Option<f64> {
        self.current_weather()?.get("temperature")?.as_f64()
    }
}

impl Serialize for ClimateReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}

impl Payload for ClimateReport {
    fn placeholders() -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("current_weather".to_string(), json!({}));
        fields.insert("daily".to_string(), json!({}));
        fields
    }
}
