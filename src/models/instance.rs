//! Plant instance (sensor) registration types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Location shared by every instance in one registration call.
///
/// Unset fields are omitted from the payload, never sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_country: Option<String>,
    /// Let the API derive the location from the caller's IP address.
    #[serde(rename = "location_by_IP", skip_serializing_if = "Option::is_none")]
    pub location_by_ip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_lat: Option<f64>,
}

/// One custom id bound to one PID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorBinding {
    pub custom_id: String,
    pub pid: String,
}

/// Request for `POST /sensor-data/instance`, one POST per sensor binding.
///
/// ```
/// use plantbook_sdk::InstanceRegistration;
///
/// let registration = InstanceRegistration::new()
///     .sensor("Abelia 1 upstairs", "abelia chinensis")
///     .country("Australia")
///     .extra("location_name", "Sydney");
/// assert_eq!(registration.sensors().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceRegistration {
    sensors: Vec<SensorBinding>,
    pub location: Location,
    /// Additional payload fields; explicit fields win on key collision.
    pub extra: Map<String, Value>,
}

impl InstanceRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(custom_id, pid)` pairs, keeping their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |reg, (custom_id, pid)| reg.sensor(custom_id, pid))
    }

    /// Bind a custom id to a PID. Bindings are posted in insertion order.
    ///
    /// Rebinding an existing custom id replaces its PID in place.
    pub fn sensor(mut self, custom_id: impl Into<String>, pid: impl Into<String>) -> Self {
        let custom_id = custom_id.into();
        let pid = pid.into();
        match self.sensors.iter_mut().find(|b| b.custom_id == custom_id) {
            Some(existing) => existing.pid = pid,
            None => self.sensors.push(SensorBinding { custom_id, pid }),
        }
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.location.location_country = Some(country.into());
        self
    }

    pub fn location_by_ip(mut self, enabled: bool) -> Self {
        self.location.location_by_ip = Some(enabled);
        self
    }

    pub fn coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.location.location_lat = Some(lat);
        self.location.location_lon = Some(lon);
        self
    }

    /// Add an extra payload field.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn sensors(&self) -> &[SensorBinding] {
        &self.sensors
    }

    /// JSON body for one binding: extra fields, then location, then ids.
    pub fn payload_for(&self, binding: &SensorBinding) -> Value {
        let mut body = self.extra.clone();
        if let Ok(Value::Object(location)) = serde_json::to_value(&self.location) {
            body.extend(location);
        }
        body.insert("custom_id".into(), Value::String(binding.custom_id.clone()));
        body.insert("pid".into(), Value::String(binding.pid.clone()));
        Value::Object(body)
    }
}

/// A created plant instance, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredInstance {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RegisteredInstance {
    /// Server-assigned instance id, used as the time-series identifier.
    pub fn id(&self) -> Option<String> {
        match self.fields.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn custom_id(&self) -> Option<&str> {
        self.fields.get("custom_id").and_then(Value::as_str)
    }

    pub fn pid(&self) -> Option<&str> {
        self.fields.get("pid").and_then(Value::as_str)
    }
}

/// Body of a 400 response with `type == "validation_error"`.
#[derive(Debug, Deserialize)]
pub(crate) struct ValidationErrorBody {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub errors: Value,
}

impl ValidationErrorBody {
    pub const KIND: &'static str = "validation_error";
}

/// Per-field error reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub code: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub attr: Option<String>,
}

/// The server's `errors` value, kept as sent (a list or a field map).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors {
    raw: Value,
}

impl ValidationErrors {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// The errors exactly as the server returned them.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// List-form entries that carry a `code`.
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.raw
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        match &self.raw {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            Value::Null => 0,
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}
