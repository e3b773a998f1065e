//! Stored-settings shapes and the merge of stored values over defaults.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::capabilities::RouteKind;
use crate::settings::{ExposureSettings, Visibility};

const EXPOSURE_FIELD: &str = "exposure";
const ENDPOINTS_FIELD: &str = "endpoints";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyProtocol {
    Http,
    Https,
    Tcp,
    Tls,
    Udp,
}

impl LegacyProtocol {
    fn route_kind(self) -> RouteKind {
        match self {
            Self::Http | Self::Https => RouteKind::Http,
            Self::Tcp | Self::Tls => RouteKind::Tcp,
            Self::Udp => RouteKind::Udp,
        }
    }
}

/// Endpoint record written by consoles that predate exposure settings.
///
/// The destination half is kept undecoded since exposure never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyEndpoint {
    pub source_protocol: LegacyProtocol,
    pub source_port: u16,
    #[serde(default)]
    pub dest_protocol: Option<Value>,
    #[serde(default)]
    pub dest_port: Option<Value>,
}

impl From<LegacyEndpoint> for ExposureSettings {
    fn from(ep: LegacyEndpoint) -> Self {
        Self {
            kind: ep.source_protocol.route_kind(),
            port: ep.source_port,
            visibility: Visibility::Cluster,
            url: None,
        }
    }
}

/// Settings as read from storage.
///
/// This is the only place where the stored document's shape is inspected;
/// everything downstream works on the current shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSettings {
    Current(Map<String, Value>),
    Legacy {
        fields: Map<String, Value>,
        endpoint: Option<LegacyEndpoint>,
    },
}

impl RawSettings {
    pub fn from_value(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                warn!(found = %json_type(&other), "stored settings are not an object, using defaults");
                Map::new()
            }
        };
        let endpoints = fields.remove(ENDPOINTS_FIELD);
        let has_exposure = fields.get(EXPOSURE_FIELD).is_some_and(|v| !v.is_null());
        match endpoints {
            Some(endpoints) if !has_exposure => Self::Legacy {
                endpoint: first_endpoint(endpoints),
                fields,
            },
            _ => Self::Current(fields),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy { .. })
    }

    /// Migrates to the current shape. Only the first legacy endpoint survives.
    pub fn into_current(self) -> Map<String, Value> {
        match self {
            Self::Current(fields) => fields,
            Self::Legacy {
                mut fields,
                endpoint,
            } => {
                if let Some(ep) = endpoint
                    && let Ok(exposure) = serde_json::to_value(ExposureSettings::from(ep))
                {
                    fields.insert(EXPOSURE_FIELD.into(), exposure);
                }
                fields
            }
        }
    }
}

fn first_endpoint(value: Value) -> Option<LegacyEndpoint> {
    let entry = match value {
        Value::Array(entries) => {
            if entries.len() > 1 {
                debug!(count = entries.len(), "keeping only the first legacy endpoint");
            }
            entries.into_iter().next()?
        }
        other => other,
    };
    match serde_json::from_value::<LegacyEndpoint>(entry) {
        Ok(ep) => Some(ep),
        Err(err) => {
            warn!(error = %err, "unreadable legacy endpoint, exposure falls back to defaults");
            None
        }
    }
}

/// Deep-merges `stored` over `defaults`.
///
/// Objects merge key by key, arrays and scalars replace, `null` counts as
/// missing, and a stored value whose JSON type differs from the default's is
/// ignored. When the merged document still cannot be decoded, stored leaves
/// are merged one at a time and each undecodable leaf keeps its default.
pub fn merge_over<T>(defaults: T, stored: Map<String, Value>) -> T
where
    T: Serialize + DeserializeOwned,
{
    let Ok(mut base) = serde_json::to_value(&defaults) else {
        return defaults;
    };
    let mut merged = base.clone();
    merge_value(&mut merged, Value::Object(stored.clone()));
    if let Ok(settings) = serde_json::from_value(merged) {
        return settings;
    }

    merge_leaf_by_leaf::<T>(&mut base, &mut Vec::new(), stored);
    serde_json::from_value(base).unwrap_or(defaults)
}

/// Merges `overlay` (found at `path` in the stored document) into `root`,
/// keeping only the leaves with which `root` still decodes as `T`.
fn merge_leaf_by_leaf<T: DeserializeOwned>(
    root: &mut Value,
    path: &mut Vec<String>,
    overlay: Map<String, Value>,
) {
    for (key, value) in overlay {
        path.push(key);
        let slot_is_object = path
            .iter()
            .try_fold(&*root, |v, k| v.get(k))
            .is_some_and(Value::is_object);
        match value {
            Value::Object(inner) if slot_is_object => merge_leaf_by_leaf::<T>(root, path, inner),
            leaf => {
                let mut candidate = root.clone();
                merge_value(&mut candidate, nest(path, leaf));
                if serde_json::from_value::<T>(candidate.clone()).is_ok() {
                    *root = candidate;
                } else {
                    warn!(field = %path.join("."), "discarding stored setting that does not fit the schema");
                }
            }
        }
        path.pop();
    }
}

/// Wraps `leaf` in one object per path segment.
fn nest(path: &[String], leaf: Value) -> Value {
    path.iter().rev().fold(leaf, |inner, key| {
        Value::Object(Map::from_iter([(key.clone(), inner)]))
    })
}

fn merge_value(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            if same_json_type(slot, &value) {
                *slot = value;
            } else {
                debug!(
                    expected = %json_type(slot),
                    found = %json_type(&value),
                    "ignoring stored value of the wrong type"
                );
            }
        }
    }
}

fn same_json_type(default: &Value, stored: &Value) -> bool {
    matches!(
        (default, stored),
        (Value::Null, _)
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Array(_), Value::Array(_))
    )
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
