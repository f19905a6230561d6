use serde::Deserialize;
use serde_json::Value;

/// Subset of the monitor document returned by `/{apiKey}/monitor/{groupKey}/{mid}`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MonitorMetadata {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub snapshot: String,
}

// Older servers answer with a bare object, newer ones with a one-element array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MetadataBody {
    Many(Vec<MonitorMetadata>),
    One(MonitorMetadata),
}

impl MetadataBody {
    pub(crate) fn into_first(self) -> Option<MonitorMetadata> {
        match self {
            MetadataBody::Many(list) => list.into_iter().next(),
            MetadataBody::One(meta) => Some(meta),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMonitor {
    pub mid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub details: Value,
}

/// One entry of the server's monitor list, as shown in the settings panel.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSummary {
    pub mid: String,
    pub name: String,
    pub groups: Vec<String>,
}

impl From<RawMonitor> for MonitorSummary {
    fn from(raw: RawMonitor) -> Self {
        // `details` is itself a JSON document encoded as a string
        let details = match raw.details {
            Value::String(s) => serde_json::from_str(&s).unwrap_or(Value::Null),
            other => other,
        };
        let groups = parse_groups(details.get("groups"));
        let name = if raw.name.is_empty() { raw.mid.clone() } else { raw.name };
        MonitorSummary {
            mid: raw.mid,
            name,
            groups,
        }
    }
}

fn parse_groups(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => {
            match serde_json::from_str::<Vec<String>>(s) {
                Ok(list) => list,
                Err(_) => vec![s.clone()],
            }
        }
        _ => Vec::new(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(rename = "$user")]
    pub user: Option<LoginUser>,
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginUser {
    pub ke: String,
    pub auth_token: String,
}

/// Keys handed out by a successful dashboard login.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub api_key: String,
    pub group_key: String,
}
