use crate::error::ConfigError;
use crate::profile::{Profile, ProfileConfig, ProfileValue};
use serde_yaml::Value;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if ext == "json" {
            ConfigFormat::Json
        } else {
            ConfigFormat::Yaml
        }
    }
}

pub fn load_config(path: &Path) -> Result<ProfileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&text, ConfigFormat::from_path(path), path)?;
    debug!(path = ?path, profiles = config.len(), "loaded configuration");
    Ok(config)
}

/// Parses configuration text; `path` is only used in error messages. JSON is
/// lifted into a YAML value so both formats share one walk.
pub fn parse_config(
    text: &str,
    format: ConfigFormat,
    path: &Path,
) -> Result<ProfileConfig, ConfigError> {
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let invalid = |message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    let mut config = ProfileConfig::new();
    if text.trim().is_empty() {
        return Ok(config);
    }
    let root: Value = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?,
        ConfigFormat::Json => {
            let json: serde_json::Value =
                serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?;
            serde_yaml::to_value(json).map_err(|e| parse_err(e.to_string()))?
        }
    };
    let root = match root {
        Value::Null => return Ok(config),
        Value::Mapping(map) => map,
        _ => return Err(invalid("top level must map profile names to settings".into())),
    };

    for (key, body) in root {
        let name = scalar_key(&key)
            .ok_or_else(|| invalid(format!("profile name {key:?} is not a scalar")))?;
        let mut profile = Profile::new(name.clone());
        match body {
            Value::Null => {}
            Value::Mapping(settings) => {
                for (k, v) in settings {
                    let k = scalar_key(&k).ok_or_else(|| {
                        invalid(format!("profile {name:?}: setting name {k:?} is not a scalar"))
                    })?;
                    let v: ProfileValue = serde_yaml::from_value(v).map_err(|_| {
                        invalid(format!(
                            "profile {name:?}: setting {k:?} must be a string, number or boolean"
                        ))
                    })?;
                    profile.settings.push((k, v));
                }
            }
            _ => return Err(invalid(format!("profile {name:?} must be a mapping of settings"))),
        }
        config.insert(profile);
    }
    Ok(config)
}

fn scalar_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
