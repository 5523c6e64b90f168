use crate::error::ConfigError;
use crate::mesh::MeshSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ProfileValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileValue::Bool(v) => write!(f, "{v}"),
            ProfileValue::Integer(v) => write!(f, "{v}"),
            ProfileValue::Float(v) => write!(f, "{v}"),
            ProfileValue::Text(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub settings: Vec<(String, ProfileValue)>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: Vec::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: ProfileValue) -> Self {
        self.settings.push((key.into(), value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ProfileValue> {
        self.settings.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    profiles: Vec<Profile>,
}

impl ProfileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: Profile) {
        match self.profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl FromIterator<Profile> for ProfileConfig {
    fn from_iter<I: IntoIterator<Item = Profile>>(iter: I) -> Self {
        let mut config = ProfileConfig::new();
        for profile in iter {
            config.insert(profile);
        }
        config
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub custom_config: bool,
    pub global_profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentEntry {
    pub source: MeshSource,
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileAssignment {
    entries: Vec<AssignmentEntry>,
}

impl ProfileAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: MeshSource, profile: Option<Profile>) {
        self.entries.push(AssignmentEntry { source, profile });
    }

    pub fn entries(&self) -> &[AssignmentEntry] {
        &self.entries
    }

    pub fn sources(&self) -> impl Iterator<Item = &MeshSource> {
        self.entries.iter().map(|e| &e.source)
    }

    pub fn profile_for(&self, source: &MeshSource) -> Option<&Profile> {
        self.entries
            .iter()
            .find(|e| &e.source == source)
            .and_then(|e| e.profile.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn resolve(
    tokens: &[String],
    options: &ResolveOptions,
    config: Option<&ProfileConfig>,
) -> Result<ProfileAssignment, ConfigError> {
    if tokens.is_empty() {
        return Err(ConfigError::NoInputFiles);
    }
    if options.custom_config {
        resolve_interleaved(tokens, config)
    } else {
        resolve_flat(tokens, options.global_profile.as_deref(), config)
    }
}

fn resolve_interleaved(
    tokens: &[String],
    config: Option<&ProfileConfig>,
) -> Result<ProfileAssignment, ConfigError> {
    if tokens.len() % 2 != 0 {
        return Err(ConfigError::DanglingFileWithoutProfile {
            file: tokens[tokens.len() - 1].clone(),
        });
    }

    let mut assignment = ProfileAssignment::new();
    for (index, pair) in tokens.chunks_exact(2).enumerate() {
        let (file, name) = (&pair[0], &pair[1]);
        let profile = lookup(config, name, file)?;
        debug!(file = %file, profile = %name, "assigned profile");
        assignment.push(MeshSource::new(index, file), Some(profile.clone()));
    }
    Ok(assignment)
}

fn resolve_flat(
    files: &[String],
    global: Option<&str>,
    config: Option<&ProfileConfig>,
) -> Result<ProfileAssignment, ConfigError> {
    let shared = match (global, config) {
        (Some(name), _) => Some(lookup(config, name, &files[0])?.clone()),
        (None, Some(cfg)) if cfg.len() == 1 => {
            let only = &cfg.profiles()[0];
            debug!(profile = %only.name, "applying the only configured profile to all files");
            Some(only.clone())
        }
        (None, Some(cfg)) if cfg.len() > 1 => {
            warn!(
                profiles = cfg.len(),
                "configuration holds several profiles but none was selected; no profile applied"
            );
            None
        }
        _ => None,
    };

    let mut assignment = ProfileAssignment::new();
    for (index, file) in files.iter().enumerate() {
        assignment.push(MeshSource::new(index, file), shared.clone());
    }
    Ok(assignment)
}

fn lookup<'a>(
    config: Option<&'a ProfileConfig>,
    name: &str,
    file: &str,
) -> Result<&'a Profile, ConfigError> {
    let config = config.ok_or_else(|| ConfigError::MissingConfig {
        profile: name.to_string(),
    })?;
    config.get(name).ok_or_else(|| ConfigError::UnknownProfile {
        profile: name.to_string(),
        file: file.to_string(),
    })
}
