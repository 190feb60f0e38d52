use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FillError, Result};

/// Quiet period applied to keystrokes of a label-only field.
pub const LIST_DEBOUNCE_MS: u64 = 300;

/// Shortest input a label-only field will send to the server.
pub const LIST_MIN_QUERY_LEN: usize = 2;

/// Form-binding prefix stripped from a field name before matching dependents.
const BINDING_PREFIX: &str = "_.";

/// Configuration of a whole form, loaded from TOML:
///
/// ```toml
/// [[field]]
/// name = "_.projectName"
/// fill_url = "/bitbucket/fillProjectNameItems"
/// fill_depends_on = "serverId credentialsId projectName"
///
/// [[field]]
/// name = "repositoryName"
/// fill_url = "/bitbucket/fillRepositoryNameItems"
/// fill_depends_on = ["serverId", "projectName", "repositoryName"]
/// mode = { kind = "map", value_identifier = "slug", value_field = "repositorySlug" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(rename = "field", default)]
    pub fields: Vec<FieldConfig>,
}

impl FormConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.fields.iter().try_for_each(FieldConfig::validate)
    }

    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// HTTP verb used for suggestion queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMethod {
    Get,
    #[default]
    Post,
}

/// What happens to the suggestion store when a query fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    Clear,
    Keep,
}

/// How the visible label relates to the submitted value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Suggestions are bare labels; the label is the value.
    #[default]
    List,
    /// Each label maps to a machine value written into `value_field`.
    Map {
        /// Property of each response entry holding the machine value.
        value_identifier: String,
        /// Element id of the field receiving the resolved value.
        value_field: String,
    },
}

impl ResolutionMode {
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map { .. })
    }
}

/// Typed configuration of a single searchable field.
///
/// Unset behavioural knobs fall back to the defaults of the chosen
/// [`ResolutionMode`]: list fields debounce keystrokes, ignore short input,
/// clear on failure and cascade on blur; map fields query on every keystroke
/// and keep their last results when a query fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub fill_url: String,
    #[serde(default, deserialize_with = "deserialize_depends_on")]
    pub fill_depends_on: Vec<String>,
    #[serde(default)]
    pub method: RequestMethod,
    #[serde(default)]
    pub mode: ResolutionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_query_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<FailurePolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascade_on_blur: Option<bool>,
    #[serde(default = "default_true")]
    pub discard_stale: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DependsOn {
    Joined(String),
    List(Vec<String>),
}

fn deserialize_depends_on<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match DependsOn::deserialize(deserializer)? {
        DependsOn::Joined(joined) => parse_depends_on(&joined),
        DependsOn::List(names) => names.iter().flat_map(|n| parse_depends_on(n)).collect(),
    })
}

/// Split a whitespace-separated dependency declaration, dropping empty names.
pub fn parse_depends_on(declaration: &str) -> Vec<String> {
    declaration.split_whitespace().map(str::to_string).collect()
}

impl FieldConfig {
    fn new(name: &str, fill_url: &str, mode: ResolutionMode) -> Self {
        Self {
            name: name.to_string(),
            id: None,
            fill_url: fill_url.to_string(),
            fill_depends_on: Vec::new(),
            method: RequestMethod::default(),
            mode,
            debounce_ms: None,
            min_query_len: None,
            on_failure: None,
            cascade_on_blur: None,
            discard_stale: true,
        }
    }

    /// A label-only field.
    pub fn list(name: &str, fill_url: &str) -> Self {
        Self::new(name, fill_url, ResolutionMode::List)
    }

    /// A label/value field writing resolved values into `value_field`.
    pub fn map(name: &str, fill_url: &str, value_identifier: &str, value_field: &str) -> Self {
        Self::new(
            name,
            fill_url,
            ResolutionMode::Map {
                value_identifier: value_identifier.to_string(),
                value_field: value_field.to_string(),
            },
        )
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn depends_on(mut self, declaration: &str) -> Self {
        self.fill_depends_on = parse_depends_on(declaration);
        self
    }

    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = Some(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_min_query_len(mut self, len: usize) -> Self {
        self.min_query_len = Some(len);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = Some(policy);
        self
    }

    pub fn with_cascade_on_blur(mut self, cascade: bool) -> Self {
        self.cascade_on_blur = Some(cascade);
        self
    }

    pub fn with_discard_stale(mut self, discard: bool) -> Self {
        self.discard_stale = discard;
        self
    }

    pub fn debounce(&self) -> Duration {
        let ms = self.debounce_ms.unwrap_or(match self.mode {
            ResolutionMode::List => LIST_DEBOUNCE_MS,
            ResolutionMode::Map { .. } => 0,
        });
        Duration::from_millis(ms)
    }

    pub fn min_query_len(&self) -> usize {
        self.min_query_len.unwrap_or(match self.mode {
            ResolutionMode::List => LIST_MIN_QUERY_LEN,
            ResolutionMode::Map { .. } => 0,
        })
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.on_failure.unwrap_or(match self.mode {
            ResolutionMode::List => FailurePolicy::Clear,
            ResolutionMode::Map { .. } => FailurePolicy::Keep,
        })
    }

    pub fn cascades_on_blur(&self) -> bool {
        self.cascade_on_blur.unwrap_or(!self.mode.is_map())
    }

    /// Name under which dependents declare this field.
    pub fn dependency_key(&self) -> String {
        self.name.replacen(BINDING_PREFIX, "", 1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FillError::InvalidConfig("field name is empty".to_string()));
        }
        if self.fill_url.trim().is_empty() {
            return Err(FillError::InvalidConfig(format!(
                "field '{}' has no fill_url",
                self.name
            )));
        }
        if let ResolutionMode::Map {
            value_identifier,
            value_field,
        } = &self.mode
        {
            if value_identifier.trim().is_empty() {
                return Err(FillError::InvalidConfig(format!(
                    "field '{}' has an empty value_identifier",
                    self.name
                )));
            }
            if value_field.trim().is_empty() {
                return Err(FillError::InvalidConfig(format!(
                    "field '{}' has an empty value_field",
                    self.name
                )));
            }
        }
        Ok(())
    }
}
