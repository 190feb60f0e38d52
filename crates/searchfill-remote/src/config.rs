use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Settings of the HTTP transport shared by every field of a form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Prefix for relative `fill_url`s, e.g. `https://ci.example.com/jenkins`.
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Extra headers sent with every query, such as a CSRF crumb.
    pub headers: BTreeMap<String, String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 10,
            user_agent: "searchfill/0.1".to_string(),
            headers: BTreeMap::new(),
        }
    }
}
