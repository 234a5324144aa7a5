//! Application configuration for SearchBridge.
//!
//! User config lives at `~/.searchbridge/searchbridge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SearchBridgeError};
use crate::types::PrincipalType;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "searchbridge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".searchbridge";

// ---------------------------------------------------------------------------
// Config structs (matching searchbridge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Local content source.
    #[serde(default)]
    pub content: ContentConfig,

    /// Documentation site settings (URL derivation).
    #[serde(default)]
    pub docs: DocsConfig,

    /// Remote index connection settings.
    #[serde(default)]
    pub index: IndexConfig,

    /// Ordered ACL override rules; first match wins, the implicit
    /// `everyone` grant applies when no rule matches.
    #[serde(default = "default_acl_rules")]
    pub acl_rules: Vec<AclRuleConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content: ContentConfig::default(),
            docs: DocsConfig::default(),
            index: IndexConfig::default(),
            acl_rules: default_acl_rules(),
        }
    }
}

/// `[content]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory tree holding the markdown sources.
    #[serde(default = "default_content_root")]
    pub root: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_content_root(),
        }
    }
}

fn default_content_root() -> String {
    "content".into()
}

/// `[docs]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Base URL the relative document paths resolve against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Icon shown next to every search result from this source.
    #[serde(default = "default_icon_url")]
    pub icon_url: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            icon_url: default_icon_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://learn.microsoft.com/graph/".into()
}
fn default_icon_url() -> String {
    "https://raw.githubusercontent.com/waldekmastykarz/img/main/microsoft-graph.png".into()
}

/// `[index]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Root URL of the index API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Pre-provisioned connection the items are published into.
    #[serde(default = "default_connection_id")]
    pub connection_id: String,

    /// Name of the env var holding the bearer token (never store the token itself).
    #[serde(default = "default_api_token_env")]
    pub api_token_env: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            connection_id: default_connection_id(),
            api_token_env: default_api_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://graph.microsoft.com/v1.0".into()
}
fn default_connection_id() -> String {
    "msgraphdocs".into()
}
fn default_api_token_env() -> String {
    "SEARCHBRIDGE_API_TOKEN".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[[acl_rules]]` entry — grants applied to documents whose relative path
/// ends with `suffix`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AclRuleConfig {
    /// Exact path suffix to match (e.g. `"use-the-api.md"`).
    pub suffix: String,
    /// Grants replacing the default `everyone` grant for matching documents.
    pub grants: Vec<GrantConfig>,
}

/// `[[acl_rules.grants]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantConfig {
    /// Principal kind: `everyone`, `user`, or `group`.
    #[serde(rename = "type")]
    pub principal_type: PrincipalType,
    /// Principal identifier.
    pub value: String,
}

/// The overrides the connection ships with: two documents restricted to a
/// designated user and group principal respectively.
fn default_acl_rules() -> Vec<AclRuleConfig> {
    vec![
        AclRuleConfig {
            suffix: "use-the-api.md".into(),
            grants: vec![GrantConfig {
                principal_type: PrincipalType::User,
                value: "2e75bd61-7a32-44aa-b8a7-ff051804df25".into(),
            }],
        },
        AclRuleConfig {
            suffix: "traverse-the-graph.md".into(),
            grants: vec![GrantConfig {
                principal_type: PrincipalType::Group,
                value: "a9fd282f-4634-4cba-9dd4-631a2ee83cd3".into(),
            }],
        },
    ]
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Check the config for values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.docs.base_url).map_err(|e| {
            SearchBridgeError::validation(format!(
                "invalid docs.base_url '{}': {e}",
                self.docs.base_url
            ))
        })?;

        Url::parse(&self.index.endpoint).map_err(|e| {
            SearchBridgeError::validation(format!(
                "invalid index.endpoint '{}': {e}",
                self.index.endpoint
            ))
        })?;

        if self.index.connection_id.is_empty() {
            return Err(SearchBridgeError::validation(
                "index.connection_id must not be empty",
            ));
        }

        for rule in &self.acl_rules {
            if rule.suffix.is_empty() {
                return Err(SearchBridgeError::validation(
                    "acl_rules entry has an empty suffix",
                ));
            }
            if rule.grants.is_empty() {
                return Err(SearchBridgeError::validation(format!(
                    "acl_rules entry for suffix '{}' has no grants; \
                     every published item needs at least one grant",
                    rule.suffix
                )));
            }
        }

        Ok(())
    }
}

/// Check that the index API token env var is set and non-empty.
pub fn validate_api_token(config: &AppConfig) -> Result<()> {
    let var_name = &config.index.api_token_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(SearchBridgeError::config(format!(
            "index API token not found. Set the {var_name} environment variable."
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.searchbridge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SearchBridgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.searchbridge/searchbridge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SearchBridgeError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        SearchBridgeError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SearchBridgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SearchBridgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SearchBridgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("root = \"content\""));
        assert!(toml_str.contains("SEARCHBRIDGE_API_TOKEN"));
        assert!(toml_str.contains("msgraphdocs"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.docs.base_url, "https://learn.microsoft.com/graph/");
        assert_eq!(parsed.index.timeout_secs, 30);
        assert_eq!(parsed.acl_rules.len(), 2);
    }

    #[test]
    fn default_acl_rules_match_connection_overrides() {
        let config = AppConfig::default();
        assert_eq!(config.acl_rules[0].suffix, "use-the-api.md");
        assert_eq!(
            config.acl_rules[0].grants[0].principal_type,
            PrincipalType::User
        );
        assert_eq!(config.acl_rules[1].suffix, "traverse-the-graph.md");
        assert_eq!(
            config.acl_rules[1].grants[0].principal_type,
            PrincipalType::Group
        );
    }

    #[test]
    fn acl_rules_parse_from_toml() {
        let toml_str = r#"
[[acl_rules]]
suffix = "internal/runbook.md"

[[acl_rules.grants]]
type = "group"
value = "ops-team-id"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.acl_rules.len(), 1);
        assert_eq!(config.acl_rules[0].suffix, "internal/runbook.md");
        assert_eq!(config.acl_rules[0].grants[0].value, "ops-team-id");
    }

    #[test]
    fn validation_rejects_rule_without_grants() {
        let mut config = AppConfig::default();
        config.acl_rules.push(AclRuleConfig {
            suffix: "orphan.md".into(),
            grants: vec![],
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("orphan.md"));
    }

    #[test]
    fn validation_rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.docs.base_url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn api_token_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.index.api_token_env = "SB_TEST_NONEXISTENT_TOKEN_12345".into();
        let result = validate_api_token(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("token not found"));
    }
}
