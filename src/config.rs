//! Configuration handling for the form engine

use crate::form::FormSettings;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_NAVIGATION_MESSAGE: &str =
    "You have unsaved changes, are you sure you want to leave?";
const DEFAULT_CONFIRM_DESTROY_MESSAGE: &str = "Are you sure you want to destroy this?";

/// Deployment-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FormForConfig {
    /// Settings every new form starts from
    pub defaults: Option<FormSettings>,
    /// Prompt shown before leaving dirty forms
    pub navigation_message: Option<String>,
    /// Prompt shown before destroying a record
    pub confirm_destroy_message: Option<String>,
}

impl FormForConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "form-for", "form-for")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the user config directory
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`, falling back to defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: FormForConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the user config directory
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    pub fn form_defaults(&self) -> FormSettings {
        self.defaults.clone().unwrap_or_default()
    }

    pub fn navigation_message(&self) -> &str {
        self.navigation_message
            .as_deref()
            .unwrap_or(DEFAULT_NAVIGATION_MESSAGE)
    }

    pub fn confirm_destroy_message(&self) -> &str {
        self.confirm_destroy_message
            .as_deref()
            .unwrap_or(DEFAULT_CONFIRM_DESTROY_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FormForConfig::default();
        assert!(config.defaults.is_none());
        assert_eq!(config.navigation_message(), DEFAULT_NAVIGATION_MESSAGE);
        assert_eq!(
            config.confirm_destroy_message(),
            DEFAULT_CONFIRM_DESTROY_MESSAGE
        );
        assert_eq!(config.form_defaults(), FormSettings::default());
    }

    #[test]
    fn test_serialization() {
        let config = FormForConfig {
            defaults: Some(FormSettings {
                allow_submit_queue: true,
                ..Default::default()
            }),
            navigation_message: Some("Leave?".to_string()),
            confirm_destroy_message: None,
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: FormForConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
        assert!(parsed.form_defaults().allow_submit_queue);
        assert_eq!(parsed.navigation_message(), "Leave?");
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed: FormForConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, FormForConfig::default());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        // Should ignore unknown fields
        let json = r#"{"navigation_message": "Stay", "button_classes": "btn"}"#;
        let parsed: FormForConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.navigation_message(), "Stay");
    }

    #[test]
    fn test_load_from_missing_path_is_default() {
        let path = std::env::temp_dir().join("form-for-missing-config-does-not-exist.json");
        let config = FormForConfig::load_from(&path).unwrap();
        assert_eq!(config, FormForConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "form-for-config-test-{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"{"defaults": {"auto_submit": true}}"#).unwrap();
        let config = FormForConfig::load_from(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert!(config.form_defaults().auto_submit);
        assert!(config.form_defaults().notify_of_success);
    }
}
