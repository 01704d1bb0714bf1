//! Per-form settings (the non-callback half of a form's policy)

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a queued submit treats the submit guard
///
/// With queuing enabled the guard `(!saving && will_submit) || allow_queue`
/// lets every queued submit through without validation. `SkipSavingCheck`
/// keeps validation and only ignores the "already saving" check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuedSubmitGuard {
    #[default]
    BypassGuards,
    SkipSavingCheck,
}

/// Settings for a single form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    pub notify_of_success: bool,
    pub notify_of_error: bool,
    pub successful_submit_message: Option<String>,
    pub failed_submit_message: Option<String>,
    pub did_not_submit_message: Option<String>,
    pub successful_reset_message: Option<String>,
    pub failed_reset_message: Option<String>,
    pub did_not_reset_message: Option<String>,
    pub confirm_destroy_message: Option<String>,
    pub successful_destroy_message: Option<String>,
    pub failed_destroy_message: Option<String>,
    /// Submit after every value update
    pub auto_submit: bool,
    /// A dirty form blocks navigation
    pub prevents_navigation: bool,
    /// Serialize repeated submits instead of rejecting them while saving
    pub allow_submit_queue: bool,
    pub queued_submit_guard: QueuedSubmitGuard,
    /// Include the model's own dirty signal in `is_dirty`
    pub use_model_dirty_tracking: bool,
    pub validation_options: Option<Value>,
    pub model_name: Option<String>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            notify_of_success: true,
            notify_of_error: true,
            successful_submit_message: None,
            failed_submit_message: None,
            did_not_submit_message: None,
            successful_reset_message: None,
            failed_reset_message: None,
            did_not_reset_message: None,
            confirm_destroy_message: None,
            successful_destroy_message: None,
            failed_destroy_message: None,
            auto_submit: false,
            prevents_navigation: true,
            allow_submit_queue: false,
            queued_submit_guard: QueuedSubmitGuard::default(),
            use_model_dirty_tracking: false,
            validation_options: None,
            model_name: None,
        }
    }
}

/// Lowercase, hyphen-separated form of a model name
pub fn dasherize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == ' ' || c == '-' {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
