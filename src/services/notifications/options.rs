//! Dispatch options and their merge rules.
//!
//! Options travel as a JSON object keyed by kebab-case names. Layers are
//! merged key by key (built-in defaults, then registry defaults, then the
//! per-call options) and the result is deserialized into typed structs.
//! Keys a struct does not know are ignored.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::error::{NotifyError, NotifyResult};

pub type OptionMap = Map<String, JsonValue>;

pub const SAVE_ON_SUCCESS: &str = "save-on-success";
pub const SAVE_ON_FAIL: &str = "save-on-fail";
pub const RENDERED_FIELDS: &str = "rendered-fields";
pub const LOG_ON_FAIL: &str = "log-on-fail";
pub const LOG_ON_SUCCESS: &str = "log-on-success";
pub const MAIL_OVERRIDE: &str = "mail-override";
pub const LANGUAGE_OVERRIDE: &str = "language-override";
pub const PHONE_NUMBER: &str = "phone-number";
pub const WEBHOOK_URL: &str = "webhook-url";

/// Per-call options passed to the dispatcher
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOptions(OptionMap);

impl DispatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &OptionMap {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<OptionMap> for DispatchOptions {
    fn from(map: OptionMap) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for DispatchOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Merges option layers; later layers win key by key.
pub fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a OptionMap>) -> OptionMap {
    let mut merged = OptionMap::new();
    for layer in layers {
        for (key, value) in layer {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Defaults shared by every transport.
pub fn common_defaults() -> OptionMap {
    [
        (SAVE_ON_SUCCESS, true),
        (SAVE_ON_FAIL, false),
        (LOG_ON_FAIL, true),
        (LOG_ON_SUCCESS, false),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), JsonValue::Bool(value)))
    .collect()
}

/// Deserializes merged options into `T`.
///
/// A recognized key holding a value of the wrong type is reported as a
/// configuration error naming that key.
pub fn parse_options<T: DeserializeOwned>(options: &OptionMap) -> NotifyResult<T> {
    serde_json::from_value(JsonValue::Object(options.clone()))
        .map_err(|e| NotifyError::configuration(offending_key::<T>(options), e.to_string()))
}

/// Finds the key whose value alone fails to deserialize into `T`. Every
/// option struct defaults all of its fields, so a single-entry map only fails
/// when that entry is malformed.
fn offending_key<T: DeserializeOwned>(options: &OptionMap) -> String {
    options
        .iter()
        .find(|(key, value)| {
            let mut single = OptionMap::new();
            single.insert((*key).clone(), (*value).clone());
            serde_json::from_value::<T>(JsonValue::Object(single)).is_err()
        })
        .map(|(key, _)| key.clone())
        .unwrap_or_else(|| "options".to_string())
}

fn default_true() -> bool {
    true
}

/// Options every transport understands
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommonOptions {
    #[serde(default = "default_true")]
    pub save_on_success: bool,
    #[serde(default)]
    pub save_on_fail: bool,
    /// View mode -> destination field
    #[serde(default)]
    pub rendered_fields: Option<BTreeMap<String, String>>,
    #[serde(default = "default_true")]
    pub log_on_fail: bool,
    #[serde(default)]
    pub log_on_success: bool,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            save_on_success: true,
            save_on_fail: false,
            rendered_fields: None,
            log_on_fail: true,
            log_on_success: false,
        }
    }
}

impl CommonOptions {
    pub fn should_save(&self, delivered: bool) -> bool {
        (delivered && self.save_on_success) || (!delivered && self.save_on_fail)
    }
}
