//! Partial-based message templates.
//!
//! A template owns an ordered list of text partials. Each view mode points at
//! one partial by index, and `[message:<field>]` tokens inside a partial are
//! replaced with the message's field values.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use anyhow::{Context, anyhow};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::Renderer;
use crate::models::{FieldDefinition, Message, RenderedContent};

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[message:([a-z0-9_]+)\]").expect("token pattern is valid")
});

/// Template for one message bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub bundle: String,
    #[serde(default)]
    pub partials: Vec<String>,
    /// View mode -> index into `partials`
    #[serde(default)]
    pub view_modes: BTreeMap<String, usize>,
    /// Whether the partials are markup fragments
    #[serde(default)]
    pub markup: bool,
    /// Fields attached to messages of this bundle
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl MessageTemplate {
    pub fn new(bundle: impl Into<String>) -> Self {
        Self {
            bundle: bundle.into(),
            partials: Vec::new(),
            view_modes: BTreeMap::new(),
            markup: false,
            fields: Vec::new(),
        }
    }

    pub fn with_partial(mut self, partial: impl Into<String>) -> Self {
        self.partials.push(partial.into());
        self
    }

    pub fn with_view_mode(mut self, view_mode: impl Into<String>, partial: usize) -> Self {
        self.view_modes.insert(view_mode.into(), partial);
        self
    }

    pub fn with_markup(mut self, markup: bool) -> Self {
        self.markup = markup;
        self
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    fn partial_for(&self, view_mode: &str) -> anyhow::Result<&str> {
        let index = self.view_modes.get(view_mode).ok_or_else(|| {
            anyhow!(
                "Bundle '{}' has no partial for view mode '{}'",
                self.bundle,
                view_mode
            )
        })?;

        self.partials
            .get(*index)
            .map(String::as_str)
            .with_context(|| {
                format!(
                    "View mode '{}' of bundle '{}' points at missing partial {}",
                    view_mode, self.bundle, index
                )
            })
    }
}

/// Renderer backed by a fixed set of [`MessageTemplate`]s
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    templates: HashMap<String, MessageTemplate>,
}

impl TemplateRenderer {
    pub fn new(templates: impl IntoIterator<Item = MessageTemplate>) -> Self {
        Self {
            templates: templates
                .into_iter()
                .map(|template| (template.bundle.clone(), template))
                .collect(),
        }
    }

    pub fn template(&self, bundle: &str) -> Option<&MessageTemplate> {
        self.templates.get(bundle)
    }

    fn replace_tokens(partial: &str, message: &Message) -> String {
        TOKEN_PATTERN
            .replace_all(partial, |caps: &Captures<'_>| match &caps[1] {
                "language" => message.language.clone(),
                "owner" => message.owner_label(),
                "bundle" => message.bundle.clone(),
                field => message
                    .field(field)
                    .map(|value| value.value().to_string())
                    .unwrap_or_default(),
            })
            .into_owned()
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, message: &Message, view_mode: &str) -> anyhow::Result<RenderedContent> {
        let template = self
            .template(&message.bundle)
            .ok_or_else(|| anyhow!("No template registered for bundle '{}'", message.bundle))?;

        let text = Self::replace_tokens(template.partial_for(view_mode)?, message);

        Ok(RenderedContent {
            text,
            markup: template.markup,
        })
    }
}
