//! Rendered output passed from the render step to transports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{NotifyError, NotifyResult};
use crate::render::strip_markup;

/// Content produced by the renderer for one view mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedContent {
    pub text: String,
    /// Whether `text` is a markup fragment rather than plain text
    #[serde(default)]
    pub markup: bool,
}

impl RenderedContent {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: false,
        }
    }

    pub fn markup(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: true,
        }
    }

    /// Text with all tags removed, regardless of the markup flag.
    pub fn stripped(&self) -> String {
        strip_markup(&self.text)
    }

    /// Text suitable for plain-text channels.
    pub fn plain_text(&self) -> String {
        if self.markup {
            self.stripped()
        } else {
            self.text.clone()
        }
    }
}

/// Mapping from view mode to rendered content, built fresh per dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedOutput(BTreeMap<String, RenderedContent>);

impl RenderedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, view_mode: impl Into<String>, content: RenderedContent) {
        self.0.insert(view_mode.into(), content);
    }

    pub fn get(&self, view_mode: &str) -> Option<&RenderedContent> {
        self.0.get(view_mode)
    }

    pub fn text(&self, view_mode: &str) -> Option<&str> {
        self.get(view_mode).map(|content| content.text.as_str())
    }

    /// Content for a view mode the transport declared.
    pub fn require(&self, view_mode: &str) -> NotifyResult<&RenderedContent> {
        self.get(view_mode).ok_or_else(|| NotifyError::MissingViewMode {
            view_mode: view_mode.to_string(),
        })
    }

    /// Checks that every listed view mode has been rendered.
    pub fn ensure_covers(&self, view_modes: &[&str]) -> NotifyResult<()> {
        for view_mode in view_modes {
            self.require(view_mode)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RenderedContent)> {
        self.0.iter().map(|(mode, content)| (mode.as_str(), content))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, RenderedContent)> for RenderedOutput {
    fn from_iter<I: IntoIterator<Item = (String, RenderedContent)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
