//! Rendering collaborator.
//!
//! The dispatcher asks a [`Renderer`] for one piece of content per view mode
//! a transport declares. [`TemplateRenderer`] is the bundled implementation
//! driven by message templates from the settings file.

mod template;

pub use template::{MessageTemplate, TemplateRenderer};

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Message, RenderedContent};

/// Turns a message into content for a named view mode.
pub trait Renderer: Send + Sync {
    fn render(&self, message: &Message, view_mode: &str) -> anyhow::Result<RenderedContent>;
}

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

/// Removes markup tags and decodes the basic character entities.
pub fn strip_markup(input: &str) -> String {
    let without_tags = TAG_PATTERN.replace_all(input, "");
    without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
