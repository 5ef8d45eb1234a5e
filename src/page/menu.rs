//! What the dropdown shows.

use crate::config::Config;
use crate::contexts::Context;

pub const EMPTY_MESSAGE: &str = "No contexts found. Add some via the extension popup.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub tooltip: String,
}

impl MenuItem {
    pub fn from_context(context: &Context, config: &Config) -> Self {
        Self {
            id: context.id.clone(),
            title: context.title.clone(),
            preview: truncate(&context.body, config.preview_chars),
            tooltip: context.body.chars().take(config.tooltip_chars).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuView {
    Loading,
    Populated(Vec<MenuItem>),
    Empty,
    /// Contexts could not be loaded at all. Offers a retry.
    Error { message: String },
}

impl MenuView {
    pub fn from_contexts<'a>(contexts: impl IntoIterator<Item = &'a Context>, config: &Config) -> Self {
        let items: Vec<MenuItem> = contexts
            .into_iter()
            .map(|c| MenuItem::from_context(c, config))
            .collect();
        if items.is_empty() {
            MenuView::Empty
        } else {
            MenuView::Populated(items)
        }
    }

    pub fn can_retry(&self) -> bool {
        matches!(self, MenuView::Error { .. })
    }
}

/// First `max` characters of `text`, with `…` appended when anything was cut.
pub fn truncate(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
