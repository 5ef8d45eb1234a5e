//! Seams between the adapter and the host page's DOM.
//!
//! The host binds these traits to real elements. Which insertion strategy
//! runs is decided by what the focused element can do, never by which site
//! it is on.

use super::menu::MenuView;

/// A text field exposing a value and a selection (textarea, input).
///
/// Offsets are character indices into `value()`.
pub trait PlainField {
    fn value(&self) -> String;
    fn selection(&self) -> (usize, usize);
    fn set_value(&mut self, value: String);
    fn set_selection(&mut self, start: usize, end: usize);
    fn focus(&mut self);
    /// Fire a bubbling `input` event so the page's own bindings see the edit.
    fn dispatch_input(&mut self);
}

/// A rich editable region (contenteditable editor).
pub trait RichEditable {
    fn focus(&mut self);
    /// Whether the document selection currently holds a range.
    fn has_range(&self) -> bool;
    fn delete_selection(&mut self);
    /// Insert a text node at the range start.
    fn insert_text_node(&mut self, text: &str);
    /// Append a text node after the region's last child.
    fn append_text_node(&mut self, text: &str);
    /// Collapse the selection to just after the node inserted last.
    fn collapse_after_last_insert(&mut self);
    fn dispatch_input(&mut self);
}

/// The focused element, probed by capability.
pub enum Focused<'a> {
    PlainField(&'a mut dyn PlainField),
    RichEditable(&'a mut dyn RichEditable),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient on-page message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
}

/// One supported page as seen by the adapter.
pub trait HostPage {
    fn host(&self) -> String;
    /// Whether the trigger control is currently attached to the document.
    fn has_trigger(&self) -> bool;
    /// Attach the trigger control. Returns false when the page has nowhere
    /// to put it yet.
    fn mount_trigger(&mut self) -> bool;
    fn focused(&mut self) -> Option<Focused<'_>>;
    fn write_clipboard(&mut self, text: &str) -> Result<(), PageError>;
    fn notify(&mut self, notice: Notice);
    fn render_menu(&mut self, view: &MenuView);
    fn close_menu(&mut self);
}
