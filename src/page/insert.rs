//! Text insertion into the focused element, with a clipboard fallback.

use super::dom::{Focused, HostPage, Notice, PlainField, RichEditable};

pub const COPIED_NOTICE: &str = "Context copied to clipboard. Paste it into the chat input.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    PlainField,
    RichEditable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(TargetKind),
    /// No usable input was focused; the text went to the clipboard.
    Copied,
    Failed(String),
}

impl InsertOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self, InsertOutcome::Failed(_))
    }
}

/// Replace the character range `start..end` of `value` with `text`.
///
/// Bounds are clamped to the value and reversed bounds are swapped. Returns
/// the new value and the caret position just after the inserted text.
pub fn splice(value: &str, start: usize, end: usize, text: &str) -> (String, usize) {
    let len = value.chars().count();
    let (start, end) = (start.min(len), end.min(len));
    let (start, end) = if start <= end { (start, end) } else { (end, start) };

    let byte = |n: usize| value.char_indices().nth(n).map_or(value.len(), |(i, _)| i);
    let mut out = String::with_capacity(value.len() + text.len());
    out.push_str(&value[..byte(start)]);
    out.push_str(text);
    out.push_str(&value[byte(end)..]);
    (out, start + text.chars().count())
}

pub fn insert_into_plain(field: &mut dyn PlainField, text: &str) {
    field.focus();
    let (start, end) = field.selection();
    let (value, caret) = splice(&field.value(), start, end, text);
    field.set_value(value);
    field.set_selection(caret, caret);
    field.dispatch_input();
}

pub fn insert_into_rich(editable: &mut dyn RichEditable, text: &str) {
    editable.focus();
    if editable.has_range() {
        editable.delete_selection();
        editable.insert_text_node(text);
    } else {
        editable.append_text_node(text);
    }
    editable.collapse_after_last_insert();
    editable.dispatch_input();
}

/// Insert `text` into whatever is focused, else copy it to the clipboard.
pub fn insert_text<P: HostPage + ?Sized>(page: &mut P, text: &str) -> InsertOutcome {
    match page.focused() {
        Some(Focused::PlainField(field)) => {
            insert_into_plain(field, text);
            return InsertOutcome::Inserted(TargetKind::PlainField);
        }
        Some(Focused::RichEditable(editable)) => {
            insert_into_rich(editable, text);
            return InsertOutcome::Inserted(TargetKind::RichEditable);
        }
        None => {}
    }

    match page.write_clipboard(text) {
        Ok(()) => {
            page.notify(Notice::info(COPIED_NOTICE));
            InsertOutcome::Copied
        }
        Err(err) => {
            tracing::warn!(error = %err, "no input focused and clipboard unavailable");
            page.notify(Notice::error(format!("Could not insert context: {err}")));
            InsertOutcome::Failed(err.to_string())
        }
    }
}
