//! Equation numbering, `\tag`, `\label` and references

use indexmap::IndexMap;

use super::tree::{NodeId, Tree};
use crate::utils::error::{ErrorKind, ParseResult, TexError};

/// Which equations are numbered automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TagMode {
    /// Only explicit `\tag`s
    #[default]
    None,
    /// Numbered AMS environments (`equation`, `align` ...)
    Ams,
    /// Every displayed equation
    All,
}

/// Side the equation number is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TagSide {
    Left,
    #[default]
    Right,
}

impl TagSide {
    pub fn name(self) -> &'static str {
        match self {
            TagSide::Left => "left",
            TagSide::Right => "right",
        }
    }
}

#[derive(Debug, Clone)]
struct Reference {
    node: NodeId,
    label: String,
    parens: bool,
}

/// Numbering state of one parse
#[derive(Debug, Clone, Default)]
pub struct TagState {
    mode: TagMode,
    counter: u32,
    labels: IndexMap<String, String>,
    tag: Option<(String, bool)>,
    label: Option<String>,
    no_tag: bool,
    display_depth: usize,
    displayed: bool,
    references: Vec<Reference>,
}

impl TagState {
    pub fn new(mode: TagMode) -> Self {
        TagState {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> TagMode {
        self.mode
    }

    /// Number of automatically numbered equations so far
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn labels(&self) -> &IndexMap<String, String> {
        &self.labels
    }

    pub fn has_tag(&self) -> bool {
        self.tag.is_some()
    }

    /// Record `\tag{text}`; `starred` tags are shown without parentheses
    pub fn set_tag(&mut self, text: String, starred: bool) -> ParseResult<()> {
        if self.tag.is_some() {
            return Err(TexError::new(ErrorKind::MultipleCommand, ["\\tag"]));
        }
        self.tag = Some((text, starred));
        Ok(())
    }

    pub fn set_label(&mut self, label: String) -> ParseResult<()> {
        if self.label.is_some() || self.labels.contains_key(&label) {
            return Err(TexError::new(ErrorKind::MultipleLabel, [label]));
        }
        self.label = Some(label);
        Ok(())
    }

    pub fn set_no_tag(&mut self) {
        self.no_tag = true;
    }

    /// Finish the current row: returns the label text to display, if any,
    /// and resets the per-row state
    pub fn row_label(&mut self, numbered: bool) -> Option<String> {
        let label = self.label.take();
        let no_tag = std::mem::take(&mut self.no_tag);
        let (value, shown) = match self.tag.take() {
            Some((text, true)) => (text.clone(), text),
            Some((text, false)) => (text.clone(), format!("({})", text)),
            None if no_tag || !numbered || self.mode == TagMode::None => return None,
            None => {
                self.counter += 1;
                let number = self.counter.to_string();
                (number.clone(), format!("({})", number))
            }
        };
        if let Some(label) = label {
            self.labels.insert(label, value);
        }
        Some(shown)
    }

    /// Enter a display equation structure
    pub fn enter_display(&mut self) -> ParseResult<()> {
        if self.display_depth > 0 {
            return Err(TexError::simple(ErrorKind::ErroneousNestingEq));
        }
        self.display_depth += 1;
        self.displayed = true;
        Ok(())
    }

    pub fn leave_display(&mut self) {
        self.display_depth = self.display_depth.saturating_sub(1);
    }

    pub fn in_display(&self) -> bool {
        self.display_depth > 0
    }

    /// Whether any display structure numbered its own rows
    pub fn used_display(&self) -> bool {
        self.displayed
    }

    /// Remember a `\ref` placeholder to fill once all labels are known
    pub fn add_reference(&mut self, node: NodeId, label: String, parens: bool) {
        self.references.push(Reference {
            node,
            label,
            parens,
        });
    }

    /// Fill reference placeholders; unknown labels show `???`
    pub fn resolve_references(&mut self, tree: &mut Tree) {
        for reference in self.references.drain(..) {
            let text = match self.labels.get(&reference.label) {
                Some(value) if reference.parens => format!("({})", value),
                Some(value) => value.clone(),
                None => "???".to_string(),
            };
            tree.set_token_text(reference.node, &text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_numbering() {
        let mut tags = TagState::new(TagMode::Ams);
        assert_eq!(tags.row_label(true).as_deref(), Some("(1)"));
        assert_eq!(tags.row_label(false), None);
        tags.set_label("second".to_string()).unwrap();
        assert_eq!(tags.row_label(true).as_deref(), Some("(2)"));
        assert_eq!(tags.labels().get("second").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_no_numbering_without_mode() {
        let mut tags = TagState::new(TagMode::None);
        assert_eq!(tags.row_label(true), None);
        tags.set_tag("A".to_string(), false).unwrap();
        assert_eq!(tags.row_label(false).as_deref(), Some("(A)"));
    }

    #[test]
    fn test_starred_tag_and_notag() {
        let mut tags = TagState::new(TagMode::All);
        tags.set_tag("*".to_string(), true).unwrap();
        assert_eq!(tags.row_label(true).as_deref(), Some("*"));
        tags.set_no_tag();
        assert_eq!(tags.row_label(true), None);
        assert_eq!(tags.counter(), 0);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut tags = TagState::new(TagMode::None);
        tags.set_tag("1".to_string(), false).unwrap();
        let err = tags.set_tag("2".to_string(), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MultipleCommand);

        tags.set_label("a".to_string()).unwrap();
        let err = tags.set_label("b".to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MultipleLabel);
    }

    #[test]
    fn test_display_nesting() {
        let mut tags = TagState::new(TagMode::None);
        tags.enter_display().unwrap();
        let err = tags.enter_display().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ErroneousNestingEq);
        tags.leave_display();
        assert!(!tags.in_display());
    }
}
