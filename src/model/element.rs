//! Document node handles and the attributes the tracker reads from them.
//!
//! Nodes are owned by the host document. The tracker only ever holds
//! [`NodeId`] handles and asks the host about them through
//! [`crate::host::Document`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a node owned by the host document.
///
/// Identity is the only thing the tracker relies on: two handles are the same
/// node iff they compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a host-assigned handle value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// The node types the tracker distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An element, the only kind that can be watched.
    Element,
    /// Character data; its presence makes the parent capturable.
    Text,
    /// Ignored everywhere.
    Comment,
}

/// Element tag identifier.
///
/// Normalized to ASCII lowercase at construction so `"SCRIPT"` and `"script"`
/// are the same tag. Empty tags are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    /// Smart constructor: trims and lowercases, rejects empty input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidTag> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidTag::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(InvalidTag::ContainsWhitespace(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// The normalized tag name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Tag {
    type Error = InvalidTag;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

/// Why a string is not a usable tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTag {
    /// Empty or whitespace only.
    #[error("Tag cannot be empty")]
    Empty,
    /// Whitespace inside the name.
    #[error("Tag cannot contain whitespace: {0:?}")]
    ContainsWhitespace(String),
}

/// Computed `display` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    /// `block`
    #[default]
    Block,
    /// `inline`
    Inline,
    /// `inline-block`
    InlineBlock,
    /// `flex`
    Flex,
    /// `grid`
    Grid,
    /// `contents`
    Contents,
    /// `list-item`
    ListItem,
    /// `table`
    Table,
    /// Removes the element and its subtree from rendering.
    None,
}

/// Computed `position` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    /// `static`
    #[default]
    Static,
    /// `relative`
    Relative,
    /// `absolute`
    Absolute,
    /// `sticky`
    Sticky,
    /// `fixed`: pinned to the viewport, never scrolls out of view.
    Fixed,
}

/// The slice of computed style the scanner consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComputedStyle {
    /// Computed `display`.
    pub display: Display,
    /// Computed `position`.
    pub position: Position,
}

impl ComputedStyle {
    /// `display: none`, static position.
    pub fn hidden() -> Self {
        Self {
            display: Display::None,
            ..Self::default()
        }
    }

    /// Block display, `position: fixed`.
    pub fn fixed() -> Self {
        Self {
            position: Position::Fixed,
            ..Self::default()
        }
    }

    /// `display: none` hides the element and everything below it.
    pub fn is_hidden(&self) -> bool {
        self.display == Display::None
    }

    /// Fixed elements stay put while the page scrolls.
    pub fn is_fixed(&self) -> bool {
        self.position == Position::Fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_lowercased() {
        let tag = Tag::new("SCRIPT").unwrap();
        assert_eq!(tag.as_str(), "script");
        assert_eq!(tag, Tag::new("script").unwrap());
    }

    #[test]
    fn tag_is_trimmed() {
        assert_eq!(Tag::new("  p ").unwrap().as_str(), "p");
    }

    #[test]
    fn tag_rejects_empty() {
        assert!(matches!(Tag::new(""), Err(InvalidTag::Empty)));
        assert!(matches!(Tag::new("   "), Err(InvalidTag::Empty)));
    }

    #[test]
    fn tag_rejects_inner_whitespace() {
        assert!(matches!(
            Tag::new("my tag"),
            Err(InvalidTag::ContainsWhitespace(_))
        ));
    }

    #[test]
    fn tag_deserializes_through_smart_constructor() {
        let tag: Tag = serde_json::from_str("\"IFRAME\"").unwrap();
        assert_eq!(tag.as_str(), "iframe");

        let err = serde_json::from_str::<Tag>("\"\"");
        assert!(err.is_err(), "empty tag must not deserialize");
    }

    #[test]
    fn computed_style_defaults_are_visible() {
        let style = ComputedStyle::default();
        assert!(!style.is_hidden());
        assert!(!style.is_fixed());
    }

    #[test]
    fn computed_style_parses_kebab_case() {
        let style: ComputedStyle =
            serde_json::from_str(r#"{"display": "inline-block", "position": "fixed"}"#).unwrap();
        assert_eq!(style.display, Display::InlineBlock);
        assert!(style.is_fixed());
    }

    #[test]
    fn computed_style_missing_fields_use_defaults() {
        let style: ComputedStyle = serde_json::from_str(r#"{"display": "none"}"#).unwrap();
        assert!(style.is_hidden());
        assert_eq!(style.position, Position::Static);
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::new(7).to_string(), "node#7");
    }
}
