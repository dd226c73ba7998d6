//! Move notation types.

use serde::{Deserialize, Serialize};

/// A single move as displayed by the page, e.g. `"e4"` or `"♘f3"`.
pub type MoveNotation = String;

/// Ordered list of played moves. Insertion order is play order.
///
/// Sequences are rebuilt from scratch on every extraction and may contain
/// repeated notations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveSequence(Vec<MoveNotation>);

impl MoveSequence {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, notation: impl Into<MoveNotation>) {
        self.0.push(notation.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoveNotation> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[MoveNotation] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<MoveNotation> {
        self.0
    }
}

impl From<Vec<MoveNotation>> for MoveSequence {
    fn from(moves: Vec<MoveNotation>) -> Self {
        Self(moves)
    }
}

impl<'a> From<&'a [&'a str]> for MoveSequence {
    fn from(moves: &'a [&'a str]) -> Self {
        Self(moves.iter().map(|m| m.to_string()).collect())
    }
}

impl FromIterator<MoveNotation> for MoveSequence {
    fn from_iter<I: IntoIterator<Item = MoveNotation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MoveSequence {
    type Item = MoveNotation;
    type IntoIter = std::vec::IntoIter<MoveNotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MoveSequence {
    type Item = &'a MoveNotation;
    type IntoIter = std::slice::Iter<'a, MoveNotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

/// One recorded ply as read from the host document.
///
/// `text` is `None` when the element could not be read; such nodes are
/// malformed and never produce a notation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlyNode {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub figurine: Option<String>,
}

impl PlyNode {
    /// A plain ply without a figurine marker.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            figurine: None,
        }
    }

    /// A ply carrying a figurine marker.
    pub fn with_figurine(figurine: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            figurine: Some(figurine.into()),
        }
    }

    /// An element that could not be read.
    pub fn malformed() -> Self {
        Self::default()
    }
}
