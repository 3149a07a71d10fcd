//! Segment records — one normalised annotation row.

use alloc::string::String;

/// Position of a segment in its source text, as a (chapter, verse) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocator {
    /// Chapter (major) component.
    pub chapter: String,
    /// Verse (minor) component.
    pub verse: String,
}

impl SourceLocator {
    /// Construct a locator from its two components.
    pub fn new(chapter: impl Into<String>, verse: impl Into<String>) -> Self {
        Self {
            chapter: chapter.into(),
            verse: verse.into(),
        }
    }

    /// `true` if the locator matches the given pair component-wise.
    pub fn matches(&self, chapter: &str, verse: &str) -> bool {
        self.chapter == chapter && self.verse == verse
    }
}

/// A normalised annotation row: identity, two raw scores, condition flag, class.
///
/// Immutable once read; the engine only borrows it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentRecord {
    /// Segment identifier. Deduplication key.
    pub id: String,
    /// Optional source locator (grouping key pair).
    pub locator: Option<SourceLocator>,
    /// Optional author / collection tag.
    pub collection: Option<String>,
    /// Raw channel A score.
    pub a0: f64,
    /// Raw channel B score.
    pub b0: f64,
    /// Condition flag.
    pub cond: bool,
    /// Categorical class label, as read.
    pub class: String,
}

impl SegmentRecord {
    /// Construct a record with no grouping keys.
    pub fn new(id: impl Into<String>, a0: f64, b0: f64, cond: bool, class: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locator: None,
            collection: None,
            a0,
            b0,
            cond,
            class: class.into(),
        }
    }

    /// Attach a source locator.
    pub fn with_locator(mut self, chapter: impl Into<String>, verse: impl Into<String>) -> Self {
        self.locator = Some(SourceLocator::new(chapter, verse));
        self
    }

    /// Attach an author / collection tag.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Condition flag as {0, 1}.
    pub fn cond_bit(&self) -> u8 {
        u8::from(self.cond)
    }

    /// Condition flag as a potential term multiplier.
    pub fn cond_value(&self) -> f64 {
        f64::from(self.cond_bit())
    }
}
