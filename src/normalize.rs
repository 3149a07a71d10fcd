//! Row normalisation — heterogeneous annotation rows to [`SegmentRecord`]s.
//!
//! Annotation exports disagree on column names (`ABL_score`, `abl score`,
//! `score_sure`, …). A [`SchemaMap`] holds, per canonical field, a list of
//! candidate names, an optional case-insensitive regular-expression fallback,
//! and a fixed fallback name. Resolving it against a header yields a
//! [`ColumnMapping`], which then turns each row into a [`SegmentRecord`]
//! without ever failing:
//!
//! - numbers are trimmed, accept a comma decimal separator, and fall back to
//!   0.0 when empty or unparsable;
//! - the condition flag is 1 only for the tokens in [`TRUTHY_TOKENS`];
//! - missing text fields become empty strings.
//!
//! Requires the `std` feature.
//!
//! [`TRUTHY_TOKENS`]: crate::vocabulary::TRUTHY_TOKENS

use std::collections::{BTreeMap, HashMap};

use regex::RegexBuilder;

use crate::error::SchemaError;
use crate::segment::{SegmentRecord, SourceLocator};
use crate::vocabulary::parse_flag;

// ─── Row sources ────────────────────────────────────────────────────────────

/// A raw record: field name → string value.
pub trait RowSource {
    /// Value of a field, if present.
    fn field(&self, name: &str) -> Option<&str>;
}

impl<S: std::hash::BuildHasher> RowSource for HashMap<String, String, S> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl RowSource for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> RowSource for [(K, V)] {
    fn field(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_ref())
    }
}

impl<K: AsRef<str>, V: AsRef<str>> RowSource for Vec<(K, V)> {
    fn field(&self, name: &str) -> Option<&str> {
        self.as_slice().field(name)
    }
}

// ─── Canonical fields ───────────────────────────────────────────────────────

/// The quantities the engine needs from a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    /// Segment identifier.
    SegmentId,
    /// Author / collection tag.
    Collection,
    /// Locator major component.
    Chapter,
    /// Locator minor component.
    Verse,
    /// Raw channel A score.
    ScoreA,
    /// Raw channel B score.
    ScoreB,
    /// Condition flag.
    Condition,
    /// Class label.
    Class,
}

impl CanonicalField {
    /// All canonical fields, in schema order.
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::SegmentId,
        CanonicalField::Collection,
        CanonicalField::Chapter,
        CanonicalField::Verse,
        CanonicalField::ScoreA,
        CanonicalField::ScoreB,
        CanonicalField::Condition,
        CanonicalField::Class,
    ];

    /// Stable name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::SegmentId => "segment_id",
            CanonicalField::Collection => "collection",
            CanonicalField::Chapter => "chapter",
            CanonicalField::Verse => "verse",
            CanonicalField::ScoreA => "score_a",
            CanonicalField::ScoreB => "score_b",
            CanonicalField::Condition => "condition",
            CanonicalField::Class => "class",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

// ─── Schema ─────────────────────────────────────────────────────────────────

/// How one canonical field is located in a header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Exact names, compared case-insensitively, in priority order.
    pub candidates: Vec<String>,
    /// Case-insensitive regular expression tried when no candidate is present.
    pub pattern: Option<String>,
    /// Name used when nothing matches.
    pub fallback: String,
}

impl ColumnSpec {
    /// Spec with candidates and a fallback name, no pattern.
    pub fn new(candidates: &[&str], fallback: &str) -> Self {
        Self {
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            pattern: None,
            fallback: fallback.to_string(),
        }
    }

    /// Add a regular-expression fallback.
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    fn resolve<S: AsRef<str>>(&self, field: CanonicalField, names: &[S]) -> Result<String, SchemaError> {
        for cand in &self.candidates {
            // Later duplicates (by case-folded name) shadow earlier ones.
            if let Some(hit) = names
                .iter()
                .rev()
                .find(|n| n.as_ref().eq_ignore_ascii_case(cand))
            {
                log::debug!("{} -> {:?} (candidate)", field.name(), hit.as_ref());
                return Ok(hit.as_ref().to_string());
            }
        }

        if let Some(pattern) = &self.pattern {
            let rx = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| SchemaError::InvalidPattern {
                    field: field.name(),
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
            if let Some(hit) = names.iter().find(|n| rx.is_match(n.as_ref())) {
                log::debug!("{} -> {:?} (pattern /{}/)", field.name(), hit.as_ref(), pattern);
                return Ok(hit.as_ref().to_string());
            }
        }

        log::debug!("{} -> {:?} (fallback)", field.name(), self.fallback);
        Ok(self.fallback.clone())
    }
}

/// Column specs for every canonical field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaMap {
    specs: [ColumnSpec; 8],
}

impl SchemaMap {
    /// The schema of the annotation exports this crate was built for.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the spec for one field.
    pub fn with_spec(mut self, field: CanonicalField, spec: ColumnSpec) -> Self {
        self.specs[field.index()] = spec;
        self
    }

    /// The spec for one field.
    pub fn spec(&self, field: CanonicalField) -> &ColumnSpec {
        &self.specs[field.index()]
    }

    /// Resolve every canonical field against a header.
    pub fn resolve<S: AsRef<str>>(&self, field_names: &[S]) -> Result<ColumnMapping, SchemaError> {
        let mut columns: [String; 8] = Default::default();
        for field in CanonicalField::ALL {
            columns[field.index()] = self.spec(field).resolve(field, field_names)?;
        }
        Ok(ColumnMapping { columns })
    }
}

impl Default for SchemaMap {
    fn default() -> Self {
        Self {
            specs: [
                ColumnSpec::new(&["segment_id", "id", "seg_id", "segment"], "segment_id"),
                ColumnSpec::new(&["meal_slug", "author", "score_author"], "meal_slug"),
                ColumnSpec::new(&["sure", "score_sure"], "sure").with_pattern(r"\bsure\b"),
                ColumnSpec::new(&["ayet", "score_ayet"], "ayet").with_pattern(r"\bayet\b"),
                ColumnSpec::new(&["ABL_score", "abl_score"], "ABL_score")
                    .with_pattern(r"\babl[_ ]?score\b"),
                ColumnSpec::new(&["DAT_score", "dat_score"], "DAT_score")
                    .with_pattern(r"\bdat[_ ]?score\b"),
                ColumnSpec::new(&["sart_flag", "cond_flag"], "sart_flag").with_pattern("sart"),
                ColumnSpec::new(&["class", "cls", "label"], "class"),
            ],
        }
    }
}

// ─── Column mapping ─────────────────────────────────────────────────────────

/// Concrete source column for every canonical field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: [String; 8],
}

impl ColumnMapping {
    /// Source column name for a canonical field.
    pub fn column(&self, field: CanonicalField) -> &str {
        &self.columns[field.index()]
    }

    fn text<'r, R: RowSource + ?Sized>(&self, row: &'r R, field: CanonicalField) -> &'r str {
        row.field(self.column(field)).unwrap_or("").trim()
    }

    /// Normalise one row. Never fails.
    pub fn normalize<R: RowSource + ?Sized>(&self, row: &R) -> SegmentRecord {
        let chapter = self.text(row, CanonicalField::Chapter);
        let verse = self.text(row, CanonicalField::Verse);
        let collection = self.text(row, CanonicalField::Collection);

        let mut record = SegmentRecord::new(
            self.text(row, CanonicalField::SegmentId),
            parse_lenient_f64(row.field(self.column(CanonicalField::ScoreA)), 0.0),
            parse_lenient_f64(row.field(self.column(CanonicalField::ScoreB)), 0.0),
            parse_flag(self.text(row, CanonicalField::Condition)) == 1,
            self.text(row, CanonicalField::Class),
        );
        // A row carrying either locator column gets a locator, even if both are blank.
        let has_locator = row.field(self.column(CanonicalField::Chapter)).is_some()
            || row.field(self.column(CanonicalField::Verse)).is_some();
        if has_locator {
            record.locator = Some(SourceLocator::new(chapter, verse));
        }
        if !collection.is_empty() {
            record.collection = Some(collection.to_string());
        }
        record
    }
}

// ─── Lenient parsing ────────────────────────────────────────────────────────

/// Parse a number leniently: trim, accept `,` as the decimal separator, and
/// return `default` for missing, empty or unparsable input.
pub fn parse_lenient_f64(raw: Option<&str>, default: f64) -> f64 {
    let s = raw.unwrap_or("").trim();
    if s.is_empty() {
        return default;
    }
    s.replace(',', ".").parse().unwrap_or(default)
}

/// Resolve the schema against `field_names` and normalise every row.
pub fn normalize_rows<S, R>(
    field_names: &[S],
    rows: &[R],
    schema: &SchemaMap,
) -> Result<Vec<SegmentRecord>, SchemaError>
where
    S: AsRef<str>,
    R: RowSource,
{
    let mapping = schema.resolve(field_names)?;
    Ok(rows.iter().map(|row| mapping.normalize(row)).collect())
}
