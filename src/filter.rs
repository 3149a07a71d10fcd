//! Trace selection syntax and trace sampling.
//!
//! A filter spec is a comma-separated list of items:
//!
//! ```text
//! 8:53,7:96,2:10            chapter:verse pairs
//! segment_id=s-0042         explicit segment identifiers
//! 8:53, segment_id=s-0042   both kinds mixed
//! ```
//!
//! Items are trimmed, empty items are ignored, and items that are neither a
//! `segment_id=` assignment nor a `chapter:verse` pair are dropped.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::assemble::{TraceRecord, TraceSelector};
use crate::segment::SegmentRecord;

/// Pairs traced by the published sample.
pub const DEFAULT_SAMPLE_PAIRS: &str = "8:53,7:96,2:10";

/// Default cap on sampled trace rows per (chapter, verse, collection) group.
pub const DEFAULT_MAX_PER_GROUP: usize = 6;

const SEGMENT_ID_PREFIX: &str = "segment_id=";

/// Parsed trace filter: segment ids plus (chapter, verse) pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceFilter {
    pairs: HashSet<(String, String)>,
    segment_ids: HashSet<String>,
}

impl TraceFilter {
    /// Parse a filter spec. Never fails; unrecognised items are ignored.
    pub fn parse(spec: &str) -> Self {
        let mut filter = Self::default();
        for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let has_id_prefix = item
                .get(..SEGMENT_ID_PREFIX.len())
                .is_some_and(|p| p.eq_ignore_ascii_case(SEGMENT_ID_PREFIX));
            if has_id_prefix {
                let id = item[SEGMENT_ID_PREFIX.len()..].trim();
                filter.segment_ids.insert(String::from(id));
            } else if let Some((chapter, verse)) = item.split_once(':') {
                filter
                    .pairs
                    .insert((String::from(chapter.trim()), String::from(verse.trim())));
            } else {
                log::debug!("ignoring trace filter item {:?}", item);
            }
        }
        filter
    }

    /// `true` if the filter selects nothing.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.segment_ids.is_empty()
    }

    /// `true` if this (chapter, verse) pair is listed.
    pub fn contains_pair(&self, chapter: &str, verse: &str) -> bool {
        self.pairs
            .iter()
            .any(|(c, v)| c == chapter && v == verse)
    }

    /// `true` if this segment id is listed.
    pub fn contains_segment_id(&self, id: &str) -> bool {
        self.segment_ids.contains(id)
    }

    /// Number of listed pairs.
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Number of listed segment ids.
    pub fn segment_id_count(&self) -> usize {
        self.segment_ids.len()
    }
}

impl TraceSelector for TraceFilter {
    fn should_trace(&self, segment: &SegmentRecord) -> bool {
        if self.contains_segment_id(&segment.id) {
            return true;
        }
        segment
            .locator
            .as_ref()
            .is_some_and(|loc| self.pairs.iter().any(|(c, v)| loc.matches(c, v)))
    }
}

/// Down-sample trace records to the listed (chapter, verse) pairs, keeping at
/// most `max_per_group` rows per (chapter, verse, collection) group.
///
/// Order is preserved. Records without a locator never match. Segment-id
/// entries of the filter are not consulted.
pub fn sample_traces(traces: &[TraceRecord], filter: &TraceFilter, max_per_group: usize) -> Vec<TraceRecord> {
    let mut counts: HashMap<(&str, &str, &str), usize> = HashMap::new();
    let mut out = Vec::new();

    for record in traces {
        let Some(loc) = record.locator.as_ref() else {
            continue;
        };
        if !filter.contains_pair(&loc.chapter, &loc.verse) {
            continue;
        }
        let collection = record.collection.as_deref().unwrap_or("");
        let count = counts
            .entry((loc.chapter.as_str(), loc.verse.as_str(), collection))
            .or_insert(0);
        *count += 1;
        if *count > max_per_group {
            continue;
        }
        out.push(record.clone());
    }
    out
}
