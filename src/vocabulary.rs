//! Fixed vocabularies — class labels that drive each channel and truthy flag tokens.
//!
//! Every literal the gate depends on lives here as a named constant set. The
//! engine never compares against a string literal directly; it asks this module.
//!
//! Labels are matched case-insensitively after trimming surrounding whitespace,
//! so `"  Mixed "` and `"mixed"` are the same label. Comparison is ASCII-only
//! and allocation-free.
//!
//! # Extending
//!
//! Adding a spelling to a set changes which segments a channel sees, but never
//! the control flow of the engine. The corpus spellings (`abl_dominant`,
//! `teleological_surface`, `dat_dominant`) are carried alongside the canonical
//! names so annotation exports can be fed through unchanged.

/// Class labels that activate channel A (the channel pushing toward `On`).
pub const CHANNEL_A_LABELS: &[&str] = &["A-dominant", "mixed", "abl_dominant"];

/// Class labels that activate channel B (the channel pushing toward `Off`).
pub const CHANNEL_B_LABELS: &[&str] = &[
    "B-surface",
    "opposite-dominant",
    "teleological_surface",
    "dat_dominant",
];

/// The mixed class. Drives channel B through its own pass-through gate even
/// though it is not a member of [`CHANNEL_B_LABELS`].
pub const MIXED_LABEL: &str = "mixed";

/// Labels that exist in the annotation vocabulary but activate neither channel.
pub const NEUTRAL_LABELS: &[&str] = &["conditional-only", "conditional_only", "unknown"];

/// Tokens parsed as a raised condition flag. Anything else is 0.
pub const TRUTHY_TOKENS: &[&str] = &["1", "1.0", "true", "t", "yes", "y"];

/// Case-insensitive membership test of a (possibly padded) label against a set.
pub fn contains_label(set: &[&str], label: &str) -> bool {
    let label = label.trim();
    set.iter().any(|s| s.eq_ignore_ascii_case(label))
}

/// `true` if the label belongs to any of the known sets.
pub fn is_known_label(label: &str) -> bool {
    contains_label(CHANNEL_A_LABELS, label)
        || contains_label(CHANNEL_B_LABELS, label)
        || contains_label(NEUTRAL_LABELS, label)
}

/// Parse a condition flag token into {0, 1}.
pub fn parse_flag(token: &str) -> u8 {
    u8::from(contains_label(TRUTHY_TOKENS, token))
}
