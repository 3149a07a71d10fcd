//! Channel gating — which class labels feed which accumulator.
//!
//! Channel A is gated by a single membership test. Channel B is gated by its own
//! membership test OR'd with a separate pass-through for the mixed class, so a
//! mixed segment drives both channels in the same run. The pass-through is kept
//! as its own function rather than folded into [`CHANNEL_B_LABELS`]: the general
//! channel-B gate still reports `false` for "mixed".
//!
//! [`CHANNEL_B_LABELS`]: crate::vocabulary::CHANNEL_B_LABELS

use crate::vocabulary::{contains_label, CHANNEL_A_LABELS, CHANNEL_B_LABELS, MIXED_LABEL};

/// Channel A activation for a class label.
pub fn channel_a_active(label: &str) -> bool {
    contains_label(CHANNEL_A_LABELS, label)
}

/// Channel B activation for a class label (general gate, excludes "mixed").
pub fn channel_b_active(label: &str) -> bool {
    contains_label(CHANNEL_B_LABELS, label)
}

/// Pass-through that lets the mixed class drive channel B.
pub fn mixed_passthrough(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case(MIXED_LABEL)
}

/// Gate applied to channel B's input inside the engine.
pub fn channel_b_drive_gate(label: &str) -> bool {
    channel_b_active(label) || mixed_passthrough(label)
}

/// Resolved gate pair for one segment, computed once before the step loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelGates {
    /// Channel A input gate.
    pub a: bool,
    /// Channel B input gate (includes the mixed pass-through).
    pub b: bool,
}

impl ChannelGates {
    /// Resolve both input gates for a class label.
    pub fn for_label(label: &str) -> Self {
        Self {
            a: channel_a_active(label),
            b: channel_b_drive_gate(label),
        }
    }

    /// Activation of channel A as a multiplier (0.0 or 1.0).
    pub fn a_activation(&self) -> f64 {
        if self.a { 1.0 } else { 0.0 }
    }

    /// Activation of channel B as a multiplier (0.0 or 1.0).
    pub fn b_activation(&self) -> f64 {
        if self.b { 1.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a_dominant_gates_only_channel_a() {
        let g = ChannelGates::for_label("A-dominant");
        assert!(g.a);
        assert!(!g.b);
    }

    #[test]
    fn test_b_labels_gate_only_channel_b() {
        for label in ["B-surface", "opposite-dominant"] {
            let g = ChannelGates::for_label(label);
            assert!(!g.a, "label={}", label);
            assert!(g.b, "label={}", label);
        }
    }

    #[test]
    fn test_mixed_asymmetry_is_visible() {
        // The general channel-B gate does not know about "mixed"...
        assert!(!channel_b_active("mixed"));
        // ...but the engine's drive gate lets it through.
        assert!(mixed_passthrough("Mixed"));
        assert!(channel_b_drive_gate("mixed"));
        assert!(channel_a_active("mixed"));
    }

    #[test]
    fn test_unknown_label_is_neutral() {
        for label in ["unknown", "conditional-only", "", "something-else"] {
            let g = ChannelGates::for_label(label);
            assert_eq!(g, ChannelGates { a: false, b: false }, "label={:?}", label);
            assert_eq!(g.a_activation(), 0.0);
            assert_eq!(g.b_activation(), 0.0);
        }
    }
}
