//! Decision engine — leaky two-channel accumulation with a hysteresis comparator.
//!
//! # The dynamic law
//!
//! Starting from both accumulators at zero and the decision `Off`, each step:
//!
//! ```text
//! acc_a ← (1 − k_dec_a)·acc_a + k_gen_a·(A0 · gate_a)
//! acc_b ← (1 − k_dec_b)·acc_b + k_gen_b·(B0 · gate_b)      gate_b includes the mixed pass-through
//! Pi    ← w_a·acc_a − w_b·acc_b − w_cond·cond − w_g·G
//! D     ← On  if Pi ≥ theta_on
//!         Off if Pi ≤ theta_off
//!         D   otherwise (dead-band)
//! ```
//!
//! Channel A pushes the potential up, channel B pushes it down, and the
//! dead-band keeps the decision from flip-flopping while `Pi` wanders between
//! the two thresholds.
//!
//! # Static snapshot
//!
//! `Pi0` is the same potential evaluated on the raw scores, compared against
//! `theta_on` only. There is no previous state at the snapshot, so no dead-band
//! applies. The snapshot never feeds the dynamic run.
//!
//! # Invariants
//!
//! - No error path: plain floating point, no division.
//! - N ≤ 0 leaves the state at zero / `Off`.
//! - No state survives a run; segments never share state.

use crate::gating::ChannelGates;
use crate::params::ParameterSet;
use crate::segment::SegmentRecord;

// ─── Channel accumulator ────────────────────────────────────────────────────

/// Leaky integrator for one channel.
///
/// With constant drive `x`, gain `k` and decay `d` in (0, 1], the value rises
/// monotonically toward the fixed point `k·x / d`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelAccumulator {
    /// Accumulated evidence.
    pub value: f64,
}

impl ChannelAccumulator {
    /// A fresh accumulator at zero.
    pub fn new() -> Self {
        Self { value: 0.0 }
    }

    /// Apply one decay-then-gain step with the given (already gated) drive.
    pub fn step(&mut self, gain: f64, decay: f64, drive: f64) {
        self.value = (1.0 - decay) * self.value + gain * drive;
    }
}

// ─── Decision + comparator ──────────────────────────────────────────────────

/// Binary decision state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Decision {
    /// Channel A has not become dominant.
    #[default]
    Off,
    /// Channel A is dominant.
    On,
}

impl Decision {
    /// Decision as {0, 1}.
    pub fn as_bit(self) -> u8 {
        match self {
            Decision::Off => 0,
            Decision::On => 1,
        }
    }

    /// `true` for [`Decision::On`].
    pub fn is_on(self) -> bool {
        self == Decision::On
    }

    /// Single-threshold comparison used by the static snapshot.
    pub fn from_threshold(pi: f64, theta_on: f64) -> Self {
        if pi >= theta_on { Decision::On } else { Decision::Off }
    }
}

/// Dead-band comparator: `On` at or above `theta_on`, `Off` at or below
/// `theta_off`, otherwise `prev`.
///
/// The on-threshold is tested first, so with an inverted band (`theta_on <
/// theta_off`) a potential lying in both regions switches on.
pub fn hysteresis(prev: Decision, pi: f64, theta_on: f64, theta_off: f64) -> Decision {
    if pi >= theta_on {
        Decision::On
    } else if pi <= theta_off {
        Decision::Off
    } else {
        prev
    }
}

/// Stateful Schmitt trigger over a stream of potential values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HysteresisGate {
    state: Decision,
    theta_on: f64,
    theta_off: f64,
}

impl HysteresisGate {
    /// A comparator starting `Off`.
    pub fn new(theta_on: f64, theta_off: f64) -> Self {
        Self {
            state: Decision::Off,
            theta_on,
            theta_off,
        }
    }

    /// A comparator using the thresholds of a parameter set.
    pub fn from_params(params: &ParameterSet) -> Self {
        Self::new(params.theta_on, params.theta_off)
    }

    /// Feed one potential value and return the new state.
    pub fn update(&mut self, pi: f64) -> Decision {
        self.state = hysteresis(self.state, pi, self.theta_on, self.theta_off);
        self.state
    }

    /// Current state.
    pub fn state(&self) -> Decision {
        self.state
    }
}

/// Decision potential `w_a·a − w_b·b − w_cond·cond − w_g·g`.
pub fn potential(a: f64, b: f64, cond: f64, g: f64, params: &ParameterSet) -> f64 {
    params.w_a * a - params.w_b * b - params.w_cond * cond - params.w_g * g
}

// ─── Engine state ───────────────────────────────────────────────────────────

/// Per-segment transient state: two accumulators and the decision bit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineState {
    /// Channel A accumulator.
    pub acc_a: ChannelAccumulator,
    /// Channel B accumulator.
    pub acc_b: ChannelAccumulator,
    /// Current decision.
    pub decision: Decision,
}

/// Constant per-segment inputs to every step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepInputs {
    /// Gated channel A drive (`A0 · gate_a`).
    pub drive_a: f64,
    /// Gated channel B drive (`B0 · gate_b`).
    pub drive_b: f64,
    /// Condition flag as 0.0 / 1.0.
    pub cond: f64,
}

impl StepInputs {
    /// Gate a segment's raw scores by its class label.
    pub fn for_segment(segment: &SegmentRecord) -> Self {
        let gates = ChannelGates::for_label(&segment.class);
        Self {
            drive_a: segment.a0 * gates.a_activation(),
            drive_b: segment.b0 * gates.b_activation(),
            cond: segment.cond_value(),
        }
    }
}

/// Engine state after one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepRecord {
    /// Zero-based step index.
    pub step: u32,
    /// Channel A accumulator after this step.
    pub acc_a: f64,
    /// Channel B accumulator after this step.
    pub acc_b: f64,
    /// Potential after this step.
    pub pi: f64,
    /// Decision after this step.
    pub decision: Decision,
}

impl EngineState {
    /// Zero accumulators, decision `Off`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Potential of the current accumulators.
    pub fn potential(&self, inputs: &StepInputs, params: &ParameterSet) -> f64 {
        potential(self.acc_a.value, self.acc_b.value, inputs.cond, params.g, params)
    }

    /// Advance one step and report the resulting state.
    pub fn advance(&mut self, step: u32, inputs: &StepInputs, params: &ParameterSet) -> StepRecord {
        self.acc_a.step(params.k_gen_a, params.k_dec_a, inputs.drive_a);
        self.acc_b.step(params.k_gen_b, params.k_dec_b, inputs.drive_b);
        let pi = self.potential(inputs, params);
        self.decision = hysteresis(self.decision, pi, params.theta_on, params.theta_off);
        StepRecord {
            step,
            acc_a: self.acc_a.value,
            acc_b: self.acc_b.value,
            pi,
            decision: self.decision,
        }
    }
}

// ─── Outcomes ───────────────────────────────────────────────────────────────

/// Decision computed directly from the raw scores.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticSnapshot {
    /// `w_a·A0 − w_b·B0 − w_cond·cond − w_g·G`.
    pub pi0: f64,
    /// `On` iff `pi0 ≥ theta_on`.
    pub decision: Decision,
}

/// Final state of a dynamic run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicOutcome {
    /// Final channel A accumulator.
    pub acc_a: f64,
    /// Final channel B accumulator.
    pub acc_b: f64,
    /// Potential of the final accumulators.
    pub pi: f64,
    /// Final decision.
    pub decision: Decision,
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Evaluates segments against one shared, read-only parameter set.
#[derive(Clone, Copy, Debug)]
pub struct DecisionEngine<'p> {
    params: &'p ParameterSet,
}

impl<'p> DecisionEngine<'p> {
    /// Bind an engine to a parameter set.
    pub fn new(params: &'p ParameterSet) -> Self {
        Self { params }
    }

    /// The parameter set in use.
    pub fn params(&self) -> &'p ParameterSet {
        self.params
    }

    /// Static snapshot from the raw scores. Independent of `steps`.
    pub fn static_snapshot(&self, segment: &SegmentRecord) -> StaticSnapshot {
        let p = self.params;
        let pi0 = potential(segment.a0, segment.b0, segment.cond_value(), p.g, p);
        StaticSnapshot {
            pi0,
            decision: Decision::from_threshold(pi0, p.theta_on),
        }
    }

    /// Run the dynamic process for `params.steps` steps.
    pub fn run(&self, segment: &SegmentRecord) -> DynamicOutcome {
        self.run_with(segment, |_| {})
    }

    /// Run the dynamic process, handing every step's state to `on_step`.
    pub fn run_with<F>(&self, segment: &SegmentRecord, mut on_step: F) -> DynamicOutcome
    where
        F: FnMut(&StepRecord),
    {
        let p = self.params;
        let inputs = StepInputs::for_segment(segment);
        let mut state = EngineState::new();

        // Negative step counts run zero steps.
        let steps = u32::try_from(p.steps).unwrap_or(0);
        for step in 0..steps {
            let record = state.advance(step, &inputs, p);
            log::trace!(
                "segment {} t={} acc_a={:.6} acc_b={:.6} pi={:.6} d={}",
                segment.id,
                step,
                record.acc_a,
                record.acc_b,
                record.pi,
                record.decision.as_bit()
            );
            on_step(&record);
        }

        DynamicOutcome {
            acc_a: state.acc_a.value,
            acc_b: state.acc_b.value,
            pi: state.potential(&inputs, p),
            decision: state.decision,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn collect_steps(engine: &DecisionEngine<'_>, seg: &SegmentRecord) -> (DynamicOutcome, Vec<StepRecord>) {
        let mut steps = Vec::new();
        let out = engine.run_with(seg, |r| steps.push(*r));
        (out, steps)
    }

    // ── Accumulator ──────────────────────────────────────────────────────

    #[test]
    fn test_accumulator_single_step() {
        let mut acc = ChannelAccumulator::new();
        acc.step(0.35, 0.15, 2.0);
        assert!((acc.value - 0.7).abs() < 1e-12, "value={}", acc.value);
        acc.step(0.35, 0.15, 2.0);
        assert!((acc.value - (0.85 * 0.7 + 0.7)).abs() < 1e-12, "value={}", acc.value);
    }

    #[test]
    fn test_accumulator_decays_without_drive() {
        let mut acc = ChannelAccumulator { value: 1.0 };
        for _ in 0..10 {
            let before = acc.value;
            acc.step(0.35, 0.15, 0.0);
            assert!(acc.value < before);
        }
        assert!(acc.value > 0.0);
    }

    #[test]
    fn test_accumulator_approaches_fixed_point() {
        let mut acc = ChannelAccumulator::new();
        for _ in 0..500 {
            acc.step(0.35, 0.15, 2.0);
        }
        let fixed = 0.35 * 2.0 / 0.15;
        assert!((acc.value - fixed).abs() < 1e-9, "value={} fixed={}", acc.value, fixed);
    }

    // ── Comparator ───────────────────────────────────────────────────────

    #[test]
    fn test_hysteresis_regions() {
        assert_eq!(hysteresis(Decision::Off, 1.2, 1.2, 0.6), Decision::On);
        assert_eq!(hysteresis(Decision::On, 0.6, 1.2, 0.6), Decision::Off);
        assert_eq!(hysteresis(Decision::Off, 0.9, 1.2, 0.6), Decision::Off);
        assert_eq!(hysteresis(Decision::On, 0.9, 1.2, 0.6), Decision::On);
    }

    #[test]
    fn test_hysteresis_dead_band_never_toggles() {
        let mut gate = HysteresisGate::new(1.2, 0.6);
        let eps = 1e-3;
        for i in 0..40 {
            let pi = if i % 2 == 0 { 0.6 + eps } else { 1.2 - eps };
            assert_eq!(gate.update(pi), Decision::Off, "step {} pi={}", i, pi);
        }
        assert_eq!(gate.state(), Decision::Off);
    }

    #[test]
    fn test_hysteresis_holds_on_inside_band() {
        let mut gate = HysteresisGate::from_params(&ParameterSet::default());
        assert_eq!(gate.update(1.5), Decision::On);
        assert_eq!(gate.update(0.61), Decision::On);
        assert_eq!(gate.update(1.19), Decision::On);
        assert_eq!(gate.update(0.59), Decision::Off);
        assert_eq!(gate.update(1.0), Decision::Off);
    }

    #[test]
    fn test_equal_thresholds_single_threshold() {
        let mut gate = HysteresisGate::new(1.0, 1.0);
        assert_eq!(gate.update(1.0), Decision::On);
        assert_eq!(gate.update(0.999), Decision::Off);
        assert_eq!(gate.update(1.001), Decision::On);
    }

    #[test]
    fn test_decision_bits() {
        assert_eq!(Decision::Off.as_bit(), 0);
        assert_eq!(Decision::On.as_bit(), 1);
        assert!(Decision::On.is_on());
        assert_eq!(Decision::default(), Decision::Off);
    }

    // ── Static snapshot ──────────────────────────────────────────────────

    #[test]
    fn test_static_snapshot_uses_only_theta_on() {
        let p = ParameterSet::default();
        let engine = DecisionEngine::new(&p);

        // Pi0 = 1.0 lies inside the band: static decision is Off, no dead-band.
        let seg = SegmentRecord::new("s", 1.0, 0.0, false, "A-dominant");
        let snap = engine.static_snapshot(&seg);
        assert!((snap.pi0 - 1.0).abs() < 1e-12);
        assert_eq!(snap.decision, Decision::Off);

        let seg = SegmentRecord::new("s", 1.2, 0.0, false, "A-dominant");
        assert_eq!(engine.static_snapshot(&seg).decision, Decision::On);
    }

    #[test]
    fn test_static_snapshot_ignores_class_and_gating() {
        let p = ParameterSet::default();
        let engine = DecisionEngine::new(&p);
        let seg = SegmentRecord::new("s", 3.0, 1.0, true, "unknown");
        // 3 − 1 − 1.5 = 0.5
        let snap = engine.static_snapshot(&seg);
        assert!((snap.pi0 - 0.5).abs() < 1e-12, "pi0={}", snap.pi0);
    }

    #[test]
    fn test_static_snapshot_independent_of_steps() {
        let seg = SegmentRecord::new("s", 2.0, 0.3, true, "mixed");
        let base = ParameterSet::default();
        let snap = DecisionEngine::new(&base).static_snapshot(&seg);
        for steps in [-5, 0, 1, 12, 100] {
            let p = ParameterSet { steps, ..ParameterSet::default() };
            assert_eq!(DecisionEngine::new(&p).static_snapshot(&seg), snap, "steps={}", steps);
        }
    }

    // ── Dynamic run ──────────────────────────────────────────────────────

    #[test]
    fn test_zero_steps_degenerate_state() {
        let p = ParameterSet { steps: 0, g: 2.0, ..ParameterSet::default() };
        let engine = DecisionEngine::new(&p);
        let seg = SegmentRecord::new("s", 5.0, 1.0, true, "mixed");
        let (out, steps) = collect_steps(&engine, &seg);
        assert!(steps.is_empty());
        assert_eq!(out.acc_a, 0.0);
        assert_eq!(out.acc_b, 0.0);
        assert_eq!(out.decision, Decision::Off);
        // −1.5·1 − 1·2
        assert!((out.pi - (-3.5)).abs() < 1e-12, "pi={}", out.pi);
    }

    #[test]
    fn test_negative_steps_match_zero_steps() {
        let seg = SegmentRecord::new("s", 5.0, 1.0, false, "A-dominant");
        let zero = ParameterSet { steps: 0, ..ParameterSet::default() };
        let negative = ParameterSet { steps: -4, ..ParameterSet::default() };
        assert_eq!(
            DecisionEngine::new(&zero).run(&seg),
            DecisionEngine::new(&negative).run(&seg)
        );
    }

    #[test]
    fn test_monotonic_activation() {
        let p = ParameterSet {
            w_a: 1.0,
            w_b: 1.0,
            w_cond: 1.5,
            w_g: 1.0,
            theta_on: 1.2,
            k_gen_a: 0.5,
            k_dec_a: 0.1,
            steps: 12,
            ..ParameterSet::default()
        };
        let engine = DecisionEngine::new(&p);
        let seg = SegmentRecord::new("s", 10.0, 0.0, false, "A-dominant");
        let (out, steps) = collect_steps(&engine, &seg);
        assert_eq!(steps.len(), 12);

        for pair in steps.windows(2) {
            assert!(
                pair[1].acc_a > pair[0].acc_a,
                "acc_a must rise: t={} {} -> {}",
                pair[1].step,
                pair[0].acc_a,
                pair[1].acc_a
            );
        }

        let first_on = steps
            .iter()
            .position(|r| r.decision == Decision::On)
            .expect("decision never switched on");
        assert!(steps[first_on..].iter().all(|r| r.decision == Decision::On));
        assert_eq!(out.decision, Decision::On);
    }

    #[test]
    fn test_mixed_class_drives_both_channels() {
        let p = ParameterSet::default();
        let engine = DecisionEngine::new(&p);
        let seg = SegmentRecord::new("s", 2.0, 1.0, false, "mixed");
        let (_, steps) = collect_steps(&engine, &seg);
        let first = steps[0];
        assert!(first.acc_a > 0.0, "acc_a={}", first.acc_a);
        assert!(first.acc_b > 0.0, "acc_b={}", first.acc_b);
        assert!((first.acc_a - 0.7).abs() < 1e-12);
        assert!((first.acc_b - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_channel_b_pulls_potential_down() {
        let p = ParameterSet::default();
        let engine = DecisionEngine::new(&p);
        let seg = SegmentRecord::new("s", 5.0, 3.0, false, "B-surface");
        let out = engine.run(&seg);
        assert_eq!(out.acc_a, 0.0);
        assert!(out.acc_b > 0.0);
        assert!(out.pi < 0.0);
        assert_eq!(out.decision, Decision::Off);
    }

    #[test]
    fn test_unknown_class_keeps_accumulators_at_zero() {
        let p = ParameterSet::default();
        let engine = DecisionEngine::new(&p);
        let seg = SegmentRecord::new("s", 5.0, 3.0, true, "novel-label");
        let out = engine.run(&seg);
        assert_eq!(out.acc_a, 0.0);
        assert_eq!(out.acc_b, 0.0);
        assert!((out.pi - (-1.5)).abs() < 1e-12);
    }

    #[test]
    fn test_potential_settling_inside_band_stays_off() {
        // Fixed point of acc_a is 0.35·0.4/0.15 ≈ 0.933, inside (0.6, 1.2).
        let p = ParameterSet { steps: 60, ..ParameterSet::default() };
        let engine = DecisionEngine::new(&p);
        let seg = SegmentRecord::new("s", 0.4, 0.0, false, "A-dominant");
        let (out, steps) = collect_steps(&engine, &seg);
        assert!(steps.iter().any(|r| r.pi > p.theta_off && r.pi < p.theta_on));
        assert!(steps.iter().all(|r| r.decision == Decision::Off));
        assert_eq!(out.decision, Decision::Off);
    }

    #[test]
    fn test_final_potential_matches_last_step() {
        let p = ParameterSet::default();
        let engine = DecisionEngine::new(&p);
        let seg = SegmentRecord::new("s", 2.0, 1.5, true, "mixed");
        let (out, steps) = collect_steps(&engine, &seg);
        let last = steps.last().copied().expect("12 steps");
        assert_eq!(last.step, 11);
        assert_eq!(out.pi, last.pi);
        assert_eq!(out.acc_a, last.acc_a);
        assert_eq!(out.acc_b, last.acc_b);
        assert_eq!(out.decision, last.decision);
    }

    #[test]
    fn test_reference_scenario() {
        let p = ParameterSet::default();
        let engine = DecisionEngine::new(&p);
        let seg = SegmentRecord::new("s1", 2.0, 0.0, false, "A-dominant");
        let (out, steps) = collect_steps(&engine, &seg);

        assert_eq!(out.decision, Decision::On);
        assert_eq!(out.acc_b, 0.0);

        // t=0: acc_a = 0.7 sits inside the band, t=1: 1.295 crosses theta_on.
        assert_eq!(steps[0].decision, Decision::Off);
        assert_eq!(steps[1].decision, Decision::On);

        // Converges: the gap to the fixed point shrinks every step.
        let fixed = p.k_gen_a * seg.a0 / p.k_dec_a;
        for pair in steps.windows(2) {
            assert!((fixed - pair[1].acc_a).abs() < (fixed - pair[0].acc_a).abs());
        }
        let closed = fixed * (1.0 - 0.85_f64.powi(12));
        assert!((out.acc_a - closed).abs() < 1e-9, "acc_a={} closed={}", out.acc_a, closed);
    }

    // ── Unvalidated parameters ───────────────────────────────────────────

    #[test]
    fn test_inverted_band_overlap_switches_on() {
        // 0.7 is both >= theta_on and <= theta_off.
        assert_eq!(hysteresis(Decision::Off, 0.7, 0.5, 1.0), Decision::On);
        assert_eq!(hysteresis(Decision::On, 0.7, 0.5, 1.0), Decision::On);
        assert_eq!(hysteresis(Decision::On, 0.4, 0.5, 1.0), Decision::Off);
    }

    #[test]
    fn test_engine_runs_on_invalid_parameters() {
        let p = ParameterSet {
            theta_on: 0.5,
            theta_off: 1.0,
            k_dec_a: 1.5,
            ..ParameterSet::default()
        };
        assert!(p.validate().is_err());

        let engine = DecisionEngine::new(&p);
        let seg = SegmentRecord::new("s1", 2.0, 0.0, false, "A-dominant");
        let (out, steps) = collect_steps(&engine, &seg);
        assert_eq!(steps.len(), 12);

        // acc <- -0.5 * acc + 0.7 oscillates around 0.7 / 1.5.
        assert!((steps[0].acc_a - 0.7).abs() < 1e-12);
        assert_eq!(steps[0].decision, Decision::On);
        assert!((steps[1].acc_a - 0.35).abs() < 1e-12);
        assert_eq!(steps[1].decision, Decision::Off);

        let closed = 0.7 / 1.5 * (1.0 - 0.5_f64.powi(12));
        assert!((out.acc_a - closed).abs() < 1e-12, "acc_a={} closed={}", out.acc_a, closed);
        assert!((out.pi - closed).abs() < 1e-12, "pi={}", out.pi);
        assert_eq!(out.decision, Decision::Off);
    }
}
