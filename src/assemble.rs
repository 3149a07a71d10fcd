//! Result assembly — one result per distinct segment, optional per-step traces.
//!
//! [`evaluate`] walks the input in order, skips rows with an empty identifier,
//! evaluates each distinct identifier exactly once (first occurrence wins), and
//! emits traces only for segments the [`TraceSelector`] accepts. Parsing filter
//! syntax is not this module's job; see [`crate::filter::TraceFilter`].

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::engine::{Decision, DecisionEngine, StepRecord};
use crate::params::ParameterSet;
use crate::segment::{SegmentRecord, SourceLocator};
use crate::vocabulary::is_known_label;

// ─── Trace selection seam ───────────────────────────────────────────────────

/// Membership test deciding which segments produce trace records.
pub trait TraceSelector {
    /// `true` if every step of this segment should be traced.
    fn should_trace(&self, segment: &SegmentRecord) -> bool;
}

impl<F> TraceSelector for F
where
    F: Fn(&SegmentRecord) -> bool,
{
    fn should_trace(&self, segment: &SegmentRecord) -> bool {
        self(segment)
    }
}

/// Selector that traces nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTrace;

impl TraceSelector for NoTrace {
    fn should_trace(&self, _segment: &SegmentRecord) -> bool {
        false
    }
}

// ─── Records ────────────────────────────────────────────────────────────────

/// Final per-segment result, with enough echo to reproduce it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultRecord {
    /// Segment identifier.
    pub segment_id: String,
    /// Source locator, if the row had one.
    pub locator: Option<SourceLocator>,
    /// Author / collection tag, if the row had one.
    pub collection: Option<String>,
    /// Class label as read.
    pub class: String,
    /// Condition flag as {0, 1}.
    pub cond: u8,
    /// Raw channel A score.
    pub a0: f64,
    /// Raw channel B score.
    pub b0: f64,
    /// Static potential from the raw scores.
    pub pi0_static: f64,
    /// Static decision (`pi0_static ≥ theta_on`).
    pub decision_static: Decision,
    /// Step count the dynamic run used.
    pub steps: i32,
    /// Final channel A accumulator.
    pub acc_a_final: f64,
    /// Final channel B accumulator.
    pub acc_b_final: f64,
    /// Potential of the final accumulators.
    pub pi_final: f64,
    /// Final dynamic decision.
    pub decision_final: Decision,
    /// Parameter set used for this result.
    pub params: ParameterSet,
}

/// Engine state of one traced segment at one step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceRecord {
    /// Zero-based step index.
    pub step: u32,
    /// Segment identifier.
    pub segment_id: String,
    /// Source locator, if the row had one.
    pub locator: Option<SourceLocator>,
    /// Author / collection tag, if the row had one.
    pub collection: Option<String>,
    /// Class label as read.
    pub class: String,
    /// Condition flag as {0, 1}.
    pub cond: u8,
    /// Raw channel A score.
    pub a0: f64,
    /// Raw channel B score.
    pub b0: f64,
    /// Channel A accumulator after this step.
    pub acc_a: f64,
    /// Channel B accumulator after this step.
    pub acc_b: f64,
    /// Potential after this step.
    pub pi: f64,
    /// Decision after this step.
    pub decision: Decision,
}

impl TraceRecord {
    fn from_step(segment: &SegmentRecord, step: &StepRecord) -> Self {
        Self {
            step: step.step,
            segment_id: segment.id.clone(),
            locator: segment.locator.clone(),
            collection: segment.collection.clone(),
            class: segment.class.clone(),
            cond: segment.cond_bit(),
            a0: segment.a0,
            b0: segment.b0,
            acc_a: step.acc_a,
            acc_b: step.acc_b,
            pi: step.pi,
            decision: step.decision,
        }
    }
}

/// Output of one evaluation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GateRun {
    /// One result per distinct segment id, in first-appearance order.
    pub results: Vec<ResultRecord>,
    /// Trace records for selected segments, grouped by segment, in step order.
    pub traces: Vec<TraceRecord>,
}

impl GateRun {
    /// Number of results whose final dynamic decision is `On`.
    pub fn count_on(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.decision_final.is_on())
            .count()
    }

    /// Look up a result by segment identifier.
    pub fn find(&self, segment_id: &str) -> Option<&ResultRecord> {
        self.results.iter().find(|r| r.segment_id == segment_id)
    }
}

// ─── Evaluation ─────────────────────────────────────────────────────────────

/// Evaluate a single segment, appending its trace if `traced`.
pub fn evaluate_segment(
    engine: &DecisionEngine<'_>,
    segment: &SegmentRecord,
    traced: bool,
    traces: &mut Vec<TraceRecord>,
) -> ResultRecord {
    let snapshot = engine.static_snapshot(segment);
    let outcome = if traced {
        engine.run_with(segment, |step| traces.push(TraceRecord::from_step(segment, step)))
    } else {
        engine.run(segment)
    };
    let params = engine.params();

    ResultRecord {
        segment_id: segment.id.clone(),
        locator: segment.locator.clone(),
        collection: segment.collection.clone(),
        class: segment.class.clone(),
        cond: segment.cond_bit(),
        a0: segment.a0,
        b0: segment.b0,
        pi0_static: snapshot.pi0,
        decision_static: snapshot.decision,
        steps: params.steps,
        acc_a_final: outcome.acc_a,
        acc_b_final: outcome.acc_b,
        pi_final: outcome.pi,
        decision_final: outcome.decision,
        params: params.clone(),
    }
}

/// Evaluate an ordered stream of segments.
///
/// - Identifiers are trimmed once; results, traces and the selector all see
///   the trimmed form.
/// - Rows whose identifier is empty after trimming are skipped.
/// - Repeated identifiers are skipped; the first occurrence's values win.
/// - Empty input yields an empty [`GateRun`].
pub fn evaluate<I, S>(rows: I, params: &ParameterSet, selector: &S) -> GateRun
where
    I: IntoIterator<Item = SegmentRecord>,
    S: TraceSelector + ?Sized,
{
    let engine = DecisionEngine::new(params);
    let mut seen: HashSet<String> = HashSet::new();
    let mut run = GateRun::default();
    let mut duplicates = 0usize;
    let mut blank = 0usize;
    let mut traced_segments = 0usize;

    for mut segment in rows {
        // The trimmed id is the identity everywhere downstream.
        let id = segment.id.trim();
        if id.is_empty() {
            blank += 1;
            continue;
        }
        if id.len() != segment.id.len() {
            segment.id = String::from(id);
        }
        if !seen.insert(segment.id.clone()) {
            log::debug!("skipping repeated segment id {}", segment.id);
            duplicates += 1;
            continue;
        }

        if !is_known_label(&segment.class) {
            log::debug!(
                "segment {} has unrecognised class {:?}; both channels closed",
                segment.id,
                segment.class
            );
        }

        let traced = selector.should_trace(&segment);
        if traced {
            traced_segments += 1;
        }
        let result = evaluate_segment(&engine, &segment, traced, &mut run.traces);
        run.results.push(result);
    }

    log::debug!(
        "evaluated {} segments ({} on), skipped {} duplicates and {} blank ids, traced {} segments / {} rows",
        run.results.len(),
        run.count_on(),
        duplicates,
        blank,
        traced_segments,
        run.traces.len()
    );
    run
}
