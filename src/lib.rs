//! # dg-core
//!
//! Decision gate for annotated text segments — leaky two-channel accumulation
//! with a hysteresis comparator.
//!
//! ---
//!
//! ## This is not a threshold on the raw scores. It is a dynamical process.
//!
//! Every segment carries two competing signal scores and a class label. The
//! label decides which signal is allowed to feed which channel; the channels
//! then integrate their input over a fixed number of discrete steps.
//!
//! **Leaky accumulators.** Each channel decays a fixed fraction per step and
//! gains a fixed fraction of its gated input. Evidence builds toward a fixed
//! point instead of arriving all at once.
//!
//! **The potential.** Channel A pushes up, channel B pushes down, and the
//! condition flag and a constant bias pull the whole thing lower:
//! > `Pi = w_a·acc_a − w_b·acc_b − w_cond·cond − w_g·G`
//!
//! **The dead-band.** The decision switches on at `theta_on`, off at
//! `theta_off`, and holds its previous value in between. A potential
//! wandering inside the band never flips the decision.
//!
//! A static snapshot of the same potential on the raw scores is reported next
//! to the dynamic result for comparison.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! raw rows → ColumnMapping → SegmentRecord → DecisionEngine → ResultRecord
//!                 ↑                               ↑      ↘
//!             SchemaMap                     ParameterSet   TraceRecord
//!                                                           ↑
//!                                                     TraceSelector
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`vocabulary`] | [`CHANNEL_A_LABELS`], [`TRUTHY_TOKENS`] | Named label sets and flag tokens |
//! | [`gating`] | [`ChannelGates`] | Class label → channel activation, with the mixed pass-through |
//! | [`params`] | [`ParameterSet`] | Weights, thresholds, rates, bias, step count; optional validation |
//! | [`engine`] | [`DecisionEngine`], [`HysteresisGate`], [`Decision`] | Accumulate, decay, compare |
//! | [`segment`] | [`SegmentRecord`] | One normalised row |
//! | [`assemble`] | [`evaluate`], [`ResultRecord`], [`TraceRecord`] | Dedup, first-occurrence order, tracing |
//! | [`filter`] | [`TraceFilter`] | `"8:53,segment_id=s1"` selectors and trace sampling |
//! | `normalize` | `SchemaMap`, `ColumnMapping` | Column auto-detection and lenient parsing (requires `std`) |
//! | [`error`] | [`ParamError`], [`SchemaError`] | Errors of the layers around the engine |
//!
//! ## Example
//!
//! ```rust
//! use dg_core::{evaluate, Decision, NoTrace, ParameterSet, SegmentRecord};
//!
//! let rows = vec![SegmentRecord::new("s1", 2.0, 0.0, false, "A-dominant")];
//! let run = evaluate(rows, &ParameterSet::default(), &NoTrace);
//! assert_eq!(run.results[0].decision_final, Decision::On);
//! assert_eq!(run.results[0].acc_b_final, 0.0);
//! ```
//!
//! ## `no_std`
//!
//! The engine, gating and assembly are `no_std` + `alloc`. Enable `std` for the
//! row normaliser, `serde` for (de)serialisable records and JSON parameter
//! loading, and `python-ffi` for the Python extension.

#![cfg_attr(not(any(feature = "std", feature = "python-ffi")), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

#[cfg(any(feature = "std", feature = "python-ffi"))]
extern crate std;

pub mod vocabulary;
pub mod gating;
pub mod params;
pub mod engine;
pub mod segment;
pub mod assemble;
pub mod filter;
pub mod error;
#[cfg(feature = "std")]
pub mod normalize;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use assemble::{evaluate, GateRun, NoTrace, ResultRecord, TraceRecord, TraceSelector};
pub use engine::{Decision, DecisionEngine, HysteresisGate};
pub use error::{ParamError, SchemaError};
pub use filter::TraceFilter;
pub use gating::ChannelGates;
pub use params::ParameterSet;
pub use segment::{SegmentRecord, SourceLocator};
pub use vocabulary::{CHANNEL_A_LABELS, TRUTHY_TOKENS};
