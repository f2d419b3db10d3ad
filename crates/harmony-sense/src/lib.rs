//! Realtime harmony inference for live instrument input.
//!
//! Takes discrete note-on/note-off events and currently-held-note snapshots
//! and infers two musical signals on different time scales:
//!
//! - **Chord** (fast): which chord is under the fingers right now, detected
//!   against interval templates and debounced by [`ChordTracker`] so finger
//!   transitions don't flicker.
//! - **Scale** (slow): which key the last few seconds of playing imply,
//!   estimated from a recency-weighted pitch-class histogram.
//!
//! The crate is pure computation: no I/O, no clocks of its own. Callers pass
//! explicit `Instant` timestamps, which keeps everything deterministic under
//! test.

pub mod chord_templates;
pub mod detect;
pub mod scale;
pub mod state;
pub mod tracker;
pub mod types;

pub use detect::detect_chord;
pub use scale::detect_scale;
pub use state::NoteState;
pub use tracker::ChordTracker;
pub use types::{Chord, ChordQuality, HeldNotes, NoteEvent, PitchClass, Scale, ScaleMode};
