use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::detect::detect_chord;
use crate::types::{Chord, HeldNotes};

/// Debounced chord tracking with stability and hold windows.
///
/// Raw detection flickers while fingers move between shapes. The tracker
/// decouples detection jitter from perceptual chord changes with two time
/// constants:
///
/// - **stability**: a newly seen chord must persist this long before it is
///   eligible to become the accepted chord.
/// - **hold**: once accepted, a chord is reported for at least this long
///   before a replacement is allowed, and the replacement must beat the
///   accepted confidence by a fixed margin.
///
/// Momentary silence never clears the accepted chord; only a new detection
/// can dislodge it.
pub struct ChordTracker {
    stability: Duration,
    hold: Duration,
    /// Confidence improvement a replacement must show over the accepted chord
    margin: f64,
    current: Option<Chord>,
    candidate: Option<Chord>,
    candidate_since: Option<Instant>,
    last_change: Option<Instant>,
}

impl ChordTracker {
    pub fn new(stability: Duration, hold: Duration, margin: f64) -> Self {
        Self {
            stability,
            hold,
            margin,
            current: None,
            candidate: None,
            candidate_since: None,
            last_change: None,
        }
    }

    /// The currently accepted chord, if any.
    pub fn current(&self) -> Option<&Chord> {
        self.current.as_ref()
    }

    /// Run detection on a held-note snapshot and advance the state machine.
    ///
    /// Returns `(accepted chord, changed)`. `changed` is true only when a
    /// chord with a different (root, quality) was just accepted — the signal
    /// for one-shot accent behaviors.
    pub fn update(&mut self, held: &HeldNotes, now: Instant) -> (Option<Chord>, bool) {
        let Some(detected) = detect_chord(held) else {
            // Silence or ambiguity: drop the pending candidate but keep the
            // accepted chord until a new detection dislodges it.
            self.candidate = None;
            self.candidate_since = None;
            return (self.current, false);
        };

        let mut changed = false;

        let same_candidate = self
            .candidate
            .as_ref()
            .is_some_and(|c| c.same_shape(&detected));

        if !same_candidate {
            debug!(
                root = %detected.root,
                quality = %detected.quality,
                confidence = detected.confidence,
                "new chord candidate"
            );
            self.candidate = Some(detected);
            self.candidate_since = Some(now);
        } else {
            let since = self.candidate_since.unwrap_or(now);
            if now.duration_since(since) >= self.stability {
                let hold_elapsed = match (&self.current, self.last_change) {
                    (None, _) => true,
                    (Some(_), Some(last)) => now.duration_since(last) >= self.hold,
                    (Some(_), None) => true,
                };
                let improves = match &self.current {
                    None => true,
                    Some(cur) => detected.confidence >= cur.confidence + self.margin,
                };

                if hold_elapsed && improves {
                    if self.current.map_or(true, |cur| !cur.same_shape(&detected)) {
                        changed = true;
                        info!(
                            root = %detected.root,
                            quality = %detected.quality,
                            confidence = detected.confidence,
                            "chord accepted"
                        );
                    }
                    self.current = Some(detected);
                    self.last_change = Some(now);
                }
            }
        }

        (self.current, changed)
    }
}
