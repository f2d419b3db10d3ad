use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::chord_templates::rotated;
use crate::types::{NoteEvent, PitchClass, Scale, ScaleMode};

/// A scale template: mode + pitch-class degree set relative to the root.
pub struct ScaleTemplate {
    pub mode: ScaleMode,
    /// Bitmask: bit i set means degree i is in the scale
    pub degrees: u16,
}

impl ScaleTemplate {
    const fn new(mode: ScaleMode, degrees: &[u8]) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < degrees.len() {
            mask |= 1 << degrees[i];
            i += 1;
        }
        Self {
            mode,
            degrees: mask,
        }
    }
}

/// All recognized scale templates. Declaration order is the tie-break
/// order, mirroring the chord-template rule: earlier mode wins a tied
/// coverage, then the lower root.
pub static SCALE_TEMPLATES: &[ScaleTemplate] = &[
    ScaleTemplate::new(ScaleMode::Major, &[0, 2, 4, 5, 7, 9, 11]),
    // natural minor (aeolian)
    ScaleTemplate::new(ScaleMode::Minor, &[0, 2, 3, 5, 7, 8, 10]),
    ScaleTemplate::new(ScaleMode::MajorPentatonic, &[0, 2, 4, 7, 9]),
    ScaleTemplate::new(ScaleMode::MinorPentatonic, &[0, 3, 5, 7, 10]),
    ScaleTemplate::new(ScaleMode::Blues, &[0, 3, 5, 6, 7, 10]),
];

/// Build a recency-weighted pitch-class histogram from note-on events
/// inside the window. Each event adds `(velocity / 127) * (0.5 + 0.5 * w)`
/// to its bin, where `w` rises linearly from 0 at the window's far edge to
/// 1 at `now`.
fn pc_histogram(events: &VecDeque<NoteEvent>, now: Instant, window: Duration) -> [f64; 12] {
    let mut histogram = [0.0_f64; 12];
    let window_s = window.as_secs_f64();

    for event in events {
        if !event.is_on() {
            continue;
        }
        let age = now.saturating_duration_since(event.at).as_secs_f64();
        if age > window_s {
            continue;
        }
        let recency = ((window_s - age) / window_s).max(0.0);
        let weight = (event.velocity as f64 / 127.0) * (0.5 + 0.5 * recency);
        histogram[event.pitch_class().index()] += weight;
    }

    histogram
}

/// Estimate the key/scale implied by recent notes.
///
/// Matches the recency-weighted histogram against every template rotated
/// across all 12 roots. Coverage = in-template histogram mass / total mass;
/// the best coverage wins and doubles as the confidence.
///
/// Returns `None` when the event log is empty or carries no histogram mass.
pub fn detect_scale(
    events: &VecDeque<NoteEvent>,
    now: Instant,
    window: Duration,
) -> Option<Scale> {
    if events.is_empty() {
        return None;
    }

    let histogram = pc_histogram(events, now, window);
    let total: f64 = histogram.iter().sum();
    if total < 1e-6 {
        return None;
    }

    let mut best: Option<Scale> = None;
    for template in SCALE_TEMPLATES {
        for root in 0..12u8 {
            let degree_set = rotated(template.degrees, root);
            let mut in_mass = 0.0;
            for (pc, &mass) in histogram.iter().enumerate() {
                if degree_set & (1 << pc) != 0 {
                    in_mass += mass;
                }
            }
            let coverage = in_mass / total;
            if best.map_or(true, |b| coverage > b.confidence) {
                best = Some(Scale {
                    root: PitchClass::new(root),
                    mode: template.mode,
                    confidence: coverage,
                });
            }
        }
    }

    best
}
