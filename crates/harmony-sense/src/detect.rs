use crate::chord_templates::{popcount, rotated, TEMPLATES};
use crate::types::{Chord, HeldNotes, PitchClass};

/// Minimum blended score for a detection to count.
const SCORE_FLOOR: f64 = 0.5;

const COVERAGE_WEIGHT: f64 = 0.7;
const PRECISION_WEIGHT: f64 = 0.3;

/// Collapse held notes to per-pitch-class velocities, keeping the maximum
/// velocity observed per class.
pub fn pitch_class_velocities(held: &HeldNotes) -> [u8; 12] {
    let mut velocities = [0u8; 12];
    for (&note, &vel) in held {
        let pc = (note % 12) as usize;
        velocities[pc] = velocities[pc].max(vel);
    }
    velocities
}

/// Bitmask of pitch classes with at least one sounding note.
fn sounding_mask(velocities: &[u8; 12]) -> u16 {
    let mut mask = 0u16;
    for (pc, &vel) in velocities.iter().enumerate() {
        if vel > 0 {
            mask |= 1 << pc;
        }
    }
    mask
}

/// Detect the chord under the fingers from a held-note snapshot.
///
/// Candidate roots are every sounding pitch class plus the pitch class of
/// the lowest-held note (bass-root hint). Each (root, quality) pair is
/// scored as `0.7 * coverage + 0.3 * precision` where coverage is the
/// fraction of the quality's chord tones present and precision is the
/// fraction of sounding pitch classes belonging to the chord set. Scores
/// below 0.5 are rejected.
///
/// Ties resolve deterministically: roots are tried in ascending pitch-class
/// order and qualities in [`TEMPLATES`] declaration order, and only a
/// strictly greater score displaces the best so far — so the lower root,
/// then the earlier-listed quality, wins.
///
/// Returns `None` when fewer than 2 distinct pitch classes sound.
pub fn detect_chord(held: &HeldNotes) -> Option<Chord> {
    if held.len() < 2 {
        return None;
    }

    let velocities = pitch_class_velocities(held);
    let sounding = sounding_mask(&velocities);
    let distinct = popcount(sounding);
    if distinct < 2 {
        return None;
    }

    // Lowest held note hints the root. With held notes in a BTreeMap the
    // first key is the bass.
    let bass_pc = held.keys().next().map(|&note| note % 12);

    let mut best: Option<Chord> = None;
    for root in 0..12u8 {
        let present = sounding & (1 << root) != 0;
        if !present && bass_pc != Some(root) {
            continue;
        }

        for template in TEMPLATES {
            let chord_set = rotated(template.intervals, root);
            let hits = popcount(chord_set & sounding);

            let coverage = hits as f64 / template.size as f64;
            let precision = hits as f64 / distinct as f64;
            let score = COVERAGE_WEIGHT * coverage + PRECISION_WEIGHT * precision;

            if score < SCORE_FLOOR {
                continue;
            }
            if best.map_or(true, |b| score > b.confidence) {
                best = Some(Chord {
                    root: PitchClass::new(root),
                    quality: template.quality,
                    confidence: score,
                });
            }
        }
    }

    best
}
