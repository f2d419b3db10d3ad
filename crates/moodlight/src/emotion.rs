use harmony_sense::{ChordQuality, ScaleMode};
use serde::{Deserialize, Serialize};

/// A 4D summary of the emotional feel of what is being played.
///
/// Chords push it quickly, scales nudge it slowly, and the engine smooths
/// every change, so the vector biases colors and accent strength without
/// hard jumps. Components are always ≥ 0 and sum to 1 whenever any chord
/// or scale signal is present; all-zero means "no signal yet."
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionVector {
    pub joy: f64,
    pub melancholy: f64,
    pub tension: f64,
    pub blues: f64,
}

impl EmotionVector {
    pub const ZERO: EmotionVector = EmotionVector {
        joy: 0.0,
        melancholy: 0.0,
        tension: 0.0,
        blues: 0.0,
    };

    pub const fn new(joy: f64, melancholy: f64, tension: f64, blues: f64) -> Self {
        Self {
            joy,
            melancholy,
            tension,
            blues,
        }
    }

    pub fn sum(&self) -> f64 {
        self.joy + self.melancholy + self.tension + self.blues
    }

    /// L1-normalize so components sum to 1; a ~zero vector stays zero.
    pub fn normalized(self) -> Self {
        let sum = self.sum();
        if sum <= 1e-9 {
            return Self::ZERO;
        }
        Self {
            joy: self.joy / sum,
            melancholy: self.melancholy / sum,
            tension: self.tension / sum,
            blues: self.blues / sum,
        }
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            joy: self.joy * factor,
            melancholy: self.melancholy * factor,
            tension: self.tension * factor,
            blues: self.blues * factor,
        }
    }

    fn plus(self, other: Self) -> Self {
        Self {
            joy: self.joy + other.joy,
            melancholy: self.melancholy + other.melancholy,
            tension: self.tension + other.tension,
            blues: self.blues + other.blues,
        }
    }
}

/// Chord quality → emotion contribution. Hand-tuned constants, treated as
/// configuration data rather than logic.
pub fn chord_emotion(quality: ChordQuality) -> EmotionVector {
    match quality {
        ChordQuality::Major => EmotionVector::new(1.0, 0.0, 0.1, 0.1),
        ChordQuality::Major7 => EmotionVector::new(1.0, 0.0, 0.1, 0.1),
        ChordQuality::Minor => EmotionVector::new(0.1, 1.0, 0.1, 0.1),
        ChordQuality::Minor7 => EmotionVector::new(0.1, 1.0, 0.1, 0.1),
        ChordQuality::Dominant7 => EmotionVector::new(0.3, 0.1, 0.1, 1.0),
        ChordQuality::Suspended2 => EmotionVector::new(0.5, 0.2, 0.2, 0.1),
        ChordQuality::Suspended4 => EmotionVector::new(0.5, 0.2, 0.2, 0.1),
        ChordQuality::Diminished => EmotionVector::new(0.2, 0.1, 1.0, 0.1),
        ChordQuality::Augmented => EmotionVector::new(0.4, 0.1, 0.8, 0.1),
    }
}

/// Scale mode → emotion contribution.
pub fn scale_emotion(mode: ScaleMode) -> EmotionVector {
    match mode {
        ScaleMode::Major => EmotionVector::new(0.7, 0.0, 0.1, 0.2),
        ScaleMode::Minor => EmotionVector::new(0.1, 0.7, 0.1, 0.2),
        ScaleMode::MajorPentatonic => EmotionVector::new(0.6, 0.0, 0.1, 0.3),
        ScaleMode::MinorPentatonic => EmotionVector::new(0.1, 0.6, 0.1, 0.3),
        ScaleMode::Blues => EmotionVector::new(0.2, 0.2, 0.1, 0.9),
    }
}

/// Blend chord and scale contributions into a normalized target vector.
///
/// The weights scale independent contributions before normalization, so
/// they are not required to sum to 1. Missing signals contribute nothing;
/// when both are absent the result is the zero vector.
pub fn combine(
    quality: Option<ChordQuality>,
    mode: Option<ScaleMode>,
    w_chord: f64,
    w_scale: f64,
) -> EmotionVector {
    let chord_vec = quality.map(chord_emotion).unwrap_or(EmotionVector::ZERO);
    let scale_vec = mode.map(scale_emotion).unwrap_or(EmotionVector::ZERO);
    chord_vec
        .scaled(w_chord)
        .plus(scale_vec.scaled(w_scale))
        .normalized()
}

/// Componentwise exponential moving average toward `target`.
pub fn ema(old: EmotionVector, target: EmotionVector, alpha: f64) -> EmotionVector {
    EmotionVector {
        joy: old.joy + alpha * (target.joy - old.joy),
        melancholy: old.melancholy + alpha * (target.melancholy - old.melancholy),
        tension: old.tension + alpha * (target.tension - old.tension),
        blues: old.blues + alpha * (target.blues - old.blues),
    }
}
