use harmony_sense::{ChordQuality, PitchClass};

pub type Rgb = (u8, u8, u8);

/// Map a pitch class onto the chromatic color circle: C = 0° (red),
/// C# = 30°, D = 60°, ... B = 330°.
pub fn pitch_class_to_hue(pc: PitchClass) -> f64 {
    (pc.value() as f64 * 30.0) % 360.0
}

/// Hue shift in degrees applied when tinting accents by chord quality.
///
/// Minor chords pull toward blue, dominant 7ths toward amber, and the
/// tense qualities toward magenta; everything else keeps the root's hue.
pub fn quality_hue_shift(quality: ChordQuality) -> f64 {
    match quality {
        ChordQuality::Minor => 240.0,
        ChordQuality::Dominant7 => 45.0,
        ChordQuality::Diminished | ChordQuality::Augmented => 300.0,
        _ => 0.0,
    }
}

/// Bias a base hue by emotional warmth and tension, then convert to RGB.
///
/// - `warmth_bias`: -1 (cool) to +1 (warm). Positive values shift the hue
///   up to +30° toward red; non-positive values re-anchor at base + 240°
///   (blue) and shift up to -60° from there.
/// - `saturation_boost`: 0–50 extra saturation from tension, on top of a
///   0.8 floor.
///
/// Value is fixed at 0.9 to keep output bright.
pub fn apply_emotion_to_color(base_hue: f64, warmth_bias: f64, saturation_boost: i32) -> Rgb {
    let biased_hue = if warmth_bias > 0.0 {
        (base_hue + warmth_bias * 30.0) % 360.0
    } else {
        (base_hue + 240.0 - warmth_bias.abs() * 60.0).rem_euclid(360.0)
    };

    let saturation = (0.8 + saturation_boost as f64 / 100.0).clamp(0.8, 1.0);
    hsv_to_rgb(biased_hue / 360.0, saturation, 0.9)
}

/// Map an absolute note number around the full hue circle.
///
/// The playable key range (C2–C6 by default on the rigs this drives) sweeps
/// red → red; notes outside the range clamp to the ends.
pub fn note_wheel_color(note: u8) -> Rgb {
    const MIN_KEY: u8 = 36;
    const MAX_KEY: u8 = 84;

    let note = note.clamp(MIN_KEY, MAX_KEY);
    let ratio = (note - MIN_KEY) as f64 / (MAX_KEY - MIN_KEY) as f64;
    hsv_to_rgb(ratio, 1.0, 1.0)
}

/// Standard HSV → RGB conversion. `h`, `s`, `v` in [0, 1]; output channels
/// 0–255.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let h6 = (h.rem_euclid(1.0)) * 6.0;
    let sector = h6.floor() as u32 % 6;
    let f = h6 - h6.floor();

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}
