use harmony_sense::{HeldNotes, NoteState};
use serde::{Deserialize, Serialize};

use crate::color::{
    apply_emotion_to_color, note_wheel_color, pitch_class_to_hue, quality_hue_shift, Rgb,
};
use crate::overrides::{Zone, ZoneOverrides};

/// Background brightness never drops below this, so the canvas stays lit
/// between phrases.
const BACKGROUND_BRIGHTNESS_FLOOR: u8 = 40;

const VELOCITY_MAX: u8 = 127;

/// Abstract effect parameters for one zone.
///
/// These are the values a zone behavior computes each tick; turning them
/// into device payloads (and diffing against the previous transmission)
/// belongs to the transport layer, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParams {
    pub is_on: bool,
    pub brightness: u8,
    pub transition_time: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<Rgb>,
    /// Extra color slots for multi-color device effects; no shipped
    /// behavior fills them, but transports forward them when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub third_color: Option<Rgb>,
}

impl Default for EffectParams {
    /// Off/neutral parameter set — what a zone shows when no behavior has
    /// an opinion.
    fn default() -> Self {
        Self {
            is_on: false,
            brightness: 0,
            transition_time: 50,
            speed: None,
            intensity: None,
            primary_color: None,
            secondary_color: None,
            third_color: None,
        }
    }
}

impl EffectParams {
    /// Return to the off/neutral set.
    pub fn reset(&mut self) {
        *self = EffectParams::default();
    }
}

/// Read-only snapshot of low-level musical state that behaviors consult
/// alongside (optional) engine overrides.
#[derive(Debug, Clone, Copy)]
pub struct MusicalState<'a> {
    pub held: &'a HeldNotes,
    pub avg_velocity: u8,
    pub avg_note: u8,
}

impl<'a> MusicalState<'a> {
    pub fn from_note_state(state: &'a NoteState) -> Self {
        Self {
            held: state.held(),
            avg_velocity: state.avg_velocity(),
            avg_note: state.avg_note(),
        }
    }

    fn at_least(&self, count: usize) -> bool {
        self.held.len() >= count
    }
}

/// A zone behavior: pure policy mapping musical state + engine overrides
/// to effect parameters. Behaviors must tolerate a missing engine
/// (`overrides == None`) by producing the off/neutral set, never an error.
pub type ZoneBehavior = fn(&MusicalState, Option<&ZoneOverrides>, &mut EffectParams);

/// A vibe: one behavior per zone. Behaviors are swappable and
/// independent; parameters are recomputed from scratch each tick.
#[derive(Clone, Copy)]
pub struct Vibe {
    pub name: &'static str,
    pub background: ZoneBehavior,
    pub runner: ZoneBehavior,
    pub accent: ZoneBehavior,
}

impl Vibe {
    pub fn behavior(&self, zone: Zone) -> ZoneBehavior {
        match zone {
            Zone::Background => self.background,
            Zone::Runner => self.runner,
            Zone::Accent => self.accent,
        }
    }

    /// Run one zone's behavior against a fresh parameter set.
    pub fn compute(
        &self,
        zone: Zone,
        state: &MusicalState,
        overrides: Option<&ZoneOverrides>,
    ) -> EffectParams {
        let mut params = EffectParams::default();
        self.behavior(zone)(state, overrides, &mut params);
        params
    }

    /// Engine-driven vibe: mood canvas, rate-driven motion, chord-change
    /// accents.
    pub fn storm() -> Self {
        Self {
            name: "storm",
            background: storm_background,
            runner: storm_runner,
            accent: storm_accent,
        }
    }

    /// Held-note-driven vibe that works without the engine.
    pub fn rainbow() -> Self {
        Self {
            name: "rainbow",
            background: rainbow_background,
            runner: rainbow_runner,
            accent: rainbow_accent,
        }
    }

    pub fn spring() -> Self {
        Self {
            name: "spring",
            background: spring_background,
            runner: spring_runner,
            accent: spring_accent,
        }
    }

    pub fn summer() -> Self {
        Self {
            name: "summer",
            background: summer_background,
            runner: summer_runner,
            accent: summer_accent,
        }
    }
}

// --- storm: driven entirely by the emotion engine ---

/// Accent zone: chord-change flashes with emotion-scaled intensity and
/// quality-tinted color.
fn storm_accent(_state: &MusicalState, overrides: Option<&ZoneOverrides>, effect: &mut EffectParams) {
    let Some(ov) = overrides.map(|o| &o.accent) else {
        return;
    };

    let intensity = ov.intensity.unwrap_or(0);
    effect.is_on = intensity > 0;
    if !effect.is_on {
        return;
    }

    effect.intensity = Some(intensity);
    effect.brightness = 255;

    if let Some(root) = ov.chord_root {
        let mut hue = pitch_class_to_hue(root);
        if let Some(quality) = ov.chord_quality {
            hue = (hue + quality_hue_shift(quality)) % 360.0;
        }
        // Accents stay vivid: no warmth bias, fixed saturation bump
        effect.primary_color = Some(apply_emotion_to_color(hue, 0.0, 30));
    }
}

/// Background zone: stable mood canvas colored by the key, biased by
/// emotion.
fn storm_background(
    _state: &MusicalState,
    overrides: Option<&ZoneOverrides>,
    effect: &mut EffectParams,
) {
    effect.is_on = true;

    let Some(ov) = overrides.map(|o| &o.background) else {
        effect.brightness = BACKGROUND_BRIGHTNESS_FLOOR;
        effect.primary_color = Some((0, 0, 255));
        return;
    };

    effect.brightness = ov.brightness.unwrap_or(BACKGROUND_BRIGHTNESS_FLOOR);

    // The key root is the color identity; fall back to the chord root,
    // then to a neutral blue before any key is known.
    match ov.scale_root.or(ov.chord_root) {
        Some(root) => {
            let hue = pitch_class_to_hue(root);
            let warmth = ov.warmth_bias.unwrap_or(0.0);
            let boost = ov.saturation_boost.unwrap_or(0);
            effect.primary_color = Some(apply_emotion_to_color(hue, warmth, boost));
        }
        None => {
            effect.primary_color = Some((0, 100, 200));
        }
    }
}

/// Runner zone: motion pace from note rate, color from the chord.
fn storm_runner(state: &MusicalState, overrides: Option<&ZoneOverrides>, effect: &mut EffectParams) {
    let Some(ov) = overrides.map(|o| &o.runner) else {
        return;
    };

    effect.is_on = state.at_least(1);
    if !effect.is_on {
        return;
    }

    effect.speed = Some(ov.speed.unwrap_or(50));
    effect.intensity = Some(state.avg_note);
    effect.brightness = 255;

    match ov.chord_root {
        Some(root) => {
            let hue = pitch_class_to_hue(root);
            let warmth = ov.warmth_bias.unwrap_or(0.0);
            // Runners get half the saturation boost; subtler than accents
            let boost = ov.saturation_boost.unwrap_or(0) / 2;
            effect.primary_color = Some(apply_emotion_to_color(hue, warmth, boost));
        }
        None => {
            effect.primary_color = Some((100, 100, 100));
        }
    }
}

// --- rainbow / spring / summer: held-note-driven, engine optional ---

fn rainbow_accent(state: &MusicalState, _overrides: Option<&ZoneOverrides>, effect: &mut EffectParams) {
    effect.is_on = state.at_least(1);
    if effect.is_on {
        effect.intensity = Some(state.avg_velocity);
        effect.brightness = 255;
    }
}

fn rainbow_background(
    state: &MusicalState,
    _overrides: Option<&ZoneOverrides>,
    effect: &mut EffectParams,
) {
    effect.is_on = true;
    effect.brightness = state
        .avg_velocity
        .clamp(BACKGROUND_BRIGHTNESS_FLOOR, VELOCITY_MAX);
}

fn rainbow_runner(state: &MusicalState, _overrides: Option<&ZoneOverrides>, effect: &mut EffectParams) {
    effect.is_on = state.at_least(1);
    if !effect.is_on {
        return;
    }

    if let Some((&first_note, _)) = state.held.iter().next() {
        effect.primary_color = Some(note_wheel_color(first_note));
    }
    effect.speed = Some(state.avg_velocity);
    effect.brightness = state.avg_velocity;
    effect.intensity = Some(state.avg_note);
}

fn spring_accent(state: &MusicalState, _overrides: Option<&ZoneOverrides>, effect: &mut EffectParams) {
    effect.is_on = state.at_least(1);
    if effect.is_on {
        effect.intensity = Some(state.avg_velocity);
        effect.brightness = 255;
    }
}

fn spring_background(
    state: &MusicalState,
    _overrides: Option<&ZoneOverrides>,
    effect: &mut EffectParams,
) {
    effect.is_on = true;
    effect.brightness = state
        .avg_velocity
        .clamp(BACKGROUND_BRIGHTNESS_FLOOR, VELOCITY_MAX);
}

fn spring_runner(state: &MusicalState, _overrides: Option<&ZoneOverrides>, effect: &mut EffectParams) {
    effect.is_on = state.at_least(1);
    if effect.is_on {
        effect.brightness = state.avg_velocity;
        effect.speed = Some(state.avg_velocity);
    }
}

fn summer_accent(state: &MusicalState, _overrides: Option<&ZoneOverrides>, effect: &mut EffectParams) {
    // Always on; velocity controls pace
    effect.is_on = true;
    effect.brightness = 255;
    effect.speed = Some(state.avg_velocity);
}

fn summer_background(
    state: &MusicalState,
    _overrides: Option<&ZoneOverrides>,
    effect: &mut EffectParams,
) {
    effect.is_on = true;
    effect.brightness = state
        .avg_velocity
        .clamp(BACKGROUND_BRIGHTNESS_FLOOR, VELOCITY_MAX);
}

fn summer_runner(state: &MusicalState, _overrides: Option<&ZoneOverrides>, effect: &mut EffectParams) {
    effect.is_on = state.at_least(1);
    if !effect.is_on {
        return;
    }

    const SUMMER_COLORS: [Rgb; 4] = [
        (255, 0, 0),
        (255, 165, 0),
        (255, 255, 0),
        (255, 255, 255),
    ];
    let index = (state.avg_velocity as usize / 64) % SUMMER_COLORS.len();
    effect.primary_color = Some(SUMMER_COLORS[index]);
    effect.brightness = state.avg_velocity;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::ZoneParams;
    use harmony_sense::{ChordQuality, PitchClass};
    use pretty_assertions::assert_eq;

    fn held(notes: &[(u8, u8)]) -> HeldNotes {
        notes.iter().copied().collect()
    }

    fn state<'a>(held: &'a HeldNotes, avg_velocity: u8, avg_note: u8) -> MusicalState<'a> {
        MusicalState {
            held,
            avg_velocity,
            avg_note,
        }
    }

    #[test]
    fn storm_zones_without_engine_stay_neutral() {
        let notes = held(&[(60, 100)]);
        let s = state(&notes, 100, 60);
        let vibe = Vibe::storm();

        let accent = vibe.compute(Zone::Accent, &s, None);
        assert!(!accent.is_on);

        let runner = vibe.compute(Zone::Runner, &s, None);
        assert!(!runner.is_on);

        // Background always shows something, even engine-less
        let background = vibe.compute(Zone::Background, &s, None);
        assert!(background.is_on);
        assert_eq!(background.brightness, BACKGROUND_BRIGHTNESS_FLOOR);
        assert_eq!(background.primary_color, Some((0, 0, 255)));
    }

    #[test]
    fn storm_accent_fires_from_override() {
        let notes = held(&[(60, 100), (64, 100), (67, 100)]);
        let s = state(&notes, 100, 64);
        let overrides = ZoneOverrides {
            accent: ZoneParams {
                intensity: Some(200),
                chord_root: Some(PitchClass::C),
                chord_quality: Some(ChordQuality::Major),
                ..Default::default()
            },
            ..Default::default()
        };

        let params = Vibe::storm().compute(Zone::Accent, &s, Some(&overrides));
        assert!(params.is_on);
        assert_eq!(params.intensity, Some(200));
        assert!(params.primary_color.is_some());
    }

    #[test]
    fn storm_accent_quality_tints_color() {
        let notes = held(&[(60, 100), (63, 100), (67, 100)]);
        let s = state(&notes, 100, 63);

        let accent = |quality| ZoneOverrides {
            accent: ZoneParams {
                intensity: Some(200),
                chord_root: Some(PitchClass::C),
                chord_quality: Some(quality),
                ..Default::default()
            },
            ..Default::default()
        };

        let major = accent(ChordQuality::Major);
        let minor = accent(ChordQuality::Minor);
        let vibe = Vibe::storm();
        let major_color = vibe.compute(Zone::Accent, &s, Some(&major)).primary_color;
        let minor_color = vibe.compute(Zone::Accent, &s, Some(&minor)).primary_color;
        assert_ne!(major_color, minor_color);
    }

    #[test]
    fn storm_accent_empty_override_turns_off() {
        let notes = held(&[(60, 100)]);
        let s = state(&notes, 100, 60);
        let overrides = ZoneOverrides::default();

        let params = Vibe::storm().compute(Zone::Accent, &s, Some(&overrides));
        assert!(!params.is_on);
        assert_eq!(params.intensity, None);
    }

    #[test]
    fn storm_background_prefers_scale_root() {
        let notes = held(&[(60, 100)]);
        let s = state(&notes, 100, 60);
        let overrides = ZoneOverrides {
            background: ZoneParams {
                brightness: Some(180),
                warmth_bias: Some(0.5),
                saturation_boost: Some(10),
                chord_root: Some(PitchClass::E),
                scale_root: Some(PitchClass::C),
                ..Default::default()
            },
            ..Default::default()
        };

        let params = Vibe::storm().compute(Zone::Background, &s, Some(&overrides));
        assert!(params.is_on);
        assert_eq!(params.brightness, 180);
        // Colored from the scale root (C), not the chord root (E)
        let expected = apply_emotion_to_color(pitch_class_to_hue(PitchClass::C), 0.5, 10);
        assert_eq!(params.primary_color, Some(expected));
    }

    #[test]
    fn storm_background_neutral_blue_before_key_known() {
        let notes = HeldNotes::new();
        let s = state(&notes, 0, 0);
        let overrides = ZoneOverrides::default();

        let params = Vibe::storm().compute(Zone::Background, &s, Some(&overrides));
        assert_eq!(params.primary_color, Some((0, 100, 200)));
    }

    #[test]
    fn storm_runner_needs_held_notes() {
        let empty = HeldNotes::new();
        let s = state(&empty, 0, 0);
        let overrides = ZoneOverrides {
            runner: ZoneParams {
                speed: Some(99),
                ..Default::default()
            },
            ..Default::default()
        };

        let params = Vibe::storm().compute(Zone::Runner, &s, Some(&overrides));
        assert!(!params.is_on);
    }

    #[test]
    fn storm_runner_takes_engine_speed() {
        let notes = held(&[(60, 90)]);
        let s = state(&notes, 90, 60);
        let overrides = ZoneOverrides {
            runner: ZoneParams {
                speed: Some(99),
                chord_root: Some(PitchClass::G),
                warmth_bias: Some(-0.3),
                ..Default::default()
            },
            ..Default::default()
        };

        let params = Vibe::storm().compute(Zone::Runner, &s, Some(&overrides));
        assert!(params.is_on);
        assert_eq!(params.speed, Some(99));
        assert_eq!(params.intensity, Some(60));
        assert!(params.primary_color.is_some());
    }

    #[test]
    fn rainbow_works_without_engine() {
        let notes = held(&[(60, 80)]);
        let s = state(&notes, 80, 60);
        let vibe = Vibe::rainbow();

        let runner = vibe.compute(Zone::Runner, &s, None);
        assert!(runner.is_on);
        assert_eq!(runner.speed, Some(80));
        assert!(runner.primary_color.is_some());

        let background = vibe.compute(Zone::Background, &s, None);
        assert_eq!(background.brightness, 80);
    }

    #[test]
    fn background_brightness_has_a_floor() {
        let notes = HeldNotes::new();
        let s = state(&notes, 5, 0);

        let params = Vibe::rainbow().compute(Zone::Background, &s, None);
        assert_eq!(params.brightness, BACKGROUND_BRIGHTNESS_FLOOR);
    }

    #[test]
    fn summer_runner_picks_velocity_band_color() {
        let notes = held(&[(60, 100)]);

        let soft = Vibe::summer().compute(Zone::Runner, &state(&notes, 30, 60), None);
        assert_eq!(soft.primary_color, Some((255, 0, 0)));

        let hard = Vibe::summer().compute(Zone::Runner, &state(&notes, 127, 60), None);
        assert_eq!(hard.primary_color, Some((255, 255, 0)));
    }

    #[test]
    fn reset_restores_neutral_params() {
        let mut params = EffectParams {
            is_on: true,
            brightness: 200,
            speed: Some(80),
            primary_color: Some((255, 0, 0)),
            secondary_color: Some((0, 255, 0)),
            third_color: Some((0, 0, 255)),
            ..Default::default()
        };
        params.reset();
        assert_eq!(params, EffectParams::default());
        assert!(!params.is_on);
        assert_eq!(params.secondary_color, None);
        assert_eq!(params.third_color, None);
    }

    #[test]
    fn vibes_expose_behaviors_per_zone() {
        let vibe = Vibe::storm();
        assert_eq!(vibe.name, "storm");
        // fn pointers compare by address
        assert!(vibe.behavior(Zone::Accent) as usize == storm_accent as usize);
    }
}
