use std::collections::VecDeque;
use std::time::{Duration, Instant};

use harmony_sense::{detect_scale, Chord, ChordTracker, HeldNotes, NoteEvent, Scale};
use tracing::debug;

use crate::config::{ConfigError, EngineConfig};
use crate::emotion::{combine, ema, EmotionVector};
use crate::overrides::{ZoneOverrides, ZoneParams};

/// Window for the note-on rate counter.
const RATE_WINDOW: Duration = Duration::from_secs(1);

/// Multiplier turning the smoothed notes-per-second rate into the 0–255
/// speed range.
const RATE_TO_SPEED: f64 = 20.0;

/// Base accent intensity before confidence and tension scaling.
const ACCENT_BASE: f64 = 160.0;

/// The realtime orchestrator: raw note events in, per-zone visual
/// overrides out.
///
/// Two entry points with very different cost profiles:
///
/// - [`ingest`](Self::ingest) runs once per raw note event, possibly at
///   high frequency. It only appends to bounded windows and nudges two
///   EMAs — O(1) amortized, no harmonic analysis.
/// - [`tick`](Self::tick) runs at the host's fixed cadence (20 Hz works
///   well). It drives the chord tracker, refreshes the scale estimate on
///   its own slower cadence, smooths the emotion vector, and rebuilds the
///   zone overrides from scratch.
///
/// Single-writer: `ingest` and `tick` must not run concurrently against
/// the same engine. The engine never blocks, performs no I/O, and needs
/// no teardown — to stop, stop calling it.
pub struct RealtimeEngine {
    config: EngineConfig,

    /// Recent note events, front-evicted past the scale window
    events: VecDeque<NoteEvent>,
    /// Note-on timestamps within the last second
    onsets: VecDeque<Instant>,

    /// Smoothed playing strength (average held velocity)
    vel_smoothed: f64,
    /// Smoothed note-on rate, events per second
    rate_smoothed: f64,

    tracker: ChordTracker,
    scale: Option<Scale>,
    last_scale_refresh: Option<Instant>,

    emotion: EmotionVector,
    overrides: ZoneOverrides,
}

impl RealtimeEngine {
    /// Build an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let tracker = ChordTracker::new(
            config.stability(),
            config.hold(),
            config.improvement_margin,
        );
        Ok(Self {
            config,
            events: VecDeque::new(),
            onsets: VecDeque::new(),
            vel_smoothed: 0.0,
            rate_smoothed: 0.0,
            tracker,
            scale: None,
            last_scale_refresh: None,
            emotion: EmotionVector::ZERO,
            overrides: ZoneOverrides::default(),
        })
    }

    /// Ingest one raw note event alongside a held-notes snapshot.
    ///
    /// Cheap by design: appends to the event log and rate window, evicts
    /// stale entries from the front, and updates the smoothed velocity and
    /// note-on rate. No chord or scale work happens here.
    pub fn ingest(&mut self, event: NoteEvent, held: &HeldNotes) {
        let now = event.at;

        if event.is_on() {
            self.onsets.push_back(now);
        }
        self.events.push_back(event);

        let scale_cutoff = now.checked_sub(self.config.scale_window());
        if let Some(cutoff) = scale_cutoff {
            while self.events.front().is_some_and(|e| e.at < cutoff) {
                self.events.pop_front();
            }
        }
        if let Some(cutoff) = now.checked_sub(RATE_WINDOW) {
            while self.onsets.front().is_some_and(|&t| t < cutoff) {
                self.onsets.pop_front();
            }
        }

        let avg_velocity = if held.is_empty() {
            0.0
        } else {
            held.values().map(|&v| v as f64).sum::<f64>() / held.len() as f64
        };
        let alpha = self.config.energy_alpha;
        self.vel_smoothed += alpha * (avg_velocity - self.vel_smoothed);
        self.rate_smoothed += alpha * (self.onsets.len() as f64 - self.rate_smoothed);
    }

    /// Run one render tick: chord/scale updates, emotion blend, and a full
    /// rebuild of the zone overrides.
    pub fn tick(&mut self, held: &HeldNotes, now: Instant) -> &ZoneOverrides {
        let (chord, chord_changed) = self.tracker.update(held, now);

        // The key estimate is intentionally slow; refresh on its own
        // cadence, keeping the previous estimate when the log goes quiet.
        let refresh_due = self
            .last_scale_refresh
            .map_or(true, |t| now.duration_since(t) >= self.config.scale_refresh());
        if refresh_due {
            if let Some(scale) = detect_scale(&self.events, now, self.config.scale_window()) {
                debug!(
                    root = %scale.root,
                    mode = %scale.mode,
                    confidence = scale.confidence,
                    "scale estimate refreshed"
                );
                self.scale = Some(scale);
            }
            self.last_scale_refresh = Some(now);
        }

        let target = combine(
            chord.map(|c| c.quality),
            self.scale.map(|s| s.mode),
            self.config.chord_weight,
            self.config.scale_weight,
        );
        self.emotion = ema(self.emotion, target, self.config.emotion_alpha);

        self.rebuild_overrides(chord, chord_changed);
        &self.overrides
    }

    fn rebuild_overrides(&mut self, chord: Option<Chord>, chord_changed: bool) {
        let warmth_bias = self.emotion.joy - self.emotion.melancholy;
        let saturation_boost = (self.emotion.tension * 50.0).round() as i32;
        // Tension makes accents stronger
        let accent_multiplier = 1.0 + self.emotion.tension * 0.5;

        let chord_root = chord.map(|c| c.root);

        self.overrides.background = ZoneParams {
            brightness: Some(self.vel_smoothed.clamp(0.0, 255.0) as u8),
            warmth_bias: Some(warmth_bias),
            saturation_boost: Some(saturation_boost),
            chord_root,
            scale_root: self.scale.map(|s| s.root),
            ..Default::default()
        };

        // Rate-driven, not velocity-driven: "how busy", not "how hard"
        self.overrides.runner = ZoneParams {
            speed: Some((self.rate_smoothed * RATE_TO_SPEED).clamp(0.0, 255.0).round() as u8),
            warmth_bias: Some(warmth_bias),
            chord_root,
            ..Default::default()
        };

        self.overrides.accent = match chord {
            Some(chord) if chord_changed => {
                let intensity =
                    (ACCENT_BASE * chord.confidence.clamp(0.0, 1.0) * accent_multiplier).round();
                ZoneParams {
                    intensity: Some(intensity as u8),
                    chord_root: Some(chord.root),
                    chord_quality: Some(chord.quality),
                    ..Default::default()
                }
            }
            // No new accent; behaviors may decay the previous value on
            // their own.
            _ => ZoneParams::default(),
        };
    }

    /// The currently accepted chord, if any.
    pub fn chord(&self) -> Option<&Chord> {
        self.tracker.current()
    }

    /// The current scale/key estimate, if any.
    pub fn scale(&self) -> Option<&Scale> {
        self.scale.as_ref()
    }

    /// The smoothed emotion vector.
    pub fn emotion(&self) -> &EmotionVector {
        &self.emotion
    }

    /// Overrides from the most recent tick.
    pub fn overrides(&self) -> &ZoneOverrides {
        &self.overrides
    }

    /// Smoothed playing strength, 0–127 range.
    pub fn smoothed_velocity(&self) -> f64 {
        self.vel_smoothed
    }

    /// Smoothed note-on rate in events per second.
    pub fn smoothed_rate(&self) -> f64 {
        self.rate_smoothed
    }
}
