//! Realtime engine turning live harmony into visual mood.
//!
//! Sits on top of [`harmony_sense`]: raw note events flow into
//! [`RealtimeEngine::ingest`] at arbitrary rates, a fixed-cadence host loop
//! calls [`RealtimeEngine::tick`], and each tick refreshes three things:
//!
//! - the accepted chord and estimated scale (fast and slow harmonic layers),
//! - a smoothed 4D [`emotion::EmotionVector`] blending both layers,
//! - bounded per-zone [`overrides::ZoneOverrides`] (brightness, speed,
//!   accent intensity, color hints) that zone behaviors translate into
//!   concrete effect parameters.
//!
//! The engine owns no transport and never self-schedules; the host loop
//! drives it and ships the resulting parameters wherever they need to go.

pub mod behavior;
pub mod color;
pub mod config;
pub mod emotion;
pub mod engine;
pub mod overrides;

pub use behavior::{EffectParams, MusicalState, Vibe, ZoneBehavior};
pub use config::{ConfigError, EngineConfig};
pub use emotion::EmotionVector;
pub use engine::RealtimeEngine;
pub use overrides::{Zone, ZoneOverrides, ZoneParams};
