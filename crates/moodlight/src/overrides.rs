use harmony_sense::{ChordQuality, PitchClass};
use serde::{Deserialize, Serialize};

/// An independently parameterized visual output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Stable mood canvas
    Background,
    /// Motion/pace channel
    Runner,
    /// One-shot chord-change accents
    Accent,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Background => "background",
            Zone::Runner => "runner",
            Zone::Accent => "accent",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters the engine suggests for one zone.
///
/// Every field is optional: an absent field means "no opinion — keep prior
/// visual state." Behaviors are free to ignore anything they don't need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u8>,
    /// -1 (cool) to +1 (warm) hue bias
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warmth_bias: Option<f64>,
    /// 0–50 extra saturation from tension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation_boost: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chord_root: Option<PitchClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chord_quality: Option<ChordQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_root: Option<PitchClass>,
}

impl ZoneParams {
    /// True when the engine expressed no opinion for this zone.
    pub fn is_empty(&self) -> bool {
        *self == ZoneParams::default()
    }
}

/// Per-zone override records, fully replaced by the engine each tick —
/// never merged with the previous tick's values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneOverrides {
    pub background: ZoneParams,
    pub runner: ZoneParams,
    pub accent: ZoneParams,
}

impl ZoneOverrides {
    pub fn zone(&self, zone: Zone) -> &ZoneParams {
        match zone {
            Zone::Background => &self.background,
            Zone::Runner => &self.runner,
            Zone::Accent => &self.accent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_params_are_empty() {
        assert!(ZoneParams::default().is_empty());

        let with_brightness = ZoneParams {
            brightness: Some(0),
            ..Default::default()
        };
        assert!(!with_brightness.is_empty());
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let params = ZoneParams {
            brightness: Some(128),
            warmth_bias: Some(-0.5),
            ..Default::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("brightness"));
        assert!(json.contains("warmth_bias"));
        assert!(!json.contains("speed"));
        assert!(!json.contains("chord_quality"));
    }

    #[test]
    fn zone_accessor_and_names() {
        let overrides = ZoneOverrides {
            runner: ZoneParams {
                speed: Some(42),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(overrides.zone(Zone::Runner).speed, Some(42));
        assert!(overrides.zone(Zone::Accent).is_empty());
        assert_eq!(Zone::Background.to_string(), "background");
    }
}
