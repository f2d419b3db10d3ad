use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A note identity independent of octave: 0 = C, 1 = C#, ... 11 = B.
///
/// Always reduced modulo 12 on construction, so a `PitchClass` can never
/// hold an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);
    pub const C_SHARP: PitchClass = PitchClass(1);
    pub const D: PitchClass = PitchClass(2);
    pub const D_SHARP: PitchClass = PitchClass(3);
    pub const E: PitchClass = PitchClass(4);
    pub const F: PitchClass = PitchClass(5);
    pub const F_SHARP: PitchClass = PitchClass(6);
    pub const G: PitchClass = PitchClass(7);
    pub const G_SHARP: PitchClass = PitchClass(8);
    pub const A: PitchClass = PitchClass(9);
    pub const A_SHARP: PitchClass = PitchClass(10);
    pub const B: PitchClass = PitchClass(11);

    /// Wrap any value into 0..12.
    pub fn new(pc: u8) -> Self {
        PitchClass(pc % 12)
    }

    /// Collapse an absolute note number (0–127) to its pitch class.
    pub fn from_note(note: u8) -> Self {
        PitchClass(note % 12)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Note name with sharp spelling: "C", "C#", ...
    pub fn name(self) -> &'static str {
        NOTE_NAMES_SHARP[self.0 as usize]
    }
}

impl std::fmt::Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The interval pattern defining a chord type, independent of root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Dominant7,
    Major7,
    Minor7,
    Suspended2,
    Suspended4,
    Diminished,
    Augmented,
}

impl ChordQuality {
    /// Suffix for chord symbol display: "Cmaj7", "Dm", "G7".
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Suspended2 => "sus2",
            ChordQuality::Suspended4 => "sus4",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
        }
    }
}

impl std::fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChordQuality::Major => write!(f, "maj"),
            ChordQuality::Minor => write!(f, "min"),
            ChordQuality::Dominant7 => write!(f, "dom7"),
            ChordQuality::Major7 => write!(f, "maj7"),
            ChordQuality::Minor7 => write!(f, "min7"),
            ChordQuality::Suspended2 => write!(f, "sus2"),
            ChordQuality::Suspended4 => write!(f, "sus4"),
            ChordQuality::Diminished => write!(f, "dim"),
            ChordQuality::Augmented => write!(f, "aug"),
        }
    }
}

/// An ordered set of pitch-class offsets from a root defining a key's
/// "home" notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    Major,
    Minor,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
}

impl std::fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleMode::Major => write!(f, "major"),
            ScaleMode::Minor => write!(f, "minor"),
            ScaleMode::MajorPentatonic => write!(f, "major_pentatonic"),
            ScaleMode::MinorPentatonic => write!(f, "minor_pentatonic"),
            ScaleMode::Blues => write!(f, "blues"),
        }
    }
}

/// A detected chord with its match confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub root: PitchClass,
    pub quality: ChordQuality,
    pub confidence: f64,
}

impl Chord {
    /// True when root and quality match, ignoring confidence.
    pub fn same_shape(&self, other: &Chord) -> bool {
        self.root == other.root && self.quality == other.quality
    }

    /// Full chord symbol: "C", "Dm", "G7".
    pub fn symbol(&self) -> String {
        format!("{}{}", self.root.name(), self.quality.suffix())
    }
}

/// A detected scale/key with its coverage confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub root: PitchClass,
    pub mode: ScaleMode,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    On,
    Off,
}

/// A single timestamped note event.
///
/// Immutable once created; the engine appends these to a time-ordered log
/// and evicts them once older than the active window. Carries an `Instant`,
/// so it deliberately has no serde representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub at: Instant,
    /// Absolute note number, 0–127
    pub note: u8,
    pub kind: NoteKind,
    /// 0–127 for note-on, 0 for note-off
    pub velocity: u8,
}

impl NoteEvent {
    pub fn on(at: Instant, note: u8, velocity: u8) -> Self {
        NoteEvent {
            at,
            note,
            kind: NoteKind::On,
            velocity,
        }
    }

    pub fn off(at: Instant, note: u8) -> Self {
        NoteEvent {
            at,
            note,
            kind: NoteKind::Off,
            velocity: 0,
        }
    }

    pub fn is_on(&self) -> bool {
        self.kind == NoteKind::On
    }

    pub fn pitch_class(&self) -> PitchClass {
        PitchClass::from_note(self.note)
    }
}

/// Snapshot of currently-held notes: note number → velocity.
///
/// Ordered map so the lowest-sounding note (the bass-root hint) is always
/// the first key.
pub type HeldNotes = BTreeMap<u8, u8>;
