use crate::types::{HeldNotes, NoteEvent};

/// Tracks which notes are currently down, plus two cheap summary stats.
///
/// This is the caller-facing side of the pipeline: it owns the held-note
/// map the inference functions read snapshots of. Averages are integer
/// means over the held notes and deliberately keep their last value
/// through silence, so behaviors reading them during a gap see the most
/// recent playing level rather than a jump to zero.
#[derive(Debug, Default)]
pub struct NoteState {
    held: HeldNotes,
    avg_velocity: u8,
    avg_note: u8,
}

impl NoteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a single note event: insert on note-on, remove on note-off.
    pub fn apply(&mut self, event: &NoteEvent) {
        if event.is_on() {
            self.held.insert(event.note, event.velocity);
        } else {
            self.held.remove(&event.note);
        }
        self.refresh_stats();
    }

    fn refresh_stats(&mut self) {
        if self.held.is_empty() {
            return;
        }
        let count = self.held.len() as u32;
        let note_sum: u32 = self.held.keys().map(|&n| n as u32).sum();
        let vel_sum: u32 = self.held.values().map(|&v| v as u32).sum();
        self.avg_note = (note_sum / count) as u8;
        self.avg_velocity = (vel_sum / count) as u8;
    }

    /// Snapshot of currently-held notes.
    pub fn held(&self) -> &HeldNotes {
        &self.held
    }

    /// Mean velocity of held notes (how hard you currently play).
    pub fn avg_velocity(&self) -> u8 {
        self.avg_velocity
    }

    /// Mean note number of held notes (rough register centroid).
    pub fn avg_note(&self) -> u8 {
        self.avg_note
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Instant;

    #[test]
    fn note_on_and_off_update_held_map() {
        let at = Instant::now();
        let mut state = NoteState::new();

        state.apply(&NoteEvent::on(at, 60, 100));
        state.apply(&NoteEvent::on(at, 64, 80));
        assert_eq!(state.held().len(), 2);
        assert_eq!(state.held().get(&60), Some(&100));

        state.apply(&NoteEvent::off(at, 60));
        assert_eq!(state.held().len(), 1);
        assert!(!state.held().contains_key(&60));
    }

    #[test]
    fn averages_are_integer_means() {
        let at = Instant::now();
        let mut state = NoteState::new();

        state.apply(&NoteEvent::on(at, 60, 100));
        state.apply(&NoteEvent::on(at, 67, 50));
        assert_eq!(state.avg_note(), 63);
        assert_eq!(state.avg_velocity(), 75);
    }

    #[test]
    fn averages_persist_through_silence() {
        let at = Instant::now();
        let mut state = NoteState::new();

        state.apply(&NoteEvent::on(at, 60, 100));
        state.apply(&NoteEvent::off(at, 60));

        assert!(state.held().is_empty());
        assert_eq!(state.avg_velocity(), 100);
        assert_eq!(state.avg_note(), 60);
    }

    #[test]
    fn off_for_unknown_note_is_harmless() {
        let at = Instant::now();
        let mut state = NoteState::new();
        state.apply(&NoteEvent::off(at, 60));
        assert!(state.held().is_empty());
    }
}
