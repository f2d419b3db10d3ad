use crate::types::ChordQuality;

/// A chord template: quality + inversion-invariant interval set from the
/// root, stored as a bitmask over the 12 pitch classes.
pub struct ChordTemplate {
    pub quality: ChordQuality,
    /// Bitmask: bit i set means interval i is in the template
    pub intervals: u16,
    pub size: usize,
}

impl ChordTemplate {
    const fn new(quality: ChordQuality, intervals: &[u8]) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < intervals.len() {
            mask |= 1 << intervals[i];
            i += 1;
        }
        Self {
            quality,
            intervals: mask,
            size: intervals.len(),
        }
    }
}

/// All recognized chord templates.
///
/// Declaration order is the tie-break order for detection: when two
/// candidates score identically at the same root, the earlier-listed
/// quality wins.
pub static TEMPLATES: &[ChordTemplate] = &[
    ChordTemplate::new(ChordQuality::Major, &[0, 4, 7]),
    ChordTemplate::new(ChordQuality::Minor, &[0, 3, 7]),
    ChordTemplate::new(ChordQuality::Dominant7, &[0, 4, 7, 10]),
    ChordTemplate::new(ChordQuality::Major7, &[0, 4, 7, 11]),
    ChordTemplate::new(ChordQuality::Minor7, &[0, 3, 7, 10]),
    ChordTemplate::new(ChordQuality::Suspended2, &[0, 2, 7]),
    ChordTemplate::new(ChordQuality::Suspended4, &[0, 5, 7]),
    ChordTemplate::new(ChordQuality::Diminished, &[0, 3, 6]),
    ChordTemplate::new(ChordQuality::Augmented, &[0, 4, 8]),
];

/// Rotate a 12-bit pitch-class mask so its zero bit lands on `root`.
pub fn rotated(mask: u16, root: u8) -> u16 {
    let root = (root % 12) as u32;
    if root == 0 {
        return mask & 0x0FFF;
    }
    ((mask << root) | (mask >> (12 - root))) & 0x0FFF
}

/// Count set bits in a u16.
pub fn popcount(mut x: u16) -> usize {
    let mut count = 0;
    while x != 0 {
        count += x & 1;
        x >>= 1;
    }
    count as usize
}
