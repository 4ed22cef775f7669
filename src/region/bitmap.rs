//! Sector bitmap
//!
//! One bit per sector: 0 = free, 1 = used. The bitmap only stores words up
//! to the highest sector ever marked; every sector past that is free, which
//! is what makes the first-fit search finite.

const WORD_BITS: u64 = u64::BITS as u64;

/// Tracks which sectors of a region file are in use
#[derive(Debug, Clone, Default)]
pub(crate) struct SectorBitmap {
    words: Vec<u64>,
}

impl SectorBitmap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Check if a sector is free (sectors past the tracked end always are)
    pub(crate) fn is_free(&self, sector: u64) -> bool {
        let word = (sector / WORD_BITS) as usize;
        match self.words.get(word) {
            Some(bits) => bits & (1u64 << (sector % WORD_BITS)) == 0,
            None => true,
        }
    }

    /// Check if every sector in `[start, start + len)` is free
    pub(crate) fn is_range_free(&self, start: u64, len: u64) -> bool {
        (start..start + len).all(|sector| self.is_free(sector))
    }

    /// Mark `[start, start + len)` as used
    pub(crate) fn set_range(&mut self, start: u64, len: u64) {
        if len == 0 {
            return;
        }
        let last_word = ((start + len - 1) / WORD_BITS) as usize;
        if self.words.len() <= last_word {
            self.words.resize(last_word + 1, 0);
        }
        for sector in start..start + len {
            self.words[(sector / WORD_BITS) as usize] |= 1u64 << (sector % WORD_BITS);
        }
    }

    /// Mark `[start, start + len)` as free
    pub(crate) fn clear_range(&mut self, start: u64, len: u64) {
        for sector in start..start + len {
            if let Some(bits) = self.words.get_mut((sector / WORD_BITS) as usize) {
                *bits &= !(1u64 << (sector % WORD_BITS));
            }
        }
    }

    /// First sector `>= from` that starts a run of `len` free sectors
    ///
    /// Once the scan walks off the tracked words the rest of the run is
    /// free by definition, so this always returns.
    pub(crate) fn find_free_run(&self, from: u64, len: u64) -> u64 {
        let tracked = self.words.len() as u64 * WORD_BITS;
        let mut run_start = from;
        let mut run_len = 0u64;

        for sector in from..tracked.max(from) {
            if self.is_free(sector) {
                run_len += 1;
                if run_len >= len {
                    return run_start;
                }
            } else {
                run_start = sector + 1;
                run_len = 0;
            }
        }

        run_start
    }

    /// Number of used sectors
    pub(crate) fn used_count(&self) -> u64 {
        self.words.iter().map(|w| w.count_ones() as u64).sum()
    }
}
