use log::error;

use crate::error::{BzError, BzResult};

/// Move-To-Front list of the 256 compact symbol indices, seeded in identity order.
#[derive(Debug, Clone)]
pub struct MtfList {
    index: [u8; 256],
}

impl MtfList {
    pub fn new() -> Self {
        let mut index = [0_u8; 256];
        index
            .iter_mut()
            .enumerate()
            .for_each(|(i, slot)| *slot = i as u8);
        Self { index }
    }

    /// The value currently at the front of the list.
    #[inline]
    pub fn front(&self) -> u8 {
        self.index[0]
    }

    /// Return the value at position idx and move it to the front, shifting the values ahead of it back one.
    #[inline]
    pub fn take(&mut self, mut idx: usize) -> u8 {
        let temp_sym = self.index[idx];

        // Shift each index in front of the current one. Do this first in blocks for speed.
        while idx > 3 {
            self.index[idx] = self.index[idx - 1];
            self.index[idx - 1] = self.index[idx - 2];
            self.index[idx - 2] = self.index[idx - 3];
            self.index[idx - 3] = self.index[idx - 4];
            idx -= 4;
        }
        // ...then clean up any odd ones
        while idx > 0 {
            self.index[idx] = self.index[idx - 1];
            idx -= 1;
        }
        // ...and finally put the symbol at the front.
        self.index[0] = temp_sym;
        temp_sym
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.index
    }
}

impl Default for MtfList {
    fn default() -> Self {
        Self::new()
    }
}

/// Undo the move to front transform on the selector list. Every raw value must be below table_count.
pub fn undo_selector_mtf(raw: &[u8], table_count: usize) -> BzResult<Vec<u8>> {
    let mut table_idx: Vec<u8> = (0..table_count as u8).collect();
    let mut selectors = Vec::with_capacity(raw.len());

    for &mtf in raw {
        let mut idx = mtf as usize;
        if idx >= table_count {
            error!(
                "Selector MTF index {} but only {} tables.",
                idx, table_count
            );
            return Err(BzError::corrupt(format!(
                "selector {} out of range for {} tables",
                idx, table_count
            )));
        }
        let table = table_idx[idx];
        while idx > 0 {
            table_idx[idx] = table_idx[idx - 1];
            idx -= 1;
        }
        table_idx[0] = table;
        selectors.push(table);
    }
    Ok(selectors)
}
