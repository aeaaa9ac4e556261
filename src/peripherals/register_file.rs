// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeMap;

/// Sparse offset -> 32-bit value store backing a peripheral's registers.
/// Offsets that were never written read as 0.
#[derive(Default, Debug, Clone)]
pub struct RegisterFile {
    regs: BTreeMap<u32, u32>,
}

impl RegisterFile {
    pub fn get(&self, offset: u32) -> u32 {
        self.regs.get(&offset).copied().unwrap_or(0)
    }

    pub fn set(&mut self, offset: u32, value: u64) {
        self.regs.insert(offset, (value & 0xFFFF_FFFF) as u32);
    }

    pub fn update(&mut self, offset: u32, f: impl FnOnce(u32) -> u32) {
        let v = f(self.get(offset));
        self.set(offset, v.into());
    }

    pub fn clear(&mut self) {
        self.regs.clear();
    }

    /// Stored entries, sorted by offset.
    pub fn iter(&self) -> impl Iterator<Item=(u32, u32)> + '_ {
        self.regs.iter().map(|(&o, &v)| (o, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_reads_zero() {
        let regs = RegisterFile::default();
        assert_eq!(regs.get(0x04), 0);
        assert_eq!(regs.get(0xFFFF_FFFC), 0);
        assert_eq!(regs.iter().count(), 0);
    }

    #[test]
    fn test_set_masks_to_32_bits() {
        let mut regs = RegisterFile::default();
        regs.set(0x10, 0x1_2345_6789);
        assert_eq!(regs.get(0x10), 0x2345_6789);

        regs.set(0x10, u64::MAX);
        assert_eq!(regs.get(0x10), 0xFFFF_FFFF);
    }

    #[test]
    fn test_update_and_clear() {
        let mut regs = RegisterFile::default();
        regs.update(0x08, |v| v | 0b100);
        regs.update(0x08, |v| v | 0b001);
        assert_eq!(regs.get(0x08), 0b101);

        regs.set(0x00, 1);
        assert_eq!(regs.iter().collect::<Vec<_>>(), vec![(0x00, 1), (0x08, 0b101)]);

        regs.clear();
        assert_eq!(regs.get(0x08), 0);
    }
}
