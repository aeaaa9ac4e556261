// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::prelude::*;
use anyhow::{Context, Result};

pub fn read_file(path: &str) -> Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path))?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .with_context(|| format!("Failed to read {}", path))?;

    Ok(buf)
}

pub fn read_file_str(path: &str) -> Result<String> {
    let content = read_file(path)?;
    let str = String::from_utf8(content)?;
    Ok(str)
}

pub fn bit_is_set(value: u32, mask: u32) -> bool {
    value & mask != 0
}

pub fn with_bit(value: u32, mask: u32, enabled: bool) -> u32 {
    if enabled { value | mask } else { value & !mask }
}

// width-bit field starting at pos
pub fn get_field(value: u32, pos: u8, width: u8) -> u32 {
    (value >> pos) & field_mask(width)
}

pub fn with_field(value: u32, pos: u8, width: u8, field: u32) -> u32 {
    let mask = field_mask(width) << pos;
    (value & !mask) | ((field << pos) & mask)
}

fn field_mask(width: u8) -> u32 {
    if width >= 32 { u32::MAX } else { (1 << width) - 1 }
}
