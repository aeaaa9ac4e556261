// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::atomic::{AtomicU64, Ordering};
use anyhow::Result;

use crate::peripherals::{PeripheralConfig, Peripherals};

pub static NUM_ACCESSES: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    Init,
    Read,
    Write,
}

/// A single access handed to a peripheral. `offset` is relative to the
/// peripheral base. Reads store their result into `value`.
#[derive(Clone, Copy, Debug)]
pub struct Request {
    pub kind: AccessKind,
    pub offset: u32,
    pub value: u64,
}

impl Request {
    pub fn init() -> Self {
        Self { kind: AccessKind::Init, offset: 0, value: 0 }
    }

    pub fn read(offset: u32) -> Self {
        Self { kind: AccessKind::Read, offset, value: 0 }
    }

    pub fn write(offset: u32, value: u64) -> Self {
        Self { kind: AccessKind::Write, offset, value }
    }
}

// Owns the peripheral state for the whole session. Nothing is reset
// between accesses unless init() is called.
pub struct System {
    pub p: Peripherals,
}

impl System {
    pub fn prepare(peripherals: &[PeripheralConfig]) -> Result<Self> {
        let p = Peripherals::from_config(peripherals)?;
        Ok(Self { p })
    }

    pub fn init(&mut self) {
        NUM_ACCESSES.fetch_add(1, Ordering::Relaxed);
        self.p.init();
    }

    pub fn read(&mut self, addr: u32) -> u32 {
        NUM_ACCESSES.fetch_add(1, Ordering::Relaxed);
        self.p.read(addr)
    }

    pub fn write(&mut self, addr: u32, value: u64) {
        NUM_ACCESSES.fetch_add(1, Ordering::Relaxed);
        self.p.write(addr, value)
    }

    pub fn dump(&self) {
        for slot in self.p.iter() {
            for (offset, value) in slot.peripheral.snapshot() {
                let reg = slot.peripheral.reg_name(offset).unwrap_or("REG_????");
                info!("{}.{:<8} offset=0x{:04x} value=0x{:08x}", slot.name, reg, offset, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_persists_across_accesses() {
        let configs = [PeripheralConfig { name: "RCC".to_string(), base: 0x4002_1000, size: None }];
        let mut sys = System::prepare(&configs).unwrap();
        sys.init();

        sys.write(0x4002_1000, 1 << 24);
        sys.write(0x4002_1008, 2);
        sys.write(0x4002_1060, 0x4000);

        assert_eq!(sys.read(0x4002_1000), (1 << 24) | (1 << 25));
        assert_eq!(sys.read(0x4002_1008), 0b1010);
        assert_eq!(sys.read(0x4002_1060), 0x4000);

        sys.init();
        assert_eq!(sys.read(0x4002_1008), 0);
        assert_eq!(sys.read(0x4002_1060), 0);
    }

    #[test]
    fn test_requests() {
        let r = Request::write(0x98, 0x1_0000_0001);
        assert_eq!(r.kind, AccessKind::Write);
        assert_eq!(r.offset, 0x98);
        assert_eq!(r.value, 0x1_0000_0001);

        assert_eq!(Request::read(4).value, 0);
        assert_eq!(Request::init().kind, AccessKind::Init);
    }
}
