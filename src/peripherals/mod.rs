// SPDX-License-Identifier: GPL-3.0-or-later

mod register_file;
pub mod rcc;

pub use register_file::RegisterFile;
use rcc::Rcc;

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::system::{AccessKind, Request};

#[derive(Debug, Deserialize, Clone)]
pub struct PeripheralConfig {
    pub name: String,
    pub base: u32,
    pub size: Option<u32>,
}

pub struct Peripherals {
    peripherals: Vec<PeripheralSlot<Box<dyn Peripheral>>>,
}

pub struct PeripheralSlot<T> {
    pub name: String,
    pub start: u32,
    pub end: u32,
    pub peripheral: T,
}

impl Peripherals {
    pub fn new() -> Self {
        let peripherals = vec![];
        Self { peripherals }
    }

    pub fn from_config(configs: &[PeripheralConfig]) -> Result<Self> {
        let mut configs = configs.to_vec();
        configs.sort_by_key(|c| c.base);

        let mut self_ = Self::new();
        for c in configs {
            self_.register_peripheral(&c.name, c.base, c.size)?;
        }
        Ok(self_)
    }

    pub fn register_peripheral(&mut self, name: &str, base: u32, size: Option<u32>) -> Result<()> {
        let p = match Rcc::new(name) {
            Some(p) => p,
            None => bail!("Unknown peripheral name={}", name),
        };

        let start = base;
        let end = match base.checked_add(size.unwrap_or_else(|| p.size())) {
            Some(end) => end,
            None => bail!("Peripheral {} does not fit in the address space", name),
        };

        debug!("Peripheral base=0x{:08x} end=0x{:08x} name={}", start, end, name);

        if let Some(last_p) = self.peripherals.last() {
            if last_p.start >= base {
                bail!("Register blocks must be sorted: {} then {}", last_p.name, name);
            }
            if last_p.end > base {
                bail!("Overlapping register blocks between {} and {}", last_p.name, name);
            }
        }

        self.peripherals.push(PeripheralSlot { name: name.to_string(), start, end, peripheral: p });
        Ok(())
    }

    fn get_peripheral(&mut self, addr: u32) -> Option<&mut PeripheralSlot<Box<dyn Peripheral>>> {
        let index = self.peripherals.binary_search_by_key(&addr, |p| p.start)
            .map_or_else(|e| e.checked_sub(1), Some);

        index.and_then(|i| self.peripherals.get_mut(i).filter(|p| addr < p.end))
    }

    pub fn addr_desc(&mut self, addr: u32) -> String {
        if let Some(p) = self.get_peripheral(addr) {
            let offset = addr - p.start;
            let reg = p.peripheral.reg_name(offset - offset % 4).unwrap_or("REG_????");
            format!("addr=0x{:08x} block={} reg={} offset=0x{:04x}", addr, p.name, reg, offset)
        } else {
            format!("addr=0x{:08x} block=????", addr)
        }
    }

    pub fn init(&mut self) {
        for p in &mut self.peripherals {
            p.peripheral.handle(&mut Request::init());
        }
    }

    pub fn read(&mut self, addr: u32) -> u32 {
        if log::log_enabled!(log::Level::Trace) {
            let desc = self.addr_desc(addr);
            trace!("read:  {}", desc);
        }

        if let Some(p) = self.get_peripheral(addr) {
            let mut request = Request::read(addr - p.start);
            p.peripheral.handle(&mut request);
            request.value as u32
        } else {
            warn!("read of unmapped addr=0x{:08x}", addr);
            0
        }
    }

    pub fn write(&mut self, addr: u32, value: u64) {
        if log::log_enabled!(log::Level::Trace) {
            let desc = self.addr_desc(addr);
            trace!("write: {} value=0x{:08x}", desc, value);
        }

        if let Some(p) = self.get_peripheral(addr) {
            p.peripheral.handle(&mut Request::write(addr - p.start, value));
        } else {
            warn!("write of unmapped addr=0x{:08x} value=0x{:08x}", addr, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item=&PeripheralSlot<Box<dyn Peripheral>>> {
        self.peripherals.iter()
    }
}

pub trait Peripheral {
    fn init(&mut self);
    fn read(&mut self, offset: u32) -> u32;
    fn write(&mut self, offset: u32, value: u64);

    /// Size of the register window in bytes.
    fn size(&self) -> u32 {
        0x400
    }

    fn reg_name(&self, _offset: u32) -> Option<&'static str> {
        None
    }

    /// (offset, value) of every register holding state.
    fn snapshot(&self) -> Vec<(u32, u32)> {
        vec![]
    }

    fn handle(&mut self, request: &mut Request) {
        match request.kind {
            AccessKind::Init => self.init(),
            AccessKind::Read => request.value = self.read(request.offset).into(),
            AccessKind::Write => self.write(request.offset, request.value),
        }
    }
}
