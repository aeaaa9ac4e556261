// SPDX-License-Identifier: GPL-3.0-or-later

// Reset and clock control for the STM32G4. Just enough for the clock setup
// done by firmware at boot: oscillators come up as soon as they are enabled,
// and the system clock switch only follows SW to a source that is ready.

use crate::util::{bit_is_set, get_field, with_bit, with_field};
use super::{Peripheral, RegisterFile};

#[derive(Clone, Copy, Debug, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[repr(u32)]
pub enum Register {
    Cr       = 0x00,
    Icscr    = 0x04,
    Cfgr     = 0x08,
    Pllcfgr  = 0x0C,
    Cier     = 0x18,
    Cifr     = 0x1C,
    Cicr     = 0x20,
    Ahb1enr  = 0x48,
    Ahb2enr  = 0x4C,
    Ahb3enr  = 0x50,
    Apb1enr1 = 0x58,
    Apb1enr2 = 0x5C,
    Apb2enr  = 0x60,
    Ccipr    = 0x88,
    Bdcr     = 0x90,
    Csr      = 0x94,
    Crrcr    = 0x98, // HSI48
    Ccipr2   = 0xA8,
}

impl Register {
    pub const ALL: [Register; 18] = [
        Register::Cr, Register::Icscr, Register::Cfgr, Register::Pllcfgr,
        Register::Cier, Register::Cifr, Register::Cicr,
        Register::Ahb1enr, Register::Ahb2enr, Register::Ahb3enr,
        Register::Apb1enr1, Register::Apb1enr2, Register::Apb2enr,
        Register::Ccipr, Register::Bdcr, Register::Csr, Register::Crrcr, Register::Ccipr2,
    ];

    pub fn offset(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::Cr => "CR",
            Register::Icscr => "ICSCR",
            Register::Cfgr => "CFGR",
            Register::Pllcfgr => "PLLCFGR",
            Register::Cier => "CIER",
            Register::Cifr => "CIFR",
            Register::Cicr => "CICR",
            Register::Ahb1enr => "AHB1ENR",
            Register::Ahb2enr => "AHB2ENR",
            Register::Ahb3enr => "AHB3ENR",
            Register::Apb1enr1 => "APB1ENR1",
            Register::Apb1enr2 => "APB1ENR2",
            Register::Apb2enr => "APB2ENR",
            Register::Ccipr => "CCIPR",
            Register::Bdcr => "BDCR",
            Register::Csr => "CSR",
            Register::Crrcr => "CRRCR",
            Register::Ccipr2 => "CCIPR2",
        }
    }
}

pub mod cr {
    pub const HSION: u32  = 1 << 8;
    pub const HSIRDY: u32 = 1 << 10;
    pub const HSEON: u32  = 1 << 16;
    pub const HSERDY: u32 = 1 << 17;
    pub const PLLON: u32  = 1 << 24;
    pub const PLLRDY: u32 = 1 << 25;
}

pub mod cfgr {
    pub const SW_POS: u8 = 0;
    pub const SWS_POS: u8 = 2;
    pub const SW_WIDTH: u8 = 2;
    pub const SWS_WIDTH: u8 = 2;
}

pub mod crrcr {
    pub const HSI48ON: u32  = 1 << 0;
    pub const HSI48RDY: u32 = 1 << 1;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[repr(u32)]
pub enum ClockSource {
    Hsi = 0,
    Hse = 1,
    Pll = 2,
    Msi = 3,
}

impl ClockSource {
    // 2-bit fields always decode
    fn from_field(v: u32) -> Self {
        Self::try_from(v & 0b11).unwrap_or(ClockSource::Hsi)
    }
}

#[derive(Default)]
pub struct Rcc {
    regs: RegisterFile,
}

impl Rcc {
    pub fn new(name: &str) -> Option<Box<dyn Peripheral>> {
        if name == "RCC" {
            Some(Box::new(Self::default()))
        } else {
            None
        }
    }

    fn get(&self, reg: Register) -> u32 {
        self.regs.get(reg.offset())
    }

    fn set_bit(&mut self, reg: Register, mask: u32, enabled: bool) {
        self.regs.update(reg.offset(), |v| with_bit(v, mask, enabled));
    }

    pub fn sw(&self) -> ClockSource {
        ClockSource::from_field(get_field(self.get(Register::Cfgr), cfgr::SW_POS, cfgr::SW_WIDTH))
    }

    pub fn sws(&self) -> ClockSource {
        ClockSource::from_field(get_field(self.get(Register::Cfgr), cfgr::SWS_POS, cfgr::SWS_WIDTH))
    }

    fn is_ready(&self, source: ClockSource) -> bool {
        let cr_value = self.get(Register::Cr);
        match source {
            ClockSource::Hsi => bit_is_set(cr_value, cr::HSIRDY),
            ClockSource::Hse => bit_is_set(cr_value, cr::HSERDY),
            ClockSource::Pll => bit_is_set(cr_value, cr::PLLRDY),
            // MSI is free running
            ClockSource::Msi => true,
        }
    }

    /// Recomputes SWS from SW. When the selected source is not ready, the
    /// switch does not happen and the SWS bits stored in CFGR are kept.
    fn apply_sws_from_sw(&mut self) {
        let sw = self.sw();
        let ready = self.is_ready(sw);
        let sws = if ready { sw } else { self.sws() };

        if !ready {
            debug!("RCC: clock switch to {:?} refused, source not ready. Staying on {:?}", sw, sws);
        }

        self.regs.update(Register::Cfgr.offset(), |v|
            with_field(v, cfgr::SWS_POS, cfgr::SWS_WIDTH, sws as u32));
    }
}

impl Peripheral for Rcc {
    fn init(&mut self) {
        // Offsets outside the named registers are forgotten too
        self.regs.clear();
        for reg in Register::ALL {
            self.regs.set(reg.offset(), 0);
        }

        self.set_bit(Register::Cr, cr::HSION, true);
        self.set_bit(Register::Cr, cr::HSIRDY, true);
        self.apply_sws_from_sw();

        info!("RCC: init done (HSI ready, SWS=HSI)");
    }

    fn read(&mut self, offset: u32) -> u32 {
        trace!("RCC: read offset 0x{:x}", offset);
        self.regs.get(offset)
    }

    fn write(&mut self, offset: u32, value: u64) {
        let value = (value & 0xFFFF_FFFF) as u32;
        trace!("RCC: write offset 0x{:x} value 0x{:x}", offset, value);

        match Register::try_from(offset) {
            Ok(Register::Cr) => {
                self.regs.set(offset, value.into());
                // No ramp-up: oscillators are ready as soon as they are on
                self.set_bit(Register::Cr, cr::HSIRDY, bit_is_set(value, cr::HSION));
                self.set_bit(Register::Cr, cr::HSERDY, bit_is_set(value, cr::HSEON));
                self.set_bit(Register::Cr, cr::PLLRDY, bit_is_set(value, cr::PLLON));
            }
            Ok(Register::Cfgr) => {
                self.regs.set(offset, value.into());
                self.apply_sws_from_sw();
            }
            Ok(Register::Crrcr) => {
                self.regs.set(offset, value.into());
                self.set_bit(Register::Crrcr, crrcr::HSI48RDY, bit_is_set(value, crrcr::HSI48ON));
            }
            _ => {
                // Peripheral clock enables, interrupt masks, and unknown
                // offsets are recorded as is.
                self.regs.set(offset, value.into());
            }
        }
    }

    fn reg_name(&self, offset: u32) -> Option<&'static str> {
        Register::try_from(offset).ok().map(Register::name)
    }

    fn snapshot(&self) -> Vec<(u32, u32)> {
        self.regs.iter().collect()
    }
}
