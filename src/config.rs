// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::util::read_file_str;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Init,
    Read {
        addr: u32,
        expect: Option<u32>,
    },
    Write {
        addr: u32,
        value: u64,
    },
}

#[derive(Debug, Deserialize)]
pub struct Config {
   pub peripherals: Vec<crate::peripherals::PeripheralConfig>,
   #[serde(default)]
   pub script: Vec<Step>,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        Self::parse(&read_file_str(path)?)
            .with_context(|| format!("Failed to parse {}", path))
    }

    pub fn parse(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let config = Config::parse(r#"
peripherals:
  - name: RCC
    base: 0x40021000
script:
  - init
  - write: { addr: 0x40021000, value: 0x01000100 }
  - read: { addr: 0x40021000, expect: 0x03000500 }
  - read: { addr: 0x40021004 }
"#).unwrap();

        assert_eq!(config.peripherals.len(), 1);
        assert_eq!(config.peripherals[0].name, "RCC");
        assert_eq!(config.peripherals[0].base, 0x4002_1000);
        assert_eq!(config.peripherals[0].size, None);

        assert_eq!(config.script, vec![
            Step::Init,
            Step::Write { addr: 0x4002_1000, value: 0x0100_0100 },
            Step::Read { addr: 0x4002_1000, expect: Some(0x0300_0500) },
            Step::Read { addr: 0x4002_1004, expect: None },
        ]);
    }

    #[test]
    fn test_script_is_optional() {
        let config = Config::parse("peripherals: [{ name: RCC, base: 0, size: 0x100 }]").unwrap();
        assert!(config.script.is_empty());
        assert_eq!(config.peripherals[0].size, Some(0x100));
    }

    #[test]
    fn test_parse_error() {
        assert!(Config::parse("script: [init]").is_err());
        assert!(Config::parse("peripherals: []\nscript: [jump]").is_err());
    }
}
