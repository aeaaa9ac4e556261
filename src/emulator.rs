// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::atomic::Ordering;
use anyhow::{bail, Result};

use crate::{config::{Config, Step}, system::{System, NUM_ACCESSES}, Args};

pub fn run_emulator(config: Config, args: Args) -> Result<()> {
    let mut sys = System::prepare(&config.peripherals)?;

    info!("Starting emulation");
    run_script(&mut sys, &config.script, args.max_accesses)?;

    for addr in args.peek {
        let value = sys.read(addr);
        info!("peek addr=0x{:08x} value=0x{:08x} ({})", addr, value, sys.p.addr_desc(addr));
    }

    info!("Emulation stop");
    sys.dump();

    Ok(())
}

/// Replays `script` as a sequence of host accesses. Stops early once
/// `max_accesses` accesses were made in total.
pub fn run_script(sys: &mut System, script: &[Step], max_accesses: Option<u64>) -> Result<()> {
    for step in script {
        if let Some(max) = max_accesses {
            if NUM_ACCESSES.load(Ordering::Relaxed) >= max {
                info!("Reached max accesses. Done");
                break;
            }
        }

        match *step {
            Step::Init => sys.init(),
            Step::Write { addr, value } => sys.write(addr, value),
            Step::Read { addr, expect } => {
                let value = sys.read(addr);
                debug!("read addr=0x{:08x} value=0x{:08x}", addr, value);

                if let Some(expect) = expect {
                    if value != expect {
                        bail!("Unexpected value at {}: expected=0x{:08x} actual=0x{:08x}",
                            sys.p.addr_desc(addr), expect, value);
                    }
                }
            }
        }
    }

    Ok(())
}
