// SPDX-License-Identifier: GPL-3.0-or-later

mod config;
mod emulator;
mod util;
mod peripherals;
mod system;

use std::io::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use clap::Parser;
use clap::AppSettings;
use anyhow::Result;
use env_logger::fmt::Color;
use log::LevelFilter;

use config::Config;
use emulator::run_emulator;

#[macro_use]
extern crate log;

/// Replay register accesses against the STM32G4 RCC model
#[derive(Parser, Debug)]
#[clap(
    global_setting(AppSettings::DeriveDisplayOrder)
)]
pub struct Args {
    /// Config file
    config: String,

    /// Verbosity. Can be repeated
    #[clap(short, long, parse(from_occurrences))]
    verbose: u8,

    /// Max register accesses
    #[clap(short, long)]
    max_accesses: Option<u64>,

    /// Address to read once the script is done. Can be repeated
    #[clap(long, parse(try_from_str=clap_num::maybe_hex))]
    peek: Vec<u32>,
}

fn init_logging(level: u8) {
    let lf = match level {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    static LAST_NUM_ACCESSES: AtomicU64 = AtomicU64::new(0);

    env_logger::Builder::new()
        .filter_level(lf)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let num_accesses = system::NUM_ACCESSES.load(Relaxed);
            let delta_accesses = num_accesses.saturating_sub(LAST_NUM_ACCESSES.swap(num_accesses, Relaxed));

            let mut style = buf.style();
            let level = match record.level() {
                log::Level::Error => style.set_color(Color::Red).set_intense(true).value("ERROR"),
                log::Level::Warn =>  style.set_color(Color::Yellow).set_intense(true).value("WARN "),
                log::Level::Info =>  style.set_color(Color::Green).set_intense(true).value("INFO "),
                log::Level::Debug => style.set_color(Color::Cyan).set_intense(true).value("DEBUG"),
                log::Level::Trace => style.set_color(Color::Blue).set_intense(true).value("TRACE"),
            };

            writeln!(buf, "[{:08} +{:08}] {} {}", num_accesses, delta_accesses, level, record.args())
        })
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = Config::from_file(&args.config)?;

    run_emulator(config, args)
}
