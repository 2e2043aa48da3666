mod config;
mod cpu;
mod debug;
mod display;
mod error;
mod keypad;
mod memory;
mod opcode;
mod system;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chip8", version, about = "CHIP-8 virtual machine emulator")]
struct Args {
    /// Path to the CHIP-8 ROM image
    rom: PathBuf,

    /// Write a per-cycle CPU state log to this file
    #[arg(short = 'D', long = "debug", value_name = "LOG_PATH")]
    debug: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.rom.is_file() {
        // reported and exits cleanly; a missing ROM is not a process error
        log::error!("unable to find ROM: {}", args.rom.display());
        return Ok(());
    }

    system::run(&system::SystemOptions {
        rom: args.rom,
        trace: args.debug,
    })
}
