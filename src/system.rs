use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::DisplayConfig;
use crate::cpu::{Cpu, State};
use crate::debug::Tracer;
use crate::display::{Screen, SdlScreen};
use crate::error::Chip8Error;
use crate::keypad::{EventSource, KeyEvent, SdlEvents};
use crate::memory::PROGRAM_OFFSET;

/// Optional display configuration, read if present.
const CONFIG_PATH: &str = "assets/config.json";

/// Interpreter cadence in instructions per second. The outer loop owns
/// timing; the core itself has no clock.
const CPU_HZ: u64 = 700;

pub struct SystemOptions {
    pub rom: PathBuf,
    pub trace: Option<PathBuf>,
}

/// Wires the SDL display and event pump to the interpreter and drives the
/// fetch/decode/execute loop until the program quits or the CPU halts.
pub fn run(options: &SystemOptions) -> anyhow::Result<()> {
    let config = DisplayConfig::load(Path::new(CONFIG_PATH));

    let sdl = sdl2::init().map_err(anyhow::Error::msg)?;
    let video = sdl.video().map_err(anyhow::Error::msg)?;
    let pump = sdl.event_pump().map_err(anyhow::Error::msg)?;

    let mut screen = SdlScreen::new(&video, config)?;
    let mut events = SdlEvents::new(pump);
    screen.initialize()?;

    let mut cpu = Cpu::new(&mut screen);

    if let Some(path) = &options.trace {
        cpu.attach_tracer(Tracer::create(path)?);
        log::info!("trace logging enabled: {}", path.display());
    }

    if let Err(e) = cpu.load(&options.rom, PROGRAM_OFFSET) {
        // a load fault is reported to the operator; the run loop never starts
        log::error!("ROM not loaded: {e}");
        return Ok(());
    }

    let cycle = Duration::from_nanos(1_000_000_000 / CPU_HZ);
    let mut next_tick = Instant::now() + cycle;

    while cpu.state() != State::Halt {
        if Instant::now() >= next_tick {
            if let Err(e) = cpu.update(&mut events) {
                report_fault(&e);
                break;
            }
            next_tick += cycle;
        }

        while let Some(event) = events.poll() {
            match event {
                KeyEvent::Quit => cpu.halt(),
                KeyEvent::Key(n) => cpu.set_key(n),
                KeyEvent::Other => {}
            }
        }

        // avoid busy-waiting between ticks
        std::thread::yield_now();
    }

    if let Some(tracer) = cpu.take_tracer() {
        tracer.stop()?;
    }

    drop(cpu);
    screen.finalize()?;
    Ok(())
}

fn report_fault(e: &Chip8Error) {
    log::error!("interpreter halted: {e}");
}
