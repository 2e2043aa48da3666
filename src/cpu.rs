use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::debug::Tracer;
use crate::display::{Screen, FB_SIZE, FB_WIDTH};
use crate::error::Chip8Error;
use crate::keypad::{EventSource, KeyEvent, KeyLatch};
use crate::memory::{Memory, FONT_GLYPH_BYTES, PROGRAM_OFFSET};
use crate::opcode::{decode, AluOp, Op};

/// Call stack capacity in return addresses.
pub const STACK_DEPTH: usize = 16;

const NUM_REGISTERS: usize = 16;

/// Interpreter run state. `Halt` is terminal: no further cycles execute
/// until an explicit `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Exec,
    Pause,
    Halt,
}

struct Registers {
    pc: u16,
    sp: u8,
    i: u16,
    v: [u8; NUM_REGISTERS],
}

struct Timers {
    delay: u8,
    sound: u8,
}

/// The CHIP-8 interpreter: registers, call stack, timers, framebuffer and
/// key latch, plus the memory store. Runs fetch/decode/execute one cycle
/// per `update` and pushes framebuffer snapshots to the `Screen`
/// collaborator from the draw-class instructions.
pub struct Cpu<'a> {
    memory: Memory,
    registers: Registers,
    timers: Timers,
    stack: [u16; STACK_DEPTH],
    framebuffer: [u8; FB_SIZE],
    keys: KeyLatch,
    state: State,
    screen: &'a mut dyn Screen,
    rng: StdRng,
    tracer: Option<Tracer>,
}

impl<'a> Cpu<'a> {
    pub fn new(screen: &'a mut dyn Screen) -> Cpu<'a> {
        Cpu {
            memory: Memory::new(),
            registers: Registers {
                pc: PROGRAM_OFFSET,
                sp: 0,
                i: 0,
                v: [0; NUM_REGISTERS],
            },
            timers: Timers { delay: 0, sound: 0 },
            stack: [0; STACK_DEPTH],
            framebuffer: [0; FB_SIZE],
            keys: KeyLatch::new(),
            state: State::Exec,
            screen,
            rng: StdRng::from_entropy(),
            tracer: None,
        }
    }

    /// Returns every piece of interpreter state to its post-power-on
    /// value, including the font table in memory. Required before reusing
    /// a faulted instance.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.registers.pc = PROGRAM_OFFSET;
        self.registers.sp = 0;
        self.registers.i = 0;
        self.registers.v = [0; NUM_REGISTERS];
        self.timers.delay = 0;
        self.timers.sound = 0;
        self.stack = [0; STACK_DEPTH];
        self.framebuffer = [0; FB_SIZE];
        self.keys.reset();
        self.state = State::Exec;
    }

    /// Loads a ROM image from disk at `offset` (conventionally 0x200).
    pub fn load(&mut self, path: &Path, offset: u16) -> Result<usize, Chip8Error> {
        self.memory.load(path, offset)
    }

    /// Latches logical key `n` as pressed, releasing all others.
    pub fn set_key(&mut self, n: u8) {
        self.keys.set_key(n);
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn halt(&mut self) {
        self.state = State::Halt;
    }

    pub fn pause(&mut self) {
        if self.state == State::Exec {
            self.state = State::Pause;
        }
    }

    pub fn resume(&mut self) {
        if self.state == State::Pause {
            self.state = State::Exec;
        }
    }

    pub fn attach_tracer(&mut self, tracer: Tracer) {
        self.tracer = Some(tracer);
    }

    pub fn take_tracer(&mut self) -> Option<Tracer> {
        self.tracer.take()
    }

    /// Runs one fetch/decode/execute cycle. Any fault transitions the
    /// interpreter to `Halt` and is returned to the caller for reporting.
    pub fn update(&mut self, events: &mut dyn EventSource) -> Result<(), Chip8Error> {
        if self.state != State::Exec {
            return Ok(());
        }

        match self.cycle(events) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state = State::Halt;
                Err(e)
            }
        }
    }

    fn cycle(&mut self, events: &mut dyn EventSource) -> Result<(), Chip8Error> {
        let word = self.fetch()?;
        let op = decode(word);

        if let Some(tracer) = self.tracer.as_mut() {
            tracer.log_cpu_state(
                word,
                &self.registers.v,
                self.registers.i,
                self.registers.pc,
                self.registers.sp,
            )?;
        }

        self.execute(word, op, events)?;

        // Both timers tick once per cycle and wrap below zero; the
        // reference behaviour, pinned by test.
        self.timers.delay = self.timers.delay.wrapping_sub(1);
        self.timers.sound = self.timers.sound.wrapping_sub(1);
        Ok(())
    }

    // Composes the big-endian instruction word at PC. PC itself advances
    // inside execute, so a blocked FX0A refetches the same word.
    fn fetch(&self) -> Result<u16, Chip8Error> {
        let msb = self.memory.read(self.registers.pc)?;
        let lsb = self.memory.read(self.registers.pc.wrapping_add(1))?;
        Ok((msb as u16) << 8 | lsb as u16)
    }

    fn execute(
        &mut self,
        word: u16,
        op: Op,
        events: &mut dyn EventSource,
    ) -> Result<(), Chip8Error> {
        match op {
            Op::Nop => self.registers.pc += 2,

            Op::Cls => {
                self.framebuffer = [0; FB_SIZE];
                self.screen.clear()?;
                self.registers.pc += 2;
            }

            Op::Ret => {
                self.registers.pc = self.pop()?;
                self.registers.pc += 2;
            }

            // Legacy SYS: jump through the byte stored at the opcode's own
            // address.
            Op::Sys { addr } => self.registers.pc = self.memory.read(addr)? as u16,

            Op::Jump { addr } => self.registers.pc = addr,

            Op::Call { addr } => {
                self.push(self.registers.pc)?;
                self.registers.pc = addr;
            }

            Op::SkipEqImm { x, nn } => self.skip(self.registers.v[x as usize] == nn),
            Op::SkipNeImm { x, nn } => self.skip(self.registers.v[x as usize] != nn),
            Op::SkipEqReg { x, y } => {
                self.skip(self.registers.v[x as usize] == self.registers.v[y as usize])
            }
            Op::SkipNeReg { x, y } => {
                self.skip(self.registers.v[x as usize] != self.registers.v[y as usize])
            }

            Op::LoadImm { x, nn } => {
                self.registers.v[x as usize] = nn;
                self.registers.pc += 2;
            }

            Op::AddImm { x, nn } => {
                let v = &mut self.registers.v[x as usize];
                *v = v.wrapping_add(nn);
                self.registers.pc += 2;
            }

            Op::Alu { x, y, op } => self.alu(op, x as usize, y as usize),

            Op::LoadIndex { addr } => {
                self.registers.i = addr;
                self.registers.pc += 2;
            }

            Op::JumpOffset { addr } => {
                self.registers.pc = addr.wrapping_add(self.registers.v[0] as u16)
            }

            Op::Random { x, nn } => {
                self.registers.v[x as usize] = self.rng.gen::<u8>() & nn;
                self.registers.pc += 2;
            }

            Op::Draw { x, y, n } => self.draw_sprite(x, y, n)?,

            Op::SkipKeyPressed { x } => {
                let key = self.registers.v[x as usize];
                if self.keys.is_pressed(key) {
                    // consuming skip: a successful check releases the key
                    self.keys.release(key);
                    self.registers.pc += 4;
                } else {
                    self.registers.pc += 2;
                }
            }

            Op::SkipKeyNotPressed { x } => {
                let key = self.registers.v[x as usize];
                self.skip(!self.keys.is_pressed(key));
            }

            Op::ReadDelay { x } => {
                self.registers.v[x as usize] = self.timers.delay;
                self.registers.pc += 2;
            }

            Op::WaitKey { x } => self.wait_key(x, events),

            Op::SetDelay { x } => {
                self.timers.delay = self.registers.v[x as usize];
                self.registers.pc += 2;
            }

            Op::SetSound { x } => {
                self.timers.sound = self.registers.v[x as usize];
                self.registers.pc += 2;
            }

            Op::AddIndex { x } => {
                self.registers.i = self
                    .registers
                    .i
                    .wrapping_add(self.registers.v[x as usize] as u16);
                self.registers.pc += 2;
            }

            Op::FontAddr { x } => {
                self.registers.i = self.registers.v[x as usize] as u16 * FONT_GLYPH_BYTES;
                self.registers.pc += 2;
            }

            Op::StoreBcd { x } => {
                let value = self.registers.v[x as usize];
                let i = self.registers.i;
                self.memory.write(i, value / 100)?;
                self.memory.write(i.wrapping_add(1), (value / 10) % 10)?;
                self.memory.write(i.wrapping_add(2), value % 10)?;
                self.registers.pc += 2;
            }

            Op::StoreRegs { x } => {
                for n in 0..=x as u16 {
                    self.memory
                        .write(self.registers.i.wrapping_add(n), self.registers.v[n as usize])?;
                }
                self.registers.pc += 2;
            }

            Op::LoadRegs { x } => {
                for n in 0..=x as u16 {
                    self.registers.v[n as usize] =
                        self.memory.read(self.registers.i.wrapping_add(n))?;
                }
                self.registers.pc += 2;
            }

            Op::Invalid => return Err(Chip8Error::UnknownOpcode { opcode: word }),
        }

        Ok(())
    }

    // One helper for the whole 8XY_ class; results truncate to 8 bits and
    // the flag, where one exists, lands in VF after the result is written.
    fn alu(&mut self, op: AluOp, x: usize, y: usize) {
        let vx = self.registers.v[x];
        let vy = self.registers.v[y];

        let (value, flag) = match op {
            AluOp::Load => (vy, None),
            AluOp::Or => (vx | vy, None),
            AluOp::And => (vx & vy, None),
            AluOp::Xor => (vx ^ vy, None),
            AluOp::Add => {
                let sum = vx as u16 + vy as u16;
                (sum as u8, Some((sum > 0xFF) as u8))
            }
            // borrow flag is 1 only for strictly-greater minuend, matching
            // the reference convention; pinned by test
            AluOp::Sub => (vx.wrapping_sub(vy), Some((vx > vy) as u8)),
            AluOp::SubNeg => (vy.wrapping_sub(vx), Some((vy > vx) as u8)),
            AluOp::ShiftRight => (vx >> 1, Some(vx & 0x01)),
            AluOp::ShiftLeft => (vx << 1, Some((vx & 0x80) >> 7)),
        };

        self.registers.v[x] = value;
        if let Some(flag) = flag {
            self.registers.v[0xF] = flag;
        }
        self.registers.pc += 2;
    }

    // DXYN: XOR-draws an N-row sprite from memory[I], setting VF on
    // collision. Coordinates are not wrapped; an index past the
    // framebuffer is an explicit fault. One display push per instruction,
    // after all rows.
    fn draw_sprite(&mut self, x: u8, y: u8, n: u8) -> Result<(), Chip8Error> {
        let x = self.registers.v[x as usize] as usize;
        let y = self.registers.v[y as usize] as usize;
        self.registers.v[0xF] = 0;

        for row in 0..n as usize {
            let bits = self.memory.read(self.registers.i.wrapping_add(row as u16))?;
            for col in 0..8 {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let index = x + col + (y + row) * FB_WIDTH;
                if index >= FB_SIZE {
                    return Err(Chip8Error::PixelOutOfRange {
                        index,
                        x: (x + col) as u16,
                        y: (y + row) as u16,
                    });
                }
                if self.framebuffer[index] == 1 {
                    self.registers.v[0xF] = 1;
                }
                self.framebuffer[index] ^= 1;
            }
        }

        self.screen.draw(&self.framebuffer)?;
        self.registers.pc += 2;
        Ok(())
    }

    // FX0A: the one instruction allowed to suspend progress. Blocks on the
    // caller-supplied event source; a quit signal halts without advancing
    // PC, any event other than a key-down leaves PC unchanged so the next
    // cycle waits again.
    fn wait_key(&mut self, x: u8, events: &mut dyn EventSource) {
        match events.wait() {
            KeyEvent::Key(n) => {
                self.registers.v[x as usize] = n;
                self.keys.set_key(n);
                self.registers.pc += 2;
            }
            KeyEvent::Quit => self.state = State::Halt,
            KeyEvent::Other => {}
        }
    }

    fn skip(&mut self, condition: bool) {
        self.registers.pc += if condition { 4 } else { 2 };
    }

    fn push(&mut self, value: u16) -> Result<(), Chip8Error> {
        if self.registers.sp as usize >= STACK_DEPTH {
            return Err(Chip8Error::StackOverflow);
        }
        self.stack[self.registers.sp as usize] = value;
        self.registers.sp += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<u16, Chip8Error> {
        if self.registers.sp == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        self.registers.sp -= 1;
        Ok(self.stack[self.registers.sp as usize])
    }
}
