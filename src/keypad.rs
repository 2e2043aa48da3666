use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::EventPump;

/// A host input event reduced to what the interpreter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Key-down on one of the 16 logical CHIP-8 keys.
    Key(u8),
    /// The host asked the program to quit.
    Quit,
    /// Anything else; ignored except to wake a blocking wait.
    Other,
}

/// Supplies logical input events to the interpreter. `poll` is
/// non-blocking and drives the outer loop; `wait` blocks and backs the
/// FX0A key-wait instruction. The core never sees host event types.
pub trait EventSource {
    fn poll(&mut self) -> Option<KeyEvent>;
    fn wait(&mut self) -> KeyEvent;
}

/// Tracks which of the 16 logical keys is currently considered pressed.
///
/// The latch is single-slot: `set_key` clears every other key, so at most
/// one key is pressed in the model at a time. Real CHIP-8 keyboards allow
/// chords; this interpreter's latch does not.
pub struct KeyLatch {
    keys: [bool; 16],
}

impl KeyLatch {
    pub fn new() -> KeyLatch {
        KeyLatch { keys: [false; 16] }
    }

    pub fn reset(&mut self) {
        self.keys = [false; 16];
    }

    /// Marks key `n` pressed and releases all others.
    pub fn set_key(&mut self, n: u8) {
        self.keys = [false; 16];
        self.keys[(n & 0xF) as usize] = true;
    }

    pub fn is_pressed(&self, n: u8) -> bool {
        self.keys[(n & 0xF) as usize]
    }

    pub fn release(&mut self, n: u8) {
        self.keys[(n & 0xF) as usize] = false;
    }
}

// Conventional 1234/QWER/ASDF/ZXCV layout
fn keycode_to_key(keycode: Keycode) -> Option<u8> {
    match keycode {
        Keycode::Num1 => Some(0x1),
        Keycode::Num2 => Some(0x2),
        Keycode::Num3 => Some(0x3),
        Keycode::Num4 => Some(0xC),
        Keycode::Q => Some(0x4),
        Keycode::W => Some(0x5),
        Keycode::E => Some(0x6),
        Keycode::R => Some(0xD),
        Keycode::A => Some(0x7),
        Keycode::S => Some(0x8),
        Keycode::D => Some(0x9),
        Keycode::F => Some(0xE),
        Keycode::Z => Some(0xA),
        Keycode::X => Some(0x0),
        Keycode::C => Some(0xB),
        Keycode::V => Some(0xF),
        _ => None,
    }
}

/// SDL-backed event source.
pub struct SdlEvents {
    pump: EventPump,
}

impl SdlEvents {
    pub fn new(pump: EventPump) -> SdlEvents {
        SdlEvents { pump }
    }

    fn translate(event: Event) -> KeyEvent {
        match event {
            Event::Quit { .. } => KeyEvent::Quit,
            Event::KeyDown {
                keycode: Some(code),
                ..
            } => match keycode_to_key(code) {
                Some(n) => KeyEvent::Key(n),
                None => KeyEvent::Other,
            },
            _ => KeyEvent::Other,
        }
    }
}

impl EventSource for SdlEvents {
    fn poll(&mut self) -> Option<KeyEvent> {
        self.pump.poll_event().map(Self::translate)
    }

    fn wait(&mut self) -> KeyEvent {
        Self::translate(self.pump.wait_event())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_starts_released() {
        let latch = KeyLatch::new();
        assert!((0..16).all(|n| !latch.is_pressed(n)));
    }

    #[test]
    fn test_set_key_is_single_slot() {
        let mut latch = KeyLatch::new();
        latch.set_key(0x4);
        assert!(latch.is_pressed(0x4));

        latch.set_key(0xA);
        assert!(latch.is_pressed(0xA));
        assert!(!latch.is_pressed(0x4));
        assert_eq!((0..16).filter(|&n| latch.is_pressed(n)).count(), 1);
    }

    #[test]
    fn test_release() {
        let mut latch = KeyLatch::new();
        latch.set_key(0x7);
        latch.release(0x7);
        assert!(!latch.is_pressed(0x7));
    }

    #[test]
    fn test_reset_clears_all() {
        let mut latch = KeyLatch::new();
        latch.set_key(0xF);
        latch.reset();
        assert!((0..16).all(|n| !latch.is_pressed(n)));
    }
}
