use std::fs;
use std::path::Path;

use crate::error::Chip8Error;

/// Size of the addressable byte store. The CHIP-8 address space is 4K;
/// the reference implementation reserved one byte less (0xFFF), which is
/// corrected here so 0x0FFF is a valid address.
pub const MEM_SIZE: usize = 0x1000;

/// Conventional ROM load offset.
pub const PROGRAM_OFFSET: u16 = 0x200;

/// Bytes per built-in font glyph.
pub const FONT_GLYPH_BYTES: u16 = 5;

// Standard CHIP-8 font set, 16 glyphs of 5 bytes each, resident at
// 0x000-0x04F after every reset.
const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Flat byte store owned by the interpreter. All access goes through
/// bounds-checked `read`/`write`; nothing outside the interpreter may
/// address it directly.
pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {
    pub fn new() -> Memory {
        let mut memory = Memory {
            bytes: [0; MEM_SIZE],
        };
        memory.reset();
        memory
    }

    /// Zeroes the store and re-seeds the font table.
    pub fn reset(&mut self) {
        self.bytes = [0; MEM_SIZE];
        self.bytes[..FONT.len()].copy_from_slice(&FONT);
    }

    /// Reads the file at `path` into the store starting at `offset`.
    pub fn load(&mut self, path: &Path, offset: u16) -> Result<usize, Chip8Error> {
        let rom = fs::read(path)?;
        self.load_bytes(&rom, offset)?;
        log::info!("loaded {} byte ROM from {}", rom.len(), path.display());
        Ok(rom.len())
    }

    /// Copies a ROM image into the store starting at `offset`.
    pub fn load_bytes(&mut self, rom: &[u8], offset: u16) -> Result<(), Chip8Error> {
        let start = offset as usize;
        let end = start
            .checked_add(rom.len())
            .filter(|&end| end <= MEM_SIZE)
            .ok_or(Chip8Error::RomTooLarge {
                size: rom.len(),
                offset,
            })?;
        self.bytes[start..end].copy_from_slice(rom);
        Ok(())
    }

    pub fn read(&self, addr: u16) -> Result<u8, Chip8Error> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(Chip8Error::AddressOutOfRange { addr })
    }

    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), Chip8Error> {
        match self.bytes.get_mut(addr as usize) {
            Some(byte) => {
                *byte = value;
                Ok(())
            }
            None => Err(Chip8Error::AddressOutOfRange { addr }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_seeds_font() {
        let memory = Memory::new();
        assert_eq!(&memory.bytes[..80], &FONT);
        // glyph 0 and glyph F pinned exactly for ROM compatibility
        assert_eq!(&memory.bytes[0..5], &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(&memory.bytes[75..80], &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
    }

    #[test]
    fn test_reset_zeroes_above_font() {
        let memory = Memory::new();
        assert!(memory.bytes[80..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_rom_round_trip() {
        let mut memory = Memory::new();
        let rom = [0x60, 0x05, 0x60, 0x0A, 0x80, 0x14, 0x00, 0xE0];
        memory.load_bytes(&rom, PROGRAM_OFFSET).unwrap();
        assert_eq!(&memory.bytes[0x200..0x208], &rom);
    }

    #[test]
    fn test_rom_too_large() {
        let mut memory = Memory::new();
        let rom = vec![0xAA; MEM_SIZE];
        let result = memory.load_bytes(&rom, PROGRAM_OFFSET);
        assert!(matches!(result, Err(Chip8Error::RomTooLarge { .. })));
    }

    #[test]
    fn test_rom_fits_exactly() {
        let mut memory = Memory::new();
        let rom = vec![0xAA; MEM_SIZE - 0x200];
        memory.load_bytes(&rom, PROGRAM_OFFSET).unwrap();
        assert_eq!(memory.bytes[MEM_SIZE - 1], 0xAA);
    }

    #[test]
    fn test_read_write_in_range() {
        let mut memory = Memory::new();
        memory.write(0x0FFF, 0x42).unwrap();
        assert_eq!(memory.read(0x0FFF).unwrap(), 0x42);
    }

    #[test]
    fn test_out_of_range_is_a_fault() {
        let mut memory = Memory::new();
        assert!(matches!(
            memory.read(0x1000),
            Err(Chip8Error::AddressOutOfRange { addr: 0x1000 })
        ));
        assert!(matches!(
            memory.write(0x1000, 0),
            Err(Chip8Error::AddressOutOfRange { addr: 0x1000 })
        ));
    }

    #[test]
    fn test_missing_rom_file_reports_error() {
        let mut memory = Memory::new();
        let result = memory.load(Path::new("does-not-exist.ch8"), PROGRAM_OFFSET);
        assert!(matches!(result, Err(Chip8Error::Io(_))));
    }
}
