//! Instruction decoding: a fetched 16-bit word is classified into one of
//! the 35 CHIP-8 operations by nibble inspection. Decode is a pure
//! function over a tagged enum so it can be tested without touching
//! interpreter state.

/// Register-register operations in the 8XY_ class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Load,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubNeg,
    ShiftLeft,
}

/// A decoded instruction. Field names follow the conventional bit-field
/// mnemonics: X and Y are register indices, N/NN/NNN are 4/8/12-bit
/// literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Nop,
    Cls,
    Ret,
    /// Legacy 0NNN "SYS", treated as an indirect jump through memory.
    Sys { addr: u16 },
    Jump { addr: u16 },
    Call { addr: u16 },
    SkipEqImm { x: u8, nn: u8 },
    SkipNeImm { x: u8, nn: u8 },
    SkipEqReg { x: u8, y: u8 },
    LoadImm { x: u8, nn: u8 },
    AddImm { x: u8, nn: u8 },
    Alu { x: u8, y: u8, op: AluOp },
    SkipNeReg { x: u8, y: u8 },
    LoadIndex { addr: u16 },
    JumpOffset { addr: u16 },
    Random { x: u8, nn: u8 },
    Draw { x: u8, y: u8, n: u8 },
    SkipKeyPressed { x: u8 },
    SkipKeyNotPressed { x: u8 },
    ReadDelay { x: u8 },
    WaitKey { x: u8 },
    SetDelay { x: u8 },
    SetSound { x: u8 },
    AddIndex { x: u8 },
    FontAddr { x: u8 },
    StoreBcd { x: u8 },
    StoreRegs { x: u8 },
    LoadRegs { x: u8 },
    /// No known pattern matched; executing this halts the interpreter.
    Invalid,
}

/// Classifies a 16-bit instruction word.
pub fn decode(word: u16) -> Op {
    let x = ((word & 0x0F00) >> 8) as u8;
    let y = ((word & 0x00F0) >> 4) as u8;
    let n = (word & 0x000F) as u8;
    let nn = (word & 0x00FF) as u8;
    let nnn = word & 0x0FFF;

    match word & 0xF000 {
        0x0000 => match nn {
            0x00 => Op::Nop,
            0xE0 => Op::Cls,
            0xEE => Op::Ret,
            _ => Op::Sys { addr: nnn },
        },
        0x1000 => Op::Jump { addr: nnn },
        0x2000 => Op::Call { addr: nnn },
        0x3000 => Op::SkipEqImm { x, nn },
        0x4000 => Op::SkipNeImm { x, nn },
        // 5XY0 and 9XY0 require a zero low nibble on real hardware
        0x5000 if n == 0 => Op::SkipEqReg { x, y },
        0x5000 => Op::Invalid,
        0x6000 => Op::LoadImm { x, nn },
        0x7000 => Op::AddImm { x, nn },
        0x8000 => match n {
            0x0 => Op::Alu { x, y, op: AluOp::Load },
            0x1 => Op::Alu { x, y, op: AluOp::Or },
            0x2 => Op::Alu { x, y, op: AluOp::And },
            0x3 => Op::Alu { x, y, op: AluOp::Xor },
            0x4 => Op::Alu { x, y, op: AluOp::Add },
            0x5 => Op::Alu { x, y, op: AluOp::Sub },
            0x6 => Op::Alu { x, y, op: AluOp::ShiftRight },
            0x7 => Op::Alu { x, y, op: AluOp::SubNeg },
            0xE => Op::Alu { x, y, op: AluOp::ShiftLeft },
            _ => Op::Invalid,
        },
        0x9000 if n == 0 => Op::SkipNeReg { x, y },
        0x9000 => Op::Invalid,
        0xA000 => Op::LoadIndex { addr: nnn },
        0xB000 => Op::JumpOffset { addr: nnn },
        0xC000 => Op::Random { x, nn },
        0xD000 => Op::Draw { x, y, n },
        0xE000 => match nn {
            0x9E => Op::SkipKeyPressed { x },
            0xA1 => Op::SkipKeyNotPressed { x },
            _ => Op::Invalid,
        },
        0xF000 => match nn {
            0x07 => Op::ReadDelay { x },
            0x0A => Op::WaitKey { x },
            0x15 => Op::SetDelay { x },
            0x18 => Op::SetSound { x },
            0x1E => Op::AddIndex { x },
            0x29 => Op::FontAddr { x },
            0x33 => Op::StoreBcd { x },
            0x55 => Op::StoreRegs { x },
            0x65 => Op::LoadRegs { x },
            _ => Op::Invalid,
        },
        _ => unreachable!("top nibble covers all 16 values"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_class() {
        assert_eq!(decode(0x0000), Op::Nop);
        assert_eq!(decode(0x0100), Op::Nop); // low byte 0x00 is nop regardless of X
        assert_eq!(decode(0x00E0), Op::Cls);
        assert_eq!(decode(0x00EE), Op::Ret);
        assert_eq!(decode(0x0123), Op::Sys { addr: 0x123 });
    }

    #[test]
    fn test_jumps_and_calls() {
        assert_eq!(decode(0x1ABC), Op::Jump { addr: 0xABC });
        assert_eq!(decode(0x2ABC), Op::Call { addr: 0xABC });
        assert_eq!(decode(0xB321), Op::JumpOffset { addr: 0x321 });
    }

    #[test]
    fn test_skips() {
        assert_eq!(decode(0x3A42), Op::SkipEqImm { x: 0xA, nn: 0x42 });
        assert_eq!(decode(0x4A42), Op::SkipNeImm { x: 0xA, nn: 0x42 });
        assert_eq!(decode(0x5AB0), Op::SkipEqReg { x: 0xA, y: 0xB });
        assert_eq!(decode(0x9AB0), Op::SkipNeReg { x: 0xA, y: 0xB });
    }

    #[test]
    fn test_skip_low_nibble_must_be_zero() {
        assert_eq!(decode(0x5001), Op::Invalid);
        assert_eq!(decode(0x5ABF), Op::Invalid);
        assert_eq!(decode(0x9AB3), Op::Invalid);
    }

    #[test]
    fn test_loads() {
        assert_eq!(decode(0x6C55), Op::LoadImm { x: 0xC, nn: 0x55 });
        assert_eq!(decode(0x7C55), Op::AddImm { x: 0xC, nn: 0x55 });
        assert_eq!(decode(0xA123), Op::LoadIndex { addr: 0x123 });
    }

    #[test]
    fn test_alu_class() {
        let cases = [
            (0x8120, AluOp::Load),
            (0x8121, AluOp::Or),
            (0x8122, AluOp::And),
            (0x8123, AluOp::Xor),
            (0x8124, AluOp::Add),
            (0x8125, AluOp::Sub),
            (0x8126, AluOp::ShiftRight),
            (0x8127, AluOp::SubNeg),
            (0x812E, AluOp::ShiftLeft),
        ];
        for (word, op) in cases {
            assert_eq!(decode(word), Op::Alu { x: 1, y: 2, op });
        }
        assert_eq!(decode(0x8128), Op::Invalid);
        assert_eq!(decode(0x812F), Op::Invalid);
    }

    #[test]
    fn test_key_class() {
        assert_eq!(decode(0xE39E), Op::SkipKeyPressed { x: 3 });
        assert_eq!(decode(0xE3A1), Op::SkipKeyNotPressed { x: 3 });
        assert_eq!(decode(0xE300), Op::Invalid);
    }

    #[test]
    fn test_misc_class() {
        assert_eq!(decode(0xF107), Op::ReadDelay { x: 1 });
        assert_eq!(decode(0xF10A), Op::WaitKey { x: 1 });
        assert_eq!(decode(0xF115), Op::SetDelay { x: 1 });
        assert_eq!(decode(0xF118), Op::SetSound { x: 1 });
        assert_eq!(decode(0xF11E), Op::AddIndex { x: 1 });
        assert_eq!(decode(0xF129), Op::FontAddr { x: 1 });
        assert_eq!(decode(0xF133), Op::StoreBcd { x: 1 });
        assert_eq!(decode(0xF155), Op::StoreRegs { x: 1 });
        assert_eq!(decode(0xF165), Op::LoadRegs { x: 1 });
        assert_eq!(decode(0xF1FF), Op::Invalid);
    }

    #[test]
    fn test_draw_and_random() {
        assert_eq!(decode(0xD125), Op::Draw { x: 1, y: 2, n: 5 });
        assert_eq!(decode(0xC3F0), Op::Random { x: 3, nn: 0xF0 });
    }
}
