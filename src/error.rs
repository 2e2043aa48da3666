use thiserror::Error;

/// Faults raised by the interpreter core.
///
/// The reference behaviour for out-of-range accesses was undefined array
/// indexing; here every such access is a distinguishable error and the
/// interpreter halts instead of corrupting unrelated state.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("memory address out of range: {addr:#06X}")]
    AddressOutOfRange { addr: u16 },

    #[error("ROM of {size} bytes does not fit at offset {offset:#06X}")]
    RomTooLarge { size: usize, offset: u16 },

    #[error("framebuffer index out of range: {index} (x={x}, y={y})")]
    PixelOutOfRange { index: usize, x: u16, y: u16 },

    #[error("call stack overflow")]
    StackOverflow,

    #[error("call stack underflow")]
    StackUnderflow,

    #[error("unrecognized opcode: {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },

    #[error("display error: {0}")]
    Display(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
