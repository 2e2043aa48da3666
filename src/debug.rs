use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Per-cycle CPU state logger behind the `-D` flag. One line per executed
/// instruction: opcode, V0-VF, I, PC and SP.
pub struct Tracer {
    out: BufWriter<File>,
}

impl Tracer {
    /// Opens the trace log, refusing to reuse an existing file.
    pub fn create(path: &Path) -> io::Result<Tracer> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("log file {} already exists", path.display()),
            ));
        }

        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{} DEBUGGING {}", "#".repeat(50), "#".repeat(51))?;
        Ok(Tracer { out })
    }

    pub fn log_cpu_state(
        &mut self,
        opcode: u16,
        v: &[u8; 16],
        i: u16,
        pc: u16,
        sp: u8,
    ) -> io::Result<()> {
        write!(self.out, "| {:04x}", opcode)?;
        for (n, value) in v.iter().enumerate() {
            write!(self.out, " |{:x}:0x{:02x}", n, value)?;
        }
        writeln!(
            self.out,
            " |I:0x{:04x} |PC:0x{:04x} |SP:{:4} |",
            i, pc, sp
        )
    }

    /// Writes the closing banner and flushes the log.
    pub fn stop(mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "#".repeat(112))?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("chip8-trace-{}-{}.log", tag, std::process::id()))
    }

    #[test]
    fn test_refuses_existing_file() {
        let path = scratch_path("existing");
        fs::write(&path, b"already here").unwrap();

        let result = Tracer::create(&path);
        assert!(result.is_err());
        assert_eq!(
            result.err().unwrap().kind(),
            io::ErrorKind::AlreadyExists
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_writes_banner_and_state_line() {
        let path = scratch_path("state");
        let _ = fs::remove_file(&path);

        let mut tracer = Tracer::create(&path).unwrap();
        let mut v = [0u8; 16];
        v[0xF] = 1;
        tracer.log_cpu_state(0x8124, &v, 0x0123, 0x0204, 2).unwrap();
        tracer.stop().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("DEBUGGING"));
        assert!(text.contains("| 8124"));
        assert!(text.contains("|f:0x01"));
        assert!(text.contains("|I:0x0123 |PC:0x0204"));

        fs::remove_file(&path).unwrap();
    }
}
