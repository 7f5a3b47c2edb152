use super::error::ConfError;
use super::state::ConfigFileState;
use std::fs::File;
use std::io::{Cursor, Seek, SeekFrom, Write};

/// A sink that can be cut back to a given length, such as a file being
/// rewritten in place.
pub trait Truncate: Write + Seek {
    fn truncate(&mut self, len: u64) -> std::io::Result<()>;
}

impl Truncate for File {
    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len)
    }
}

impl Truncate for Cursor<Vec<u8>> {
    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        self.get_mut().truncate(len);
        Ok(())
    }
}

impl ConfigFileState {
    /// Write every retained line followed by `\n`.
    ///
    /// Returns the number of bytes written. Any write error is returned as is.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<u64, ConfError> {
        let mut written = 0u64;
        for line in self.retained_lines() {
            let bytes = line.as_bytes();
            writer.write_all(bytes)?;
            writer.write_all(b"\n")?;
            written += bytes.len() as u64 + 1;
        }
        writer.flush()?;
        Ok(written)
    }

    /// Empty `writer` and rewind it, then [`write_to`](Self::write_to).
    ///
    /// Nothing is written if truncating or seeking fails.
    pub fn write_truncating<W: Truncate>(&self, writer: &mut W) -> Result<u64, ConfError> {
        writer.truncate(0)?;
        writer.seek(SeekFrom::Start(0))?;
        self.write_to(writer)
    }
}
