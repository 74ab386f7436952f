use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Lazily reads lines from a buffered source, one at a time.
///
/// `\n`, `\r\n` and a bare `\r` all end a line. Only the current line is held
/// in memory; its buffer is reused for the next one. The file handle is closed
/// when the reader is dropped, on every exit path.
#[derive(Debug)]
pub struct LogLines<R> {
    reader: R,
    buf: Vec<u8>,
    // Last line ended in `\r`; a leading `\n` belongs to that terminator
    pending_lf: bool,
    line_number: usize,
    bytes_read: u64,
    longest_line: usize,
    peak_capacity: usize,
}

impl LogLines<BufReader<File>> {
    /// Opens `path` with a read buffer of `buffer_size` bytes
    pub fn open(path: &Path, buffer_size: usize) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::with_capacity(buffer_size.max(1), file)))
    }
}

impl<R: BufRead> LogLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            pending_lf: false,
            line_number: 0,
            bytes_read: 0,
            longest_line: 0,
            peak_capacity: 0,
        }
    }

    /// The underlying reader
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Returns the next line without its terminator, or `None` at end of
    /// input. The slice is valid until the next call.
    pub fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.buf.clear();

        if std::mem::take(&mut self.pending_lf)
            && fill(&mut self.reader)?.first() == Some(&b'\n')
        {
            self.reader.consume(1);
            self.bytes_read += 1;
        }

        let mut read = 0;
        loop {
            let available = fill(&mut self.reader)?;
            if available.is_empty() {
                break;
            }

            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(i) => {
                    self.buf.extend_from_slice(&available[..i]);
                    self.pending_lf = available[i] == b'\r';
                    self.reader.consume(i + 1);
                    read += i + 1;
                    break;
                }
                None => {
                    let n = available.len();
                    self.buf.extend_from_slice(available);
                    self.reader.consume(n);
                    read += n;
                }
            }
        }

        if read == 0 {
            return Ok(None);
        }

        self.line_number += 1;
        self.bytes_read += read as u64;
        self.longest_line = self.longest_line.max(read);
        self.peak_capacity = self.peak_capacity.max(self.buf.capacity());
        Ok(Some(&self.buf))
    }

    /// 1-based number of the line last returned
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Length of the longest raw line seen so far, terminator included
    pub fn longest_line(&self) -> usize {
        self.longest_line
    }

    /// Largest capacity the line buffer has grown to
    pub fn peak_capacity(&self) -> usize {
        self.peak_capacity
    }
}

fn fill<R: BufRead>(reader: &mut R) -> io::Result<&[u8]> {
    loop {
        match reader.fill_buf() {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
            Ok(_) => break,
        }
    }
    reader.fill_buf()
}
