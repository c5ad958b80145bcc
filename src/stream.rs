//! Reassembles lines from a byte source read in fixed-size chunks.

#[cfg(test)]
#[path = "./stream_tests.rs"]
mod tests;

use std::io::{self, Read};

use crate::{
    Error, ErrorKind,
    dir::Directory,
    session::Session,
};

/// Source name used in error locations for in-memory input.
pub const STRING_SOURCE: &str = "<string>";

/// Splits bytes into lines, keeping the 1-based line counter.
///
/// `\r` and `\n` both end a line, but `\r\n` counts once even when the two
/// bytes arrive in different chunks.
#[derive(Debug, Default)]
pub(crate) struct LineFeed {
    line: usize,
    after_cr: bool,
}

impl LineFeed {
    /// Number of lines handed out so far.
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// Hands every line of `chunk` to `apply`. Trailing bytes after the last
    /// terminator form a final line of their own.
    pub(crate) fn feed<F>(&mut self, chunk: &[u8], mut apply: F) -> Result<(), Error>
    where
        F: FnMut(usize, &[u8]) -> Result<(), Error>,
    {
        let mut start = 0;
        for (i, &byte) in chunk.iter().enumerate() {
            match byte {
                b'\n' if self.after_cr && i == start => {
                    self.after_cr = false;
                    start = i + 1;
                }
                b'\n' | b'\r' => {
                    self.line += 1;
                    self.after_cr = byte == b'\r';
                    apply(self.line, &chunk[start..i])?;
                    start = i + 1;
                }
                _ => self.after_cr = false,
            }
        }
        if start < chunk.len() {
            self.line += 1;
            apply(self.line, &chunk[start..])?;
        }
        Ok(())
    }
}

impl<D: Directory> Session<'_, D> {
    /// Applies every line of `text` in order.
    ///
    /// Errors carry a location naming the source `<string>`.
    pub fn feed_str(&mut self, text: &str) -> Result<(), Error> {
        let mut lines = LineFeed::default();
        lines.feed(text.as_bytes(), |line, bytes| {
            self.apply_bytes(STRING_SOURCE, line, bytes)
        })
    }

    /// Opens `path` relative to the current directory and streams its lines.
    pub fn feed_file(&mut self, path: &str) -> Result<(), Error> {
        let file = self.dir.open_file(path).map_err(|source| ErrorKind::Io {
            path: path.to_owned(),
            source,
        })?;
        let name = self.dir.display(path);
        tracing::debug!(path = %name, depth = self.depth, "reading config file");
        self.feed_reader(file, &name)
    }

    /// Streams the lines of `reader`, naming it `name` in error locations.
    ///
    /// The reader is consumed in chunks of [`Options::buffer_capacity`]
    /// bytes; a line that does not fit fails with
    /// [`ErrorKind::LineTooLong`]. The final line needs no terminator.
    ///
    /// [`Options::buffer_capacity`]: crate::Options::buffer_capacity
    pub fn feed_reader<R: Read>(&mut self, mut reader: R, name: &str) -> Result<(), Error> {
        if self.depth > self.options.max_include_depth {
            return Err(ErrorKind::IncludeTooDeep(self.options.max_include_depth).into());
        }
        self.depth += 1;
        let result = self.stream(&mut reader, name);
        self.depth -= 1;
        result
    }

    fn stream<R: Read>(&mut self, reader: &mut R, name: &str) -> Result<(), Error> {
        let capacity = self.options.buffer_capacity.max(1);
        let mut buf = vec![0u8; capacity];
        let mut filled = 0;
        let mut lines = LineFeed::default();

        loop {
            let read = match reader.read(&mut buf[filled..]) {
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    let err = Error::from(ErrorKind::Io {
                        path: name.to_owned(),
                        source,
                    });
                    return Err(err.or_location(name, lines.line() + 1, &buf[..filled]));
                }
            };
            tracing::trace!(source = name, read, "read chunk");

            if read == 0 {
                return lines.feed(&buf[..filled], |line, bytes| {
                    self.apply_bytes(name, line, bytes)
                });
            }
            filled += read;

            match buf[..filled].iter().rposition(|&b| b == b'\n' || b == b'\r') {
                Some(last) => {
                    lines.feed(&buf[..=last], |line, bytes| {
                        self.apply_bytes(name, line, bytes)
                    })?;
                    buf.copy_within(last + 1..filled, 0);
                    filled -= last + 1;
                }
                None if filled == capacity => {
                    let err = Error::from(ErrorKind::LineTooLong(capacity));
                    return Err(err.or_location(name, lines.line() + 1, &buf[..filled]));
                }
                None => {}
            }
        }
    }

    fn apply_bytes(&mut self, source: &str, line: usize, bytes: &[u8]) -> Result<(), Error> {
        let result = match std::str::from_utf8(bytes) {
            Ok(text) => self.apply_line(text),
            Err(_) => Err(ErrorKind::InvalidUtf8.into()),
        };
        result.map_err(|err| err.or_location(source, line, bytes))
    }
}
