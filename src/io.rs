use std::collections::VecDeque;
use std::io::{self, Read, Stdin, Stdout, Write};

use crate::types::Cell;

pub trait InputStream {
    /// Next input byte, `None` at end of input.
    fn read(&mut self) -> Option<Cell>;
}

pub trait OutputStream {
    fn write(&mut self, value: Cell) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// IO streams implementations
impl InputStream for Stdin {
    fn read(&mut self) -> Option<Cell> {
        Write::flush(&mut io::stdout()).ok()?;

        let mut byte = [0; 1];
        match self.lock().read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }
}

impl OutputStream for Stdout {
    fn write(&mut self, value: Cell) -> io::Result<()> {
        self.write_all(&[value])
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

impl InputStream for VecDeque<Cell> {
    fn read(&mut self) -> Option<Cell> {
        self.pop_front()
    }
}

impl OutputStream for Vec<Cell> {
    fn write(&mut self, value: Cell) -> io::Result<()> {
        self.push(value);
        Ok(())
    }
}

#[cfg(test)]
pub struct EmptyInput;
#[cfg(test)]
impl InputStream for EmptyInput {
    fn read(&mut self) -> Option<Cell> {
        None
    }
}

#[cfg(test)]
pub struct IgnoreOutput;
#[cfg(test)]
impl OutputStream for IgnoreOutput {
    fn write(&mut self, _: Cell) -> io::Result<()> {
        Ok(())
    }
}

/// Output sink that remembers whether anything was written, so the
/// interactive loop knows when to finish the line.
pub struct Tracked<O> {
    inner: O,
    written: bool,
}

impl<O: OutputStream> Tracked<O> {
    pub fn new(inner: O) -> Self {
        Tracked {
            inner,
            written: false,
        }
    }

    pub fn written(&self) -> bool {
        self.written
    }
}

impl<O: OutputStream> OutputStream for Tracked<O> {
    fn write(&mut self, value: Cell) -> io::Result<()> {
        self.written = true;
        self.inner.write(value)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
