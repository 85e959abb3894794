mod file;
mod socket;

use std::io::{self, Read};

use crate::types::Cell;

pub use self::file::FsFile;
pub use self::socket::TcpSocket;

/// The single file handle available to `#`, `;` and `:`.
pub trait FileChannel {
    /// Opens `path` for reading and writing. The file must already exist.
    fn open(&mut self, path: &[u8]) -> io::Result<()>;

    /// Closes the handle if one is open. Calling it again is a no-op.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Next byte of the file, 0 at end of file.
    fn read_byte(&mut self) -> io::Result<Cell>;

    fn write_byte(&mut self, byte: Cell) -> io::Result<()>;
}

/// The single TCP connection available to `%`, `^` and `!`.
pub trait SocketChannel {
    /// Connects to `target:port`, or, when `target` is empty, listens on
    /// `port` and blocks until one peer connects.
    fn open(&mut self, target: &[u8], port: u16) -> io::Result<()>;

    /// Drops both the listener and the connection. Idempotent.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    fn send_byte(&mut self, byte: Cell) -> io::Result<()>;

    /// Next byte from the peer, 0 once the peer is gone.
    fn recv_byte(&mut self) -> Cell;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    File,
    Socket,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelKind::File => write!(f, "file"),
            ChannelKind::Socket => write!(f, "socket"),
        }
    }
}

/// Process-wide I/O capabilities owned by a session: at most one file and
/// one socket at a time.
pub struct Channels {
    pub file: Box<dyn FileChannel>,
    pub socket: Box<dyn SocketChannel>,
}

impl Channels {
    pub fn new(file: Box<dyn FileChannel>, socket: Box<dyn SocketChannel>) -> Self {
        Channels { file, socket }
    }

    pub fn system() -> Self {
        Self::new(Box::new(FsFile::new()), Box::new(TcpSocket::new()))
    }

    pub fn close_all(&mut self) {
        self.file.close();
        self.socket.close();
    }
}

impl Drop for Channels {
    fn drop(&mut self) {
        self.close_all();
    }
}

/// Reads one byte, 0 at end of stream. Interrupted reads are retried.
fn read_one<R: Read>(reader: &mut R) -> io::Result<Cell> {
    let mut byte = [0; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(0),
            Ok(_) => return Ok(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn decode_name(name: &[u8]) -> io::Result<&str> {
    std::str::from_utf8(name).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}
