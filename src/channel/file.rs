use std::fs::{File, OpenOptions};
use std::io::{self, Write};

use tracing::debug;

use super::{decode_name, read_one, FileChannel};
use crate::types::Cell;

#[derive(Debug, Default)]
pub struct FsFile {
    file: Option<File>,
}

impl FsFile {
    pub fn new() -> Self {
        FsFile { file: None }
    }
}

impl FileChannel for FsFile {
    fn open(&mut self, path: &[u8]) -> io::Result<()> {
        let path = decode_name(path)?;
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        debug!(path, "file channel opened");

        self.file = Some(file);
        Ok(())
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            debug!("file channel closed");
        }
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn read_byte(&mut self) -> io::Result<Cell> {
        match self.file.as_mut() {
            Some(file) => read_one(file),
            None => Err(io::ErrorKind::NotConnected.into()),
        }
    }

    fn write_byte(&mut self, byte: Cell) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(&[byte]),
            None => Err(io::ErrorKind::NotConnected.into()),
        }
    }
}
