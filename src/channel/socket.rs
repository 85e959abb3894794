use std::io::{self, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};

use tracing::debug;

use super::{decode_name, read_one, SocketChannel};
use crate::types::Cell;

#[derive(Debug, Default)]
pub struct TcpSocket {
    // kept only in server role, until the channel is closed
    listener: Option<TcpListener>,
    stream: Option<TcpStream>,
}

impl TcpSocket {
    pub fn new() -> Self {
        TcpSocket {
            listener: None,
            stream: None,
        }
    }

    fn serve(&mut self, port: u16) -> io::Result<()> {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))?;
        debug!(port, "socket channel waiting for a peer");

        let (stream, peer) = listener.accept()?;
        debug!(%peer, "socket channel accepted");

        self.listener = Some(listener);
        self.stream = Some(stream);
        Ok(())
    }

    fn connect(&mut self, host: &str, port: u16) -> io::Result<()> {
        let stream = TcpStream::connect((host, port))?;
        debug!(host, port, "socket channel connected");

        self.stream = Some(stream);
        Ok(())
    }
}

impl SocketChannel for TcpSocket {
    fn open(&mut self, target: &[u8], port: u16) -> io::Result<()> {
        if target.is_empty() {
            self.serve(port)
        } else {
            let host = decode_name(target)?;
            self.connect(host, port)
        }
    }

    fn close(&mut self) {
        let had_stream = self.stream.take().is_some();
        let had_listener = self.listener.take().is_some();
        if had_stream || had_listener {
            debug!("socket channel closed");
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn send_byte(&mut self, byte: Cell) -> io::Result<()> {
        match self.stream.as_mut() {
            Some(stream) => stream.write_all(&[byte]),
            None => Ok(()),
        }
    }

    fn recv_byte(&mut self) -> Cell {
        match self.stream.as_mut() {
            Some(stream) => read_one(stream).unwrap_or(0),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn client_exchanges_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let peer = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0; 1];
            stream.read_exact(&mut buf).unwrap();
            stream.write_all(&[buf[0] + 1]).unwrap();
        });

        let mut socket = TcpSocket::new();
        socket.open(b"127.0.0.1", port).unwrap();
        assert!(socket.is_open());

        socket.send_byte(41).unwrap();
        assert_eq!(socket.recv_byte(), 42);

        peer.join().unwrap();
        assert_eq!(socket.recv_byte(), 0);

        socket.close();
        socket.close();
        assert!(!socket.is_open());
    }

    #[test]
    fn server_keeps_listener_until_close() {
        let port = {
            let free = TcpListener::bind("127.0.0.1:0").unwrap();
            free.local_addr().unwrap().port()
        };

        let peer = thread::spawn(move || loop {
            if let Ok(mut stream) = TcpStream::connect(("127.0.0.1", port)) {
                stream.write_all(&[7]).unwrap();
                break;
            }
            thread::sleep(Duration::from_millis(10));
        });

        let mut socket = TcpSocket::new();
        socket.open(b"", port).unwrap();
        assert!(socket.is_open());
        assert!(socket.listener.is_some());
        assert_eq!(socket.recv_byte(), 7);
        peer.join().unwrap();

        socket.close();
        assert!(!socket.is_open());
        assert!(socket.listener.is_none());
    }

    #[test]
    fn closed_socket_is_inert() {
        let mut socket = TcpSocket::new();
        assert!(socket.send_byte(1).is_ok());
        assert_eq!(socket.recv_byte(), 0);
    }

    #[test]
    fn unresolvable_host_fails() {
        let mut socket = TcpSocket::new();
        assert!(socket.open(b"no such host.invalid", 1).is_err());
        assert!(!socket.is_open());
    }
}
