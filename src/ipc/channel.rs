//! Single-client duplex byte channel.
//!
//! ```text
//! Trading process                         Decision process
//! ┌──────────────────────┐               ┌──────────────────────┐
//! │ Channel::listen()    │               │                      │
//! │ Channel::accept() ◄──┼── connect ────┼─ Channel::connect()  │
//! │   send() ────────────┼──────────────►│   recv()             │
//! │   recv() ◄───────────┼───────────────┼── send()             │
//! └──────────────────────┘               └──────────────────────┘
//! ```
//!
//! The listening side accepts exactly one peer over its whole lifetime. The
//! listener socket is dropped as soon as that peer is accepted, so later
//! connection attempts are refused by the OS and later `accept` calls fail
//! with [`ChannelError::AlreadyConnected`].
//!
//! `send` and `recv` move whole buffers; short reads and writes are retried
//! internally. Any broken pipe, reset or EOF surfaces as
//! [`ChannelError::Disconnected`].

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::io::AsRawFd;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::ChannelError;
use crate::ipc::endpoint::EndpointIdentity;

type Result<T> = std::result::Result<T, ChannelError>;

#[derive(Debug)]
enum State {
    Listening(UnixListener),
    Connected(UnixStream),
    Closed,
}

/// One end of a bridge channel.
#[derive(Debug)]
pub struct Channel {
    state: State,
    /// Socket file owned by the listening side, unlinked on close.
    socket_path: Option<PathBuf>,
    /// Endpoint lock of the listening side.
    lock: Option<File>,
    name: String,
}

impl Channel {
    /// Creates the named endpoint for `identity` inside `dir`.
    ///
    /// The endpoint is guarded by an advisory lock on `{name}.lock`, held
    /// for the channel's lifetime and released by the kernel if the process
    /// dies. A socket file found while holding the lock was left behind by a
    /// crashed session and is removed.
    ///
    /// # Errors
    ///
    /// - `ChannelError::AlreadyListening`: a live session owns this identity
    /// - `ChannelError::Io`: the directory cannot be created or the socket
    ///   cannot be bound
    pub fn listen(dir: &Path, identity: &EndpointIdentity) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(ChannelError::Io)?;
        let path = identity.socket_path(dir);
        let lock = lock_endpoint(&lock_path(&path))?;
        if path.exists() {
            warn!("removing stale channel socket {}", path.display());
            std::fs::remove_file(&path).map_err(ChannelError::Io)?;
        }
        let listener = UnixListener::bind(&path).map_err(ChannelError::Io)?;
        info!("channel {} listening on {}", identity, path.display());
        Ok(Self {
            state: State::Listening(listener),
            socket_path: Some(path),
            lock: Some(lock),
            name: identity.name(),
        })
    }

    /// Connects to a listening endpoint as the peer.
    pub fn connect(dir: &Path, identity: &EndpointIdentity) -> Result<Self> {
        let path = identity.socket_path(dir);
        let stream = UnixStream::connect(&path).map_err(ChannelError::Io)?;
        debug!("connected to channel {}", identity);
        Ok(Self {
            state: State::Connected(stream),
            socket_path: None,
            lock: None,
            name: identity.name(),
        })
    }

    /// Wraps an already connected stream, e.g. one half of
    /// `UnixStream::pair()`.
    pub fn from_stream(stream: UnixStream, name: impl Into<String>) -> Self {
        Self {
            state: State::Connected(stream),
            socket_path: None,
            lock: None,
            name: name.into(),
        }
    }

    /// Blocks until the one peer connects.
    pub fn accept(&mut self) -> Result<()> {
        self.accept_inner(None)
    }

    /// Like [`Channel::accept`] but gives up after `timeout`.
    pub fn accept_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.accept_inner(Some(timeout))
    }

    fn accept_inner(&mut self, timeout: Option<Duration>) -> Result<()> {
        let listener = match &self.state {
            State::Listening(listener) => listener,
            State::Connected(_) => return Err(ChannelError::AlreadyConnected),
            State::Closed => return Err(ChannelError::Closed),
        };
        if let Some(timeout) = timeout {
            if !wait_readable(listener, timeout)? {
                return Err(ChannelError::AcceptTimeout(timeout));
            }
        }
        let (stream, _) = listener.accept().map_err(ChannelError::Io)?;
        info!("channel {} accepted peer", self.name);
        // dropping the listener refuses any further peer
        self.state = State::Connected(stream);
        Ok(())
    }

    /// Writes the whole buffer.
    pub fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream()?;
        stream.write_all(bytes)?;
        stream.flush()?;
        Ok(())
    }

    /// Reads exactly `buf.len()` bytes.
    pub fn recv_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let stream = self.stream()?;
        stream.read_exact(buf)?;
        Ok(())
    }

    /// Reads exactly `n` bytes.
    pub fn recv(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.recv_into(&mut buf)?;
        Ok(buf)
    }

    /// Reads a single byte.
    pub fn recv_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.recv_into(&mut buf)?;
        Ok(buf[0])
    }

    /// Shuts the stream down and unlinks the socket file. Idempotent.
    pub fn close(&mut self) {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Connected(stream) => {
                if let Err(err) = stream.shutdown(Shutdown::Both) {
                    debug!("channel {} shutdown: {}", self.name, err);
                }
                info!("channel {} closed", self.name);
            }
            State::Listening(_) => info!("channel {} closed before a peer connected", self.name),
            State::Closed => {}
        }
        if let Some(path) = self.socket_path.take() {
            if let Err(err) = std::fs::remove_file(&path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("failed to remove {}: {}", path.display(), err);
                }
            }
        }
        // the lock file stays; unlinking it would race a new owner
        self.lock = None;
    }

    /// Handle that can shut the stream down from another thread, unblocking
    /// a pending `send` or `recv` with `Disconnected`.
    pub fn closer(&self) -> Result<ChannelCloser> {
        match &self.state {
            State::Connected(stream) => Ok(ChannelCloser {
                stream: stream.try_clone().map_err(ChannelError::Io)?,
            }),
            State::Listening(_) => Err(ChannelError::Disconnected),
            State::Closed => Err(ChannelError::Closed),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, State::Connected(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn socket_path(&self) -> Option<&Path> {
        self.socket_path.as_deref()
    }

    fn stream(&mut self) -> Result<&mut UnixStream> {
        match &mut self.state {
            State::Connected(stream) => Ok(stream),
            State::Listening(_) => Err(ChannelError::Disconnected),
            State::Closed => Err(ChannelError::Closed),
        }
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}

/// Cross-thread cancellation for a [`Channel`].
pub struct ChannelCloser {
    stream: UnixStream,
}

impl ChannelCloser {
    pub fn close(&self) {
        if let Err(err) = self.stream.shutdown(Shutdown::Both) {
            debug!("channel closer shutdown: {}", err);
        }
    }
}

/// Lock file guarding the socket at `socket`.
fn lock_path(socket: &Path) -> PathBuf {
    let mut name = socket.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Takes the exclusive endpoint lock without blocking.
fn lock_endpoint(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(ChannelError::Io)?;
    let res = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if res != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
            return Err(ChannelError::AlreadyListening(path.to_path_buf()));
        }
        return Err(ChannelError::Io(err));
    }
    Ok(file)
}

/// Polls the listener until a connection is pending or `timeout` expires.
fn wait_readable(listener: &UnixListener, timeout: Duration) -> Result<bool> {
    use libc::{poll, pollfd, EINTR, POLLIN};

    let deadline = Instant::now() + timeout;
    let mut pfd = pollfd {
        fd: listener.as_raw_fd(),
        events: POLLIN,
        revents: 0,
    };
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        // round up so a sub-millisecond remainder still waits
        let millis = remaining
            .as_micros()
            .div_ceil(1000)
            .min(libc::c_int::MAX as u128) as libc::c_int;
        let res = unsafe { poll(&mut pfd, 1, millis) };
        if res < 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(EINTR) {
                continue;
            }
            return Err(ChannelError::Io(err));
        }
        return Ok(res > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;

    fn identity() -> EndpointIdentity {
        EndpointIdentity::new("broker", "EURUSD", "m1", "1").unwrap()
    }

    #[test]
    fn test_pair_send_recv() {
        let (a, b) = UnixStream::pair().unwrap();
        let mut left = Channel::from_stream(a, "left");
        let mut right = Channel::from_stream(b, "right");
        left.send(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(right.recv_u8().unwrap(), 1);
        assert_eq!(right.recv(4).unwrap(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_listen_accept_connect() {
        let dir = TempDir::new().unwrap();
        let id = identity();
        let mut server = Channel::listen(dir.path(), &id).unwrap();
        assert!(id.socket_path(dir.path()).exists());

        let dir_path = dir.path().to_path_buf();
        let peer_id = id.clone();
        let peer = thread::spawn(move || {
            let mut client = Channel::connect(&dir_path, &peer_id).unwrap();
            client.send(b"ping").unwrap();
            client.recv(4).unwrap()
        });

        server.accept().unwrap();
        assert_eq!(server.recv(4).unwrap(), b"ping");
        server.send(b"pong").unwrap();
        assert_eq!(peer.join().unwrap(), b"pong");
    }

    #[test]
    fn test_second_accept_rejected() {
        let dir = TempDir::new().unwrap();
        let id = identity();
        let mut server = Channel::listen(dir.path(), &id).unwrap();
        let _client = Channel::connect(dir.path(), &id).unwrap();
        server.accept().unwrap();
        assert!(matches!(server.accept(), Err(ChannelError::AlreadyConnected)));
        // listener is gone, a second peer cannot connect
        assert!(Channel::connect(dir.path(), &id).is_err());
    }

    #[test]
    fn test_accept_timeout() {
        let dir = TempDir::new().unwrap();
        let mut server = Channel::listen(dir.path(), &identity()).unwrap();
        let err = server
            .accept_timeout(Duration::from_millis(20))
            .unwrap_err();
        assert!(matches!(err, ChannelError::AcceptTimeout(_)));
    }

    #[test]
    fn test_close_is_idempotent_and_unlinks() {
        let dir = TempDir::new().unwrap();
        let id = identity();
        let mut server = Channel::listen(dir.path(), &id).unwrap();
        server.close();
        server.close();
        assert!(server.is_closed());
        assert!(!id.socket_path(dir.path()).exists());
        assert!(matches!(server.send(b"x"), Err(ChannelError::Closed)));
    }

    #[test]
    fn test_peer_vanishing_is_disconnect() {
        let (a, b) = UnixStream::pair().unwrap();
        let mut left = Channel::from_stream(a, "left");
        drop(b);
        assert!(matches!(left.recv(1), Err(ChannelError::Disconnected)));
        left.close();
        left.close();
    }

    #[test]
    fn test_closer_unblocks_recv() {
        let (a, _b) = UnixStream::pair().unwrap();
        let mut left = Channel::from_stream(a, "left");
        let closer = left.closer().unwrap();
        let reader = thread::spawn(move || left.recv(1));
        thread::sleep(Duration::from_millis(20));
        closer.close();
        let res = reader.join().unwrap();
        assert!(matches!(res, Err(ChannelError::Disconnected)));
    }

    #[test]
    fn test_live_identity_not_taken_over() {
        let dir = TempDir::new().unwrap();
        let id = identity();
        let mut first = Channel::listen(dir.path(), &id).unwrap();
        let err = Channel::listen(dir.path(), &id).unwrap_err();
        assert!(matches!(err, ChannelError::AlreadyListening(_)));

        // the first session still owns the socket
        let mut client = Channel::connect(dir.path(), &id).unwrap();
        first.accept_timeout(Duration::from_secs(5)).unwrap();
        client.send(&[7]).unwrap();
        assert_eq!(first.recv_u8().unwrap(), 7);

        first.close();
        let again = Channel::listen(dir.path(), &id).unwrap();
        assert!(again.socket_path().is_some());
    }

    #[test]
    fn test_accept_timeout_respects_deadline() {
        let dir = TempDir::new().unwrap();
        let mut server = Channel::listen(dir.path(), &identity()).unwrap();
        let started = Instant::now();
        assert!(server.accept_timeout(Duration::from_millis(50)).is_err());
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(50), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");
    }

    #[test]
    fn test_stale_socket_replaced() {
        let dir = TempDir::new().unwrap();
        let id = identity();
        std::fs::write(id.socket_path(dir.path()), b"stale").unwrap();
        let server = Channel::listen(dir.path(), &id).unwrap();
        assert_eq!(server.socket_path(), Some(id.socket_path(dir.path()).as_path()));
    }
}
