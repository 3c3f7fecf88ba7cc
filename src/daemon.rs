//! The domain socket between a client rendering frames and the daemon
//! that owns the LED hardware.
//!
//! Every message is one native-endian `u32` pixel count followed by that
//! many native-endian `u32` pixels.

use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::ops::DerefMut;
use std::os::unix::net::UnixListener;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use anyhow::bail;
use anyhow::Context;

use crate::tree::FrameSink;

/// Largest frame the daemon accepts.
pub const MAX_FRAME: usize = 1024;

pub fn write_frame(mut stream: impl Write, frame: &[u32]) -> anyhow::Result<()> {
    if frame.len() > MAX_FRAME {
        bail!("frame of {} leds exceeds the limit of {}", frame.len(), MAX_FRAME);
    }
    let mut bytes = Vec::with_capacity(4 * (frame.len() + 1));
    bytes.extend_from_slice(&(frame.len() as u32).to_ne_bytes());
    for pixel in frame {
        bytes.extend_from_slice(&pixel.to_ne_bytes());
    }
    stream.write_all(&bytes)?;
    return Ok(());
}

/// Reads one frame into `buffer` and returns the number of pixels,
/// or `None` if the peer hung up between frames.
pub fn read_frame(mut stream: impl Read, buffer: &mut [u32]) -> anyhow::Result<Option<usize>> {
    let mut word = [0u8; 4];
    match stream.read_exact(&mut word) {
        Ok(()) => (),
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err.into()),
    }
    let n = u32::from_ne_bytes(word) as usize;
    if n > buffer.len() {
        bail!("invalid msg: frame of {} leds", n);
    }
    for pixel in buffer[..n].iter_mut() {
        stream
            .read_exact(&mut word)
            .context("frame ended early")?;
        *pixel = u32::from_ne_bytes(word);
    }
    return Ok(Some(n));
}

/// Client side: forwards every frame to a running daemon.
pub struct SocketSink {
    stream: UnixStream,
}

impl SocketSink {
    pub fn connect(path: impl AsRef<Path>) -> anyhow::Result<SocketSink> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path)
            .with_context(|| format!("failed to connect to {}", path.display()))?;
        return Ok(SocketSink { stream: stream });
    }
}

impl FrameSink for SocketSink {
    fn show(&mut self, frame: &[u32]) -> anyhow::Result<()> {
        return write_frame(&mut self.stream, frame);
    }
}

fn handle_client<S: FrameSink>(
    mut stream: UnixStream,
    sink: Arc<Mutex<S>>,
) -> anyhow::Result<()> {
    let mut buffer: [u32; MAX_FRAME] = [0; MAX_FRAME];
    loop {
        let n = match read_frame(&mut stream, &mut buffer)? {
            Some(n) => n,
            None => break,
        };
        log::debug!("got {} colors", n);
        let maybe_sink = sink.lock();
        match maybe_sink {
            Ok(mut sink) => sink.deref_mut().show(&buffer[0..n])?,
            Err(e) => {
                log::error!("shared state is poisoned : {}", e);
                break;
            }
        }
    }
    return Ok(());
}

/// Accepts clients forever, one thread each. All of them draw onto the
/// same sink.
pub fn serve<S: FrameSink + Send + 'static>(listener: UnixListener, sink: S) -> anyhow::Result<()> {
    let shared_sink = Arc::new(Mutex::new(sink));
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                log::info!("new client");
                let thread_sink = shared_sink.clone();
                thread::spawn(move || {
                    if let Err(err) = handle_client(stream, thread_sink) {
                        log::warn!("client went away: {:#}", err);
                    }
                });
            }
            Err(err) => {
                log::warn!("couldn't accept client: {}", err);
                continue;
            }
        }
    }
    return Ok(());
}

/// Binds `path` for everyone to write to.
/// It would be cleaner to delete the socket on shutdown using RAII,
/// but rust doesn't unwind after signals, so a stale file is removed here.
pub fn bind(path: impl AsRef<Path>) -> anyhow::Result<UnixListener> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    let path = path.as_ref();
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    let listener = UnixListener::bind(path)
        .with_context(|| format!("failed to bind {}", path.display()))?;
    std::fs::set_permissions(path, Permissions::from_mode(0o666))?;
    log::info!("listening on {}", path.display());
    return Ok(listener);
}
