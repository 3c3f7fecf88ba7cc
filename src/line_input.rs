//! Line buffered input, for when stdin is not a terminal or raw mode is
//! not wanted. Each line holds one value between 0 and 10, or `q`.

use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::mpsc;
use std::time::Duration;
use std::time::Instant;

use crate::keys::Deadline;
use crate::keys::InputError;
use crate::keys::Interrupt;
use crate::keys::KeyEvent;
use crate::keys::KeySource;

pub struct LineKeys {
    rx: mpsc::Receiver<std::io::Result<String>>,
    queued: VecDeque<KeyEvent>,
    interrupt: Interrupt,
}

impl LineKeys {
    /// Reads lines from `reader` on a background thread, since a blocking
    /// read can't be given a timeout.
    /// Bytes that aren't UTF-8 are replaced, so such a line is rejected
    /// like any other bad value instead of ending the input.
    pub fn spawn<R: BufRead + Send + 'static>(mut reader: R, interrupt: Interrupt) -> LineKeys {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut bytes = Vec::new();
            loop {
                bytes.clear();
                let line = match reader.read_until(b'\n', &mut bytes) {
                    Ok(0) => break,
                    Ok(_) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(err) => Err(err),
                };
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        });
        return LineKeys {
            rx: rx,
            queued: VecDeque::new(),
            interrupt: interrupt,
        };
    }

    pub fn stdin(interrupt: Interrupt) -> LineKeys {
        return LineKeys::spawn(std::io::BufReader::new(std::io::stdin()), interrupt);
    }
}

/// The keys a line stands for. All of them share one timestamp, so
/// that `10` arrives as a `1` immediately followed by a `0`.
fn tokenize(line: &str, at: Instant) -> Vec<KeyEvent> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }
    if line.eq_ignore_ascii_case("q") {
        return vec![KeyEvent { symbol: 'q', at: at }];
    }
    match line.parse::<u8>() {
        Ok(value) if value <= 10 => value
            .to_string()
            .chars()
            .map(|symbol| KeyEvent { symbol: symbol, at: at })
            .collect(),
        _ => {
            log::warn!("expected a value between 0 and 10, got {:?}", line);
            Vec::new()
        }
    }
}

impl KeySource for LineKeys {
    fn next_key(&mut self, timeout: Option<Duration>) -> Result<Option<KeyEvent>, InputError> {
        if let Some(event) = self.queued.pop_front() {
            return Ok(Some(event));
        }
        let mut deadline = Deadline::after(timeout);
        loop {
            if self.interrupt.is_raised() {
                return Err(InputError::Interrupted);
            }
            let slice = match deadline.next_slice() {
                Some(slice) => slice,
                None => return Ok(None),
            };
            let line = match self.rx.recv_timeout(slice) {
                Ok(line) => line?,
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => return Err(InputError::Closed),
            };
            self.queued.extend(tokenize(&line, Instant::now()));
            if let Some(event) = self.queued.pop_front() {
                return Ok(Some(event));
            }
        }
    }
}
