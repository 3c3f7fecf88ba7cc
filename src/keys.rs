use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

/// Sources wait in slices of this length so that an interrupt is
/// noticed even while blocked on input.
pub const POLL_SLICE: Duration = Duration::from_millis(50);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub symbol: char,
    pub at: Instant,
}

impl KeyEvent {
    pub fn now(symbol: char) -> KeyEvent {
        return KeyEvent {
            symbol: symbol,
            at: Instant::now(),
        };
    }
}

#[derive(Debug)]
pub enum InputError {
    /// The user asked to stop, by signal or by Ctrl+C in raw mode.
    Interrupted,
    /// No more input will arrive.
    Closed,
    Io(std::io::Error),
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::Interrupted => write!(f, "interrupted"),
            InputError::Closed => write!(f, "input closed"),
            InputError::Io(err) => write!(f, "failed to read input: {}", err),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for InputError {
    fn from(err: std::io::Error) -> InputError {
        return InputError::Io(err);
    }
}

/// Where key presses come from.
pub trait KeySource {
    /// Waits for the next key, at most `timeout` (forever if `None`).
    /// Returns `Ok(None)` once the timeout has passed without a key.
    fn next_key(&mut self, timeout: Option<Duration>) -> Result<Option<KeyEvent>, InputError>;
}

impl<K: KeySource + ?Sized> KeySource for Box<K> {
    fn next_key(&mut self, timeout: Option<Duration>) -> Result<Option<KeyEvent>, InputError> {
        return (**self).next_key(timeout);
    }
}

/// Set from a signal handler, checked by the key sources between slices.
#[derive(Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// Routes SIGINT and SIGTERM into the returned flag.
    /// Can only be called once per process.
    pub fn install() -> anyhow::Result<Interrupt> {
        let interrupt = Interrupt::default();
        let handler = interrupt.clone();
        ctrlc::set_handler(move || handler.raise())?;
        return Ok(interrupt);
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        return self.0.load(Ordering::SeqCst);
    }
}

/// Splits an optional overall timeout into poll slices.
pub(crate) struct Deadline {
    at: Option<Instant>,
    polled: bool,
}

impl Deadline {
    pub(crate) fn after(timeout: Option<Duration>) -> Deadline {
        return Deadline {
            at: timeout.map(|timeout| Instant::now() + timeout),
            polled: false,
        };
    }

    /// The next slice to wait for, or `None` once the deadline has passed.
    /// There is always at least one slice, possibly of zero length, so
    /// input that is already waiting gets picked up.
    pub(crate) fn next_slice(&mut self) -> Option<Duration> {
        let first = !self.polled;
        self.polled = true;
        let deadline = match self.at {
            Some(deadline) => deadline,
            None => return Some(POLL_SLICE),
        };
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() && !first {
            return None;
        }
        return Some(remaining.min(POLL_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_is_shared_between_clones() {
        let interrupt = Interrupt::default();
        let other = interrupt.clone();
        assert!(!other.is_raised());
        interrupt.raise();
        assert!(other.is_raised());
    }

    #[test]
    fn unbounded_deadline_always_has_a_slice() {
        let mut deadline = Deadline::after(None);
        assert_eq!(deadline.next_slice(), Some(POLL_SLICE));
        assert_eq!(deadline.next_slice(), Some(POLL_SLICE));
    }

    #[test]
    fn slices_are_capped() {
        let mut deadline = Deadline::after(Some(Duration::from_secs(10)));
        assert_eq!(deadline.next_slice(), Some(POLL_SLICE));
        let mut short = Deadline::after(Some(Duration::from_millis(5)));
        assert!(short.next_slice().unwrap() <= Duration::from_millis(5));
    }

    #[test]
    fn zero_timeout_still_polls_once() {
        let mut deadline = Deadline::after(Some(Duration::ZERO));
        assert_eq!(deadline.next_slice(), Some(Duration::ZERO));
        assert_eq!(deadline.next_slice(), None);
    }
}
