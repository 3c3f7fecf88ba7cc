use std::time::Duration;
use std::time::Instant;

use crate::driver::Brightness;
use crate::keys::KeyEvent;

/// How long a `1` waits for a following `0` before it counts on its own.
pub const LOOKAHEAD: Duration = Duration::from_millis(250);

/// A brightness level as typed by the user, 0 (off) up to 10 (full).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Level(u8);

impl Level {
    pub const OFF: Level = Level(0);
    pub const MAX: Level = Level(10);

    pub fn new(level: u8) -> Option<Level> {
        if level > Level::MAX.0 {
            return None;
        }
        return Some(Level(level));
    }

    fn from_digit(symbol: char) -> Option<Level> {
        let digit = symbol.to_digit(10)?;
        return Level::new(digit as u8);
    }

    pub fn value(&self) -> u8 {
        return self.0;
    }

    pub fn is_off(&self) -> bool {
        return self.0 == 0;
    }

    /// Linear mapping onto [0, 1].
    pub fn brightness(&self) -> Brightness {
        return Brightness::from(self.0 as f32 / 10.0);
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", self.0);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Set(Level),
    Quit,
}

#[derive(Copy, Clone, Debug)]
struct Pending {
    level: Level,
    at: Instant,
}

/// Turns key presses into commands.
///
/// Every digit maps to its own level, except that a `1` is held back for
/// the lookahead window: if a `0` arrives in time the pair means 10,
/// otherwise the `1` is released as level 1 on the next key or on
/// [`Interpreter::expire`].
pub struct Interpreter {
    lookahead: Duration,
    pending: Option<Pending>,
}

impl Interpreter {
    pub fn new(lookahead: Duration) -> Interpreter {
        return Interpreter {
            lookahead: lookahead,
            pending: None,
        };
    }

    pub fn is_pending(&self) -> bool {
        return self.pending.is_some();
    }

    /// The instant at which a held back `1` stops waiting for its `0`.
    pub fn deadline(&self) -> Option<Instant> {
        return self.pending.map(|pending| pending.at + self.lookahead);
    }

    pub fn feed(&mut self, event: KeyEvent) -> Vec<Command> {
        let mut commands = Vec::new();

        if event.symbol == 'q' || event.symbol == 'Q' {
            self.pending = None;
            commands.push(Command::Quit);
            return commands;
        }

        let level = match Level::from_digit(event.symbol) {
            Some(level) => level,
            None => {
                // Not a key we know, but it still ends the wait for a `0`.
                commands.extend(self.flush());
                return commands;
            }
        };

        if let Some(pending) = self.pending {
            let waited = event.at.saturating_duration_since(pending.at);
            if level.is_off() && waited <= self.lookahead {
                self.pending = None;
                commands.push(Command::Set(Level::MAX));
                return commands;
            }
        }

        commands.extend(self.flush());
        if level.value() == 1 {
            self.pending = Some(Pending {
                level: level,
                at: event.at,
            });
        } else {
            commands.push(Command::Set(level));
        }
        return commands;
    }

    /// Releases a held back `1` once its window has passed.
    pub fn expire(&mut self, now: Instant) -> Option<Command> {
        let pending = self.pending?;
        if now.saturating_duration_since(pending.at) < self.lookahead {
            return None;
        }
        return self.flush();
    }

    fn flush(&mut self) -> Option<Command> {
        return self.pending.take().map(|pending| Command::Set(pending.level));
    }
}

impl Default for Interpreter {
    fn default() -> Interpreter {
        return Interpreter::new(LOOKAHEAD);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(symbol: char, at: Instant) -> KeyEvent {
        return KeyEvent { symbol, at };
    }

    fn set(level: u8) -> Command {
        return Command::Set(Level::new(level).unwrap());
    }

    #[test]
    fn single_digits_map_to_their_level() {
        let t0 = Instant::now();
        for digit in ['0', '2', '3', '4', '5', '6', '7', '8', '9'] {
            let mut interpreter = Interpreter::default();
            let expected = set(digit.to_digit(10).unwrap() as u8);
            assert_eq!(interpreter.feed(key(digit, t0)), vec![expected]);
            assert!(!interpreter.is_pending());
        }
    }

    #[test]
    fn one_waits_for_the_window() {
        let t0 = Instant::now();
        let mut interpreter = Interpreter::default();
        assert!(interpreter.feed(key('1', t0)).is_empty());
        assert_eq!(interpreter.deadline(), Some(t0 + LOOKAHEAD));
        assert_eq!(interpreter.expire(t0 + Duration::from_millis(100)), None);
        assert_eq!(interpreter.expire(t0 + Duration::from_millis(300)), Some(set(1)));
        assert!(!interpreter.is_pending());
        assert_eq!(interpreter.expire(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn one_then_zero_is_ten() {
        let t0 = Instant::now();
        let mut interpreter = Interpreter::default();
        assert!(interpreter.feed(key('1', t0)).is_empty());
        let commands = interpreter.feed(key('0', t0 + Duration::from_millis(250)));
        assert_eq!(commands, vec![set(10)]);
        assert!(!interpreter.is_pending());
        assert_eq!(interpreter.expire(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn late_zero_is_one_then_off() {
        let t0 = Instant::now();
        let mut interpreter = Interpreter::default();
        interpreter.feed(key('1', t0));
        let commands = interpreter.feed(key('0', t0 + Duration::from_millis(251)));
        assert_eq!(commands, vec![set(1), set(0)]);
    }

    #[test]
    fn other_digit_releases_the_one() {
        let t0 = Instant::now();
        let mut interpreter = Interpreter::default();
        interpreter.feed(key('1', t0));
        let commands = interpreter.feed(key('7', t0 + Duration::from_millis(10)));
        assert_eq!(commands, vec![set(1), set(7)]);
    }

    #[test]
    fn one_after_one_replaces_the_pending_digit() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(100);
        let mut interpreter = Interpreter::default();
        interpreter.feed(key('1', t0));
        assert_eq!(interpreter.feed(key('1', t1)), vec![set(1)]);
        assert_eq!(interpreter.deadline(), Some(t1 + LOOKAHEAD));
        // the second `1` still pairs with a `0`
        let commands = interpreter.feed(key('0', t1 + Duration::from_millis(100)));
        assert_eq!(commands, vec![set(10)]);
    }

    #[test]
    fn quit_discards_pending() {
        let t0 = Instant::now();
        let mut interpreter = Interpreter::default();
        interpreter.feed(key('1', t0));
        assert_eq!(interpreter.feed(key('Q', t0)), vec![Command::Quit]);
        assert!(!interpreter.is_pending());
        assert_eq!(interpreter.feed(key('q', t0)), vec![Command::Quit]);
    }

    #[test]
    fn unknown_keys_are_ignored_but_release_the_one() {
        let t0 = Instant::now();
        let mut interpreter = Interpreter::default();
        assert!(interpreter.feed(key('x', t0)).is_empty());
        interpreter.feed(key('1', t0));
        assert_eq!(interpreter.feed(key(' ', t0)), vec![set(1)]);
        assert!(!interpreter.is_pending());
    }

    #[test]
    fn same_level_twice_is_reported_twice() {
        let t0 = Instant::now();
        let mut interpreter = Interpreter::default();
        assert_eq!(interpreter.feed(key('4', t0)), vec![set(4)]);
        assert_eq!(interpreter.feed(key('4', t0)), vec![set(4)]);
    }

    #[test]
    fn levels_never_exceed_ten() {
        assert_eq!(Level::new(11), None);
        assert_eq!(Level::from_digit('a'), None);
        let t0 = Instant::now();
        let mut interpreter = Interpreter::default();
        let mut seen = Vec::new();
        for (i, symbol) in "1010199910q".chars().enumerate() {
            seen.extend(interpreter.feed(key(symbol, t0 + Duration::from_millis(i as u64))));
        }
        for command in seen {
            if let Command::Set(level) = command {
                assert!(level <= Level::MAX);
            }
        }
    }

    #[test]
    fn brightness_is_linear() {
        assert_eq!(f32::from(Level::OFF.brightness()), 0.0);
        assert_eq!(f32::from(Level::MAX.brightness()), 1.0);
        let half = f32::from(Level::new(5).unwrap().brightness());
        assert!((half - 0.5).abs() < 1e-6);
    }
}
