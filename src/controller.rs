use std::time::Duration;
use std::time::Instant;

use crate::driver::black;
use crate::driver::blackout;
use crate::driver::white;
use crate::driver::LightDriver;
use crate::driver::LightGuard;
use crate::interpreter::Command;
use crate::interpreter::Interpreter;
use crate::interpreter::Level;
use crate::keys::InputError;
use crate::keys::KeySource;

/// Why a session ended. The lights are off in every case.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Exit {
    Quit,
    Interrupted,
    InputClosed,
    InputFailed,
}

/// Reads keys one at a time and applies the resulting levels to the
/// driver until the user quits or input ends.
pub struct Controller<K: KeySource, D: LightDriver> {
    keys: K,
    driver: D,
    interpreter: Interpreter,
    initial_level: Option<Level>,
    on_applied: Option<Box<dyn FnMut(Level)>>,
}

impl<K: KeySource, D: LightDriver> Controller<K, D> {
    pub fn new(keys: K, driver: D, lookahead: Duration) -> Controller<K, D> {
        return Controller {
            keys: keys,
            driver: driver,
            interpreter: Interpreter::new(lookahead),
            initial_level: None,
            on_applied: None,
        };
    }

    /// Level to show before the first key arrives.
    pub fn initial_level(mut self, level: Option<Level>) -> Self {
        self.initial_level = level;
        return self;
    }

    /// Called after every level that was sent to the driver.
    pub fn on_applied(mut self, callback: impl FnMut(Level) + 'static) -> Self {
        self.on_applied = Some(Box::new(callback));
        return self;
    }

    pub fn run(self) -> Exit {
        let Controller {
            mut keys,
            driver,
            mut interpreter,
            initial_level,
            mut on_applied,
        } = self;
        // Dropping the guard switches the lights off, on every return
        // below and while unwinding.
        let mut light = LightGuard::new(driver);
        let mut report = |level: Level| {
            if let Some(callback) = on_applied.as_mut() {
                callback(level);
            }
        };

        if let Some(level) = initial_level {
            apply(&mut *light, level);
            report(level);
        }

        loop {
            let timeout = interpreter
                .deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()));
            let commands = match keys.next_key(timeout) {
                Ok(Some(event)) => interpreter.feed(event),
                Ok(None) => interpreter.expire(Instant::now()).into_iter().collect(),
                Err(InputError::Interrupted) => {
                    log::info!("interrupted");
                    return Exit::Interrupted;
                }
                Err(InputError::Closed) => {
                    log::info!("input closed");
                    return Exit::InputClosed;
                }
                Err(err) => {
                    log::error!("{}", err);
                    return Exit::InputFailed;
                }
            };
            for command in commands {
                match command {
                    Command::Quit => {
                        log::info!("quit requested");
                        return Exit::Quit;
                    }
                    Command::Set(level) => {
                        apply(&mut *light, level);
                        report(level);
                    }
                }
            }
        }
    }
}

/// Sends one level to the driver. Level 0 switches the lights off,
/// anything else sets the brightness and a white color so the change is
/// visible. Failures end in a black tree, never in an error.
pub fn apply(driver: &mut (impl LightDriver + ?Sized), level: Level) {
    if level.is_off() {
        log::info!("brightness 0, switching off");
        blackout(driver);
        return;
    }
    let brightness = level.brightness();
    log::info!("brightness {} -> {:.2}", level, f32::from(brightness));
    let result = driver
        .set_brightness(brightness)
        .and_then(|()| driver.set_color(white()));
    if let Err(err) = result {
        log::warn!("failed to set brightness {}: {:#}", level, err);
        if let Err(err) = driver.set_color(black()) {
            log::warn!("blanking the lights failed too: {:#}", err);
        }
    }
}
