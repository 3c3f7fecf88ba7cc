//! Single key presses straight from the terminal, without waiting for enter.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use crossterm::cursor::MoveToColumn;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent as TermKeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::style::Print;
use crossterm::terminal::Clear;
use crossterm::terminal::ClearType;

use crate::keys::Deadline;
use crate::keys::InputError;
use crate::keys::Interrupt;
use crate::keys::KeyEvent;
use crate::keys::KeySource;

/// Puts the terminal into raw mode for as long as it lives.
pub struct RawTerminal {
    interrupt: Interrupt,
}

impl RawTerminal {
    pub fn enter(interrupt: Interrupt) -> anyhow::Result<RawTerminal> {
        crossterm::terminal::enable_raw_mode().context("failed to enable raw mode")?;
        return Ok(RawTerminal { interrupt: interrupt });
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if let Err(err) = crossterm::terminal::disable_raw_mode() {
            log::warn!("failed to restore the terminal: {}", err);
        }
    }
}

#[derive(Debug, PartialEq)]
enum Translated {
    Key(char),
    Interrupt,
    Ignore,
}

fn translate(event: &TermKeyEvent) -> Translated {
    if event.kind != KeyEventKind::Press {
        return Translated::Ignore;
    }
    match event.code {
        KeyCode::Char('c') | KeyCode::Char('d')
            if event.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Translated::Interrupt
        }
        KeyCode::Char(symbol) => Translated::Key(symbol),
        _ => Translated::Ignore,
    }
}

impl KeySource for RawTerminal {
    fn next_key(&mut self, timeout: Option<Duration>) -> Result<Option<KeyEvent>, InputError> {
        let mut deadline = Deadline::after(timeout);
        loop {
            if self.interrupt.is_raised() {
                return Err(InputError::Interrupted);
            }
            let slice = match deadline.next_slice() {
                Some(slice) => slice,
                None => return Ok(None),
            };
            if !crossterm::event::poll(slice)? {
                continue;
            }
            let event = match crossterm::event::read()? {
                Event::Key(event) => event,
                _ => continue,
            };
            match translate(&event) {
                Translated::Key(symbol) => return Ok(Some(KeyEvent::now(symbol))),
                Translated::Interrupt => return Err(InputError::Interrupted),
                Translated::Ignore => continue,
            }
        }
    }
}

/// Replaces the current line with `message`. Works in raw mode too,
/// where a bare newline would not return the cursor.
pub fn status_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    crossterm::queue!(
        stdout,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    return stdout.flush();
}
