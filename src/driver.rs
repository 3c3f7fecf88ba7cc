use std::ops::Deref;
use std::ops::DerefMut;

use anyhow::Result;

/// Channels in [0, 1].
pub type Color = palette::Srgb<f32>;

pub fn white() -> Color {
    return Color::new(1.0, 1.0, 1.0);
}

pub fn black() -> Color {
    return Color::new(0.0, 0.0, 0.0);
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Brightness(f32);

impl From<f32> for Brightness {
    fn from(value: f32) -> Self {
        Brightness(value.clamp(0.0f32, 1.0f32))
    }
}

impl From<Brightness> for f32 {
    fn from(value: Brightness) -> Self {
        value.0
    }
}

/// Anything that can light up the tree.
///
/// Calls are synchronous and may fail; callers never retry.
pub trait LightDriver {
    fn set_brightness(&mut self, brightness: Brightness) -> Result<()>;
    fn set_color(&mut self, color: Color) -> Result<()>;
    fn turn_off(&mut self) -> Result<()>;
}

impl<D: LightDriver + ?Sized> LightDriver for &mut D {
    fn set_brightness(&mut self, brightness: Brightness) -> Result<()> {
        return (**self).set_brightness(brightness);
    }

    fn set_color(&mut self, color: Color) -> Result<()> {
        return (**self).set_color(color);
    }

    fn turn_off(&mut self) -> Result<()> {
        return (**self).turn_off();
    }
}

impl<D: LightDriver + ?Sized> LightDriver for Box<D> {
    fn set_brightness(&mut self, brightness: Brightness) -> Result<()> {
        return (**self).set_brightness(brightness);
    }

    fn set_color(&mut self, color: Color) -> Result<()> {
        return (**self).set_color(color);
    }

    fn turn_off(&mut self) -> Result<()> {
        return (**self).turn_off();
    }
}

/// Best effort: turn the lights off, or at least paint them black.
pub fn blackout(driver: &mut (impl LightDriver + ?Sized)) {
    let err = match driver.turn_off() {
        Ok(()) => return,
        Err(err) => err,
    };
    log::warn!("turning the lights off failed: {:#}", err);
    if let Err(err) = driver.set_color(black()) {
        log::warn!("blanking the lights failed too: {:#}", err);
    }
}

/// Owns a driver for the duration of a session and switches the
/// lights off exactly once when dropped, whichever way the session ends.
pub struct LightGuard<D: LightDriver> {
    driver: D,
}

impl<D: LightDriver> LightGuard<D> {
    pub fn new(driver: D) -> LightGuard<D> {
        return LightGuard { driver: driver };
    }
}

impl<D: LightDriver> Deref for LightGuard<D> {
    type Target = D;

    fn deref(&self) -> &D {
        return &self.driver;
    }
}

impl<D: LightDriver> DerefMut for LightGuard<D> {
    fn deref_mut(&mut self) -> &mut D {
        return &mut self.driver;
    }
}

impl<D: LightDriver> Drop for LightGuard<D> {
    fn drop(&mut self) {
        log::debug!("switching the lights off");
        blackout(&mut self.driver);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use anyhow::bail;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        Brightness(f32),
        Color(f32, f32, f32),
        Off,
    }

    /// Records every call; individual operations can be made to fail.
    #[derive(Default)]
    pub struct RecordingDriver {
        pub calls: Vec<Call>,
        pub fail_off: bool,
        pub fail_color: bool,
        pub fail_brightness: bool,
    }

    impl LightDriver for RecordingDriver {
        fn set_brightness(&mut self, brightness: Brightness) -> Result<()> {
            self.calls.push(Call::Brightness(brightness.into()));
            if self.fail_brightness {
                bail!("brightness unavailable");
            }
            return Ok(());
        }

        fn set_color(&mut self, color: Color) -> Result<()> {
            self.calls.push(Call::Color(color.red, color.green, color.blue));
            if self.fail_color {
                bail!("color unavailable");
            }
            return Ok(());
        }

        fn turn_off(&mut self) -> Result<()> {
            self.calls.push(Call::Off);
            if self.fail_off {
                bail!("off unavailable");
            }
            return Ok(());
        }
    }
}
