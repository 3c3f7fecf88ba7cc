use anyhow::Result;

use crate::driver::black;
use crate::driver::Brightness;
use crate::driver::Color;
use crate::driver::LightDriver;

/// The RGB Xmas tree has 24 LEDs on its branches and one star on top.
pub const TREE_LEDS: usize = 25;

/// Takes a full frame of `0x00RRGGBB` pixels, one per LED.
pub trait FrameSink {
    fn show(&mut self, frame: &[u32]) -> Result<()>;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn show(&mut self, frame: &[u32]) -> Result<()> {
        return (**self).show(frame);
    }
}

/// A string of LEDs that all share one color and brightness, like the
/// `brightness` and `color` properties of the tree. Every change is
/// rendered and pushed to the sink right away.
pub struct Tree<S: FrameSink> {
    sink: S,
    brightness: Brightness,
    color: Color,
    frame: Vec<u32>,
}

impl<S: FrameSink> Tree<S> {
    pub fn new(sink: S, leds: usize) -> Tree<S> {
        return Tree {
            sink: sink,
            brightness: Brightness::from(1.0),
            color: black(),
            frame: vec![0; leds],
        };
    }

    pub fn brightness(&self) -> Brightness {
        return self.brightness;
    }

    pub fn color(&self) -> Color {
        return self.color;
    }

    pub fn sink(&self) -> &S {
        return &self.sink;
    }

    fn render(&mut self) -> Result<()> {
        let pixel = to_pixel(self.color, self.brightness);
        for led in self.frame.iter_mut() {
            *led = pixel;
        }
        log::debug!("rendering {} leds as {:06x}", self.frame.len(), pixel);
        return self.sink.show(&self.frame);
    }
}

/// Scales `color` by `brightness` and packs it as `0x00RRGGBB`.
pub fn to_pixel(color: Color, brightness: Brightness) -> u32 {
    let scale = f32::from(brightness);
    let scaled = Color::new(
        (color.red * scale).clamp(0.0, 1.0),
        (color.green * scale).clamp(0.0, 1.0),
        (color.blue * scale).clamp(0.0, 1.0),
    );
    let rgb: palette::Srgb<u8> = scaled.into_format();
    return ((rgb.red as u32) << 16) | ((rgb.green as u32) << 8) | (rgb.blue as u32);
}

impl<S: FrameSink> LightDriver for Tree<S> {
    fn set_brightness(&mut self, brightness: Brightness) -> Result<()> {
        self.brightness = brightness;
        return self.render();
    }

    fn set_color(&mut self, color: Color) -> Result<()> {
        self.color = color;
        return self.render();
    }

    fn turn_off(&mut self) -> Result<()> {
        self.color = black();
        return self.render();
    }
}
