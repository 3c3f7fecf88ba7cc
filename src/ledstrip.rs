use crate::tree::FrameSink;

#[cfg(feature = "ws281x")]
pub use hardware::DeviceController;

#[cfg(feature = "ws281x")]
mod hardware {
    use anyhow::anyhow;

    use crate::tree::FrameSink;

    pub struct DeviceController {
        hw: ws281x::handle::Handle,
        channel: usize,
    }

    impl DeviceController {
        /// Note that this can currently only run on a supported Raspberry Pi model,
        /// because it needs to know the correct offsets for video core memory and
        /// peripheral memory.
        ///
        /// Arguments:
        ///   rpi_dma:     The DMA number to be used. Can be any number 0-15 that is
        ///                *not* concurrently used by another process or hardware.
        ///   rpi_channel: The PWM channel to which the LED string is connected. Usually 0 or 1.
        ///   rpi_pin:     The pin to which the LED string is attached. Will usually be one of the
        ///                PWM pins 12,18 for channel PWM0 or 13,19 for channel PWM1.
        ///   leds_count:  How many LEDs the string contains.
        pub fn new(
            rpi_dma: i32,
            rpi_channel: usize,
            rpi_pin: i32,
            leds_count: usize,
        ) -> anyhow::Result<DeviceController> {
            // The library scales every channel by `c = c * (brightness+1) / 256`.
            // Pass colors through unchanged, the tree does its own scaling.
            let hw_channel = ws281x::channel::new()
                .pin(rpi_pin)
                .count(leds_count)
                .brightness(255)
                .build()
                .map_err(|_e| anyhow!("failed to create channel"))?;

            let handler = ws281x::handle::new()
                .dma(rpi_dma)
                .channel(rpi_channel, hw_channel)
                .build()
                .map_err(|_e| anyhow!("failed to open device"))?;

            return Ok(DeviceController {
                hw: handler,
                channel: rpi_channel,
            });
        }
    }

    impl FrameSink for DeviceController {
        fn show(&mut self, led_colors: &[u32]) -> anyhow::Result<()> {
            let leds = self.hw.channel_mut(self.channel).leds_mut();
            for (led, color) in leds.iter_mut().zip(led_colors) {
                *led = *color;
            }
            self.hw.render().map_err(|_e| anyhow!("failed to render"))?;
            self.hw.wait().map_err(|_e| anyhow!("failed to wait for render"))?;
            return Ok(());
        }
    }
}

/// Stands in for the hardware: only logs what it would show.
#[derive(Default)]
pub struct DummyStrip {
    frames: usize,
}

impl DummyStrip {
    pub fn frames(&self) -> usize {
        return self.frames;
    }
}

impl FrameSink for DummyStrip {
    fn show(&mut self, frame: &[u32]) -> anyhow::Result<()> {
        self.frames += 1;
        match frame.first() {
            Some(first) if frame.iter().all(|pixel| pixel == first) => {
                log::info!("frame {}: {} leds at {:06x}", self.frames, frame.len(), first)
            }
            _ => log::info!("frame {}: {:06x?}", self.frames, frame),
        }
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_counts_frames() {
        let mut strip = DummyStrip::default();
        strip.show(&[0xffffff; 25]).unwrap();
        strip.show(&[0x0, 0x1]).unwrap();
        strip.show(&[]).unwrap();
        assert_eq!(strip.frames(), 3);
    }
}
