//! SSD1306 status panel (128x64, I2C).
//!
//! The panel is write-only and best-effort: a failed flush is logged and
//! dropped, never propagated into the control loop.

#[cfg(target_os = "espidf")]
mod hw {
    use embedded_graphics::mono_font::ascii::FONT_6X10;
    use embedded_graphics::mono_font::MonoTextStyle;
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::prelude::*;
    use embedded_graphics::text::Text;
    use esp_idf_hal::i2c::I2cDriver;
    use ssd1306::mode::BufferedGraphicsMode;
    use ssd1306::prelude::*;
    use ssd1306::{I2CDisplayInterface, Ssd1306};

    use crate::app::ports::DisplayPort;
    use crate::error::Error;

    type Panel = Ssd1306<
        I2CInterface<I2cDriver<'static>>,
        DisplaySize128x32,
        BufferedGraphicsMode<DisplaySize128x32>,
    >;

    pub struct OledDisplay {
        panel: Panel,
    }

    impl OledDisplay {
        pub fn new(i2c: I2cDriver<'static>) -> Result<Self, Error> {
            let interface = I2CDisplayInterface::new(i2c);
            let mut panel = Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
                .into_buffered_graphics_mode();
            panel.init().map_err(|_| Error::Init("display init"))?;
            Ok(Self { panel })
        }

        fn draw_lines(&mut self, lines: &[(&str, i32)]) {
            let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
            self.panel.clear(BinaryColor::Off).ok();
            for (text, y) in lines {
                if Text::new(text, Point::new(0, *y), style)
                    .draw(&mut self.panel)
                    .is_err()
                {
                    log::debug!("display draw failed");
                    return;
                }
            }
            if self.panel.flush().is_err() {
                log::debug!("display flush failed");
            }
        }
    }

    impl DisplayPort for OledDisplay {
        fn show_readings(&mut self, t1: &str, t2: &str, status: &str) {
            let mut line1: heapless::String<32> = heapless::String::new();
            let mut line2: heapless::String<32> = heapless::String::new();
            let _ = line1.push_str("T1 ");
            let _ = line1.push_str(t1);
            let _ = line2.push_str("T2 ");
            let _ = line2.push_str(t2);
            self.draw_lines(&[(line1.as_str(), 9), (line2.as_str(), 19), (status, 30)]);
        }

        fn show_message(&mut self, line1: &str, line2: &str) {
            self.draw_lines(&[(line1, 12), (line2, 26)]);
        }
    }
}

#[cfg(target_os = "espidf")]
pub use hw::OledDisplay;

/// Host stand-in: remembers the last thing written so tests can assert on it.
#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
pub struct SimDisplay {
    pub last_readings: Option<(String, String, String)>,
    pub last_message: Option<(String, String)>,
}

#[cfg(not(target_os = "espidf"))]
impl SimDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(not(target_os = "espidf"))]
impl crate::app::ports::DisplayPort for SimDisplay {
    fn show_readings(&mut self, t1: &str, t2: &str, status: &str) {
        self.last_readings = Some((t1.into(), t2.into(), status.into()));
    }

    fn show_message(&mut self, line1: &str, line2: &str) {
        self.last_message = Some((line1.into(), line2.into()));
    }
}
