//! Color space conversion helpers and an RGB light-ring adapter.
//!
//! The engine talks to the light ring in HSV because that is what the face
//! animates (hue sweeps, brightness fades). Hardware that only understands
//! RGB can be wrapped in [`RgbRing`].

use crate::scene::LightDriver;
use palette::{FromColor, Hsv, Srgb};

/// Light off.
pub const COLOR_OFF: Srgb = Srgb::new(0.0, 0.0, 0.0);

/// Creates an RGB color from HSV (Hue, Saturation, Value) components.
#[inline]
pub fn hsv(hue: f32, saturation: f32, value: f32) -> Srgb {
    Srgb::from_color(Hsv::new(hue, saturation, value))
}

/// Creates an RGB color from hue only (full saturation and value).
#[inline]
pub fn hue(hue: f32) -> Srgb {
    hsv(hue, 1.0, 1.0)
}

/// Trait for abstracting RGB LED hardware.
///
/// Color components are in the range 0.0-1.0. Implementations should convert
/// these to their hardware's native format and handle hardware errors
/// internally.
pub trait RgbLed {
    /// Sets the LED to the specified RGB color.
    fn set_color(&mut self, color: Srgb);
}

/// [`LightDriver`] for plain RGB hardware.
///
/// Remembers the last HSV triple so hue survives a trip through black, and
/// pushes the converted color to the LED on every change.
pub struct RgbRing<L: RgbLed> {
    led: L,
    current: Hsv,
}

impl<L: RgbLed> RgbRing<L> {
    /// Wraps `led` and turns it off.
    pub fn new(mut led: L) -> Self {
        led.set_color(COLOR_OFF);
        Self {
            led,
            current: Hsv::new(0.0, 1.0, 0.0),
        }
    }

    /// Rotates the hue by `degrees`, as the touch "hold to change color"
    /// gesture does.
    pub fn increase_hue(&mut self, degrees: f32) {
        let next = (self.current.hue.into_positive_degrees() + degrees).rem_euclid(360.0);
        self.set_hsv(Hsv::new(next, self.current.saturation, self.current.value));
    }

    pub fn led(&self) -> &L {
        &self.led
    }
}

impl<L: RgbLed> LightDriver for RgbRing<L> {
    fn hsv(&self) -> Hsv {
        self.current
    }

    fn set_hsv(&mut self, color: Hsv) {
        if color != self.current {
            self.current = color;
            self.led.set_color(Srgb::from_color(color));
        }
    }
}
