//! Graphics support via embedded-graphics
//!
//! Every [`Panel`] is a 3×3 [`DrawTarget`] over
//! [`Rgb888`]. Coordinates are column `x` and row `y` from the
//! top-left cell, seen from outside the cube; pixels outside the grid are
//! clipped.
//!
//! ## Example
//!
//! ```
//! use embedded_graphics::{
//!     pixelcolor::Rgb888,
//!     prelude::*,
//!     primitives::{Line, PrimitiveStyle},
//! };
//! use cube_lights::Panel;
//! use smart_leds::RGB8;
//!
//! let mut panel = Panel::new(0);
//! let _ = Line::new(Point::new(0, 0), Point::new(2, 2))
//!     .into_styled(PrimitiveStyle::with_stroke(Rgb888::RED, 1))
//!     .draw(&mut panel);
//!
//! assert_eq!(panel.cell(4), Ok(RGB8::new(255, 0, 0)));
//! assert_eq!(panel.cell(1), Ok(RGB8::new(0, 0, 0)));
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::{Rgb888, RgbColor},
    prelude::Pixel,
};

use crate::color::RGB8;
use crate::panel::{LED_COLS, LED_ROWS, Panel};

/// Convert an embedded-graphics color to a cell color
pub fn to_rgb8(color: Rgb888) -> RGB8 {
    RGB8::new(color.r(), color.g(), color.b())
}

/// Convert a cell color to an embedded-graphics color
pub fn to_rgb888(color: RGB8) -> Rgb888 {
    Rgb888::new(color.r, color.g, color.b)
}

impl OriginDimensions for Panel {
    fn size(&self) -> Size {
        Size::new(LED_COLS as u32, LED_ROWS as u32)
    }
}

impl DrawTarget for Panel {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (Ok(col), Ok(row)) = (usize::try_from(coord.x), usize::try_from(coord.y)) else {
                continue;
            };
            let cell = Self::cell_index(row, col)
                .ok()
                .and_then(|index| self.cell_mut(index));
            if let Some(cell) = cell {
                *cell = to_rgb8(color);
                self.updated = true;
            }
        }
        Ok(())
    }
}
