//! Color helpers for panel cells
//!
//! Cells store [`RGB8`] values from `smart-leds`. Renderers and callers that
//! prefer a single integer use the packed `0x00RRGGBB` form; [`pack`] and
//! [`unpack`] convert between the two without loss.
//!
//! ## Example
//!
//! ```
//! use cube_lights::color::{pack, unpack};
//! use smart_leds::RGB8;
//!
//! let packed = pack(RGB8::new(0x12, 0x34, 0x56));
//! assert_eq!(packed, 0x0012_3456);
//! assert_eq!(unpack(packed), RGB8::new(0x12, 0x34, 0x56));
//! ```

pub use smart_leds::RGB8;

/// All channels off
pub const OFF: RGB8 = RGB8::new(0, 0, 0);
/// Full white
pub const WHITE: RGB8 = RGB8::new(255, 255, 255);
/// Full red
pub const RED: RGB8 = RGB8::new(255, 0, 0);
/// Full green
pub const GREEN: RGB8 = RGB8::new(0, 255, 0);
/// Full blue
pub const BLUE: RGB8 = RGB8::new(0, 0, 255);
/// Red + green
pub const YELLOW: RGB8 = RGB8::new(255, 255, 0);
/// Green + blue
pub const CYAN: RGB8 = RGB8::new(0, 255, 255);
/// Red + blue
pub const MAGENTA: RGB8 = RGB8::new(255, 0, 255);

/// One distinct color per cube face, indexed by panel id
pub const FACE_COLORS: [RGB8; 6] = [RED, GREEN, BLUE, YELLOW, CYAN, MAGENTA];

/// Pack a color into `0x00RRGGBB`
pub const fn pack(color: RGB8) -> u32 {
    ((color.r as u32) << 16) | ((color.g as u32) << 8) | color.b as u32
}

/// Pack separate channels into `0x00RRGGBB`
pub const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    pack(RGB8::new(r, g, b))
}

/// Unpack a `0x00RRGGBB` value; the top byte is ignored
pub const fn unpack(packed: u32) -> RGB8 {
    RGB8::new((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
}

/// Scale every channel by `scale / 256`
#[inline]
pub fn scale(color: RGB8, scale: u8) -> RGB8 {
    RGB8::new(
        scale8(color.r, scale),
        scale8(color.g, scale),
        scale8(color.b, scale),
    )
}

/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0)
#[inline]
pub fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * scale as u16) >> 8) as u8
}

/// Blend two colors channel by channel
///
/// `amount_of_b` of 0 yields `a`, 255 yields (almost) `b`.
#[inline]
pub fn blend(a: RGB8, b: RGB8, amount_of_b: u8) -> RGB8 {
    RGB8::new(
        blend8(a.r, b.r, amount_of_b),
        blend8(a.g, b.g, amount_of_b),
        blend8(a.b, b.b, amount_of_b),
    )
}

#[inline]
#[allow(clippy::cast_possible_wrap)]
fn blend8(a: u8, b: u8, amount_of_b: u8) -> u8 {
    let a = i16::from(a);
    let b = i16::from(b);
    let amount = i16::from(amount_of_b);

    (a + (((b - a) * amount) >> 8)) as u8
}
