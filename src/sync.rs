//! Pixel output
//!
//! The chain starts with `first_led` unused pixels, which are driven
//! dark, followed by the cells of every LED-bearing panel in id order.
//! Within a panel cells go row by row.
//!
//! ## Example
//!
//! ```
//! use cube_lights::sync::sync;
//! use cube_lights::Topology;
//! use smart_leds::{SmartLedsWrite, RGB8};
//!
//! struct Count(usize);
//! impl SmartLedsWrite for Count {
//!     type Error = ();
//!     type Color = RGB8;
//!     fn write<T, I>(&mut self, iterator: T) -> Result<(), ()>
//!     where
//!         T: IntoIterator<Item = I>,
//!         I: Into<RGB8>,
//!     {
//!         self.0 = iterator.into_iter().count();
//!         Ok(())
//!     }
//! }
//!
//! let mut topology = match Topology::build(6, 9, 2, 0b11_1111) {
//!     Ok(topology) => topology,
//!     Err(_) => return,
//! };
//! let mut chain = Count(0);
//! assert_eq!(sync(&mut topology, &mut chain, true), Ok(true));
//! assert_eq!(chain.0, 2 + 6 * 9);
//! ```

use core::iter;

use smart_leds::SmartLedsWrite;

use crate::color::{OFF, RGB8};
use crate::error::Error;
use crate::topology::Topology;

/// Cells of every LED-bearing panel in chain order
pub fn flatten(topology: &Topology) -> impl Iterator<Item = RGB8> + '_ {
    topology
        .panels()
        .iter()
        .filter(|panel| panel.has_leds)
        .flat_map(|panel| panel.cells().iter().copied())
}

/// Full pixel stream, leading dark pixels included
pub fn pixels(topology: &Topology) -> impl Iterator<Item = RGB8> + '_ {
    iter::repeat_n(OFF, topology.first_led() as usize).chain(flatten(topology))
}

/// Write the cube to the chain if anything changed
///
/// With `force` set the write happens regardless. On success every
/// panel's `updated` flag is cleared and `true` is returned; `false`
/// means nothing needed writing.
///
/// # Errors
///
/// Returns [`Error::Output`] if the writer fails. The `updated` flags are
/// left set so the next call retries.
pub fn sync<W>(topology: &mut Topology, writer: &mut W, force: bool) -> Result<bool, Error<W::Error>>
where
    W: SmartLedsWrite,
    RGB8: Into<W::Color>,
{
    if !force && !topology.any_updated() {
        return Ok(false);
    }

    if let Err(e) = writer.write(pixels(topology)) {
        log::warn!("pixel write failed");
        return Err(Error::Output(e));
    }

    for panel in topology.panels_mut() {
        panel.clear_updated();
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLUE, RED};
    use crate::panel::CELL_COUNT;
    use crate::topology::{ALL_FACES, NUM_FACES};
    use alloc::vec::Vec;

    #[derive(Default)]
    struct MockChain {
        frames: Vec<Vec<RGB8>>,
        fail: bool,
    }

    impl SmartLedsWrite for MockChain {
        type Error = &'static str;
        type Color = RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            if self.fail {
                return Err("chain");
            }
            self.frames.push(iterator.into_iter().map(Into::into).collect());
            Ok(())
        }
    }

    fn cube(first_led: u16, mask: u8) -> Topology {
        Topology::build(NUM_FACES, CELL_COUNT, first_led, mask).unwrap()
    }

    #[test]
    fn test_flatten_order() {
        let mut topology = cube(0, ALL_FACES);
        topology.panel_mut(1).unwrap().set_cell(8, RED).unwrap();
        topology.panel_mut(2).unwrap().set_cell(0, BLUE).unwrap();

        let pixels: Vec<RGB8> = flatten(&topology).collect();
        assert_eq!(pixels.len(), NUM_FACES * CELL_COUNT);
        assert_eq!(pixels[CELL_COUNT + 8], RED);
        assert_eq!(pixels[2 * CELL_COUNT], BLUE);
    }

    #[test]
    fn test_flatten_skips_dark_faces() {
        let mut topology = cube(0, 0b11_1101);
        topology.panel_mut(2).unwrap().set_cell(0, BLUE).unwrap();
        let pixels: Vec<RGB8> = flatten(&topology).collect();
        assert_eq!(pixels.len(), 5 * CELL_COUNT);
        assert_eq!(pixels[CELL_COUNT], BLUE);
    }

    #[test]
    fn test_pixel_offset_locates_panel_in_stream() {
        let mut topology = cube(4, 0b11_1110);
        for id in 0..NUM_FACES {
            topology.panel_mut(id).unwrap().set_cell(0, RED).unwrap();
        }

        let stream: Vec<RGB8> = pixels(&topology).collect();
        assert_eq!(stream.len(), 4 + 5 * CELL_COUNT);
        for panel in topology.panels().iter().filter(|p| p.has_leds) {
            let offset = panel.pixel_offset() as usize;
            assert_eq!(stream[offset], RED, "panel {}", panel.id());
            assert_eq!(stream[offset + 1], OFF, "panel {}", panel.id());
        }
        assert_eq!(topology.panel(1).unwrap().pixel_offset(), 4);
    }

    #[test]
    fn test_sync_writes_leading_dark_pixels() {
        let mut topology = cube(3, ALL_FACES);
        topology.set_all(RED);
        let mut chain = MockChain::default();

        assert_eq!(sync(&mut topology, &mut chain, false), Ok(true));
        let frame = &chain.frames[0];
        assert_eq!(frame.len(), 3 + NUM_FACES * CELL_COUNT);
        assert!(frame[..3].iter().all(|p| *p == OFF));
        assert!(frame[3..].iter().all(|p| *p == RED));
        assert!(!topology.any_updated());
    }

    #[test]
    fn test_sync_skips_when_unchanged() {
        let mut topology = cube(0, ALL_FACES);
        let mut chain = MockChain::default();
        assert_eq!(sync(&mut topology, &mut chain, false), Ok(false));
        assert!(chain.frames.is_empty());

        assert_eq!(sync(&mut topology, &mut chain, true), Ok(true));
        assert_eq!(chain.frames.len(), 1);
    }

    #[test]
    fn test_sync_ignores_changes_on_dark_faces() {
        let mut topology = cube(0, 0b11_1110);
        topology.panel_mut(0).unwrap().set_color(RED);
        let mut chain = MockChain::default();
        assert_eq!(sync(&mut topology, &mut chain, false), Ok(false));
    }

    #[test]
    fn test_sync_error_keeps_updated() {
        let mut topology = cube(0, ALL_FACES);
        topology.set_all(RED);
        let mut chain = MockChain {
            fail: true,
            ..MockChain::default()
        };
        assert_eq!(sync(&mut topology, &mut chain, false), Err(Error::Output("chain")));
        assert!(topology.any_updated());
    }
}
