//! LED Cube Controller
//!
//! Drives a cube of six square panels, each a 3×3 grid of addressable
//! LEDs on one chain.
//!
//! ## Features
//!
//! - `no_std` compatible, no heap
//! - Closed panel graph with edge and corner adjacency
//! - Primary mode and followup overlay, each with one-level undo
//! - `smart-leds` output to any `SmartLedsWrite` chain
//! - `embedded-hal` v1.0 ultrasonic, photoresistor and MPR121 touch input
//! - `embedded-graphics` drawing on a single panel (with `graphics` feature)
//!
//! ## Usage
//!
//! ```
//! use cube_lights::sensor::SensorSnapshot;
//! use cube_lights::{Action, Builder, CubeLights, ModeId};
//! use smart_leds::{SmartLedsWrite, RGB8};
//!
//! # struct MockChain;
//! # impl SmartLedsWrite for MockChain {
//! #     type Error = ();
//! #     type Color = RGB8;
//! #     fn write<T, I>(&mut self, _iterator: T) -> Result<(), ()>
//! #     where
//! #         T: IntoIterator<Item = I>,
//! #         I: Into<RGB8>,
//! #     {
//! #         Ok(())
//! #     }
//! # }
//! let config = match Builder::new().first_led(1).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut cube = match CubeLights::new(&config, MockChain, 0xC0BE) {
//!     Ok(cube) => cube,
//!     Err(_) => return,
//! };
//!
//! let _ = cube.tick(0, &SensorSnapshot::default());
//! cube.apply(Action::NextMode);
//! let _ = cube.tick(1, &SensorSnapshot::default());
//! assert_eq!(cube.engine().current_mode(), ModeId::CirclePattern);
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

/// Cell colors and packing helpers
pub mod color;
/// Cube configuration types and builder
pub mod config;
/// Cooperative scheduler
pub mod cube;
/// Error types for the crate
pub mod error;
/// Mode selection with one-level undo
pub mod mode;
/// One square face and its links
pub mod panel;
/// Renderers for the mode table
pub mod pattern;
/// Sensor adapters and the trigger map
pub mod sensor;
/// Pixel output to the LED chain
pub mod sync;
/// The closed panel graph
pub mod topology;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use color::RGB8;
pub use config::{Builder, Config};
pub use cube::CubeLights;
pub use error::{BuilderError, Error, TopologyError};
pub use mode::{Action, ModeEngine, ModeId};
pub use panel::{EdgeLink, Panel, VertexLink};
pub use sensor::{SensorError, SensorSnapshot};
pub use topology::Topology;
