//! Cube configuration types and builder
//!
//! All values are fixed at startup. [`Builder::new`] reproduces the
//! stock table: six LED-bearing faces of nine cells, six modes enabled for
//! cycling with the cycle pattern selected, and the light-center overlay
//! as the only followup.

pub use crate::error::BuilderError;
use crate::mode::ModeId;
use crate::panel::CELL_COUNT;
use crate::topology::{ALL_FACES, NUM_FACES};

/// Modes enabled for cycling by default
pub const DEFAULT_VALID_MODES: &[ModeId] = &[
    ModeId::AllOn,
    ModeId::RandomNeighbor,
    ModeId::CyclePattern,
    ModeId::CirclePattern,
    ModeId::StaticNoise,
    ModeId::SwitchRandom,
];

/// Followups enabled for cycling by default
pub const DEFAULT_VALID_FOLLOWUPS: &[ModeId] = &[ModeId::LightCenter];

/// Default starting position in the valid mode list
pub const DEFAULT_START_MODE: u8 = 2;

/// Cube configuration
///
/// Use [`Builder`] to create a Config.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Number of panels requested from the topology builder
    pub num_panels: usize,
    /// LEDs on each panel
    pub leds_per_panel: usize,
    /// Chain index of the first panel's first LED
    pub first_led: u16,
    /// Bit `n` set when face `n` carries LEDs
    pub led_mask: u8,
    /// Render-table ids enabled for primary mode cycling
    pub valid_modes: &'static [ModeId],
    /// Render-table ids enabled for followup cycling
    pub valid_followups: &'static [ModeId],
    /// Starting position in `valid_modes`
    pub start_mode: u8,
}

/// Builder for constructing cube configuration
///
/// # Example
///
/// ```
/// use cube_lights::{Builder, ModeId};
///
/// let config = match Builder::new()
///     .first_led(1)
///     .valid_modes(&[ModeId::AllOn, ModeId::CirclePattern])
///     .start_mode(1)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.first_led, 1);
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct Builder {
    num_panels: usize,
    leds_per_panel: usize,
    first_led: u16,
    led_mask: u8,
    valid_modes: &'static [ModeId],
    valid_followups: &'static [ModeId],
    start_mode: u8,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            num_panels: NUM_FACES,
            leds_per_panel: CELL_COUNT,
            first_led: 0,
            led_mask: ALL_FACES,
            valid_modes: DEFAULT_VALID_MODES,
            valid_followups: DEFAULT_VALID_FOLLOWUPS,
            start_mode: DEFAULT_START_MODE,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the panel count
    ///
    /// Only six builds a cube; other values are passed through so the
    /// topology builder can refuse them.
    pub fn num_panels(mut self, value: usize) -> Self {
        self.num_panels = value;
        self
    }

    /// Set LEDs per panel
    pub fn leds_per_panel(mut self, value: usize) -> Self {
        self.leds_per_panel = value;
        self
    }

    /// Set the chain index of the first panel's first LED
    ///
    /// LEDs before it are driven dark.
    pub fn first_led(mut self, value: u16) -> Self {
        self.first_led = value;
        self
    }

    /// Set which faces carry LEDs
    pub fn led_mask(mut self, value: u8) -> Self {
        self.led_mask = value;
        self
    }

    /// Set the modes enabled for cycling
    pub fn valid_modes(mut self, value: &'static [ModeId]) -> Self {
        self.valid_modes = value;
        self
    }

    /// Set the followups enabled for cycling
    ///
    /// An empty list disables the followup track.
    pub fn valid_followups(mut self, value: &'static [ModeId]) -> Self {
        self.valid_followups = value;
        self
    }

    /// Set the starting position in the valid mode list
    pub fn start_mode(mut self, value: u8) -> Self {
        self.start_mode = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns a [`BuilderError`] when the mode list is empty, the start
    /// index is past its end, the LED count does not match the cell grid,
    /// or the LED mask names faces that do not exist.
    pub fn build(self) -> Result<Config, BuilderError> {
        if self.valid_modes.is_empty() {
            return Err(BuilderError::EmptyValidModes);
        }
        if self.start_mode as usize >= self.valid_modes.len() {
            return Err(BuilderError::StartOutOfRange {
                start: self.start_mode,
                len: self.valid_modes.len(),
            });
        }
        if self.leds_per_panel != CELL_COUNT {
            return Err(BuilderError::InvalidLedsPerFace {
                provided: self.leds_per_panel,
            });
        }
        if self.led_mask & !ALL_FACES != 0 {
            return Err(BuilderError::InvalidLedMask {
                mask: self.led_mask,
            });
        }
        Ok(Config {
            num_panels: self.num_panels,
            leds_per_panel: self.leds_per_panel,
            first_led: self.first_led,
            led_mask: self.led_mask,
            valid_modes: self.valid_modes,
            valid_followups: self.valid_followups,
            start_mode: self.start_mode,
        })
    }
}
