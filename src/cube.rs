//! Cooperative scheduler tying the pieces together
//!
//! [`CubeLights`] owns the topology, the mode engine and the pixel chain.
//! Call [`tick`](CubeLights::tick) from the main loop with the current
//! time and the latest sensor values; it applies trigger actions, swaps
//! renderers when the selection changed, renders when the current mode's
//! period has elapsed and pushes changed pixels to the chain.
//!
//! ## Example
//!
//! ```
//! use cube_lights::sensor::SensorSnapshot;
//! use cube_lights::{Builder, CubeLights};
//! use smart_leds::{SmartLedsWrite, RGB8};
//!
//! struct Sink;
//! impl SmartLedsWrite for Sink {
//!     type Error = ();
//!     type Color = RGB8;
//!     fn write<T, I>(&mut self, _iterator: T) -> Result<(), ()>
//!     where
//!         T: IntoIterator<Item = I>,
//!         I: Into<RGB8>,
//!     {
//!         Ok(())
//!     }
//! }
//!
//! let config = match Builder::new().build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut cube = match CubeLights::new(&config, Sink, 0x1234) {
//!     Ok(cube) => cube,
//!     Err(_) => return,
//! };
//!
//! let sensors = SensorSnapshot::default();
//! assert_eq!(cube.tick(0, &sensors), Ok(true));
//! assert_eq!(cube.tick(1, &sensors), Ok(false));
//! ```

use smart_leds::SmartLedsWrite;

use crate::color::RGB8;
use crate::config::Config;
use crate::error::Error;
use crate::mode::{Action, ModeEngine};
use crate::pattern::{Frame, RenderSlot, Renderer, Xorshift32};
use crate::sensor::{SensorSnapshot, Triggers, reached};
use crate::sync::sync;
use crate::topology::Topology;

type TickResult<W> = core::result::Result<bool, Error<<W as SmartLedsWrite>::Error>>;

/// LED cube controller
pub struct CubeLights<W> {
    topology: Topology,
    engine: ModeEngine,
    writer: W,
    triggers: Triggers,
    primary: RenderSlot,
    followup: Option<RenderSlot>,
    rng: Xorshift32,
    step: u32,
    next_action_ms: u32,
}

impl<W> CubeLights<W>
where
    W: SmartLedsWrite,
    RGB8: Into<W::Color>,
{
    /// Build the cube and mode engine described by `config`
    ///
    /// `seed` feeds the random renderers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Topology`] if the cube cannot be built and
    /// [`Error::Config`] if the mode lists are unusable.
    pub fn new(config: &Config, writer: W, seed: u32) -> Result<Self, Error<W::Error>> {
        let topology = Topology::from_config(config)?;
        let engine = ModeEngine::from_config(config)?;
        Ok(Self::from_parts(topology, engine, writer, seed))
    }

    /// Assemble a controller from already built parts
    pub fn from_parts(topology: Topology, engine: ModeEngine, writer: W, seed: u32) -> Self {
        let mut rng = Xorshift32::new(seed);
        let primary = RenderSlot::for_mode(engine.current_mode(), rng.next_u32());
        let followup = engine
            .current_followup()
            .map(|id| RenderSlot::for_mode(id, rng.next_u32()));
        Self {
            topology,
            engine,
            writer,
            triggers: Triggers::new(),
            primary,
            followup,
            rng,
            step: 0,
            next_action_ms: 0,
        }
    }

    /// Run one pass of the main loop
    ///
    /// Returns whether pixels were written to the chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] if the chain rejects the write and
    /// [`Error::Topology`] if a renderer walks off the graph.
    pub fn tick(&mut self, now_ms: u32, sensors: &SensorSnapshot) -> TickResult<W> {
        for action in self.triggers.update(sensors) {
            self.engine.apply(action);
        }
        self.refresh_slots(now_ms);

        if !reached(now_ms, self.next_action_ms) {
            return Ok(false);
        }

        let frame = Frame {
            now_ms,
            step: self.step,
            sensors: *sensors,
        };
        self.primary.render(&mut self.topology, &frame)?;
        if let Some(followup) = self.followup.as_mut() {
            followup.render(&mut self.topology, &frame)?;
        }
        self.step = self.step.wrapping_add(1);
        self.next_action_ms = now_ms.wrapping_add(u32::from(self.engine.current_period_ms()));

        sync(&mut self.topology, &mut self.writer, false)
    }

    /// Perform a mode action outside the trigger map
    ///
    /// The new renderer takes over on the next [`tick`](Self::tick).
    pub fn apply(&mut self, action: Action) {
        self.engine.apply(action);
    }

    /// Write every pixel now, changed or not
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] if the chain rejects the write.
    pub fn refresh(&mut self) -> TickResult<W> {
        sync(&mut self.topology, &mut self.writer, true)
    }

    /// Replace renderers whose mode is no longer selected
    fn refresh_slots(&mut self, now_ms: u32) {
        let mode = self.engine.current_mode();
        if self.primary.mode_id() != mode {
            log::debug!("render {} -> {}", self.primary.mode_id().as_str(), mode.as_str());
            self.primary = RenderSlot::for_mode(mode, self.rng.next_u32());
            self.step = 0;
            self.next_action_ms = now_ms;
        }

        let followup = self.engine.current_followup();
        if self.followup.as_ref().map(RenderSlot::mode_id) != followup {
            self.followup = followup.map(|id| RenderSlot::for_mode(id, self.rng.next_u32()));
            self.next_action_ms = now_ms;
        }
    }

    /// Panel graph
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Mutable panel graph
    pub const fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    /// Mode engine
    pub const fn engine(&self) -> &ModeEngine {
        &self.engine
    }

    /// Mutable mode engine
    ///
    /// Changes take effect on the next [`tick`](Self::tick).
    pub const fn engine_mut(&mut self) -> &mut ModeEngine {
        &mut self.engine
    }

    /// Trigger map
    pub const fn triggers_mut(&mut self) -> &mut Triggers {
        &mut self.triggers
    }

    /// Active primary renderer
    pub const fn primary(&self) -> &RenderSlot {
        &self.primary
    }

    /// Active followup renderer
    pub const fn followup(&self) -> Option<&RenderSlot> {
        self.followup.as_ref()
    }

    /// Time of the next render in milliseconds
    pub const fn next_action_ms(&self) -> u32 {
        self.next_action_ms
    }

    /// Release the pixel chain
    pub fn release(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WHITE;
    use crate::config::Builder;
    use crate::error::TopologyError;
    use crate::mode::ModeId;
    use crate::panel::CENTER_CELL;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct MockChain {
        writes: usize,
        last: Vec<RGB8>,
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
            self.writes += 1;
            self.last = iterator.into_iter().map(Into::into).collect();
            Ok(())
        }
    }

    fn cube() -> CubeLights<MockChain> {
        let config = Builder::new().build().unwrap();
        CubeLights::new(&config, MockChain::default(), 1).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_panel_count() {
        let config = Builder::new().num_panels(5).build().unwrap();
        let result = CubeLights::new(&config, MockChain::default(), 1);
        assert!(matches!(
            result,
            Err(Error::Topology(TopologyError::FaceCount { expected: 6, provided: 5 }))
        ));
    }

    #[test]
    fn test_starts_on_configured_mode() {
        let cube = cube();
        assert_eq!(cube.primary().mode_id(), ModeId::CyclePattern);
        assert!(cube.followup().is_none());
    }

    #[test]
    fn test_tick_renders_once_per_period() {
        let mut cube = cube();
        let idle = SensorSnapshot::default();
        assert_eq!(cube.tick(0, &idle), Ok(true));
        assert_eq!(cube.next_action_ms(), 500);
        assert_eq!(cube.tick(499, &idle), Ok(false));
        assert_eq!(cube.tick(500, &idle), Ok(true));
        assert_eq!(cube.release().writes, 2);
    }

    #[test]
    fn test_touch_advances_mode_immediately() {
        let mut cube = cube();
        let idle = SensorSnapshot::default();
        cube.tick(0, &idle).unwrap();

        let pressed = SensorSnapshot { touched: 0b1, ..idle };
        assert_eq!(cube.tick(10, &pressed), Ok(true));
        assert_eq!(cube.engine().current_mode(), ModeId::CirclePattern);
        assert_eq!(cube.primary().mode_id(), ModeId::CirclePattern);

        let restore = SensorSnapshot { touched: 0b10, ..idle };
        cube.tick(20, &restore).unwrap();
        assert_eq!(cube.primary().mode_id(), ModeId::CyclePattern);
    }

    #[test]
    fn test_near_object_enables_followup() {
        let mut cube = cube();
        let far = SensorSnapshot {
            range_cm: 150,
            ..SensorSnapshot::default()
        };
        cube.tick(0, &far).unwrap();

        let near = SensorSnapshot { range_cm: 10, ..far };
        assert_eq!(cube.tick(5, &near), Ok(true));
        assert_eq!(cube.followup().map(RenderSlot::mode_id), Some(ModeId::LightCenter));
        for panel in cube.topology().panels() {
            assert_eq!(panel.cell(CENTER_CELL).unwrap(), WHITE);
        }

        cube.tick(10, &far).unwrap();
        assert!(cube.followup().is_none());
    }

    #[test]
    fn test_apply_takes_effect_on_next_tick() {
        let mut cube = cube();
        let idle = SensorSnapshot::default();
        cube.tick(0, &idle).unwrap();
        cube.apply(Action::NextMode);
        assert_eq!(cube.primary().mode_id(), ModeId::CyclePattern);
        assert_eq!(cube.tick(1, &idle), Ok(true));
        assert_eq!(cube.primary().mode_id(), ModeId::CirclePattern);
    }

    #[test]
    fn test_output_error_propagates() {
        let config = Builder::new().build().unwrap();
        let chain = MockChain {
            fail: true,
            ..MockChain::default()
        };
        let mut cube = CubeLights::new(&config, chain, 1).unwrap();
        assert_eq!(
            cube.tick(0, &SensorSnapshot::default()),
            Err(Error::Output("chain"))
        );
    }

    #[test]
    fn test_refresh_writes_unchanged_cube() {
        let mut cube = cube();
        assert_eq!(cube.refresh(), Ok(true));
        let chain = cube.release();
        assert_eq!(chain.writes, 1);
        assert_eq!(chain.last.len(), 54);
    }
}
