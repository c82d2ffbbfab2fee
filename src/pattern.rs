//! Renderers for every entry of the mode table
//!
//! A renderer paints panel cells on the [`Topology`]; pixel output happens
//! later in [`sync`](crate::sync). All renderers live in the [`RenderSlot`]
//! enum so switching modes needs no heap.
//!
//! Renderers are stateful. The scheduler creates a fresh slot with
//! [`RenderSlot::for_mode`] whenever the engine selects a different mode
//! and passes a [`Frame`] on every update.
//!
//! ## Example
//!
//! ```
//! use cube_lights::pattern::{Frame, RenderSlot, Renderer};
//! use cube_lights::{color, ModeId, Topology};
//!
//! let mut topology = match Topology::build(6, 9, 0, 0b11_1111) {
//!     Ok(topology) => topology,
//!     Err(_) => return,
//! };
//! let mut slot = RenderSlot::for_mode(ModeId::TestPattern, 1);
//! let _ = slot.render(&mut topology, &Frame::default());
//! assert_eq!(topology.panels()[0].color(), color::FACE_COLORS[0]);
//! ```

use crate::color::{self, FACE_COLORS, OFF, RGB8, WHITE};
use crate::error::TopologyError;
use crate::mode::ModeId;
use crate::panel::{CELL_COUNT, CENTER_CELL, EDGE_CELLS, NUM_EDGES, VERTEX_CELLS};
use crate::sensor::SensorSnapshot;
use crate::topology::{CORNER_DEGREE, NUM_FACES, Topology};

/// Input to one render call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    /// Milliseconds since start
    pub now_ms: u32,
    /// Renders since this mode became active
    pub step: u32,
    /// Latest sensor values
    pub sensors: SensorSnapshot,
}

/// Trait for renderer implementations
pub trait Renderer {
    /// Paint one update onto the topology
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if the graph is missing a link the
    /// renderer walks.
    fn render(&mut self, topology: &mut Topology, frame: &Frame) -> Result<(), TopologyError>;

    /// Return to the initial state
    fn reset(&mut self) {}
}

/// Small deterministic pseudo-random source
///
/// Marsaglia xorshift with the 13/17/5 triple. Not for anything but
/// picking lights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    const ZERO_SEED: u32 = 0x9E37_79B9;

    /// Create a generator; a zero seed is replaced with a fixed constant
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { Self::ZERO_SEED } else { seed },
        }
    }

    /// Next 32-bit value
    pub const fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Next 8-bit value
    pub const fn next_u8(&mut self) -> u8 {
        (self.next_u32() >> 24) as u8
    }

    /// Value in `0..bound`, or 0 when `bound` is 0
    pub const fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.next_u32() as usize % bound
    }
}

// =============================================================================
// Primary modes
// =============================================================================

/// Every cell white, painted once
#[derive(Clone, Debug, Default)]
pub struct AllOn {
    drawn: bool,
}

impl Renderer for AllOn {
    fn render(&mut self, topology: &mut Topology, _frame: &Frame) -> Result<(), TopologyError> {
        if !self.drawn {
            topology.set_all(WHITE);
            self.drawn = true;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.drawn = false;
    }
}

/// One face color per panel, rotating each step
#[derive(Clone, Debug, Default)]
pub struct TestPattern;

impl Renderer for TestPattern {
    fn render(&mut self, topology: &mut Topology, frame: &Frame) -> Result<(), TopologyError> {
        for (id, panel) in topology.panels_mut().iter_mut().enumerate() {
            panel.set_color(FACE_COLORS[(id + frame.step as usize) % NUM_FACES]);
        }
        Ok(())
    }
}

/// Wiring check: one face white, the shared edge of each neighbor in the
/// color of the edge index
#[derive(Clone, Debug, Default)]
pub struct SetupPattern;

impl Renderer for SetupPattern {
    fn render(&mut self, topology: &mut Topology, frame: &Frame) -> Result<(), TopologyError> {
        let face = frame.step as usize % NUM_FACES;
        topology.set_all(OFF);
        topology.panel_mut(face)?.set_color(WHITE);
        for edge in 0..NUM_EDGES {
            let link = topology.link(face, edge)?;
            let neighbor = topology.panel_mut(link.panel as usize)?;
            for &cell in &EDGE_CELLS[link.edge as usize] {
                neighbor.set_cell(cell, FACE_COLORS[edge])?;
            }
        }
        Ok(())
    }
}

/// A color hopping to a random edge neighbor, leaving a fading trail
#[derive(Clone, Debug)]
pub struct RandomNeighbor {
    rng: Xorshift32,
    face: usize,
}

impl RandomNeighbor {
    const TRAIL_SCALE: u8 = 96;

    /// Create the renderer with a random seed
    pub const fn new(seed: u32) -> Self {
        Self {
            rng: Xorshift32::new(seed),
            face: 0,
        }
    }
}

impl Renderer for RandomNeighbor {
    fn render(&mut self, topology: &mut Topology, _frame: &Frame) -> Result<(), TopologyError> {
        for panel in topology.panels_mut() {
            let faded = color::scale(panel.color(), Self::TRAIL_SCALE);
            if faded != panel.color() {
                panel.set_color(faded);
            }
        }
        let edge = self.rng.below(NUM_EDGES);
        self.face = topology.neighbor(self.face, edge)?;
        let next = FACE_COLORS[self.rng.below(FACE_COLORS.len())];
        topology.panel_mut(self.face)?.set_color(next);
        Ok(())
    }

    fn reset(&mut self) {
        self.face = 0;
    }
}

/// A lit face walking straight around the cube
///
/// Four moves in one direction bring it back to the start; it then turns
/// a quarter so successive loops cover every face.
#[derive(Clone, Debug, Default)]
pub struct CyclePattern {
    face: usize,
    heading: usize,
    moves: u32,
}

impl CyclePattern {
    /// Panel lit by the next render and the edge it will leave through
    pub const fn position(&self) -> (usize, usize) {
        (self.face, self.heading)
    }
}

impl Renderer for CyclePattern {
    fn render(&mut self, topology: &mut Topology, _frame: &Frame) -> Result<(), TopologyError> {
        topology.set_all(OFF);
        topology
            .panel_mut(self.face)?
            .set_color(FACE_COLORS[self.heading % FACE_COLORS.len()]);

        let (face, heading) = topology.cross_edge(self.face, self.heading)?;
        self.face = face;
        self.heading = heading;
        self.moves += 1;
        if self.moves % NUM_EDGES as u32 == 0 {
            self.heading = (self.heading + 1) % NUM_EDGES;
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Color rotating around one cube corner, then moving to the next corner
#[derive(Clone, Debug, Default)]
pub struct CirclePattern {
    face: usize,
    vertex: usize,
    pos: usize,
}

impl Renderer for CirclePattern {
    fn render(&mut self, topology: &mut Topology, _frame: &Frame) -> Result<(), TopologyError> {
        let ring = topology.corner_ring(self.face, self.vertex)?;
        let color = FACE_COLORS[self.face];
        topology.set_all(OFF);
        for (i, &(panel, vertex)) in ring.iter().enumerate() {
            let panel = topology.panel_mut(panel)?;
            if i == self.pos {
                panel.set_color(color);
            } else {
                panel.set_cell(VERTEX_CELLS[vertex], color)?;
            }
        }

        self.pos += 1;
        if self.pos == CORNER_DEGREE {
            self.pos = 0;
            self.vertex += 1;
            if self.vertex == VERTEX_CELLS.len() {
                self.vertex = 0;
                self.face = (self.face + 1) % NUM_FACES;
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Every panel fading through the face colors
#[derive(Clone, Debug, Default)]
pub struct FadeCycle;

impl FadeCycle {
    /// Milliseconds per blend step
    pub const STEP_MS: u32 = 8;

    /// Color shown at a given time
    pub fn color_at(now_ms: u32) -> RGB8 {
        let t = now_ms / Self::STEP_MS;
        let from = (t >> 8) as usize % FACE_COLORS.len();
        let to = (from + 1) % FACE_COLORS.len();
        color::blend(FACE_COLORS[from], FACE_COLORS[to], (t & 0xFF) as u8)
    }
}

impl Renderer for FadeCycle {
    fn render(&mut self, topology: &mut Topology, frame: &Frame) -> Result<(), TopologyError> {
        let color = Self::color_at(frame.now_ms);
        for panel in topology.panels_mut() {
            if panel.color() != color {
                panel.set_color(color);
            }
        }
        Ok(())
    }
}

/// Faces lit while their touch channel is held
#[derive(Clone, Debug, Default)]
pub struct CapResponse;

impl Renderer for CapResponse {
    fn render(&mut self, topology: &mut Topology, frame: &Frame) -> Result<(), TopologyError> {
        for (id, panel) in topology.panels_mut().iter_mut().enumerate() {
            let color = if frame.sensors.is_touched(id) {
                FACE_COLORS[id]
            } else {
                OFF
            };
            panel.set_color(color);
        }
        Ok(())
    }
}

/// Dim grey noise on every cell
#[derive(Clone, Debug)]
pub struct StaticNoise {
    rng: Xorshift32,
}

impl StaticNoise {
    /// Create the renderer with a random seed
    pub const fn new(seed: u32) -> Self {
        Self {
            rng: Xorshift32::new(seed),
        }
    }
}

impl Renderer for StaticNoise {
    fn render(&mut self, topology: &mut Topology, _frame: &Frame) -> Result<(), TopologyError> {
        for panel in topology.panels_mut() {
            for cell in 0..CELL_COUNT {
                let level = self.rng.next_u8() >> 2;
                panel.set_cell(cell, RGB8::new(level, level, level))?;
            }
        }
        Ok(())
    }
}

/// One random panel toggled on or off per update
#[derive(Clone, Debug)]
pub struct SwitchRandom {
    rng: Xorshift32,
}

impl SwitchRandom {
    /// Create the renderer with a random seed
    pub const fn new(seed: u32) -> Self {
        Self {
            rng: Xorshift32::new(seed),
        }
    }
}

impl Renderer for SwitchRandom {
    fn render(&mut self, topology: &mut Topology, _frame: &Frame) -> Result<(), TopologyError> {
        let face = self.rng.below(NUM_FACES);
        let color = FACE_COLORS[self.rng.below(FACE_COLORS.len())];
        let panel = topology.panel_mut(face)?;
        if panel.color() == OFF {
            panel.set_color(color);
        } else {
            panel.set_color(OFF);
        }
        Ok(())
    }
}

// =============================================================================
// Followups
// =============================================================================

/// Center cell of every face lit white, brighter as the room gets darker
#[derive(Clone, Debug, Default)]
pub struct LightCenter;

impl LightCenter {
    /// Center brightness for a raw light level
    pub fn level(sensors: &SensorSnapshot) -> u8 {
        if sensors.dark {
            return u8::MAX;
        }
        let light = (sensors.light.min(1023) >> 2) as u8;
        u8::MAX - light
    }
}

impl Renderer for LightCenter {
    fn render(&mut self, topology: &mut Topology, frame: &Frame) -> Result<(), TopologyError> {
        let level = Self::level(&frame.sensors);
        let color = RGB8::new(level, level, level);
        for panel in topology.panels_mut() {
            if panel.cell(CENTER_CELL)? != color {
                panel.set_cell(CENTER_CELL, color)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Slot
// =============================================================================

/// Render slot - enum containing one renderer per mode table entry
#[derive(Clone, Debug)]
pub enum RenderSlot {
    /// [`ModeId::AllOn`]
    AllOn(AllOn),
    /// [`ModeId::TestPattern`]
    TestPattern(TestPattern),
    /// [`ModeId::SetupPattern`]
    SetupPattern(SetupPattern),
    /// [`ModeId::RandomNeighbor`]
    RandomNeighbor(RandomNeighbor),
    /// [`ModeId::CyclePattern`]
    CyclePattern(CyclePattern),
    /// [`ModeId::CirclePattern`]
    CirclePattern(CirclePattern),
    /// [`ModeId::FadeCycle`]
    FadeCycle(FadeCycle),
    /// [`ModeId::CapResponse`]
    CapResponse(CapResponse),
    /// [`ModeId::StaticNoise`]
    StaticNoise(StaticNoise),
    /// [`ModeId::SwitchRandom`]
    SwitchRandom(SwitchRandom),
    /// [`ModeId::LightCenter`]
    LightCenter(LightCenter),
}

impl RenderSlot {
    /// Fresh renderer for a mode; `seed` feeds the random modes
    pub fn for_mode(id: ModeId, seed: u32) -> Self {
        match id {
            ModeId::AllOn => Self::AllOn(AllOn::default()),
            ModeId::TestPattern => Self::TestPattern(TestPattern),
            ModeId::SetupPattern => Self::SetupPattern(SetupPattern),
            ModeId::RandomNeighbor => Self::RandomNeighbor(RandomNeighbor::new(seed)),
            ModeId::CyclePattern => Self::CyclePattern(CyclePattern::default()),
            ModeId::CirclePattern => Self::CirclePattern(CirclePattern::default()),
            ModeId::FadeCycle => Self::FadeCycle(FadeCycle),
            ModeId::CapResponse => Self::CapResponse(CapResponse),
            ModeId::StaticNoise => Self::StaticNoise(StaticNoise::new(seed)),
            ModeId::SwitchRandom => Self::SwitchRandom(SwitchRandom::new(seed)),
            ModeId::LightCenter => Self::LightCenter(LightCenter),
        }
    }

    /// Mode this slot renders
    pub const fn mode_id(&self) -> ModeId {
        match self {
            Self::AllOn(_) => ModeId::AllOn,
            Self::TestPattern(_) => ModeId::TestPattern,
            Self::SetupPattern(_) => ModeId::SetupPattern,
            Self::RandomNeighbor(_) => ModeId::RandomNeighbor,
            Self::CyclePattern(_) => ModeId::CyclePattern,
            Self::CirclePattern(_) => ModeId::CirclePattern,
            Self::FadeCycle(_) => ModeId::FadeCycle,
            Self::CapResponse(_) => ModeId::CapResponse,
            Self::StaticNoise(_) => ModeId::StaticNoise,
            Self::SwitchRandom(_) => ModeId::SwitchRandom,
            Self::LightCenter(_) => ModeId::LightCenter,
        }
    }
}

impl Renderer for RenderSlot {
    fn render(&mut self, topology: &mut Topology, frame: &Frame) -> Result<(), TopologyError> {
        match self {
            Self::AllOn(r) => r.render(topology, frame),
            Self::TestPattern(r) => r.render(topology, frame),
            Self::SetupPattern(r) => r.render(topology, frame),
            Self::RandomNeighbor(r) => r.render(topology, frame),
            Self::CyclePattern(r) => r.render(topology, frame),
            Self::CirclePattern(r) => r.render(topology, frame),
            Self::FadeCycle(r) => r.render(topology, frame),
            Self::CapResponse(r) => r.render(topology, frame),
            Self::StaticNoise(r) => r.render(topology, frame),
            Self::SwitchRandom(r) => r.render(topology, frame),
            Self::LightCenter(r) => r.render(topology, frame),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::AllOn(r) => r.reset(),
            Self::TestPattern(r) => r.reset(),
            Self::SetupPattern(r) => r.reset(),
            Self::RandomNeighbor(r) => r.reset(),
            Self::CyclePattern(r) => r.reset(),
            Self::CirclePattern(r) => r.reset(),
            Self::FadeCycle(r) => r.reset(),
            Self::CapResponse(r) => r.reset(),
            Self::StaticNoise(r) => r.reset(),
            Self::SwitchRandom(r) => r.reset(),
            Self::LightCenter(r) => r.reset(),
        }
    }
}
