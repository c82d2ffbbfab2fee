//! Square panel entity
//!
//! A [`Panel`] is one face of the cube: a 3x3 grid of color cells, four
//! edge slots and four corner slots. Slots hold indices into the
//! [`Topology`](crate::Topology) arena rather than references, so a panel
//! never outlives or aliases its neighbors.
//!
//! ## Layout
//!
//! Viewed from outside the solid, edges and vertices are numbered
//! clockwise. Edge `e` runs from vertex [`vertex_ccw`]`(e)` to vertex `e`.
//!
//! ```text
//!   3      0       0
//!    +------------+
//!    | 0    1    2|
//!    |            |
//!   3| 3    4    5|1
//!    |            |
//!    | 6    7    8|
//!    +------------+
//!   2      2       1
//! ```
//!
//! ## Example
//!
//! ```
//! use cube_lights::Panel;
//! use cube_lights::color::pack_rgb;
//!
//! let mut panel = Panel::new(0);
//! panel.set_cell_rgb(4, 10, 20, 30).unwrap();
//! assert_eq!(panel.cell_packed(4), Ok(pack_rgb(10, 20, 30)));
//! assert!(panel.set_cell_rgb(9, 0, 0, 0).is_err());
//! ```

use smart_leds::RGB8;

use crate::color::{OFF, pack, unpack};
use crate::error::TopologyError;

/// Number of edges on a square panel
pub const NUM_EDGES: usize = 4;
/// Number of corners on a square panel
pub const NUM_VERTICES: usize = 4;
/// Length of each corner-neighbor list
pub const VERTEX_ORDER: usize = 1;
/// Rows in the cell grid
pub const LED_ROWS: usize = 3;
/// Columns in the cell grid
pub const LED_COLS: usize = 3;
/// Cells per panel
pub const CELL_COUNT: usize = LED_ROWS * LED_COLS;
/// Index of the middle cell
pub const CENTER_CELL: usize = CELL_COUNT / 2;

/// Next vertex clockwise
pub const fn vertex_cw(vertex: usize) -> usize {
    (vertex + 1) % NUM_VERTICES
}

/// Next vertex counter-clockwise
pub const fn vertex_ccw(vertex: usize) -> usize {
    (vertex + NUM_VERTICES - 1) % NUM_VERTICES
}

/// Edge on the far side of the panel
pub const fn opposite_edge(edge: usize) -> usize {
    (edge + 2) % NUM_EDGES
}

/// Cell indices along each edge, in clockwise order
pub const EDGE_CELLS: [[usize; LED_COLS]; NUM_EDGES] =
    [[0, 1, 2], [2, 5, 8], [8, 7, 6], [6, 3, 0]];

/// Cell index sitting in each corner
pub const VERTEX_CELLS: [usize; NUM_VERTICES] = [2, 8, 6, 0];

/// Link across an edge to a neighboring panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeLink {
    /// Neighbor panel id
    pub panel: u8,
    /// Edge index on the neighbor that leads back
    pub edge: u8,
}

impl EdgeLink {
    /// Create a new edge link
    pub const fn new(panel: u8, edge: u8) -> Self {
        Self { panel, edge }
    }

    /// Rotational offset from this panel's numbering to the neighbor's
    ///
    /// Adding the offset to an edge or vertex index on the origin panel
    /// yields the index on the neighbor that points the same way across the
    /// shared edge. Zero means both faces sit in the same orientation.
    pub const fn rotation(&self, from_edge: usize) -> usize {
        (self.edge as usize + NUM_EDGES + 2 - from_edge % NUM_EDGES) % NUM_EDGES
    }
}

/// Link from a corner to a panel sharing it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexLink {
    /// Neighbor panel id
    pub panel: u8,
    /// Corner index on the neighbor
    pub vertex: u8,
}

impl VertexLink {
    /// Create a new vertex link
    pub const fn new(panel: u8, vertex: u8) -> Self {
        Self { panel, vertex }
    }
}

/// One square face of the cube
#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    id: u8,
    cells: [RGB8; CELL_COUNT],
    edges: [Option<EdgeLink>; NUM_EDGES],
    vertices: [[Option<VertexLink>; VERTEX_ORDER]; NUM_VERTICES],
    pixel_offset: u16,
    /// Whether this panel carries addressable LEDs
    pub has_leds: bool,
    /// Whether any cell changed since the last sync
    pub updated: bool,
    /// Scratch value for traversals; reset before use
    pub mark: u8,
}

impl Panel {
    /// Create an unwired panel with all cells off
    pub const fn new(id: u8) -> Self {
        Self {
            id,
            cells: [OFF; CELL_COUNT],
            edges: [None; NUM_EDGES],
            vertices: [[None; VERTEX_ORDER]; NUM_VERTICES],
            pixel_offset: 0,
            has_leds: true,
            updated: false,
            mark: 0,
        }
    }

    /// Stable panel id
    pub const fn id(&self) -> u8 {
        self.id
    }

    /// First index of this panel in the global pixel space
    ///
    /// Counts only panels with LEDs, so it matches the stream written by
    /// [`crate::sync::pixels`].
    pub const fn pixel_offset(&self) -> u16 {
        self.pixel_offset
    }

    pub(crate) fn set_pixel_offset(&mut self, offset: u16) {
        self.pixel_offset = offset;
    }

    /// Row-major cell index for a grid position
    pub fn cell_index(row: usize, col: usize) -> Result<usize, TopologyError> {
        if row >= LED_ROWS || col >= LED_COLS {
            return Err(TopologyError::CellOutOfRange {
                index: row.saturating_mul(LED_COLS).saturating_add(col),
            });
        }
        Ok(row * LED_COLS + col)
    }

    /// All cells in row-major order
    pub const fn cells(&self) -> &[RGB8; CELL_COUNT] {
        &self.cells
    }

    /// Mutable cell access without touching `updated`
    pub(crate) fn cell_mut(&mut self, index: usize) -> Option<&mut RGB8> {
        self.cells.get_mut(index)
    }

    /// Set every cell to one color
    pub fn set_color(&mut self, color: RGB8) {
        self.cells = [color; CELL_COUNT];
        self.updated = true;
    }

    /// Set every cell from separate channels
    pub fn set_color_rgb(&mut self, r: u8, g: u8, b: u8) {
        self.set_color(RGB8::new(r, g, b));
    }

    /// Set every cell from a packed `0x00RRGGBB` value
    pub fn set_color_packed(&mut self, packed: u32) {
        self.set_color(unpack(packed));
    }

    /// Set one cell
    pub fn set_cell(&mut self, index: usize, color: RGB8) -> Result<(), TopologyError> {
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(TopologyError::CellOutOfRange { index })?;
        *cell = color;
        self.updated = true;
        Ok(())
    }

    /// Set one cell from separate channels
    pub fn set_cell_rgb(&mut self, index: usize, r: u8, g: u8, b: u8) -> Result<(), TopologyError> {
        self.set_cell(index, RGB8::new(r, g, b))
    }

    /// Set one cell from a packed `0x00RRGGBB` value
    pub fn set_cell_packed(&mut self, index: usize, packed: u32) -> Result<(), TopologyError> {
        self.set_cell(index, unpack(packed))
    }

    /// Whole-panel color
    ///
    /// The first cell stands for the panel.
    pub const fn color(&self) -> RGB8 {
        self.cells[0]
    }

    /// Whole-panel color, packed
    pub const fn color_packed(&self) -> u32 {
        pack(self.cells[0])
    }

    /// Color of one cell
    pub fn cell(&self, index: usize) -> Result<RGB8, TopologyError> {
        self.cells
            .get(index)
            .copied()
            .ok_or(TopologyError::CellOutOfRange { index })
    }

    /// Color of one cell, packed
    pub fn cell_packed(&self, index: usize) -> Result<u32, TopologyError> {
        self.cell(index).map(pack)
    }

    /// Red channel of one cell
    pub fn red(&self, index: usize) -> Result<u8, TopologyError> {
        self.cell(index).map(|c| c.r)
    }

    /// Green channel of one cell
    pub fn green(&self, index: usize) -> Result<u8, TopologyError> {
        self.cell(index).map(|c| c.g)
    }

    /// Blue channel of one cell
    pub fn blue(&self, index: usize) -> Result<u8, TopologyError> {
        self.cell(index).map(|c| c.b)
    }

    /// Mark the panel as synced
    pub fn clear_updated(&mut self) {
        self.updated = false;
    }

    /// Neighbor across an edge
    pub fn edge(&self, edge: usize) -> Result<Option<EdgeLink>, TopologyError> {
        self.edges
            .get(edge)
            .copied()
            .ok_or(TopologyError::EdgeOutOfRange { index: edge })
    }

    /// Wire an edge slot
    ///
    /// Only the topology builder wires panels; a live graph is not rewired.
    pub fn set_edge(&mut self, edge: usize, link: EdgeLink) -> Result<(), TopologyError> {
        let slot = self
            .edges
            .get_mut(edge)
            .ok_or(TopologyError::EdgeOutOfRange { index: edge })?;
        *slot = Some(link);
        Ok(())
    }

    /// Entry `slot` of the ordered corner-neighbor list of `vertex`
    pub fn vertex(&self, vertex: usize, slot: usize) -> Result<Option<VertexLink>, TopologyError> {
        self.vertices
            .get(vertex)
            .and_then(|list| list.get(slot))
            .copied()
            .ok_or(TopologyError::VertexOutOfRange { vertex, slot })
    }

    /// Wire one entry of a corner-neighbor list
    pub fn set_vertex(
        &mut self,
        vertex: usize,
        slot: usize,
        link: VertexLink,
    ) -> Result<(), TopologyError> {
        let entry = self
            .vertices
            .get_mut(vertex)
            .and_then(|list| list.get_mut(slot))
            .ok_or(TopologyError::VertexOutOfRange { vertex, slot })?;
        *entry = Some(link);
        Ok(())
    }
}
