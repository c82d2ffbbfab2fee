//! Cube topology builder and graph queries
//!
//! [`Topology`] is an arena of six [`Panel`]s wired into a closed cube.
//! Panel ids follow a "+"-shaped net:
//!
//! ```text
//!           +---+
//!           | 1 |
//!       +---+---+---+
//!       | 4 | 0 | 2 |
//!       +---+---+---+
//!           | 3 |
//!           +---+
//!           | 5 |
//!           +---+
//! ```
//!
//! Every face is drawn upright in the net. Folding it up leaves faces
//! rotated relative to each other, so each edge link records the edge on
//! the neighbor that leads back; walks that cross an edge use it to keep
//! their heading.
//!
//! ## Example
//!
//! ```
//! use cube_lights::Topology;
//!
//! let cube = match Topology::build(6, 9, 0, 0b11_1111) {
//!     Ok(cube) => cube,
//!     Err(_) => return,
//! };
//! assert!(cube.validate().is_ok());
//!
//! // Leaving face 0 through its top edge lands on face 1
//! let (next, heading) = cube.cross_edge(0, 0).unwrap();
//! assert_eq!(next, 1);
//! assert_eq!(heading, 0);
//! ```

use smart_leds::RGB8;

use crate::config::Config;
use crate::error::TopologyError;
use crate::panel::{
    CELL_COUNT, EdgeLink, NUM_EDGES, NUM_VERTICES, Panel, VERTEX_ORDER, VertexLink,
    opposite_edge, vertex_ccw,
};

/// Number of faces on the cube
pub const NUM_FACES: usize = 6;

/// Panels meeting at each cube corner
pub const CORNER_DEGREE: usize = 3;

/// Mask with one bit set for every face
pub const ALL_FACES: u8 = (1 << NUM_FACES) - 1;

/// Edge wiring of the net: `CUBE_NET[face][edge] = (neighbor, back edge)`
const CUBE_NET: [[(u8, u8); NUM_EDGES]; NUM_FACES] = [
    [(1, 2), (2, 3), (3, 0), (4, 1)],
    [(5, 2), (2, 0), (0, 0), (4, 0)],
    [(1, 1), (5, 1), (3, 1), (0, 1)],
    [(0, 2), (2, 2), (5, 0), (4, 2)],
    [(1, 3), (0, 3), (3, 3), (5, 3)],
    [(3, 2), (2, 1), (1, 0), (4, 3)],
];

/// Closed cube of panels
#[derive(Clone, Debug, PartialEq)]
pub struct Topology {
    panels: [Panel; NUM_FACES],
    first_led: u16,
}

impl Topology {
    /// Allocate and wire a cube
    ///
    /// # Arguments
    ///
    /// * `num_panels` - Requested panel count; anything but six is refused
    /// * `leds_per_panel` - LEDs on each face, must match the cell grid
    /// * `first_led` - Index of the first panel's LED in the chain
    /// * `led_mask` - Bit `n` set when face `n` carries LEDs
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::FaceCount`] or [`TopologyError::LedCount`]
    /// before any panel is wired; no partially built graph escapes.
    pub fn build(
        num_panels: usize,
        leds_per_panel: usize,
        first_led: u16,
        led_mask: u8,
    ) -> Result<Self, TopologyError> {
        if num_panels != NUM_FACES {
            log::warn!("refusing cube with {} panels", num_panels);
            return Err(TopologyError::FaceCount {
                expected: NUM_FACES,
                provided: num_panels,
            });
        }
        if leds_per_panel != CELL_COUNT {
            log::warn!("refusing cube with {} LEDs per panel", leds_per_panel);
            return Err(TopologyError::LedCount {
                expected: CELL_COUNT,
                provided: leds_per_panel,
            });
        }

        let mut panels = [0, 1, 2, 3, 4, 5].map(Panel::new);
        let mut lit_before = 0;
        for (face, panel) in panels.iter_mut().enumerate() {
            for (edge, &(neighbor, back)) in CUBE_NET[face].iter().enumerate() {
                panel.set_edge(edge, EdgeLink::new(neighbor, back))?;
                // The corner at the end of edge `e` is the start of the back edge
                let corner = vertex_ccw(back as usize) as u8;
                panel.set_vertex(edge, 0, VertexLink::new(neighbor, corner))?;
            }
            panel.has_leds = led_mask & (1 << face) != 0;
            // Dark faces are skipped in the pixel stream
            panel.set_pixel_offset(first_led.saturating_add((lit_before * leds_per_panel) as u16));
            if panel.has_leds {
                lit_before += 1;
            }
        }

        let topology = Self { panels, first_led };
        topology.validate()?;
        log::info!("built cube of {} panels from LED {}", NUM_FACES, first_led);
        Ok(topology)
    }

    /// Build the cube described by a configuration
    pub fn from_config(config: &Config) -> Result<Self, TopologyError> {
        Self::build(
            config.num_panels,
            config.leds_per_panel,
            config.first_led,
            config.led_mask,
        )
    }

    /// Number of panels
    pub const fn len(&self) -> usize {
        NUM_FACES
    }

    /// Always false; a built cube is never empty
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// LED chain index of the first panel
    pub const fn first_led(&self) -> u16 {
        self.first_led
    }

    /// All panels in id order
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// All panels in id order, mutable
    pub fn panels_mut(&mut self) -> &mut [Panel] {
        &mut self.panels
    }

    /// Panel by id
    pub fn panel(&self, id: usize) -> Result<&Panel, TopologyError> {
        self.panels
            .get(id)
            .ok_or(TopologyError::PanelOutOfRange { id })
    }

    /// Panel by id, mutable
    pub fn panel_mut(&mut self, id: usize) -> Result<&mut Panel, TopologyError> {
        self.panels
            .get_mut(id)
            .ok_or(TopologyError::PanelOutOfRange { id })
    }

    /// Link across edge `edge` of panel `id`
    pub fn link(&self, id: usize, edge: usize) -> Result<EdgeLink, TopologyError> {
        self.panel(id)?.edge(edge)?.ok_or(TopologyError::Unwired {
            panel: id as u8,
            slot: edge as u8,
        })
    }

    /// Neighbor id across an edge
    pub fn neighbor(&self, id: usize, edge: usize) -> Result<usize, TopologyError> {
        self.link(id, edge).map(|link| link.panel as usize)
    }

    /// Step across an edge keeping the direction of travel
    ///
    /// Returns the neighbor and the edge on it that continues straight on,
    /// which is the edge opposite the one leading back.
    pub fn cross_edge(&self, id: usize, edge: usize) -> Result<(usize, usize), TopologyError> {
        let link = self.link(id, edge)?;
        Ok((link.panel as usize, opposite_edge(link.edge as usize)))
    }

    /// Panels around a cube corner, clockwise seen from outside
    ///
    /// Starts with `id` itself and follows corner links until the ring
    /// closes.
    pub fn corner_ring(
        &self,
        id: usize,
        vertex: usize,
    ) -> Result<[(usize, usize); CORNER_DEGREE], TopologyError> {
        let mut ring = [(id, vertex); CORNER_DEGREE];
        for i in 1..CORNER_DEGREE {
            let (panel, corner) = ring[i - 1];
            let link = self.panel(panel)?.vertex(corner, 0)?.ok_or(TopologyError::Unwired {
                panel: panel as u8,
                slot: corner as u8,
            })?;
            ring[i] = (link.panel as usize, link.vertex as usize);
        }
        Ok(ring)
    }

    /// Set every panel's scratch mark
    pub fn reset_marks(&mut self, value: u8) {
        for panel in &mut self.panels {
            panel.mark = value;
        }
    }

    /// Set every cell of every panel
    pub fn set_all(&mut self, color: RGB8) {
        for panel in &mut self.panels {
            panel.set_color(color);
        }
    }

    /// Whether any LED-bearing panel changed since the last sync
    pub fn any_updated(&self) -> bool {
        self.panels.iter().any(|p| p.has_leds && p.updated)
    }

    /// Check the closed-graph invariants
    ///
    /// Every edge and corner slot is wired, every edge link leads back to
    /// its origin, and every corner ring closes after [`CORNER_DEGREE`]
    /// steps.
    pub fn validate(&self) -> Result<(), TopologyError> {
        for (id, panel) in self.panels.iter().enumerate() {
            for edge in 0..NUM_EDGES {
                let link = self.link(id, edge)?;
                let back = self.link(link.panel as usize, link.edge as usize)?;
                if back.panel as usize != id || back.edge as usize != edge {
                    return Err(TopologyError::Asymmetric {
                        panel: id as u8,
                        edge: edge as u8,
                    });
                }
            }
            for vertex in 0..NUM_VERTICES {
                for slot in 0..VERTEX_ORDER {
                    if panel.vertex(vertex, slot)?.is_none() {
                        return Err(TopologyError::Unwired {
                            panel: id as u8,
                            slot: vertex as u8,
                        });
                    }
                }
                let ring = self.corner_ring(id, vertex)?;
                let (last, corner) = ring[CORNER_DEGREE - 1];
                let closing = self.panel(last)?.vertex(corner, 0)?;
                if closing != Some(VertexLink::new(id as u8, vertex as u8)) {
                    return Err(TopologyError::Asymmetric {
                        panel: id as u8,
                        edge: vertex as u8,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::RED;

    fn cube() -> Topology {
        Topology::build(NUM_FACES, CELL_COUNT, 0, ALL_FACES).unwrap()
    }

    #[test]
    fn test_build_refuses_other_panel_counts() {
        for n in [0, 1, 4, 5, 7, 12, 20] {
            assert_eq!(
                Topology::build(n, CELL_COUNT, 0, ALL_FACES),
                Err(TopologyError::FaceCount {
                    expected: 6,
                    provided: n
                })
            );
        }
    }

    #[test]
    fn test_build_refuses_wrong_led_count() {
        assert_eq!(
            Topology::build(NUM_FACES, 8, 0, ALL_FACES),
            Err(TopologyError::LedCount {
                expected: 9,
                provided: 8
            })
        );
    }

    #[test]
    fn test_every_slot_is_wired() {
        let cube = cube();
        for panel in cube.panels() {
            for e in 0..NUM_EDGES {
                assert!(panel.edge(e).unwrap().is_some());
            }
            for v in 0..NUM_VERTICES {
                assert!(panel.vertex(v, 0).unwrap().is_some());
            }
        }
    }

    #[test]
    fn test_edge_round_trip() {
        let cube = cube();
        for a in 0..NUM_FACES {
            for e in 0..NUM_EDGES {
                let b = cube.neighbor(a, e).unwrap();
                let back = (0..NUM_EDGES).any(|e2| cube.neighbor(b, e2).unwrap() == a);
                assert!(back, "panel {a} edge {e} does not link back");
                let link = cube.link(a, e).unwrap();
                assert_eq!(cube.neighbor(b, link.edge as usize).unwrap(), a);
            }
        }
    }

    #[test]
    fn test_neighbors_are_distinct_and_exclude_opposite_face() {
        let cube = cube();
        let opposite = [5, 3, 4, 1, 2, 0];
        for a in 0..NUM_FACES {
            let mut seen = [false; NUM_FACES];
            for e in 0..NUM_EDGES {
                let b = cube.neighbor(a, e).unwrap();
                assert_ne!(b, a);
                assert_ne!(b, opposite[a]);
                assert!(!seen[b]);
                seen[b] = true;
            }
        }
    }

    #[test]
    fn test_net_centre_face_has_upright_neighbors() {
        let cube = cube();
        assert_eq!(cube.neighbor(0, 0).unwrap(), 1);
        assert_eq!(cube.neighbor(0, 1).unwrap(), 2);
        assert_eq!(cube.neighbor(0, 2).unwrap(), 3);
        assert_eq!(cube.neighbor(0, 3).unwrap(), 4);
        for e in 0..NUM_EDGES {
            assert_eq!(cube.link(0, e).unwrap().rotation(e), 0);
        }
    }

    #[test]
    fn test_walking_straight_circles_the_cube() {
        let cube = cube();
        for start in 0..NUM_FACES {
            for heading in 0..NUM_EDGES {
                let (mut panel, mut edge) = (start, heading);
                let mut visited = [false; NUM_FACES];
                for _ in 0..4 {
                    visited[panel] = true;
                    (panel, edge) = cube.cross_edge(panel, edge).unwrap();
                }
                assert_eq!((panel, edge), (start, heading));
                assert_eq!(visited.iter().filter(|v| **v).count(), 4);
            }
        }
    }

    #[test]
    fn test_corner_ring_has_three_distinct_panels() {
        let cube = cube();
        for id in 0..NUM_FACES {
            for v in 0..NUM_VERTICES {
                let ring = cube.corner_ring(id, v).unwrap();
                assert_eq!(ring[0], (id, v));
                assert_ne!(ring[0].0, ring[1].0);
                assert_ne!(ring[1].0, ring[2].0);
                assert_ne!(ring[0].0, ring[2].0);
            }
        }
    }

    #[test]
    fn test_corner_ring_matches_net_geometry() {
        let cube = cube();
        // Top-right corner of the centre face is shared with the top and right faces
        assert_eq!(cube.corner_ring(0, 0).unwrap(), [(0, 0), (1, 1), (2, 3)]);
    }

    #[test]
    fn test_corner_rings_are_consistent_across_faces() {
        let cube = cube();
        for id in 0..NUM_FACES {
            for v in 0..NUM_VERTICES {
                let ring = cube.corner_ring(id, v).unwrap();
                let (next, corner) = ring[1];
                let rotated = cube.corner_ring(next, corner).unwrap();
                assert_eq!(rotated, [ring[1], ring[2], ring[0]]);
            }
        }
    }

    #[test]
    fn test_pixel_offsets_and_led_mask() {
        let cube = Topology::build(NUM_FACES, CELL_COUNT, 4, 0b01_1110).unwrap();
        let offsets: [u16; NUM_FACES] = core::array::from_fn(|id| cube.panels()[id].pixel_offset());
        assert_eq!(offsets, [4, 4, 13, 22, 31, 40]);
        for (face, panel) in cube.panels().iter().enumerate() {
            assert_eq!(panel.has_leds, face != 0 && face != 5);
        }
        assert_eq!(cube.first_led(), 4);
    }

    #[test]
    fn test_pixel_offsets_with_every_face_lit() {
        let cube = Topology::build(NUM_FACES, CELL_COUNT, 1, ALL_FACES).unwrap();
        for (face, panel) in cube.panels().iter().enumerate() {
            assert_eq!(panel.pixel_offset(), 1 + (face * CELL_COUNT) as u16);
        }
    }

    #[test]
    fn test_reset_marks() {
        let mut cube = cube();
        cube.panel_mut(3).unwrap().mark = 9;
        cube.reset_marks(0);
        assert!(cube.panels().iter().all(|p| p.mark == 0));
    }

    #[test]
    fn test_panel_lookup_out_of_range() {
        let cube = cube();
        assert_eq!(
            cube.panel(6).err(),
            Some(TopologyError::PanelOutOfRange { id: 6 })
        );
        assert_eq!(
            cube.neighbor(0, 4),
            Err(TopologyError::EdgeOutOfRange { index: 4 })
        );
    }

    #[test]
    fn test_validate_detects_asymmetric_edge() {
        let mut cube = cube();
        cube.panel_mut(0)
            .unwrap()
            .set_edge(0, EdgeLink::new(2, 3))
            .unwrap();
        assert!(matches!(
            cube.validate(),
            Err(TopologyError::Asymmetric { panel: 0, edge: 0 })
        ));
    }

    #[test]
    fn test_set_all_marks_updated() {
        let mut cube = cube();
        assert!(!cube.any_updated());
        cube.set_all(RED);
        assert!(cube.any_updated());
        assert!(cube.panels().iter().all(|p| p.color() == RED));
    }
}
