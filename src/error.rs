//! Error types for the crate
//!
//! This module defines error types for topology construction and access
//! ([`TopologyError`]), configuration building ([`BuilderError`]) and
//! runtime operations against a pixel chain ([`Error`]).
//!
//! ## Error Types
//!
//! - [`TopologyError`] - Graph construction refused, or an index outside a fixed-size array
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors while driving the cube
//! - [`SensorError`](crate::sensor::SensorError) - Low-level sensor communication errors
//!
//! ## Example
//!
//! ```
//! use cube_lights::{Builder, BuilderError, Topology, TopologyError};
//!
//! // A cube has exactly six faces
//! let result = Topology::build(5, 9, 0, 0b11_1111);
//! assert!(matches!(result, Err(TopologyError::FaceCount { expected: 6, provided: 5 })));
//!
//! // The valid mode list may not be empty
//! let result = Builder::new().valid_modes(&[]).build();
//! assert!(matches!(result, Err(BuilderError::EmptyValidModes)));
//! ```

/// Errors raised by the panel graph
///
/// Every index into a fixed-size array is checked; out-of-range access is
/// reported here instead of reading or writing past the array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyError {
    /// Requested panel count does not match the fixed topology size
    FaceCount {
        /// Number of faces the topology requires
        expected: usize,
        /// Number of faces requested
        provided: usize,
    },
    /// LEDs per face does not match the panel cell grid
    LedCount {
        /// Cells per panel
        expected: usize,
        /// LEDs per face requested
        provided: usize,
    },
    /// Cell index outside the panel grid
    CellOutOfRange {
        /// Requested cell index
        index: usize,
    },
    /// Edge index outside `0..NUM_EDGES`
    EdgeOutOfRange {
        /// Requested edge index
        index: usize,
    },
    /// Vertex or vertex-list index outside the corner slots
    VertexOutOfRange {
        /// Requested vertex index
        vertex: usize,
        /// Requested position in the corner-neighbor list
        slot: usize,
    },
    /// Panel id not present in the topology
    PanelOutOfRange {
        /// Requested panel id
        id: usize,
    },
    /// An edge slot has no neighbor
    Unwired {
        /// Panel holding the empty slot
        panel: u8,
        /// Edge or vertex index of the empty slot
        slot: u8,
    },
    /// An edge link does not lead back to its origin
    Asymmetric {
        /// Origin panel
        panel: u8,
        /// Origin edge
        edge: u8,
    },
}

impl core::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::FaceCount { expected, provided } => {
                write!(f, "Face count mismatch: expected {expected}, provided {provided}")
            }
            Self::LedCount { expected, provided } => {
                write!(f, "LEDs per face mismatch: expected {expected}, provided {provided}")
            }
            Self::CellOutOfRange { index } => write!(f, "Cell index {index} out of range"),
            Self::EdgeOutOfRange { index } => write!(f, "Edge index {index} out of range"),
            Self::VertexOutOfRange { vertex, slot } => {
                write!(f, "Vertex index {vertex}/{slot} out of range")
            }
            Self::PanelOutOfRange { id } => write!(f, "Panel id {id} out of range"),
            Self::Unwired { panel, slot } => {
                write!(f, "Panel {panel} has no neighbor in slot {slot}")
            }
            Self::Asymmetric { panel, edge } => {
                write!(f, "Edge {edge} of panel {panel} does not link back")
            }
        }
    }
}

impl core::error::Error for TopologyError {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the cube is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderError {
    /// The valid mode list was empty
    ///
    /// The primary track always needs at least one mode to resolve to.
    EmptyValidModes,
    /// Starting selection index is past the end of the valid mode list
    StartOutOfRange {
        /// Requested starting index
        start: u8,
        /// Length of the valid mode list
        len: usize,
    },
    /// LEDs per face does not match the panel cell grid
    InvalidLedsPerFace {
        /// Requested LEDs per face
        provided: usize,
    },
    /// LED face mask has bits set for faces that do not exist
    InvalidLedMask {
        /// Requested mask
        mask: u8,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyValidModes => write!(f, "Valid mode list must not be empty"),
            Self::StartOutOfRange { start, len } => {
                write!(f, "Start index {start} out of range for {len} valid modes")
            }
            Self::InvalidLedsPerFace { provided } => {
                write!(f, "Invalid LEDs per face: {provided}")
            }
            Self::InvalidLedMask { mask } => write!(f, "Invalid LED face mask: {mask:#010b}"),
        }
    }
}

impl core::error::Error for BuilderError {}

/// Errors that can occur while driving the pixel chain
///
/// Generic over the writer's error type to preserve the specific error.
/// This allows error handling code to match on the underlying hardware error.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// Pixel chain write failed
    ///
    /// Wraps the error of the [`SmartLedsWrite`](smart_leds::SmartLedsWrite) implementation.
    Output(E),
    /// Topology access failed
    Topology(TopologyError),
    /// Configuration rejected
    Config(BuilderError),
}

impl<E> From<TopologyError> for Error<E> {
    fn from(err: TopologyError) -> Self {
        Self::Topology(err)
    }
}

impl<E> From<BuilderError> for Error<E> {
    fn from(err: BuilderError) -> Self {
        Self::Config(err)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Output(e) => write!(f, "Output error: {e:?}"),
            Self::Topology(e) => write!(f, "Topology error: {e}"),
            Self::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for Error<E> {}
