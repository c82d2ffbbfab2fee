//! Mode selection with one-level undo
//!
//! The [`ModeEngine`] tracks two independent selections: the primary mode,
//! which always names a renderer, and an optional followup overlay drawn
//! after it. Each selection is a position in a curated list of
//! [`ModeId`]s; resolving a position through its list yields the render
//! table entry to run.
//!
//! Selecting a different position remembers the old one so a single
//! [`restore`](ModeEngine::restore_mode) can bring it back. There is no
//! deeper history.
//!
//! ## Example
//!
//! ```
//! use cube_lights::{ModeEngine, ModeId};
//!
//! static VALID: [ModeId; 3] = [ModeId::SetupPattern, ModeId::CyclePattern, ModeId::StaticNoise];
//! let mut engine = match ModeEngine::new(&VALID, &[], 0) {
//!     Ok(engine) => engine,
//!     Err(_) => return,
//! };
//!
//! engine.increment_mode();
//! engine.increment_mode();
//! assert_eq!(engine.current_mode(), ModeId::StaticNoise);
//!
//! engine.restore_mode();
//! assert_eq!(engine.current_mode(), ModeId::CyclePattern);
//! ```

use crate::config::Config;
use crate::error::BuilderError;

/// Number of entries in the render table
pub const NUM_MODES: usize = 11;

/// Render table ids
///
/// The discriminant is the table index accepted by
/// [`from_raw`](Self::from_raw).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModeId {
    /// Every cell on
    AllOn = 0,
    /// One color per face
    TestPattern = 1,
    /// Light one face and its edge neighbors in turn
    SetupPattern = 2,
    /// Spread a color to a random neighbor
    RandomNeighbor = 3,
    /// Walk a lit face straight around the cube
    CyclePattern = 4,
    /// Rotate color around a cube corner
    CirclePattern = 5,
    /// Fade every panel through the face colors
    FadeCycle = 6,
    /// Light the faces whose touch channel is held
    CapResponse = 7,
    /// Random dim noise on every cell
    StaticNoise = 8,
    /// Switch one random panel at a time
    SwitchRandom = 9,
    /// Light the center cell of every face, brighter in the dark
    LightCenter = 10,
}

impl ModeId {
    /// All ids in table order
    pub const ALL: [Self; NUM_MODES] = [
        Self::AllOn,
        Self::TestPattern,
        Self::SetupPattern,
        Self::RandomNeighbor,
        Self::CyclePattern,
        Self::CirclePattern,
        Self::FadeCycle,
        Self::CapResponse,
        Self::StaticNoise,
        Self::SwitchRandom,
        Self::LightCenter,
    ];

    /// Look up a table id
    pub fn from_raw(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Table id
    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// Update period in milliseconds
    ///
    /// The scheduler runs the renderer once per period; faster effects use
    /// shorter periods.
    pub const fn period_ms(self) -> u16 {
        match self {
            Self::AllOn => 1,
            Self::TestPattern => 1000,
            Self::SetupPattern => 1000,
            Self::RandomNeighbor => 500,
            Self::CyclePattern => 500,
            Self::CirclePattern => 500,
            Self::FadeCycle => 1,
            Self::CapResponse => 500,
            Self::StaticNoise => 250,
            Self::SwitchRandom => 100,
            Self::LightCenter => 1,
        }
    }

    /// Short name for logs
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllOn => "all_on",
            Self::TestPattern => "test_pattern",
            Self::SetupPattern => "setup_pattern",
            Self::RandomNeighbor => "random_neighbor",
            Self::CyclePattern => "cycle_pattern",
            Self::CirclePattern => "circle_pattern",
            Self::FadeCycle => "fade_cycle",
            Self::CapResponse => "cap_response",
            Self::StaticNoise => "static_noise",
            Self::SwitchRandom => "switch_random",
            Self::LightCenter => "light_center",
        }
    }
}

/// A mode transition requested by a trigger
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Advance the primary mode
    NextMode,
    /// Return to the previous primary mode
    RestoreMode,
    /// Advance the followup
    NextFollowup,
    /// Return to the previous followup
    RestoreFollowup,
    /// Deselect the followup
    ClearFollowup,
}

/// One selection track with a single restore point
///
/// `None` as the current value means nothing is selected, which only the
/// followup track uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    current: Option<u8>,
    previous: Option<u8>,
    restorable: bool,
}

impl Selection {
    const fn new(current: Option<u8>) -> Self {
        Self {
            current,
            previous: None,
            restorable: false,
        }
    }

    /// Currently selected position
    pub const fn current(&self) -> Option<u8> {
        self.current
    }

    /// Position a restore would return to
    pub const fn previous(&self) -> Option<u8> {
        self.previous
    }

    /// Whether a restore point is available
    pub const fn is_restorable(&self) -> bool {
        self.restorable
    }

    /// Select a position, keeping the old one as restore point
    ///
    /// Re-selecting the current position changes nothing, so the restore
    /// point survives repeated selection.
    fn select(&mut self, next: Option<u8>) -> bool {
        if self.current == next {
            return false;
        }
        self.previous = self.current;
        self.current = next;
        self.restorable = true;
        true
    }

    /// Swap back to the restore point once
    fn restore(&mut self) -> bool {
        if !self.restorable {
            return false;
        }
        self.restorable = false;
        core::mem::swap(&mut self.current, &mut self.previous);
        true
    }
}

/// Primary mode and followup selection
#[derive(Clone, Debug, PartialEq)]
pub struct ModeEngine {
    valid_modes: &'static [ModeId],
    valid_followups: &'static [ModeId],
    mode: Selection,
    followup: Selection,
}

impl ModeEngine {
    /// Create an engine starting at position `start` of `valid_modes`
    ///
    /// The followup track starts with nothing selected.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::EmptyValidModes`] if `valid_modes` is empty
    /// and [`BuilderError::StartOutOfRange`] if `start` is past its end.
    pub fn new(
        valid_modes: &'static [ModeId],
        valid_followups: &'static [ModeId],
        start: u8,
    ) -> Result<Self, BuilderError> {
        if valid_modes.is_empty() {
            return Err(BuilderError::EmptyValidModes);
        }
        if start as usize >= valid_modes.len() {
            return Err(BuilderError::StartOutOfRange {
                start,
                len: valid_modes.len(),
            });
        }
        Ok(Self {
            valid_modes,
            valid_followups,
            mode: Selection::new(Some(start)),
            followup: Selection::new(None),
        })
    }

    /// Create the engine described by a configuration
    pub fn from_config(config: &Config) -> Result<Self, BuilderError> {
        Self::new(config.valid_modes, config.valid_followups, config.start_mode)
    }

    /// Modes enabled for cycling
    pub const fn valid_modes(&self) -> &'static [ModeId] {
        self.valid_modes
    }

    /// Followups enabled for cycling
    pub const fn valid_followups(&self) -> &'static [ModeId] {
        self.valid_followups
    }

    /// Primary selection track
    pub const fn mode_track(&self) -> &Selection {
        &self.mode
    }

    /// Followup selection track
    pub const fn followup_track(&self) -> &Selection {
        &self.followup
    }

    /// Current position in the valid mode list
    pub fn mode_selection(&self) -> u8 {
        self.mode.current.unwrap_or(0)
    }

    /// Whether [`restore_mode`](Self::restore_mode) would do anything
    pub const fn is_restorable(&self) -> bool {
        self.mode.restorable
    }

    /// Render-table id of the current mode
    pub fn current_mode(&self) -> ModeId {
        let index = self.mode_selection() as usize % self.valid_modes.len();
        self.valid_modes[index]
    }

    /// Period of the current mode in milliseconds
    pub fn current_period_ms(&self) -> u16 {
        self.current_mode().period_ms()
    }

    /// Select a position in the valid mode list
    ///
    /// Positions past the end wrap around the list before the comparison,
    /// so any position that wraps onto the current one is a no-op and
    /// keeps the restore point.
    pub fn set_mode(&mut self, position: u8) {
        let position = wrap(position as usize, self.valid_modes.len());
        if self.mode.select(Some(position)) {
            log::debug!("set mode={} ({})", position, self.current_mode().as_str());
        }
    }

    /// Advance to the next valid mode, wrapping at the end
    pub fn increment_mode(&mut self) {
        let next = wrap(self.mode_selection() as usize + 1, self.valid_modes.len());
        self.set_mode(next);
    }

    /// Return to the mode active before the last change
    ///
    /// Only one level is kept; a second restore without an intervening
    /// change is a no-op.
    pub fn restore_mode(&mut self) {
        if self.mode.restore() {
            log::debug!(
                "restore mode={} ({})",
                self.mode_selection(),
                self.current_mode().as_str()
            );
        }
    }

    /// Current position in the valid followup list, if any
    pub const fn followup_selection(&self) -> Option<u8> {
        self.followup.current
    }

    /// Whether [`restore_followup`](Self::restore_followup) would do anything
    pub const fn is_followup_restorable(&self) -> bool {
        self.followup.restorable
    }

    /// Render-table id of the current followup, if one is active
    pub fn current_followup(&self) -> Option<ModeId> {
        let position = self.followup.current? as usize;
        self.valid_followups
            .get(position % self.valid_followups.len().max(1))
            .copied()
    }

    /// Select a position in the valid followup list
    ///
    /// Positions past the end wrap around the list before the comparison
    /// with the current one, as in [`ModeEngine::set_mode`]. Ignored when no
    /// followups are enabled.
    pub fn set_followup(&mut self, position: u8) {
        if self.valid_followups.is_empty() {
            return;
        }
        let position = wrap(position as usize, self.valid_followups.len());
        if self.followup.select(Some(position)) {
            log::debug!("set followup={}", position);
        }
    }

    /// Advance to the next valid followup
    ///
    /// From no selection this lands on the first followup.
    pub fn increment_followup(&mut self) {
        let next = self.followup.current.map_or(0, |current| current as usize + 1);
        self.set_followup(wrap(next, self.valid_followups.len().max(1)));
    }

    /// Deselect the followup, keeping it as restore point
    pub fn clear_followup(&mut self) {
        if self.followup.select(None) {
            log::debug!("clear followup");
        }
    }

    /// Return to the followup active before the last change
    pub fn restore_followup(&mut self) {
        if self.followup.restore() {
            log::debug!("restore followup={:?}", self.followup.current);
        }
    }

    /// Perform a trigger action
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::NextMode => self.increment_mode(),
            Action::RestoreMode => self.restore_mode(),
            Action::NextFollowup => self.increment_followup(),
            Action::RestoreFollowup => self.restore_followup(),
            Action::ClearFollowup => self.clear_followup(),
        }
    }
}

/// Reduce a list position modulo `len`; callers compare the wrapped value
fn wrap(position: usize, len: usize) -> u8 {
    (position % len) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    static SPARSE: [ModeId; 3] = [ModeId::AllOn, ModeId::RandomNeighbor, ModeId::CyclePattern];
    static SCENARIO: [ModeId; 3] = [
        ModeId::SetupPattern,
        ModeId::CyclePattern,
        ModeId::StaticNoise,
    ];
    static FOLLOWUPS: [ModeId; 2] = [ModeId::LightCenter, ModeId::CapResponse];

    fn engine(valid: &'static [ModeId]) -> ModeEngine {
        ModeEngine::new(valid, &FOLLOWUPS, 0).unwrap()
    }

    #[test]
    fn test_mode_id_raw_round_trip() {
        for (raw, id) in ModeId::ALL.iter().enumerate() {
            assert_eq!(id.as_raw() as usize, raw);
            assert_eq!(ModeId::from_raw(raw as u8), Some(*id));
        }
        assert_eq!(ModeId::from_raw(NUM_MODES as u8), None);
    }

    #[test]
    fn test_periods_match_table() {
        assert_eq!(ModeId::AllOn.period_ms(), 1);
        assert_eq!(ModeId::StaticNoise.period_ms(), 250);
        assert_eq!(ModeId::SwitchRandom.period_ms(), 100);
        assert_eq!(ModeId::TestPattern.period_ms(), 1000);
    }

    #[test]
    fn test_new_rejects_empty_and_out_of_range_start() {
        assert_eq!(
            ModeEngine::new(&[], &[], 0),
            Err(BuilderError::EmptyValidModes)
        );
        assert_eq!(
            ModeEngine::new(&SPARSE, &[], 3),
            Err(BuilderError::StartOutOfRange { start: 3, len: 3 })
        );
    }

    #[test]
    fn test_current_mode_resolves_through_valid_list() {
        let mut engine = engine(&SPARSE);
        engine.set_mode(1);
        assert_eq!(engine.mode_selection(), 1);
        assert_eq!(engine.current_mode().as_raw(), 3);
        assert_eq!(engine.current_period_ms(), 500);
    }

    #[test]
    fn test_set_mode_wraps_out_of_range_position() {
        let mut engine = engine(&SPARSE);
        engine.set_mode(7);
        assert_eq!(engine.mode_selection(), 1);
        assert_eq!(engine.current_mode(), ModeId::RandomNeighbor);
    }

    #[test]
    fn test_set_mode_wrapping_onto_current_is_noop() {
        let mut engine = engine(&SPARSE);
        engine.set_mode(0);
        assert!(!engine.is_restorable());
        engine.set_mode(SPARSE.len() as u8);
        assert_eq!(engine.mode_selection(), 0);
        assert!(!engine.is_restorable());
    }

    #[test]
    fn test_repeat_set_mode_keeps_restorable() {
        let mut engine = engine(&SPARSE);
        assert!(!engine.is_restorable());
        engine.set_mode(0);
        engine.set_mode(0);
        assert!(!engine.is_restorable());

        engine.set_mode(2);
        engine.restore_mode();
        assert!(!engine.is_restorable());
        engine.set_mode(0);
        assert!(!engine.is_restorable());
    }

    #[test]
    fn test_repeat_set_mode_does_not_overwrite_restore_point() {
        let mut engine = engine(&SPARSE);
        engine.set_mode(1);
        engine.set_mode(2);
        engine.set_mode(2);
        assert!(engine.is_restorable());
        engine.restore_mode();
        assert_eq!(engine.mode_selection(), 1);
    }

    #[test]
    fn test_restore_is_single_level() {
        let mut engine = engine(&SPARSE);
        engine.set_mode(1);
        engine.set_mode(2);
        engine.restore_mode();
        assert_eq!(engine.mode_selection(), 1);
        engine.restore_mode();
        assert_eq!(engine.mode_selection(), 1);
        assert!(!engine.is_restorable());
    }

    #[test]
    fn test_restore_without_history_is_noop() {
        let mut engine = engine(&SPARSE);
        engine.restore_mode();
        assert_eq!(engine.mode_selection(), 0);
    }

    #[test]
    fn test_increment_wraps_after_valid_count() {
        let mut engine = ModeEngine::new(&SPARSE, &[], 2).unwrap();
        for _ in 0..SPARSE.len() {
            engine.increment_mode();
        }
        assert_eq!(engine.mode_selection(), 2);
        assert_eq!(engine.current_mode(), ModeId::CyclePattern);
    }

    #[test]
    fn test_increment_then_restore_scenario() {
        let mut engine = engine(&SCENARIO);
        assert_eq!(engine.current_mode().as_raw(), 2);

        engine.increment_mode();
        engine.increment_mode();
        assert_eq!(engine.mode_selection(), 2);
        assert_eq!(engine.current_mode().as_raw(), 8);

        engine.restore_mode();
        assert_eq!(engine.mode_selection(), 1);
        assert_eq!(engine.current_mode().as_raw(), 4);
    }

    #[test]
    fn test_single_mode_list_increment_is_noop() {
        static ONE: [ModeId; 1] = [ModeId::AllOn];
        let mut engine = ModeEngine::new(&ONE, &[], 0).unwrap();
        engine.increment_mode();
        assert_eq!(engine.current_mode(), ModeId::AllOn);
        assert!(!engine.is_restorable());
    }

    #[test]
    fn test_followup_starts_unselected() {
        let engine = engine(&SPARSE);
        assert_eq!(engine.followup_selection(), None);
        assert_eq!(engine.current_followup(), None);
        assert!(!engine.is_followup_restorable());
    }

    #[test]
    fn test_increment_followup_from_none_lands_on_first() {
        let mut engine = engine(&SPARSE);
        engine.increment_followup();
        assert_eq!(engine.followup_selection(), Some(0));
        assert_eq!(engine.current_followup(), Some(ModeId::LightCenter));

        engine.increment_followup();
        assert_eq!(engine.current_followup(), Some(ModeId::CapResponse));
        engine.increment_followup();
        assert_eq!(engine.current_followup(), Some(ModeId::LightCenter));
    }

    #[test]
    fn test_restore_followup_returns_to_none() {
        let mut engine = engine(&SPARSE);
        engine.increment_followup();
        assert!(engine.is_followup_restorable());
        engine.restore_followup();
        assert_eq!(engine.current_followup(), None);
        engine.restore_followup();
        assert_eq!(engine.current_followup(), None);
    }

    #[test]
    fn test_clear_followup_is_restorable() {
        let mut engine = engine(&SPARSE);
        engine.set_followup(1);
        engine.clear_followup();
        assert_eq!(engine.current_followup(), None);
        engine.restore_followup();
        assert_eq!(engine.current_followup(), Some(ModeId::CapResponse));
    }

    #[test]
    fn test_followup_track_is_independent() {
        let mut engine = engine(&SPARSE);
        engine.set_mode(2);
        engine.increment_followup();
        engine.restore_followup();
        assert_eq!(engine.mode_selection(), 2);
        assert!(engine.is_restorable());
        engine.restore_mode();
        assert_eq!(engine.mode_selection(), 0);
        assert_eq!(engine.current_followup(), None);
    }

    #[test]
    fn test_apply_dispatches_actions() {
        let mut engine = engine(&SPARSE);
        engine.apply(Action::NextMode);
        assert_eq!(engine.mode_selection(), 1);
        engine.apply(Action::RestoreMode);
        assert_eq!(engine.mode_selection(), 0);
        engine.apply(Action::NextFollowup);
        assert_eq!(engine.current_followup(), Some(ModeId::LightCenter));
        engine.apply(Action::ClearFollowup);
        assert_eq!(engine.current_followup(), None);
        engine.apply(Action::RestoreFollowup);
        assert_eq!(engine.current_followup(), Some(ModeId::LightCenter));
    }

    #[test]
    fn test_followups_disabled_when_list_empty() {
        let mut engine = ModeEngine::new(&SPARSE, &[], 0).unwrap();
        engine.increment_followup();
        engine.set_followup(0);
        assert_eq!(engine.current_followup(), None);
        assert!(!engine.is_followup_restorable());
    }
}
