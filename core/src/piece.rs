use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Color category of a piece; the discriminant is its identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceKind {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    White,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Purple,
        Self::White,
    ];

    pub const fn discriminant(self) -> u8 {
        self as u8
    }

    pub const fn color(self) -> Color {
        use PieceKind::*;
        match self {
            Red => Color::RED,
            Orange => Color::ORANGE,
            Yellow => Color::YELLOW,
            Green => Color::GREEN,
            Blue => Color::BLUE,
            Purple => Color::PURPLE,
            White => Color::WHITE,
        }
    }

    pub const fn short_name(self) -> &'static str {
        use PieceKind::*;
        match self {
            Red => "RED",
            Orange => "ORA",
            Yellow => "YEL",
            Green => "GRE",
            Blue => "BLU",
            Purple => "PUR",
            White => "WHI",
        }
    }
}

impl Default for PieceKind {
    fn default() -> Self {
        Self::White
    }
}

impl TryFrom<u8> for PieceKind {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(GameError::UnknownPieceKind(value))
    }
}

impl Color {
    /// Display color for a raw discriminant, white when it maps to no kind.
    pub fn for_discriminant(value: u8) -> Self {
        PieceKind::try_from(value)
            .map(PieceKind::color)
            .unwrap_or(Color::WHITE)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceState {
    Sitting,
    Grabbed,
    Moving,
    Popped,
}

impl PieceState {
    pub const ALL: [PieceState; 4] = [Self::Sitting, Self::Grabbed, Self::Moving, Self::Popped];

    /// Hit-testing flag applied on entry, `None` leaves it untouched.
    pub const fn hit_testing_on_entry(self) -> Option<bool> {
        use PieceState::*;
        match self {
            Sitting => Some(true),
            Grabbed => Some(false),
            Moving => Some(false),
            Popped => None,
        }
    }

    pub const fn is_moving(self) -> bool {
        matches!(self, Self::Moving)
    }
}

impl Default for PieceState {
    fn default() -> Self {
        Self::Sitting
    }
}

/// Rendering and collision handle owned by a piece.
pub trait PieceView {
    fn set_color(&mut self, color: Color);
    fn set_hit_testing(&mut self, enabled: bool);
}

impl<V: PieceView + ?Sized> PieceView for &mut V {
    fn set_color(&mut self, color: Color) {
        (**self).set_color(color)
    }

    fn set_hit_testing(&mut self, enabled: bool) {
        (**self).set_hit_testing(enabled)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceConfig {
    /// Distance units per second.
    pub move_speed: f32,
}

impl PieceConfig {
    pub const DEFAULT_MOVE_SPEED: f32 = 5.0;
}

impl Default for PieceConfig {
    fn default() -> Self {
        Self {
            move_speed: Self::DEFAULT_MOVE_SPEED,
        }
    }
}

/// In-flight motion; exists exactly while the piece is [`PieceState::Moving`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub target: Vec2,
    pub started_at: Seconds,
    pub journey_length: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MoveOutcome {
    Started,
    /// Already moving; the in-flight motion keeps its target and timing.
    Ignored,
}

impl MoveOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Started => true,
            Self::Ignored => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MotionOutcome {
    Idle,
    Advanced,
    Arrived,
}

impl MotionOutcome {
    pub const fn has_update(self) -> bool {
        use MotionOutcome::*;
        match self {
            Idle => false,
            Advanced => true,
            Arrived => true,
        }
    }
}

#[derive(Debug)]
pub struct Piece<V> {
    kind: PieceKind,
    hardened: bool,
    config: PieceConfig,
    state: PieceState,
    position: Vec2,
    motion: Option<Motion>,
    view: V,
}

impl<V: PieceView> Piece<V> {
    pub fn new(kind: PieceKind, hardened: bool, position: Vec2, view: V) -> Self {
        Self::with_config(kind, hardened, position, PieceConfig::default(), view)
    }

    /// Spawns a sitting piece, painting `view` with the kind's color and
    /// applying the sitting hit-testing flag.
    pub fn with_config(
        kind: PieceKind,
        hardened: bool,
        position: Vec2,
        config: PieceConfig,
        mut view: V,
    ) -> Self {
        view.set_color(kind.color());
        let mut piece = Self {
            kind,
            hardened,
            config,
            state: PieceState::Sitting,
            position,
            motion: None,
            view,
        };
        piece.enter(PieceState::Sitting);
        piece
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    pub fn config(&self) -> PieceConfig {
        self.config
    }

    pub fn state(&self) -> PieceState {
        self.state
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn motion(&self) -> Option<Motion> {
        self.motion
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Moves the piece without animating, e.g. while it is being dragged.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Unconditional transition that always re-runs the entry effect.
    ///
    /// Entering `Moving` this way has no destination, so the piece sits down
    /// where it is on the next tick, even if it was repositioned meanwhile.
    pub fn set_state(&mut self, state: PieceState) {
        if self.state == PieceState::Popped && state != PieceState::Popped {
            log::debug!("{} leaving popped state for {:?}", self, state);
        }
        self.motion = match state {
            PieceState::Moving => Some(Motion {
                target: self.position,
                started_at: 0.0,
                journey_length: 0.0,
            }),
            _ => None,
        };
        self.enter(state);
    }

    pub fn move_to(&mut self, target: Vec2, now: Seconds) -> MoveOutcome {
        if self.state.is_moving() {
            log::trace!("{} already moving, ignoring move to {}", self, target);
            return MoveOutcome::Ignored;
        }

        let journey_length = self.position.distance(target);
        self.motion = Some(Motion {
            target,
            started_at: now,
            journey_length,
        });
        self.enter(PieceState::Moving);
        log::trace!(
            "{} moving {} -> {} ({} units)",
            self,
            self.position,
            target,
            journey_length
        );
        MoveOutcome::Started
    }

    /// Advances the in-flight motion to frame time `now`.
    ///
    /// Each tick interpolates from the current position rather than from
    /// where the motion started, so the piece eases out towards the target
    /// instead of travelling at constant speed.
    pub fn tick(&mut self, now: Seconds) -> MotionOutcome {
        if !self.state.is_moving() {
            return MotionOutcome::Idle;
        }
        let Some(motion) = self.motion else {
            log::warn!("{} moving without a destination, sitting down", self);
            self.set_state(PieceState::Sitting);
            return MotionOutcome::Arrived;
        };

        if self.position == motion.target {
            self.set_state(PieceState::Sitting);
            return MotionOutcome::Arrived;
        }

        if !(motion.journey_length > 0.0 && motion.journey_length.is_finite()) {
            log::debug!("{} has a degenerate journey, sitting in place", self);
            self.set_state(PieceState::Sitting);
            return MotionOutcome::Arrived;
        }

        let distance_covered = (now - motion.started_at) * self.config.move_speed;
        let fraction = distance_covered / motion.journey_length;
        if fraction.is_nan() {
            log::warn!("{} got NaN journey fraction at t={}, snapping to target", self, now);
            self.position = motion.target;
            self.set_state(PieceState::Sitting);
            return MotionOutcome::Arrived;
        }
        self.position = self.position.lerp(motion.target, fraction);
        MotionOutcome::Advanced
    }

    fn enter(&mut self, state: PieceState) {
        self.state = state;
        if let Some(enabled) = state.hit_testing_on_entry() {
            self.view.set_hit_testing(enabled);
        }
    }
}

impl<V> fmt::Display for Piece<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece [{}]", self.kind.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingView {
        colors: Vec<Color>,
        hit_testing: Option<bool>,
        hit_testing_writes: usize,
    }

    impl PieceView for RecordingView {
        fn set_color(&mut self, color: Color) {
            self.colors.push(color);
        }

        fn set_hit_testing(&mut self, enabled: bool) {
            self.hit_testing = Some(enabled);
            self.hit_testing_writes += 1;
        }
    }

    fn piece_at(x: f32, y: f32) -> Piece<RecordingView> {
        Piece::new(
            PieceKind::Red,
            false,
            Vec2::new(x, y),
            RecordingView::default(),
        )
    }

    #[test]
    fn spawns_sitting_with_hit_testing() {
        let piece = piece_at(1.0, 2.0);

        assert_eq!(piece.state(), PieceState::Sitting);
        assert_eq!(piece.position(), Vec2::new(1.0, 2.0));
        assert_eq!(piece.motion(), None);
        assert_eq!(piece.view().hit_testing, Some(true));
    }

    #[test]
    fn set_state_always_lands_and_reapplies_entry_effect() {
        for from in PieceState::ALL {
            for to in PieceState::ALL {
                let mut piece = piece_at(0.0, 0.0);
                piece.set_state(from);
                piece.view_mut().hit_testing = None;
                let writes = piece.view().hit_testing_writes;

                piece.set_state(to);

                assert_eq!(piece.state(), to, "{:?} -> {:?}", from, to);
                assert_eq!(piece.view().hit_testing, to.hit_testing_on_entry());
                let expected_writes = writes + usize::from(to.hit_testing_on_entry().is_some());
                assert_eq!(piece.view().hit_testing_writes, expected_writes);
            }
        }
    }

    #[test]
    fn motion_exists_only_while_moving() {
        let mut piece = piece_at(0.0, 0.0);

        piece.move_to(Vec2::new(3.0, 4.0), 0.0);
        assert!(piece.motion().is_some());

        piece.set_state(PieceState::Grabbed);
        assert_eq!(piece.motion(), None);

        piece.set_state(PieceState::Moving);
        assert!(piece.motion().is_some());

        piece.set_state(PieceState::Popped);
        assert_eq!(piece.motion(), None);
    }

    #[test]
    fn move_to_records_target_and_journey() {
        let mut piece = piece_at(1.0, 1.0);
        piece.set_state(PieceState::Grabbed);

        let outcome = piece.move_to(Vec2::new(4.0, 5.0), 2.5);

        assert_eq!(outcome, MoveOutcome::Started);
        assert_eq!(piece.state(), PieceState::Moving);
        assert_eq!(piece.view().hit_testing, Some(false));
        assert_eq!(
            piece.motion(),
            Some(Motion {
                target: Vec2::new(4.0, 5.0),
                started_at: 2.5,
                journey_length: 5.0,
            })
        );
    }

    #[test]
    fn move_to_while_moving_is_ignored() {
        let mut piece = piece_at(0.0, 0.0);
        piece.move_to(Vec2::new(10.0, 0.0), 0.0);
        let before = piece.motion();

        let outcome = piece.move_to(Vec2::new(-3.0, 7.0), 1.0);

        assert_eq!(outcome, MoveOutcome::Ignored);
        assert!(!outcome.has_update());
        assert_eq!(piece.state(), PieceState::Moving);
        assert_eq!(piece.motion(), before);
    }

    #[test]
    fn tick_at_target_sits_without_moving() {
        let mut piece = piece_at(0.0, 0.0);
        piece.move_to(Vec2::new(2.0, 0.0), 0.0);
        piece.set_position(Vec2::new(2.0, 0.0));

        let outcome = piece.tick(0.1);

        assert_eq!(outcome, MotionOutcome::Arrived);
        assert_eq!(piece.state(), PieceState::Sitting);
        assert_eq!(piece.position(), Vec2::new(2.0, 0.0));
        assert_eq!(piece.view().hit_testing, Some(true));
    }

    #[test]
    fn interpolates_from_current_position() {
        let mut piece = piece_at(0.0, 0.0);
        piece.move_to(Vec2::new(10.0, 0.0), 0.0);

        assert_eq!(piece.tick(0.5), MotionOutcome::Advanced);
        assert_eq!(piece.position(), Vec2::new(2.5, 0.0));

        assert_eq!(piece.tick(1.0), MotionOutcome::Advanced);
        // constant velocity from the start would give 5.0 here
        assert_eq!(piece.position(), Vec2::new(6.25, 0.0));
        assert_ne!(piece.position().x, 5.0);
    }

    #[test]
    fn single_tick_after_one_second_covers_half() {
        let mut piece = piece_at(0.0, 0.0);
        piece.move_to(Vec2::new(10.0, 0.0), 0.0);

        piece.tick(1.0);

        assert_eq!(piece.position(), Vec2::new(5.0, 0.0));
        assert_eq!(piece.state(), PieceState::Moving);
    }

    #[test]
    fn arrives_once_full_journey_time_has_passed() {
        let mut piece = piece_at(0.0, 0.0);
        piece.move_to(Vec2::new(10.0, 0.0), 0.0);

        piece.tick(0.5);
        piece.tick(2.0);
        assert_eq!(piece.position(), Vec2::new(10.0, 0.0));
        assert_eq!(piece.state(), PieceState::Moving);

        assert_eq!(piece.tick(2.1), MotionOutcome::Arrived);
        assert_eq!(piece.state(), PieceState::Sitting);
    }

    #[test]
    fn zero_length_move_sits_within_one_tick() {
        let mut piece = piece_at(3.0, 3.0);

        assert_eq!(piece.move_to(Vec2::new(3.0, 3.0), 0.0), MoveOutcome::Started);
        assert_eq!(piece.state(), PieceState::Moving);

        assert_eq!(piece.tick(0.0), MotionOutcome::Arrived);
        assert_eq!(piece.state(), PieceState::Sitting);
        assert_eq!(piece.position(), Vec2::new(3.0, 3.0));
        assert!(piece.position().is_finite());
    }

    #[test]
    fn tiny_journey_lands_instead_of_stalling() {
        let mut piece = piece_at(0.0, 0.0);
        let target = Vec2::new(1e-44, 0.0);
        piece.move_to(target, 0.0);

        for frame in 1..=3u8 {
            piece.tick(f32::from(frame));
        }

        assert_eq!(piece.state(), PieceState::Sitting);
        assert_eq!(piece.position(), target);
    }

    #[test]
    fn nan_frame_time_snaps_to_target() {
        let mut piece = piece_at(0.0, 0.0);
        piece.move_to(Vec2::new(4.0, 0.0), 0.0);

        assert_eq!(piece.tick(f32::NAN), MotionOutcome::Arrived);
        assert_eq!(piece.state(), PieceState::Sitting);
        assert_eq!(piece.position(), Vec2::new(4.0, 0.0));
    }

    #[test]
    fn repositioned_after_bare_moving_sits_in_place() {
        let mut piece = piece_at(1.0, 0.0);
        piece.set_state(PieceState::Moving);
        piece.set_position(Vec2::new(6.0, 2.0));

        assert_eq!(piece.tick(1.0), MotionOutcome::Arrived);
        assert_eq!(piece.state(), PieceState::Sitting);
        assert_eq!(piece.position(), Vec2::new(6.0, 2.0));
    }

    #[test]
    fn moving_without_destination_sits_next_tick() {
        let mut piece = piece_at(1.0, 0.0);

        piece.set_state(PieceState::Moving);

        assert_eq!(piece.tick(5.0), MotionOutcome::Arrived);
        assert_eq!(piece.state(), PieceState::Sitting);
        assert_eq!(piece.position(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn idle_states_do_not_move() {
        for state in [PieceState::Sitting, PieceState::Grabbed, PieceState::Popped] {
            let mut piece = piece_at(1.0, 1.0);
            piece.set_state(state);

            assert_eq!(piece.tick(10.0), MotionOutcome::Idle);
            assert_eq!(piece.position(), Vec2::new(1.0, 1.0));
            assert_eq!(piece.state(), state);
        }
    }

    #[test]
    fn speed_comes_from_config() {
        let config = PieceConfig { move_speed: 10.0 };
        let mut piece = Piece::with_config(
            PieceKind::Blue,
            true,
            Vec2::ZERO,
            config,
            RecordingView::default(),
        );
        piece.move_to(Vec2::new(10.0, 0.0), 0.0);

        piece.tick(0.5);

        assert_eq!(piece.position(), Vec2::new(5.0, 0.0));
        assert!(piece.is_hardened());
    }

    #[test]
    fn each_kind_paints_its_color_once() {
        let expected = [
            Color::rgb(1.0, 0.0, 0.0),
            Color::rgb(1.0, 0.5, 0.0),
            Color::rgb(1.0, 0.92, 0.016),
            Color::rgb(0.0, 1.0, 0.0),
            Color::rgb(0.0, 0.0, 1.0),
            Color::rgb(1.0, 0.0, 1.0),
            Color::rgb(1.0, 1.0, 1.0),
        ];

        for (discriminant, color) in expected.into_iter().enumerate() {
            let kind = PieceKind::try_from(discriminant as u8).unwrap();
            let mut piece = Piece::new(kind, false, Vec2::ZERO, RecordingView::default());
            piece.move_to(Vec2::new(1.0, 0.0), 0.0);
            piece.tick(1.0);
            piece.tick(2.0);

            assert_eq!(piece.view().colors, vec![color]);
            assert_eq!(Color::for_discriminant(discriminant as u8), color);
        }
    }

    #[test]
    fn unknown_discriminant_falls_back_to_white() {
        assert_eq!(Color::for_discriminant(7), Color::WHITE);
        assert_eq!(Color::for_discriminant(u8::MAX), Color::WHITE);
        assert_eq!(
            PieceKind::try_from(7),
            Err(GameError::UnknownPieceKind(7))
        );
    }

    #[test]
    fn borrowed_view_is_a_view() {
        let mut view = RecordingView::default();
        {
            let mut piece = Piece::new(PieceKind::Green, false, Vec2::ZERO, &mut view);
            piece.set_state(PieceState::Grabbed);
        }

        assert_eq!(view.colors, vec![Color::GREEN]);
        assert_eq!(view.hit_testing, Some(false));
    }

    #[test]
    fn displays_short_kind_name() {
        let piece = Piece::new(PieceKind::Orange, false, Vec2::ZERO, RecordingView::default());

        assert_eq!(piece.to_string(), "Piece [ORA]");
    }

    #[test]
    fn config_reads_from_json_with_defaults() {
        let config: PieceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PieceConfig::default());

        let config: PieceConfig = serde_json::from_str(r#"{"move_speed": 2.0}"#).unwrap();
        assert_eq!(config.move_speed, 2.0);
    }
}
