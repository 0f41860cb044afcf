//! Shared carriage motion state.
//!
//! One [`MotionState`] lives in the dispatcher. Menu nodes write motion intent
//! into it, the hole sensor advances `current_holes`, and the stepper driver
//! reads the run flags and consumes the stop edge.

use log::debug;

/// Sign of the last commanded carriage motion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Signed hole delta of one step in this direction.
    pub const fn delta(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionState {
    current_holes: i32,
    target_holes: i32,
    running: bool,
    stopped: bool,
    seeking: bool,
    direction: Direction,
    mm_per_hole: f64,
}

impl MotionState {
    pub const fn new(mm_per_hole: f64) -> Self {
        Self {
            current_holes: 0,
            target_holes: 0,
            running: false,
            stopped: false,
            seeking: false,
            direction: Direction::Up,
            mm_per_hole,
        }
    }

    pub const fn current_holes(&self) -> i32 {
        self.current_holes
    }

    pub const fn target_holes(&self) -> i32 {
        self.target_holes
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub const fn is_seeking(&self) -> bool {
        self.seeking
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    pub const fn mm_per_hole(&self) -> f64 {
        self.mm_per_hole
    }

    /// Carriage position converted to millimetres.
    pub fn position_mm(&self) -> f64 {
        self.current_holes as f64 * self.mm_per_hole
    }

    /// Target position converted to millimetres.
    pub fn target_mm(&self) -> f64 {
        self.target_holes as f64 * self.mm_per_hole
    }

    /// Restores a position read back from non-volatile storage.
    pub fn restore_position(&mut self, holes: i32) {
        self.current_holes = holes;
    }

    /// Calibration reset: the carriage's present location becomes hole zero.
    pub fn reset_position(&mut self) {
        debug!("motion: position reset from {}", self.current_holes);
        self.current_holes = 0;
    }

    /// Position sensor hook: one hole passed in the commanded direction.
    pub fn record_hole(&mut self) {
        self.current_holes = self.current_holes.saturating_add(self.direction.delta());
    }

    pub fn set_target(&mut self, holes: i32) {
        self.target_holes = holes;
    }

    /// Moves the target by `delta` holes, never below zero.
    pub fn nudge_target(&mut self, delta: i32) {
        self.target_holes = self.target_holes.saturating_add(delta).max(0);
    }

    /// Target follows the carriage, clamped to the non-negative range.
    pub fn snap_target_to_position(&mut self) {
        self.target_holes = self.current_holes.max(0);
    }

    /// Starts a continuous jog in `direction` unless a run is already active.
    pub fn start_jog(&mut self, direction: Direction) {
        self.direction = direction;
        if !self.running {
            debug!("motion: jog start {:?}", direction);
            self.running = true;
            self.seeking = false;
        }
    }

    /// Ends a jog; a release with nothing running is a no-op.
    pub fn end_jog(&mut self) {
        if self.running {
            self.halt();
        }
    }

    /// Starts a run toward `target_holes`.
    ///
    /// Returns `false` and leaves the state idle when the carriage already sits
    /// on the target.
    pub fn start_seek(&mut self) -> bool {
        let direction = match self.target_holes.cmp(&self.current_holes) {
            core::cmp::Ordering::Greater => Direction::Up,
            core::cmp::Ordering::Less => Direction::Down,
            core::cmp::Ordering::Equal => return false,
        };

        debug!(
            "motion: seek {:?} from {} to {}",
            direction, self.current_holes, self.target_holes
        );
        self.direction = direction;
        self.running = true;
        self.seeking = true;
        true
    }

    /// True once a seek has reached or passed its target.
    pub fn seek_arrived(&self) -> bool {
        if !(self.running && self.seeking) {
            return false;
        }

        match self.direction {
            Direction::Up => self.current_holes >= self.target_holes,
            Direction::Down => self.current_holes <= self.target_holes,
        }
    }

    /// Stops any run and raises the stop edge for the stepper driver.
    ///
    /// This is the only writer of the `running=false` / `stopped=true` pair.
    pub fn halt(&mut self) {
        if self.running {
            debug!("motion: halt at {}", self.current_holes);
        }
        self.running = false;
        self.seeking = false;
        self.stopped = true;
    }

    /// Stepper driver hook: consumes the stop edge.
    pub fn take_stop(&mut self) -> bool {
        core::mem::replace(&mut self.stopped, false)
    }

    /// Hole count nearest to `distance_mm`, rounding halves away from zero.
    pub fn holes_for_distance(&self, distance_mm: f64) -> i32 {
        round_half_away(distance_mm / self.mm_per_hole)
    }
}

/// `floor(h + 0.5)` for non-negative `h`, `ceil(h - 0.5)` otherwise.
///
/// Non-finite input maps to zero; results saturate at the `i32` range.
pub fn round_half_away(holes: f64) -> i32 {
    if !holes.is_finite() {
        return 0;
    }

    let rounded = if holes >= 0.0 {
        libm::floor(holes + 0.5)
    } else {
        libm::ceil(holes - 0.5)
    };

    rounded as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_goes_away_from_zero_on_halves() {
        assert_eq!(round_half_away(40.0), 40);
        assert_eq!(round_half_away(2.5), 3);
        assert_eq!(round_half_away(-3.5), -4);
        assert_eq!(round_half_away(-3.4), -3);
        assert_eq!(round_half_away(f64::NAN), 0);
        assert_eq!(round_half_away(f64::INFINITY), 0);
    }

    #[test]
    fn holes_for_distance_uses_calibration_constant() {
        assert_eq!(MotionState::new(2.5).holes_for_distance(100.0), 40);
        assert_eq!(MotionState::new(2.0).holes_for_distance(-7.0), -4);
        assert_eq!(MotionState::new(0.0).holes_for_distance(10.0), 0);
    }

    #[test]
    fn jog_release_is_idempotent() {
        let mut motion = MotionState::new(1.0);
        motion.start_jog(Direction::Down);
        assert!(motion.is_running());
        assert_eq!(motion.direction(), Direction::Down);

        motion.end_jog();
        assert!(!motion.is_running());
        assert!(motion.take_stop());

        let before = motion;
        motion.end_jog();
        assert_eq!(motion, before);
    }

    #[test]
    fn seek_on_target_stays_idle() {
        let mut motion = MotionState::new(1.0);
        motion.restore_position(4);
        motion.set_target(4);

        assert!(!motion.start_seek());
        assert!(!motion.is_running());
    }

    #[test]
    fn seek_arrival_tracks_direction() {
        let mut motion = MotionState::new(1.0);
        motion.set_target(2);
        assert!(motion.start_seek());
        assert_eq!(motion.direction(), Direction::Up);
        assert!(!motion.seek_arrived());

        motion.record_hole();
        motion.record_hole();
        assert_eq!(motion.current_holes(), 2);
        assert!(motion.seek_arrived());
    }

    #[test]
    fn target_nudge_clamps_at_zero() {
        let mut motion = MotionState::new(1.0);
        motion.nudge_target(-1);
        assert_eq!(motion.target_holes(), 0);
        motion.nudge_target(3);
        assert_eq!(motion.target_holes(), 3);
    }
}
