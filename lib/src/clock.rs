//! Simulation clock.
//!
//! Converts wall-clock frame timestamps into elapsed simulation days. The
//! rate is normalized to a nominal frame length, so a given speed
//! multiplier yields the same simulated days per real second at any
//! display refresh rate.

use color_eyre::eyre::{self, ensure};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::time::Days;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayState {
    Playing,
    Paused,
}

/// Snapshot of the clock, handed to consumers.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub elapsed_days: Days,
    pub is_playing: bool,
    pub speed_multiplier: f64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            elapsed_days: Days::ZERO,
            is_playing: true,
            speed_multiplier: 1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Start in the playing state.
    pub autoplay: bool,
    /// Initial speed multiplier.
    pub speed: f64,
    /// Upper bound on a single frame delta (ms).
    pub max_frame_ms: f64,
    /// Frame length that advances one day per unit of speed (ms).
    pub nominal_frame_ms: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            speed: 1.0,
            max_frame_ms: 100.0,
            nominal_frame_ms: 16.0,
        }
    }
}

impl ClockConfig {
    /// Reject settings that would let a tick produce a non-finite or
    /// negative advance.
    pub fn validate(&self) -> eyre::Result<()> {
        ensure!(
            self.speed.is_finite(),
            "clock speed must be finite, got {}",
            self.speed
        );
        ensure!(
            self.max_frame_ms.is_finite() && self.max_frame_ms >= 0.0,
            "max_frame_ms must be finite and non-negative, got {}",
            self.max_frame_ms
        );
        ensure!(
            self.nominal_frame_ms.is_finite() && self.nominal_frame_ms > 0.0,
            "nominal_frame_ms must be finite and positive, got {}",
            self.nominal_frame_ms
        );
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SimulationClock {
    state: SimulationState,
    config: ClockConfig,
    /// Timestamp of the previous tick (ms), if any.
    previous: Option<f64>,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::with_config(ClockConfig::default())
    }

    pub fn with_config(config: ClockConfig) -> Self {
        Self {
            state: SimulationState {
                elapsed_days: Days::ZERO,
                is_playing: config.autoplay,
                speed_multiplier: config.speed,
            },
            config,
            previous: None,
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn elapsed_days(&self) -> Days {
        self.state.elapsed_days
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.state.speed_multiplier
    }

    pub fn play_state(&self) -> PlayState {
        if self.state.is_playing {
            PlayState::Playing
        } else {
            PlayState::Paused
        }
    }

    pub fn play(&mut self) {
        debug!("clock: play at {}", self.state.elapsed_days);
        self.state.is_playing = true;
    }

    pub fn pause(&mut self) {
        debug!("clock: pause at {}", self.state.elapsed_days);
        self.state.is_playing = false;
    }

    pub fn toggle(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Rewind to day zero and pause. The speed multiplier is kept.
    pub fn reset(&mut self) {
        debug!("clock: reset");
        self.state.elapsed_days = Days::ZERO;
        self.state.is_playing = false;
        self.rearm();
    }

    /// Forget the previous frame timestamp; the next tick only records.
    pub fn rearm(&mut self) {
        self.previous = None;
    }

    /// Jump to `days` without touching the play state.
    ///
    /// Non-finite input lands on day zero. Negative values are accepted.
    pub fn scrub(&mut self, days: f64) {
        let elapsed = Days::sanitized(days);
        debug!("clock: scrub to {elapsed} (requested {days})");
        self.state.elapsed_days = elapsed;
    }

    /// Change the speed multiplier. No bounds are enforced here.
    pub fn set_speed(&mut self, multiplier: f64) {
        debug!("clock: speed {} -> {multiplier}", self.state.speed_multiplier);
        self.state.speed_multiplier = multiplier;
    }

    /// Advance the clock to the frame timestamp `now_ms`.
    ///
    /// The first tick only records the timestamp. Deltas are clamped to
    /// `[0, max_frame_ms]`, so a stalled or backgrounded host resumes
    /// without a jump. Non-finite timestamps are ignored.
    pub fn tick(&mut self, now_ms: f64) -> Days {
        if !now_ms.is_finite() {
            trace!("clock: ignoring non-finite timestamp {now_ms}");
            return self.state.elapsed_days;
        }
        let Some(previous) = self.previous.replace(now_ms) else {
            return self.state.elapsed_days;
        };

        let raw = now_ms - previous;
        let delta = raw.max(0.0).min(self.config.max_frame_ms);
        if delta != raw {
            trace!("clock: clamped frame delta {raw}ms to {delta}ms");
        }

        if !self.state.elapsed_days.get().is_finite() {
            self.state.elapsed_days = Days::ZERO;
        }
        if self.state.is_playing {
            let next = self.state.elapsed_days
                + self.state.speed_multiplier * (delta / self.config.nominal_frame_ms);
            if next.get().is_finite() {
                self.state.elapsed_days = next;
            } else {
                trace!(
                    "clock: dropping non-finite advance at speed {}",
                    self.state.speed_multiplier
                );
            }
        }
        self.state.elapsed_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state() {
        let clock = SimulationClock::new();
        assert_eq!(
            clock.state(),
            SimulationState {
                elapsed_days: Days::ZERO,
                is_playing: true,
                speed_multiplier: 1.0,
            }
        );
        assert_eq!(clock.play_state(), PlayState::Playing);
    }

    #[test]
    fn first_tick_only_records() {
        let mut clock = SimulationClock::new();
        assert_eq!(clock.tick(5000.0), Days::ZERO);
        assert_eq!(clock.tick(5016.0).get(), 1.0);
        assert_eq!(clock.tick(5048.0).get(), 3.0);
    }

    #[test]
    fn speed_scales_advance() {
        let mut clock = SimulationClock::new();
        clock.set_speed(2.5);
        clock.tick(0.0);
        clock.tick(32.0);
        assert!((clock.elapsed_days().get() - 5.0).abs() < 1e-12);
        assert!(clock.is_playing());
    }

    #[test]
    fn frame_rate_independent() {
        let mut fast = SimulationClock::new();
        let mut slow = SimulationClock::new();
        for i in 0..=120 {
            fast.tick(f64::from(i) * 8.0);
        }
        for i in 0..=30 {
            slow.tick(f64::from(i) * 32.0);
        }
        assert!((fast.elapsed_days().get() - slow.elapsed_days().get()).abs() < 1e-9);
        assert!((fast.elapsed_days().get() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn reset_pauses_and_keeps_speed() {
        let mut clock = SimulationClock::new();
        clock.set_speed(4.0);
        clock.tick(0.0);
        clock.tick(50.0);
        clock.reset();
        assert_eq!(
            clock.state(),
            SimulationState {
                elapsed_days: Days::ZERO,
                is_playing: false,
                speed_multiplier: 4.0,
            }
        );
    }

    #[test]
    fn paused_ticks_do_not_advance() {
        let mut clock = SimulationClock::new();
        clock.scrub(12.0);
        clock.pause();
        for i in 0..50 {
            clock.tick(f64::from(i) * 16.0);
        }
        assert_eq!(clock.elapsed_days().get(), 12.0);
        clock.play();
        clock.tick(50.0 * 16.0);
        assert_eq!(clock.elapsed_days().get(), 13.0);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut a = SimulationClock::new();
        a.tick(0.0);
        a.tick(10_000.0);
        let mut b = SimulationClock::new();
        b.tick(0.0);
        b.tick(100.0);
        assert_eq!(a.elapsed_days(), b.elapsed_days());
        assert_eq!(a.elapsed_days().get(), 100.0 / 16.0);
    }

    #[test]
    fn backwards_and_bad_timestamps() {
        let mut clock = SimulationClock::new();
        clock.tick(1000.0);
        clock.tick(500.0);
        assert_eq!(clock.elapsed_days(), Days::ZERO);
        clock.tick(f64::NAN);
        clock.tick(f64::INFINITY);
        clock.tick(516.0);
        assert_eq!(clock.elapsed_days().get(), 1.0);
    }

    #[test]
    fn nan_scrub_does_not_poison() {
        let mut clock = SimulationClock::new();
        clock.tick(0.0);
        clock.tick(16.0);
        clock.scrub(f64::NAN);
        assert_eq!(clock.elapsed_days(), Days::ZERO);
        clock.tick(32.0);
        assert_eq!(clock.elapsed_days().get(), 1.0);
        assert!(clock.is_playing());
    }

    #[test]
    fn scrub_keeps_play_state() {
        let mut clock = SimulationClock::new();
        clock.pause();
        clock.scrub(365.25);
        assert!(!clock.is_playing());
        assert_eq!(clock.elapsed_days().get(), 365.25);
        clock.scrub(-3.0);
        assert_eq!(clock.elapsed_days().get(), -3.0);
    }

    #[test]
    fn toggle() {
        let mut clock = SimulationClock::new();
        clock.toggle();
        assert_eq!(clock.play_state(), PlayState::Paused);
        clock.toggle();
        assert_eq!(clock.play_state(), PlayState::Playing);
    }

    #[test]
    fn first_tick_after_reset_rearms() {
        let mut clock = SimulationClock::new();
        clock.tick(0.0);
        clock.reset();
        clock.play();
        clock.tick(5000.0);
        assert_eq!(clock.elapsed_days(), Days::ZERO);
        clock.tick(5016.0);
        assert_eq!(clock.elapsed_days().get(), 1.0);
    }

    #[test]
    fn config_overrides() {
        let config: ClockConfig = toml::from_str("autoplay = false\nspeed = 3.0").unwrap();
        assert_eq!(config.max_frame_ms, 100.0);
        let clock = SimulationClock::with_config(config);
        assert_eq!(clock.config().max_frame_ms, 100.0);
        assert!(!clock.is_playing());
        assert_eq!(clock.speed_multiplier(), 3.0);
    }

    #[test]
    fn non_finite_speed_does_not_poison() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut clock = SimulationClock::new();
            clock.scrub(5.0);
            clock.set_speed(bad);
            clock.tick(0.0);
            clock.tick(16.0);
            assert_eq!(clock.elapsed_days().get(), 5.0, "speed {bad}");
            clock.set_speed(1.0);
            clock.tick(32.0);
            assert_eq!(clock.elapsed_days().get(), 6.0, "speed {bad}");
        }
    }

    #[test]
    fn overflowing_advance_is_dropped() {
        let mut clock = SimulationClock::new();
        clock.scrub(f64::MAX);
        clock.set_speed(f64::MAX);
        clock.tick(0.0);
        clock.tick(16.0);
        assert_eq!(clock.elapsed_days().get(), f64::MAX);
    }

    #[test]
    fn rejects_bad_config() {
        assert!(ClockConfig::default().validate().is_ok());
        for text in [
            "nominal_frame_ms = 0.0",
            "nominal_frame_ms = -16.0",
            "max_frame_ms = -50.0",
            "max_frame_ms = nan",
            "speed = inf",
            "speed = nan",
        ] {
            let config: ClockConfig = toml::from_str(text).unwrap();
            assert!(config.validate().is_err(), "{text}");
        }
        let config: ClockConfig = toml::from_str("max_frame_ms = 0.0\nspeed = -2.0").unwrap();
        assert!(config.validate().is_ok());
    }
}
