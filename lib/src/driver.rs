//! Animation-frame subscription driving a [`SimulationClock`].

use tracing::info;

use crate::clock::{SimulationClock, SimulationState};

/// Feeds host frame timestamps into a clock until cancelled.
///
/// The host calls [`FrameDriver::on_frame`] once per animation frame and
/// schedules the next frame only while [`FrameDriver::is_active`] holds.
/// After [`FrameDriver::cancel`] no frame mutates the clock.
#[derive(Debug)]
pub struct FrameDriver {
    clock: SimulationClock,
    active: bool,
    frames: u64,
}

impl FrameDriver {
    pub fn start(clock: SimulationClock) -> Self {
        info!("frame driver started");
        Self {
            clock,
            active: true,
            frames: 0,
        }
    }

    pub fn on_frame(&mut self, now_ms: f64) -> Option<SimulationState> {
        if !self.active {
            return None;
        }
        self.frames += 1;
        self.clock.tick(now_ms);
        Some(self.clock.state())
    }

    pub fn cancel(&mut self) {
        if self.active {
            info!("frame driver cancelled after {} frames", self.frames);
            self.active = false;
        }
    }

    /// Subscribe again after [`FrameDriver::cancel`].
    ///
    /// The first frame afterwards only re-arms the clock, so time spent
    /// unsubscribed is not simulated.
    pub fn resume(&mut self) {
        if !self.active {
            info!("frame driver resumed");
            self.clock.rearm();
            self.active = true;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Frames delivered while subscribed.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    pub fn state(&self) -> SimulationState {
        self.clock.state()
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Days;

    #[test]
    fn cancel_halts_advancement() {
        let mut driver = FrameDriver::start(SimulationClock::new());
        driver.on_frame(0.0);
        let state = driver.on_frame(16.0).unwrap();
        assert_eq!(state.elapsed_days.get(), 1.0);

        driver.cancel();
        assert!(!driver.is_active());
        for i in 2..20 {
            assert!(driver.on_frame(f64::from(i) * 16.0).is_none());
        }
        assert_eq!(driver.state().elapsed_days.get(), 1.0);
        assert_eq!(driver.frames(), 2);

        driver.cancel();
        assert!(!driver.is_active());
    }

    #[test]
    fn resume_does_not_jump() {
        let mut driver = FrameDriver::start(SimulationClock::new());
        driver.on_frame(0.0);
        driver.on_frame(16.0);
        driver.cancel();
        driver.resume();
        driver.on_frame(60_000.0);
        assert_eq!(driver.state().elapsed_days.get(), 1.0);
        driver.on_frame(60_032.0);
        assert_eq!(driver.state().elapsed_days.get(), 3.0);
    }

    #[test]
    fn controls_through_driver() {
        let mut driver = FrameDriver::start(SimulationClock::new());
        driver.clock_mut().scrub(100.0);
        driver.clock_mut().pause();
        driver.on_frame(0.0);
        driver.on_frame(16.0);
        assert_eq!(driver.clock().elapsed_days(), Days::new(100.0));
    }
}
