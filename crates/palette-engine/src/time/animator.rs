use std::time::{Duration, Instant};

/// Highest frame rate an [`Animator`] runs at. Keeps the frame interval well
/// above zero so deadlines always move forward.
pub const MAX_FPS: u32 = 1000;

/// Frame-stepped animation driver.
///
/// An `Animator` interpolates from `start_value` to `end_value` over
/// `duration`, advancing in whole frames of `1 / fps` seconds. It never
/// schedules anything itself: the owner calls [`poll`](Self::poll) with the
/// current time and receives the value of the most recent frame that became
/// due since the last poll.
///
/// The last frame always carries `end_value` exactly and stops the animator,
/// so callers can compare against it to detect completion.
///
/// Starting a running animator restarts it from the first frame. Stopping it
/// drops the remaining frames; values already handed out are not revisited.
#[derive(Debug, Clone)]
pub struct Animator {
    duration: Duration,
    fps: u32,
    start_value: f64,
    end_value: f64,
    started_at: Option<Instant>,
    last_frame: u32,
}

impl Animator {
    /// Creates an animator running `0.0 → 1.0`. `fps` is clamped to
    /// `1..=MAX_FPS`.
    pub fn new(duration: Duration, fps: u32) -> Self {
        Self {
            duration,
            fps: fps.clamp(1, MAX_FPS),
            start_value: 0.0,
            end_value: 1.0,
            started_at: None,
            last_frame: 0,
        }
    }

    /// Replaces the interpolated range.
    pub fn with_range(mut self, start_value: f64, end_value: f64) -> Self {
        self.start_value = start_value;
        self.end_value = end_value;
        self
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    #[inline]
    pub fn end_value(&self) -> f64 {
        self.end_value
    }

    /// Time between two frames.
    #[inline]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.fps))
    }

    /// Number of frames in one run, never less than one.
    pub fn frame_count(&self) -> u32 {
        let interval = self.frame_interval().as_nanos().max(1);
        let frames = self.duration.as_nanos().div_ceil(interval);
        frames.clamp(1, u128::from(u32::MAX)) as u32
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Starts (or restarts) the animation at `now`.
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.last_frame = 0;
    }

    /// Stops the animation. Remaining frames are discarded.
    pub fn stop(&mut self) {
        self.started_at = None;
        self.last_frame = 0;
    }

    /// Value carried by frame `frame` (1-based).
    pub fn value_at(&self, frame: u32) -> f64 {
        let count = self.frame_count();
        if frame >= count {
            return self.end_value;
        }
        let t = f64::from(frame) / f64::from(count);
        self.start_value + (self.end_value - self.start_value) * t
    }

    /// Instant at which frame `frame` (1-based) becomes due.
    fn due_at(&self, started_at: Instant, frame: u32) -> Instant {
        let offset = self.frame_interval() * frame;
        started_at + offset.min(self.duration)
    }

    /// Returns the value of the newest frame that became due, if any.
    ///
    /// Frames skipped because the loop woke up late are coalesced into the
    /// newest one. Returns `None` when not running or when no new frame is due.
    pub fn poll(&mut self, now: Instant) -> Option<f64> {
        let started_at = self.started_at?;
        let count = self.frame_count();
        let elapsed = now.saturating_duration_since(started_at);

        let due = if elapsed >= self.duration {
            count
        } else {
            let interval = self.frame_interval().as_nanos().max(1);
            ((elapsed.as_nanos() / interval) as u32).min(count)
        };

        if due <= self.last_frame {
            return None;
        }

        self.last_frame = due;
        let value = self.value_at(due);

        if due >= count {
            log::trace!("animator finished after {count} frames");
            self.stop();
        }

        Some(value)
    }

    /// When the next frame becomes due, or `None` if not running.
    pub fn next_deadline(&self) -> Option<Instant> {
        let started_at = self.started_at?;
        Some(self.due_at(started_at, self.last_frame + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    // ── frame counting ────────────────────────────────────────────────────

    #[test]
    fn frame_count_rounds_up() {
        assert_eq!(Animator::new(ms(300), 10).frame_count(), 3);
        assert_eq!(Animator::new(ms(1000), 10).frame_count(), 10);
        assert_eq!(Animator::new(ms(250), 10).frame_count(), 3);
    }

    #[test]
    fn zero_duration_still_has_one_frame() {
        let mut anim = Animator::new(Duration::ZERO, 10);
        assert_eq!(anim.frame_count(), 1);
        let t0 = Instant::now();
        anim.start(t0);
        assert_eq!(anim.poll(t0), Some(1.0));
        assert!(!anim.is_running());
    }

    #[test]
    fn fps_is_clamped_to_supported_range() {
        assert_eq!(Animator::new(ms(100), 0).fps(), 1);
        assert_eq!(Animator::new(ms(100), 2_000_000_000).fps(), MAX_FPS);
    }

    #[test]
    fn huge_fps_still_advances_deadlines() {
        let mut anim = Animator::new(ms(300), 2_000_000_000);
        let t0 = Instant::now();
        anim.start(t0);
        let first = anim.next_deadline().unwrap();
        assert!(first > t0);
        assert!(anim.poll(first).is_some());
        assert!(anim.next_deadline().unwrap() > first);
        assert_eq!(anim.poll(t0 + ms(300)), Some(1.0));
    }

    // ── poll ──────────────────────────────────────────────────────────────

    #[test]
    fn poll_before_start_yields_nothing() {
        let mut anim = Animator::new(ms(300), 10);
        assert_eq!(anim.poll(Instant::now()), None);
    }

    #[test]
    fn frames_arrive_in_framerate_steps() {
        let mut anim = Animator::new(ms(300), 10);
        let t0 = Instant::now();
        anim.start(t0);

        assert_eq!(anim.poll(t0 + ms(50)), None);
        let v1 = anim.poll(t0 + ms(100)).unwrap();
        assert!((v1 - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(anim.poll(t0 + ms(150)), None);
        let v2 = anim.poll(t0 + ms(200)).unwrap();
        assert!((v2 - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(anim.poll(t0 + ms(300)), Some(1.0));
        assert!(!anim.is_running());
    }

    #[test]
    fn late_poll_coalesces_to_final_frame() {
        let mut anim = Animator::new(ms(600), 10);
        let t0 = Instant::now();
        anim.start(t0);
        assert_eq!(anim.poll(t0 + ms(5_000)), Some(1.0));
        assert_eq!(anim.poll(t0 + ms(6_000)), None);
    }

    #[test]
    fn custom_range_ends_on_end_value() {
        let mut anim = Animator::new(ms(200), 10).with_range(1.0, 0.0);
        let t0 = Instant::now();
        anim.start(t0);
        assert_eq!(anim.poll(t0 + ms(100)), Some(0.5));
        assert_eq!(anim.poll(t0 + ms(200)), Some(0.0));
    }

    // ── start / stop ──────────────────────────────────────────────────────

    #[test]
    fn stop_discards_remaining_frames() {
        let mut anim = Animator::new(ms(300), 10);
        let t0 = Instant::now();
        anim.start(t0);
        anim.poll(t0 + ms(100));
        anim.stop();
        assert_eq!(anim.poll(t0 + ms(300)), None);
        assert_eq!(anim.next_deadline(), None);
    }

    #[test]
    fn start_while_running_restarts() {
        let mut anim = Animator::new(ms(300), 10);
        let t0 = Instant::now();
        anim.start(t0);
        anim.poll(t0 + ms(200));
        anim.start(t0 + ms(250));
        // Old schedule would have finished at 300ms.
        assert_eq!(anim.poll(t0 + ms(300)), None);
        assert_eq!(anim.poll(t0 + ms(550)), Some(1.0));
    }

    #[test]
    fn next_deadline_tracks_next_frame() {
        let mut anim = Animator::new(ms(300), 10);
        let t0 = Instant::now();
        anim.start(t0);
        assert_eq!(anim.next_deadline(), Some(t0 + ms(100)));
        anim.poll(t0 + ms(100));
        assert_eq!(anim.next_deadline(), Some(t0 + ms(200)));
    }

    #[test]
    fn last_deadline_is_clamped_to_duration() {
        let mut anim = Animator::new(ms(250), 10);
        let t0 = Instant::now();
        anim.start(t0);
        anim.poll(t0 + ms(200));
        assert_eq!(anim.next_deadline(), Some(t0 + ms(250)));
    }
}
