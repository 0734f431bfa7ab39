//! Countdown driving the timed-writing phase.
//!
//! The countdown itself is pure state advanced by `tick()`; whoever owns it
//! (the WebSocket session loop) arms a one-second interval only while the
//! countdown is running, so pause/reset can never leak a tick.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
  /// Not started; full duration remaining.
  Idle,
  /// Decrementing once per external tick.
  Running,
  /// Paused mid-count or naturally expired at zero.
  Stopped,
}

#[derive(Clone, Debug)]
pub struct Countdown {
  duration: u32,
  remaining: u32,
  state: TimerState,
  expired: bool,
}

impl Countdown {
  pub fn new(duration: u32) -> Self {
    Self { duration, remaining: duration, state: TimerState::Idle, expired: false }
  }

  pub fn duration(&self) -> u32 { self.duration }
  pub fn remaining(&self) -> u32 { self.remaining }
  pub fn state(&self) -> TimerState { self.state }
  pub fn is_running(&self) -> bool { self.state == TimerState::Running }

  /// Set once the count reaches zero; cleared only by `reset`. This flag is
  /// what the session watches to force auto-submission.
  pub fn is_expired(&self) -> bool { self.expired }

  pub fn percent_remaining(&self) -> f32 {
    if self.duration == 0 {
      0.0
    } else {
      (self.remaining as f32 / self.duration as f32) * 100.0
    }
  }

  /// Reconfigure the duration. While idle this also resets the remaining
  /// time; a running or stopped countdown keeps its remaining count until
  /// the next `reset`.
  pub fn set_duration(&mut self, duration: u32) {
    self.duration = duration;
    if self.state == TimerState::Idle {
      self.remaining = duration;
    }
  }

  /// Idle or paused -> running. Starting an expired countdown is a no-op;
  /// it has to be `reset` first.
  pub fn start(&mut self) {
    if self.expired {
      return;
    }
    self.state = TimerState::Running;
  }

  /// Running -> stopped without touching the remaining time.
  pub fn pause(&mut self) {
    if self.state == TimerState::Running {
      self.state = TimerState::Stopped;
    }
  }

  /// Back to idle with the full configured duration.
  pub fn reset(&mut self) {
    self.state = TimerState::Idle;
    self.remaining = self.duration;
    self.expired = false;
  }

  /// Advance one second. Returns true exactly when this tick crossed zero
  /// and flipped the countdown into the expired state.
  pub fn tick(&mut self) -> bool {
    if self.state != TimerState::Running {
      return false;
    }
    self.remaining = self.remaining.saturating_sub(1);
    if self.remaining == 0 {
      self.state = TimerState::Stopped;
      self.expired = true;
      return true;
    }
    false
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn runs_down_and_expires() {
    let mut c = Countdown::new(3);
    assert_eq!(c.state(), TimerState::Idle);
    c.start();
    assert!(!c.tick());
    assert!(!c.tick());
    assert!(c.tick());
    assert_eq!(c.remaining(), 0);
    assert_eq!(c.state(), TimerState::Stopped);
    assert!(c.is_expired());
    // tick after expiry does nothing
    assert!(!c.tick());
    assert_eq!(c.remaining(), 0);
  }

  #[test]
  fn pause_keeps_remaining_and_resumes() {
    let mut c = Countdown::new(10);
    c.start();
    c.tick();
    c.tick();
    c.pause();
    assert_eq!(c.state(), TimerState::Stopped);
    assert_eq!(c.remaining(), 8);
    assert!(!c.tick(), "paused countdown must ignore ticks");
    assert_eq!(c.remaining(), 8);
    c.start();
    c.tick();
    assert_eq!(c.remaining(), 7);
  }

  #[test]
  fn reset_restores_full_duration_and_clears_expiry() {
    let mut c = Countdown::new(2);
    c.start();
    c.tick();
    c.tick();
    assert!(c.is_expired());
    c.reset();
    assert_eq!(c.state(), TimerState::Idle);
    assert_eq!(c.remaining(), 2);
    assert!(!c.is_expired());
  }

  #[test]
  fn start_after_expiry_requires_reset() {
    let mut c = Countdown::new(1);
    c.start();
    c.tick();
    c.start();
    assert_eq!(c.state(), TimerState::Stopped);
    c.reset();
    c.start();
    assert_eq!(c.state(), TimerState::Running);
  }

  #[test]
  fn set_duration_resets_remaining_only_while_idle() {
    let mut c = Countdown::new(60);
    c.set_duration(90);
    assert_eq!(c.remaining(), 90);
    c.start();
    c.tick();
    c.set_duration(30);
    assert_eq!(c.remaining(), 89);
    c.reset();
    assert_eq!(c.remaining(), 30);
  }
}
