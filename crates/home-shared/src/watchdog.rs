use std::ops::Add;
use std::time::Duration;

/// Idle period after which the session is
/// logged out.
pub const DEFAULT_IDLE_TIMEOUT: Duration =
  Duration::from_millis(300_000);

/// User input that proves the session is
/// still attended.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum InputSignal {
  PointerMove,
  KeyPress,
  TouchStart
}

impl InputSignal {
  pub const ALL: [InputSignal; 3] = [
    InputSignal::PointerMove,
    InputSignal::KeyPress,
    InputSignal::TouchStart
  ];

  pub fn event_type(self) -> &'static str {
    match self {
      | InputSignal::PointerMove => {
        "mousemove"
      }
      | InputSignal::KeyPress => "keypress",
      | InputSignal::TouchStart => {
        "touchstart"
      }
    }
  }

  pub fn from_event_type(
    event_type: &str
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|s| s.event_type() == event_type)
  }
}

/// Inactivity deadline.
///
/// Holds at most one pending deadline: every
/// `arm`/`reset` replaces it. Generic over the
/// clock so both real and paused time drive it.
#[derive(Debug, Clone)]
pub struct Watchdog<I> {
  timeout:  Duration,
  deadline: Option<I>
}

impl<I> Watchdog<I>
where
  I: Copy + Ord + Add<Duration, Output = I>
{
  pub fn new(timeout: Duration) -> Self {
    Self {
      timeout,
      deadline: None
    }
  }

  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  pub fn deadline(&self) -> Option<I> {
    self.deadline
  }

  pub fn is_armed(&self) -> bool {
    self.deadline.is_some()
  }

  pub fn arm(&mut self, now: I) -> I {
    let deadline = now + self.timeout;
    self.deadline = Some(deadline);
    deadline
  }

  pub fn reset(
    &mut self,
    now: I,
    _signal: InputSignal
  ) -> I {
    self.arm(now)
  }

  pub fn is_expired(&self, now: I) -> bool {
    self
      .deadline
      .is_some_and(|deadline| deadline <= now)
  }

  /// Fires once: an expired deadline is
  /// consumed.
  pub fn poll(&mut self, now: I) -> bool {
    if self.is_expired(now) {
      self.deadline = None;
      return true;
    }
    false
  }
}

#[cfg(test)]
mod tests {
  use std::time::{
    Duration,
    Instant
  };

  use super::{
    DEFAULT_IDLE_TIMEOUT,
    InputSignal,
    Watchdog
  };

  fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
  }

  #[test]
  fn reset_just_before_expiry_restarts_full_period()
  {
    let start = Instant::now();
    let mut dog =
      Watchdog::new(DEFAULT_IDLE_TIMEOUT);
    dog.arm(start);

    let moved = start + ms(299_999);
    assert!(!dog.poll(moved));
    dog.reset(moved, InputSignal::PointerMove);

    assert!(!dog.poll(start + ms(300_000)));
    assert!(!dog.poll(moved + ms(299_999)));
    assert!(dog.poll(moved + ms(300_000)));
  }

  #[test]
  fn only_one_deadline_is_kept() {
    let start = Instant::now();
    let mut dog = Watchdog::new(ms(1_000));
    dog.arm(start);
    dog.reset(
      start + ms(10),
      InputSignal::KeyPress
    );
    dog.reset(
      start + ms(20),
      InputSignal::TouchStart
    );

    assert_eq!(
      dog.deadline(),
      Some(start + ms(1_020))
    );
  }

  #[test]
  fn expiry_fires_once() {
    let start = Instant::now();
    let mut dog = Watchdog::new(ms(5));
    dog.arm(start);

    assert!(dog.poll(start + ms(5)));
    assert!(!dog.poll(start + ms(50)));
    assert!(!dog.is_armed());
  }

  #[test]
  fn event_types_round_trip() {
    for signal in InputSignal::ALL {
      assert_eq!(
        InputSignal::from_event_type(
          signal.event_type()
        ),
        Some(signal)
      );
    }
    assert_eq!(
      InputSignal::from_event_type("scroll"),
      None
    );
  }
}
