use std::cell::RefCell;
use std::ops::Add;
use std::rc::Rc;
use std::time::Duration;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use home_shared::mutation::LOGOUT_PATH;
use home_shared::{
  InputSignal,
  Watchdog
};
use tracing::{
  info,
  warn
};
use wasm_bindgen::JsValue;
use web_sys::Document;

use crate::page;

/// Milliseconds since the epoch as seen by
/// the page.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd,
  Ord,
)]
struct PageTime(u64);

impl PageTime {
  fn now() -> Self {
    PageTime(js_sys::Date::now() as u64)
  }

  fn until(self, later: PageTime) -> u32 {
    u32::try_from(later.0.saturating_sub(self.0))
      .unwrap_or(u32::MAX)
  }
}

impl Add<Duration> for PageTime {
  type Output = PageTime;

  fn add(self, rhs: Duration) -> PageTime {
    let millis =
      u64::try_from(rhs.as_millis())
        .unwrap_or(u64::MAX);
    PageTime(self.0.saturating_add(millis))
  }
}

/// Owns the single pending logout timer.
struct IdleTimer {
  watchdog: Watchdog<PageTime>,
  pending:  Option<Timeout>
}

type Shared = Rc<RefCell<IdleTimer>>;

fn schedule(shared: &Shared, now: PageTime) {
  let mut timer = shared.borrow_mut();
  let Some(deadline) =
    timer.watchdog.deadline()
  else {
    return;
  };
  let handle = shared.clone();
  // Replacing the handle drops and cancels
  // the previous timeout.
  timer.pending = Some(Timeout::new(
    now.until(deadline),
    move || fire(&handle)
  ));
}

fn fire(shared: &Shared) {
  let now = PageTime::now();
  let expired = {
    let mut timer = shared.borrow_mut();
    timer.pending = None;
    timer.watchdog.poll(now)
  };
  if !expired {
    schedule(shared, now);
    return;
  }

  info!("session idle; logging out");
  if let Err(err) = page::navigate(LOGOUT_PATH)
  {
    warn!(error = ?err, "logout navigation failed");
  }
}

/// Arms the idle logout on load and restarts
/// it on every pointer move, key press, and
/// touch.
pub fn start(
  document: &Document,
  timeout: Duration
) -> Result<(), JsValue> {
  let shared: Shared =
    Rc::new(RefCell::new(IdleTimer {
      watchdog: Watchdog::new(timeout),
      pending:  None
    }));

  let now = PageTime::now();
  shared.borrow_mut().watchdog.arm(now);
  schedule(&shared, now);

  for signal in InputSignal::ALL {
    let shared = shared.clone();
    EventListener::new(
      document,
      signal.event_type(),
      move |_| {
        let now = PageTime::now();
        shared
          .borrow_mut()
          .watchdog
          .reset(now, signal);
        schedule(&shared, now);
      }
    )
    .forget();
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::PageTime;

  #[test]
  fn page_time_adds_and_measures_millis() {
    let start = PageTime(1_000);
    let deadline =
      start + Duration::from_millis(300_000);

    assert_eq!(deadline, PageTime(301_000));
    assert_eq!(start.until(deadline), 300_000);
    assert_eq!(deadline.until(start), 0);
  }
}
