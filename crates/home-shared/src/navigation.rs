/// Modifier keys that turn a link click
/// into an open-elsewhere request.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default,
)]
pub struct Modifiers {
  pub meta: bool,
  pub ctrl: bool
}

impl Modifiers {
  pub fn none() -> Self {
    Self::default()
  }

  pub fn any(self) -> bool {
    self.meta || self.ctrl
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
  LinkClick {
    href:      String,
    modifiers: Modifiers
  },
  FormSubmit {
    action: String
  }
}

impl NavigationIntent {
  pub fn link(
    href: impl Into<String>,
    modifiers: Modifiers
  ) -> Self {
    NavigationIntent::LinkClick {
      href: href.into(),
      modifiers
    }
  }

  pub fn submit(
    action: impl Into<String>
  ) -> Self {
    NavigationIntent::FormSubmit {
      action: action.into()
    }
  }

  /// Whether this intent replaces the current
  /// page. Fragment links and modified clicks
  /// do not.
  pub fn shows_overlay(&self) -> bool {
    match self {
      | NavigationIntent::LinkClick {
        href,
        modifiers
      } => {
        !href.contains('#') && !modifiers.any()
      }
      | NavigationIntent::FormSubmit {
        ..
      } => true
    }
  }
}

pub trait Overlay {
  fn show(&mut self);

  fn hide(&mut self);

  fn is_visible(&self) -> bool;
}

/// Overlay reduced to its visibility bit.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default,
)]
pub struct OverlayFlag {
  visible: bool
}

impl Overlay for OverlayFlag {
  fn show(&mut self) {
    self.visible = true;
  }

  fn hide(&mut self) {
    self.visible = false;
  }

  fn is_visible(&self) -> bool {
    self.visible
  }
}

/// Shows the loading overlay for intents that
/// leave the page. A missing overlay turns
/// every call into a no-op.
#[derive(Debug, Clone, Default)]
pub struct NavigationFeedback<O> {
  overlay: Option<O>
}

impl<O: Overlay> NavigationFeedback<O> {
  pub fn new(overlay: Option<O>) -> Self {
    Self { overlay }
  }

  pub fn overlay(&self) -> Option<&O> {
    self.overlay.as_ref()
  }

  pub fn is_visible(&self) -> bool {
    self
      .overlay
      .as_ref()
      .is_some_and(|o| o.is_visible())
  }

  /// Returns whether the overlay was shown.
  pub fn on_intent(
    &mut self,
    intent: &NavigationIntent
  ) -> bool {
    if !intent.shows_overlay() {
      return false;
    }
    match self.overlay.as_mut() {
      | Some(overlay) => {
        overlay.show();
        true
      }
      | None => false
    }
  }

  /// The navigation finished without
  /// replacing the page.
  pub fn settle(&mut self) {
    if let Some(overlay) =
      self.overlay.as_mut()
    {
      overlay.hide();
    }
  }
}
