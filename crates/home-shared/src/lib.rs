pub mod dom;
pub mod editor;
pub mod form;
pub mod mutation;
pub mod navigation;
pub mod watchdog;

pub use editor::{
  EditEffect,
  EditKey,
  InlineEditor
};
pub use form::{
  FormMethod,
  MutationForm
};
pub use mutation::Mutation;
pub use navigation::{
  Modifiers,
  NavigationFeedback,
  NavigationIntent,
  Overlay,
  OverlayFlag
};
pub use watchdog::{
  DEFAULT_IDLE_TIMEOUT,
  InputSignal,
  Watchdog
};
