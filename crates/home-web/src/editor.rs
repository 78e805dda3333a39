use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use home_shared::dom::{
  EDIT_INPUT_CLASS,
  task_name_id
};
use home_shared::{
  EditEffect,
  EditKey,
  InlineEditor
};
use tracing::{
  debug,
  warn
};
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  HtmlElement,
  HtmlInputElement,
  KeyboardEvent
};

use crate::page;

/// One label under edit: the swapped-out
/// label node, the input standing in for it,
/// and the input's listeners.
struct Session {
  editor:    InlineEditor,
  label:     HtmlElement,
  input:     HtmlInputElement,
  listeners: Vec<EventListener>
}

impl Session {
  /// Returns the listeners to release once no
  /// borrow of the session is held.
  fn apply(
    &mut self,
    effect: EditEffect
  ) -> Vec<EventListener> {
    match effect {
      | EditEffect::None => {}
      | EditEffect::Focus => {
        if let Err(err) = self.input.focus() {
          warn!(error = ?err, "failed to focus");
        }
      }
      | EditEffect::Blur => {
        if let Err(err) = self.input.blur() {
          warn!(error = ?err, "failed to blur");
        }
      }
      | EditEffect::Restore {
        ..
      } => {
        if let Err(err) = self
          .input
          .replace_with_with_node_1(&self.label)
        {
          warn!(
            error = ?err,
            "failed to restore label"
          );
        }
        return std::mem::take(
          &mut self.listeners
        );
      }
      | EditEffect::Commit {
        mutation,
        ..
      } => {
        // The page reloads with the new name.
        if let Err(err) =
          page::submit_form(&mutation.to_form())
        {
          warn!(error = ?err, "rename failed");
        }
      }
    }
    Vec::new()
  }
}

/// Swaps the `task-name-{id}` label for a
/// text input. A label already under edit is
/// no longer in the document, so a second
/// call does nothing.
#[tracing::instrument]
pub fn begin(
  task_id: &str
) -> Result<(), JsValue> {
  let document = page::document()?;
  let Some(label) = page::html_element_by_id(
    &document,
    &task_name_id(task_id)
  ) else {
    debug!("no label to edit");
    return Ok(());
  };

  let text =
    label.text_content().unwrap_or_default();
  let input: HtmlInputElement = document
    .create_element("input")?
    .dyn_into()?;
  input.set_type("text");
  input.set_class_name(EDIT_INPUT_CLASS);
  input.set_value(&text);
  label.replace_with_with_node_1(&input)?;

  let mut editor = InlineEditor::new(task_id);
  let effect = editor.begin(&text);
  let session =
    Rc::new(RefCell::new(Session {
      editor,
      label,
      input: input.clone(),
      listeners: Vec::new()
    }));
  session.borrow_mut().apply(effect);

  let on_input = {
    let session = session.clone();
    EventListener::new(
      &input,
      "input",
      move |_| {
        let mut session = session.borrow_mut();
        let value = session.input.value();
        session.editor.input(&value);
      }
    )
  };

  let on_keydown = {
    let session = session.clone();
    EventListener::new(
      &input,
      "keydown",
      move |event| {
        let Some(key) = event
          .dyn_ref::<KeyboardEvent>()
          .map(|event| {
            EditKey::from_key_name(&event.key())
          })
        else {
          return;
        };
        // Blur is dispatched synchronously and
        // re-enters the session through the blur
        // listener, so no borrow may be held
        // across it.
        let (effect, input) = {
          let mut session = session.borrow_mut();
          let effect = session.editor.key(key);
          if key == EditKey::Escape
            && let Some(original) =
              session.editor.value()
          {
            session.input.set_value(original);
          }
          (effect, session.input.clone())
        };
        if matches!(effect, EditEffect::Blur)
          && let Err(err) = input.blur()
        {
          warn!(error = ?err, "failed to blur");
        }
      }
    )
  };

  let on_blur = {
    let session = session.clone();
    EventListener::new(
      &input,
      "blur",
      move |_| {
        // Removing the focused input may blur it
        // again while the first blur is handled.
        let Ok(mut session) =
          session.try_borrow_mut()
        else {
          return;
        };
        let released = {
          let effect = session.editor.blur();
          session.apply(effect)
        };
        drop(session);
        // Dropping a handle removes its listener
        // and ends the session's reference cycle.
        drop(released);
      }
    )
  };

  session.borrow_mut().listeners =
    vec![on_input, on_keydown, on_blur];
  Ok(())
}
