use crate::mutation::Mutation;

#[derive(
  Debug, Clone, PartialEq, Eq, Default,
)]
pub enum EditState {
  #[default]
  Display,
  Editing {
    original: String,
    value:    String
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum EditKey {
  Enter,
  Escape,
  Other
}

impl EditKey {
  /// Maps a DOM `KeyboardEvent.key` value.
  pub fn from_key_name(
    key: &str
  ) -> Self {
    match key {
      | "Enter" => EditKey::Enter,
      | "Escape" | "Esc" => EditKey::Escape,
      | _ => EditKey::Other
    }
  }
}

/// What the host should do after a
/// transition.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum EditEffect {
  None,
  /// The input replaced the label and
  /// should take focus.
  Focus,
  /// The input should lose focus; the
  /// resulting blur settles the edit.
  Blur,
  /// Put the label back with this text.
  Restore {
    text: String
  },
  /// Send the rename. `original` is what
  /// the label showed before editing.
  Commit {
    mutation: Mutation,
    original: String
  }
}

/// Two-state editor for one task label.
#[derive(Debug, Clone)]
pub struct InlineEditor {
  task_id: String,
  state:   EditState
}

impl InlineEditor {
  pub fn new(
    task_id: impl Into<String>
  ) -> Self {
    Self {
      task_id: task_id.into(),
      state:   EditState::Display
    }
  }

  pub fn task_id(&self) -> &str {
    &self.task_id
  }

  pub fn state(&self) -> &EditState {
    &self.state
  }

  pub fn is_editing(&self) -> bool {
    matches!(
      self.state,
      EditState::Editing { .. }
    )
  }

  pub fn value(&self) -> Option<&str> {
    match &self.state {
      | EditState::Editing {
        value,
        ..
      } => Some(value.as_str()),
      | EditState::Display => None
    }
  }

  pub fn begin(
    &mut self,
    current_text: &str
  ) -> EditEffect {
    if self.is_editing() {
      return EditEffect::None;
    }
    self.state = EditState::Editing {
      original: current_text.to_string(),
      value:    current_text.to_string()
    };
    EditEffect::Focus
  }

  pub fn input(
    &mut self,
    new_value: &str
  ) {
    if let EditState::Editing {
      value,
      ..
    } = &mut self.state
    {
      *value = new_value.to_string();
    }
  }

  pub fn key(
    &mut self,
    key: EditKey
  ) -> EditEffect {
    let EditState::Editing {
      original,
      value
    } = &mut self.state
    else {
      return EditEffect::None;
    };

    match key {
      | EditKey::Enter => EditEffect::Blur,
      | EditKey::Escape => {
        value.clone_from(original);
        EditEffect::Blur
      }
      | EditKey::Other => EditEffect::None
    }
  }

  pub fn blur(&mut self) -> EditEffect {
    match std::mem::take(&mut self.state)
    {
      | EditState::Display => {
        EditEffect::None
      }
      | EditState::Editing {
        original,
        value
      } if value == original => {
        EditEffect::Restore {
          text: original
        }
      }
      | EditState::Editing {
        original,
        value
      } => EditEffect::Commit {
        mutation: Mutation::edit_task(
          self.task_id.clone(),
          value
        ),
        original
      }
    }
  }

  /// Key press followed by the blur it
  /// requests, as a browser would deliver.
  pub fn press(
    &mut self,
    key: EditKey
  ) -> EditEffect {
    match self.key(key) {
      | EditEffect::Blur => self.blur(),
      | other => other
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{
    EditEffect,
    EditKey,
    EditState,
    InlineEditor
  };
  use crate::mutation::Mutation;

  #[test]
  fn unchanged_blur_restores_without_commit() {
    let mut editor = InlineEditor::new("3");
    assert_eq!(
      editor.begin("Buy milk"),
      EditEffect::Focus
    );

    assert_eq!(
      editor.blur(),
      EditEffect::Restore {
        text: "Buy milk".to_string()
      }
    );
    assert_eq!(
      editor.state(),
      &EditState::Display
    );
  }

  #[test]
  fn enter_commits_changed_name() {
    let mut editor = InlineEditor::new("3");
    editor.begin("Buy milk");
    editor.input("Buy bread");

    assert_eq!(
      editor.key(EditKey::Enter),
      EditEffect::Blur
    );
    assert_eq!(
      editor.blur(),
      EditEffect::Commit {
        mutation: Mutation::edit_task(
          "3",
          "Buy bread"
        ),
        original: "Buy milk".to_string()
      }
    );
    assert!(!editor.is_editing());
  }

  #[test]
  fn escape_reverts_then_restores() {
    let mut editor = InlineEditor::new("3");
    editor.begin("Buy milk");
    editor.input("Buy bread");

    assert_eq!(
      editor.press(EditKey::Escape),
      EditEffect::Restore {
        text: "Buy milk".to_string()
      }
    );
  }

  #[test]
  fn second_begin_is_ignored_while_editing() {
    let mut editor = InlineEditor::new("3");
    editor.begin("Buy milk");
    editor.input("Buy");

    assert_eq!(
      editor.begin("Something else"),
      EditEffect::None
    );
    assert_eq!(editor.value(), Some("Buy"));
  }

  #[test]
  fn display_state_ignores_keys_and_blur() {
    let mut editor = InlineEditor::new("3");

    assert_eq!(
      editor.key(EditKey::Enter),
      EditEffect::None
    );
    assert_eq!(editor.blur(), EditEffect::None);
    editor.input("ignored");
    assert_eq!(editor.value(), None);
  }

  #[test]
  fn editors_do_not_share_state() {
    let mut first = InlineEditor::new("1");
    let mut second = InlineEditor::new("2");
    first.begin("Dishes");
    second.begin("Laundry");
    first.input("Dishes tonight");

    assert_eq!(
      second.blur(),
      EditEffect::Restore {
        text: "Laundry".to_string()
      }
    );
    assert!(first.is_editing());
  }

  #[test]
  fn key_names_map_to_edit_keys() {
    assert_eq!(
      EditKey::from_key_name("Enter"),
      EditKey::Enter
    );
    assert_eq!(
      EditKey::from_key_name("Escape"),
      EditKey::Escape
    );
    assert_eq!(
      EditKey::from_key_name("a"),
      EditKey::Other
    );
  }
}
