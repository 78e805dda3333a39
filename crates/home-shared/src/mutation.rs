use crate::form::MutationForm;

pub const MARK_TASK_PATH: &str =
  "/mark_task";
pub const STAR_TASK_PATH: &str =
  "/star_task";
pub const STAR_ALL_PATH: &str =
  "/star_all";
pub const EDIT_TASK_PATH: &str =
  "/edit_task";
pub const LOGOUT_PATH: &str = "/logout";

/// Value a checked checkbox submits.
pub const COMPLETED_ON: &str = "on";

/// One server-side state change.
///
/// Identifiers are carried verbatim; the
/// server validates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
  MarkTask {
    task_id:   String,
    date:      String,
    user_id:   String,
    completed: bool
  },
  StarTask {
    task_id: String,
    date:    String,
    user_id: String,
    starred: bool
  },
  StarAll {
    date:    String,
    user_id: String
  },
  EditTask {
    task_id:  String,
    new_name: String
  },
  Login {
    user_id:  String,
    passcode: String
  }
}

impl Mutation {
  pub fn mark(
    task_id: impl Into<String>,
    date: impl Into<String>,
    user_id: impl Into<String>,
    completed: bool
  ) -> Self {
    Mutation::MarkTask {
      task_id: task_id.into(),
      date: date.into(),
      user_id: user_id.into(),
      completed
    }
  }

  /// Star toggle: the submitted state is the
  /// negation of `currently_starred`.
  pub fn star(
    task_id: impl Into<String>,
    date: impl Into<String>,
    user_id: impl Into<String>,
    currently_starred: bool
  ) -> Self {
    Mutation::StarTask {
      task_id: task_id.into(),
      date:    date.into(),
      user_id: user_id.into(),
      starred: !currently_starred
    }
  }

  pub fn star_all(
    date: impl Into<String>,
    user_id: impl Into<String>
  ) -> Self {
    Mutation::StarAll {
      date:    date.into(),
      user_id: user_id.into()
    }
  }

  pub fn edit_task(
    task_id: impl Into<String>,
    new_name: impl Into<String>
  ) -> Self {
    Mutation::EditTask {
      task_id:  task_id.into(),
      new_name: new_name.into()
    }
  }

  pub fn login(
    user_id: impl Into<String>,
    passcode: impl Into<String>
  ) -> Self {
    Mutation::Login {
      user_id:  user_id.into(),
      passcode: passcode.into()
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      | Mutation::MarkTask { .. } => {
        "mark_task"
      }
      | Mutation::StarTask { .. } => {
        "star_task"
      }
      | Mutation::StarAll { .. } => {
        "star_all"
      }
      | Mutation::EditTask { .. } => {
        "edit_task"
      }
      | Mutation::Login { .. } => "login"
    }
  }

  pub fn endpoint(&self) -> String {
    match self {
      | Mutation::MarkTask { .. } => {
        MARK_TASK_PATH.to_string()
      }
      | Mutation::StarTask { .. } => {
        STAR_TASK_PATH.to_string()
      }
      | Mutation::StarAll { .. } => {
        STAR_ALL_PATH.to_string()
      }
      | Mutation::EditTask { .. } => {
        EDIT_TASK_PATH.to_string()
      }
      | Mutation::Login {
        user_id,
        ..
      } => format!("/login/{user_id}")
    }
  }

  pub fn to_form(&self) -> MutationForm {
    let form =
      MutationForm::new(self.endpoint());
    match self {
      | Mutation::MarkTask {
        task_id,
        date,
        user_id,
        completed
      } => {
        let mut form = form
          .with_field("task_id", task_id)
          .with_field("date", date)
          .with_field("user_id", user_id);
        if *completed {
          form.push_field(
            "completed",
            COMPLETED_ON
          );
        }
        form
      }
      | Mutation::StarTask {
        task_id,
        date,
        user_id,
        starred
      } => form
        .with_field("task_id", task_id)
        .with_field("date", date)
        .with_field(
          "starred",
          if *starred { "1" } else { "0" }
        )
        .with_field("user_id", user_id),
      | Mutation::StarAll {
        date,
        user_id
      } => form
        .with_field("date", date)
        .with_field("user_id", user_id),
      | Mutation::EditTask {
        task_id,
        new_name
      } => form
        .with_field("task_id", task_id)
        .with_field("new_name", new_name),
      | Mutation::Login {
        passcode,
        ..
      } => form
        .with_field("passcode", passcode)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::Mutation;

  fn names(
    mutation: &Mutation
  ) -> Vec<String> {
    mutation
      .to_form()
      .fields()
      .iter()
      .map(|(k, _)| k.clone())
      .collect()
  }

  #[test]
  fn checked_mark_submits_completed_on() {
    let form =
      Mutation::mark("7", "2024-01-01", "3", true)
        .to_form();

    assert_eq!(form.action, "/mark_task");
    assert_eq!(
      form.fields(),
      &[
        ("task_id".to_string(), "7".to_string()),
        (
          "date".to_string(),
          "2024-01-01".to_string()
        ),
        ("user_id".to_string(), "3".to_string()),
        (
          "completed".to_string(),
          "on".to_string()
        )
      ]
    );
  }

  #[test]
  fn unchecked_mark_omits_completed() {
    let mutation =
      Mutation::mark("7", "2024-01-01", "3", false);

    assert_eq!(
      names(&mutation),
      vec!["task_id", "date", "user_id"]
    );
  }

  #[test]
  fn star_submits_negated_state() {
    let starred =
      Mutation::star("5", "2024-02-02", "1", true)
        .to_form();
    let unstarred =
      Mutation::star("5", "2024-02-02", "1", false)
        .to_form();

    assert_eq!(starred.action, "/star_task");
    assert_eq!(starred.field("starred"), Some("0"));
    assert_eq!(
      unstarred.field("starred"),
      Some("1")
    );
    assert_eq!(
      names(&Mutation::star("5", "d", "1", true)),
      vec!["task_id", "date", "starred", "user_id"]
    );
  }

  #[test]
  fn star_all_and_edit_carry_identifiers() {
    let star_all =
      Mutation::star_all("2024-03-03", "2")
        .to_form();
    assert_eq!(star_all.action, "/star_all");
    assert_eq!(
      star_all.field("date"),
      Some("2024-03-03")
    );
    assert_eq!(star_all.field("user_id"), Some("2"));

    let edit =
      Mutation::edit_task("9", "Buy bread").to_form();
    assert_eq!(edit.action, "/edit_task");
    assert_eq!(edit.field("task_id"), Some("9"));
    assert_eq!(
      edit.field("new_name"),
      Some("Buy bread")
    );
  }

  #[test]
  fn login_posts_to_user_path() {
    let mutation = Mutation::login("4", "1234");
    let form = mutation.to_form();

    assert_eq!(mutation.name(), "login");
    assert_eq!(form.action, "/login/4");
    assert_eq!(form.len(), 1);
    assert_eq!(form.field("passcode"), Some("1234"));
  }
}
