#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default,
)]
pub enum FormMethod {
  #[default]
  Post
}

impl FormMethod {
  pub fn as_str(self) -> &'static str {
    match self {
      | FormMethod::Post => "POST"
    }
  }
}

/// A synthetic form carrying exactly one
/// server-side state change.
///
/// Fields keep their insertion order, which
/// is also the order they are encoded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationForm {
  pub action: String,
  pub method: FormMethod,
  fields:     Vec<(String, String)>
}

impl MutationForm {
  pub fn new(
    action: impl Into<String>
  ) -> Self {
    Self {
      action: action.into(),
      method: FormMethod::Post,
      fields: Vec::new()
    }
  }

  pub fn with_field(
    mut self,
    name: impl Into<String>,
    value: impl Into<String>
  ) -> Self {
    self.push_field(name, value);
    self
  }

  pub fn push_field(
    &mut self,
    name: impl Into<String>,
    value: impl Into<String>
  ) {
    self
      .fields
      .push((name.into(), value.into()));
  }

  pub fn field(
    &self,
    name: &str
  ) -> Option<&str> {
    self
      .fields
      .iter()
      .find(|(key, _)| key == name)
      .map(|(_, value)| value.as_str())
  }

  pub fn contains(
    &self,
    name: &str
  ) -> bool {
    self.field(name).is_some()
  }

  pub fn fields(
    &self
  ) -> &[(String, String)] {
    &self.fields
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  /// `application/x-www-form-urlencoded`
  /// body of the form.
  pub fn encode(&self) -> String {
    url::form_urlencoded::Serializer::new(
      String::new()
    )
    .extend_pairs(
      self
        .fields
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
    )
    .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::{
    FormMethod,
    MutationForm
  };

  #[test]
  fn fields_keep_insertion_order() {
    let form = MutationForm::new("/star_all")
      .with_field("date", "2024-01-01")
      .with_field("user_id", "3");

    assert_eq!(form.method, FormMethod::Post);
    assert_eq!(form.len(), 2);
    assert_eq!(form.fields()[0].0, "date");
    assert_eq!(form.field("user_id"), Some("3"));
    assert!(!form.contains("task_id"));
  }

  #[test]
  fn encode_escapes_values() {
    let form = MutationForm::new("/edit_task")
      .with_field("task_id", "4")
      .with_field("new_name", "Feed the cat & dog");

    assert_eq!(
      form.encode(),
      "task_id=4&new_name=Feed+the+cat+%26+dog"
    );
  }
}
