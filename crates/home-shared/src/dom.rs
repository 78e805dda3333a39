//! Element ids and classes the server
//! templates render for the client.

pub const LOADING_OVERLAY_ID: &str =
  "loading-overlay";
pub const OVERLAY_VISIBLE_DISPLAY: &str =
  "flex";
pub const LOGIN_FORM_VISIBLE_DISPLAY: &str =
  "block";
pub const EDIT_INPUT_CLASS: &str =
  "edit-input";

pub fn login_form_id(
  user_id: &str
) -> String {
  format!("login-form-{user_id}")
}

pub fn task_name_id(
  task_id: &str
) -> String {
  format!("task-name-{task_id}")
}
