mod editor;
mod overlay;
mod page;
mod watchdog;

use home_shared::{
  DEFAULT_IDLE_TIMEOUT,
  Mutation
};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting home page bindings"
  );

  let document = page::document()?;
  overlay::bind(&document)?;
  watchdog::start(
    &document,
    DEFAULT_IDLE_TIMEOUT
  )?;
  Ok(())
}

#[wasm_bindgen(js_name = markTask)]
pub fn mark_task(
  task_id: &str,
  date: &str,
  user_id: &str,
  completed: bool
) -> Result<(), JsValue> {
  page::submit_form(
    &Mutation::mark(
      task_id, date, user_id, completed
    )
    .to_form()
  )
}

#[wasm_bindgen(js_name = starTask)]
pub fn star_task(
  task_id: &str,
  date: &str,
  user_id: &str,
  currently_starred: bool
) -> Result<(), JsValue> {
  page::submit_form(
    &Mutation::star(
      task_id,
      date,
      user_id,
      currently_starred
    )
    .to_form()
  )
}

#[wasm_bindgen(js_name = starAll)]
pub fn star_all(
  date: &str,
  user_id: &str
) -> Result<(), JsValue> {
  page::submit_form(
    &Mutation::star_all(date, user_id)
      .to_form()
  )
}

#[wasm_bindgen(js_name = editTask)]
pub fn edit_task(
  task_id: &str,
  new_name: &str
) -> Result<(), JsValue> {
  page::submit_form(
    &Mutation::edit_task(task_id, new_name)
      .to_form()
  )
}

/// Puts the task label into inline editing.
#[wasm_bindgen(js_name = startEdit)]
pub fn start_edit(
  task_id: &str
) -> Result<(), JsValue> {
  editor::begin(task_id)
}

#[wasm_bindgen(js_name = showLoginForm)]
pub fn show_login_form(
  user_id: &str
) -> Result<(), JsValue> {
  page::show_login_form(user_id)
}
