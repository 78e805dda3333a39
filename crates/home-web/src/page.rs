use home_shared::dom::{
  LOADING_OVERLAY_ID,
  LOGIN_FORM_VISIBLE_DISPLAY,
  OVERLAY_VISIBLE_DISPLAY,
  login_form_id
};
use home_shared::{
  MutationForm,
  NavigationFeedback,
  NavigationIntent,
  Overlay
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
  Document,
  HtmlElement,
  HtmlFormElement,
  HtmlInputElement
};

pub fn document() -> Result<Document, JsValue>
{
  web_sys::window()
    .and_then(|window| window.document())
    .ok_or_else(|| {
      JsValue::from_str("no document")
    })
}

pub fn html_element_by_id(
  document: &Document,
  id: &str
) -> Option<HtmlElement> {
  document
    .get_element_by_id(id)
    .and_then(|element| {
      element
        .dyn_into::<HtmlElement>()
        .ok()
    })
}

pub fn set_display(
  element: &HtmlElement,
  value: &str
) {
  if let Err(err) = element
    .style()
    .set_property("display", value)
  {
    warn!(
      error = ?err,
      "failed to set display"
    );
  }
}

/// The page's `loading-overlay` element.
#[derive(Debug, Clone)]
pub struct DomOverlay {
  element: HtmlElement
}

impl DomOverlay {
  pub fn find(
    document: &Document
  ) -> Option<Self> {
    html_element_by_id(
      document,
      LOADING_OVERLAY_ID
    )
    .map(|element| Self { element })
  }
}

impl Overlay for DomOverlay {
  fn show(&mut self) {
    set_display(
      &self.element,
      OVERLAY_VISIBLE_DISPLAY
    );
  }

  fn hide(&mut self) {
    set_display(&self.element, "none");
  }

  fn is_visible(&self) -> bool {
    self
      .element
      .style()
      .get_property_value("display")
      .is_ok_and(|display| {
        display == OVERLAY_VISIBLE_DISPLAY
      })
  }
}

pub fn feedback(
  document: &Document
) -> NavigationFeedback<DomOverlay> {
  NavigationFeedback::new(DomOverlay::find(
    document
  ))
}

/// Builds a hidden POST form from `form`,
/// attaches it to the body and submits it.
/// The server response replaces the page.
#[tracing::instrument(skip(form), fields(action = %form.action))]
pub fn submit_form(
  form: &MutationForm
) -> Result<(), JsValue> {
  let document = document()?;

  feedback(&document).on_intent(
    &NavigationIntent::submit(
      form.action.clone()
    )
  );

  let element: HtmlFormElement = document
    .create_element("form")?
    .dyn_into()?;
  element.set_method(form.method.as_str());
  element.set_action(&form.action);

  for (name, value) in form.fields() {
    let input: HtmlInputElement = document
      .create_element("input")?
      .dyn_into()?;
    input.set_type("hidden");
    input.set_name(name);
    input.set_value(value);
    element.append_child(&input)?;
  }

  let body =
    document.body().ok_or_else(|| {
      JsValue::from_str("no body")
    })?;
  body.append_child(&element)?;

  debug!(
    fields = form.len(),
    "submitting mutation form"
  );
  element.submit()
}

/// Reveals the passcode form of one user on
/// the landing page.
pub fn show_login_form(
  user_id: &str
) -> Result<(), JsValue> {
  let document = document()?;
  match html_element_by_id(
    &document,
    &login_form_id(user_id)
  ) {
    | Some(form) => {
      set_display(
        &form,
        LOGIN_FORM_VISIBLE_DISPLAY
      );
    }
    | None => {
      debug!(
        user_id,
        "no login form for user"
      );
    }
  }
  Ok(())
}

pub fn navigate(
  path: &str
) -> Result<(), JsValue> {
  web_sys::window()
    .ok_or_else(|| {
      JsValue::from_str("no window")
    })?
    .location()
    .set_href(path)
}
