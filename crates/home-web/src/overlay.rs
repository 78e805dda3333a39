use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use home_shared::{
  Modifiers,
  NavigationFeedback,
  NavigationIntent
};
use tracing::debug;
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  Document,
  Element,
  MouseEvent
};

use crate::page::DomOverlay;

fn modifiers_of(
  event: &web_sys::Event
) -> Modifiers {
  event
    .dyn_ref::<MouseEvent>()
    .map(|mouse| {
      Modifiers {
        meta: mouse.meta_key(),
        ctrl: mouse.ctrl_key()
      }
    })
    .unwrap_or_default()
}

fn elements(
  document: &Document,
  selector: &str
) -> Result<Vec<Element>, JsValue> {
  let nodes =
    document.query_selector_all(selector)?;
  Ok(
    (0..nodes.length())
      .filter_map(|index| nodes.item(index))
      .filter_map(|node| {
        node.dyn_into::<Element>().ok()
      })
      .collect()
  )
}

/// Shows the loading overlay when a link or
/// form is about to replace the page.
pub fn bind(
  document: &Document
) -> Result<(), JsValue> {
  let Some(overlay) =
    DomOverlay::find(document)
  else {
    debug!("page has no loading overlay");
    return Ok(());
  };
  let feedback = Rc::new(RefCell::new(
    NavigationFeedback::new(Some(overlay))
  ));

  let links = elements(document, "a")?;
  let forms = elements(document, "form")?;
  debug!(
    links = links.len(),
    forms = forms.len(),
    "binding navigation feedback"
  );

  for link in links {
    let feedback = feedback.clone();
    let target = link.clone();
    EventListener::new(
      &link,
      "click",
      move |event| {
        let href = target
          .get_attribute("href")
          .unwrap_or_default();
        let intent = NavigationIntent::link(
          href,
          modifiers_of(event)
        );
        feedback
          .borrow_mut()
          .on_intent(&intent);
      }
    )
    .forget();
  }

  for form in forms {
    let feedback = feedback.clone();
    let target = form.clone();
    EventListener::new(
      &form,
      "submit",
      move |_| {
        let action = target
          .get_attribute("action")
          .unwrap_or_default();
        feedback.borrow_mut().on_intent(
          &NavigationIntent::submit(action)
        );
      }
    )
    .forget();
  }

  Ok(())
}
