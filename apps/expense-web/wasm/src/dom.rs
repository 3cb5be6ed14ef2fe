//! Element lookups for the expense page
//!
//! Field ids: `email`, `password`, `amount`, `category`, `note`, `date`,
//! plus `tracker-section`, `expense-form` and `message`.

use expense_core::ExpenseForm;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

pub const TRACKER_SECTION: &str = "tracker-section";
pub const EXPENSE_FORM: &str = "expense-form";
pub const MESSAGE: &str = "message";

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document"))
}

pub fn element(id: &str) -> Result<Element, JsValue> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element #{}", id)))
}

/// `value` of an input, select or textarea; empty if the element is missing
pub fn field_value(id: &str) -> String {
    element(id)
        .ok()
        .and_then(|el| js_sys::Reflect::get(&el, &JsValue::from_str("value")).ok())
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

pub fn read_expense_form() -> ExpenseForm {
    ExpenseForm::new(
        &field_value("amount"),
        &field_value("category"),
        &field_value("note"),
        &field_value("date"),
    )
}

pub fn set_tracker_visible(visible: bool) -> Result<(), JsValue> {
    let section: HtmlElement = element(TRACKER_SECTION)?.dyn_into()?;
    section.style().set_property("display", display_value(visible))
}

pub fn set_message(text: &str) -> Result<(), JsValue> {
    element(MESSAGE)?.set_text_content(Some(text));
    Ok(())
}

pub fn alert(text: &str) -> Result<(), JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window"))?
        .alert_with_message(text)
}

pub fn display_value(visible: bool) -> &'static str {
    if visible {
        "block"
    } else {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(true), "block");
        assert_eq!(display_value(false), "none");
    }
}
