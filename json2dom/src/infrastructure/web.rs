//! Browser host: builds descriptions directly into the live DOM.

use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::domain::{HandlerRegistry, Host, HostError, NodeDescription, PropValue, TreeBuilder};
use crate::infrastructure::{InfraError, InfraResult};

/// [`Host`] over a `web_sys::Document`.
#[derive(Debug, Clone)]
pub struct WebHost {
    document: Document,
}

impl WebHost {
    /// Host for the current window's document.
    pub fn new() -> Result<Self, HostError> {
        let window = web_sys::window().ok_or_else(|| HostError::Js("window is not available".into()))?;
        let document = window
            .document()
            .ok_or_else(|| HostError::Js("document is not available".into()))?;
        Ok(Self { document })
    }

    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Append `root` to the element with id `container_id`.
    pub fn mount(&self, container_id: &str, root: &Element) -> Result<Element, HostError> {
        let container = self
            .document
            .get_element_by_id(container_id)
            .ok_or_else(|| HostError::ContainerNotFound(container_id.to_string()))?;
        container.append_child(root).map_err(js_error)?;
        Ok(container)
    }
}

impl Host for WebHost {
    type Element = Element;

    fn create_element(&mut self, tag: &str) -> Result<Element, HostError> {
        self.document
            .create_element(tag)
            .map_err(|_| HostError::InvalidTag(tag.to_string()))
    }

    fn set_property(&mut self, element: &Element, name: &str, value: &PropValue) -> Result<(), HostError> {
        let assigned = Reflect::set(element.as_ref(), &JsValue::from_str(name), &to_js(value))
            .map_err(js_error)?;
        if assigned {
            Ok(())
        } else {
            Err(HostError::ReadOnlyProperty {
                tag: element.tag_name().to_ascii_lowercase(),
                property: name.to_string(),
            })
        }
    }

    fn append_child(&mut self, parent: &Element, child: &Element) -> Result<(), HostError> {
        parent.append_child(child).map(|_| ()).map_err(js_error)
    }
}

/// Parse a JSON description, build it into the page and mount it under `container_id`.
pub fn render_json_into(
    container_id: &str,
    json: &str,
    handlers: &HandlerRegistry,
) -> InfraResult<Element> {
    let description = NodeDescription::from_json(json, handlers)
        .map_err(|e| InfraError::Application(e.into()))?;
    let mut host = WebHost::new().map_err(InfraError::Browser)?;
    let root = TreeBuilder::new()
        .convert(&mut host, &description)
        .map_err(|e| InfraError::Application(e.into()))?;
    host.mount(container_id, &root).map_err(InfraError::Browser)?;
    Ok(root)
}

fn to_js(value: &PropValue) -> JsValue {
    match value {
        PropValue::Null => JsValue::NULL,
        PropValue::Bool(b) => JsValue::from_bool(*b),
        PropValue::Number(n) => JsValue::from_f64(*n),
        PropValue::String(s) => JsValue::from_str(s),
        PropValue::Handler(cb) => {
            let cb = cb.clone();
            Closure::<dyn FnMut()>::new(move || cb.call()).into_js_value()
        }
    }
}

fn js_error(value: JsValue) -> HostError {
    HostError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}
