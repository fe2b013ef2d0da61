//! Per-element-kind property table.
//!
//! Decides how a named property behaves when assigned on an element kind.
//! Names that appear nowhere in the table are expando properties.

/// Assignment behaviour of a known property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// String property, reflected as an attribute.
    Text,
    /// Boolean property, reflected as a present/absent attribute.
    Flag,
    /// Numeric property, reflected as an attribute.
    Number,
    /// Event handler; keeps callables, any other value becomes null.
    Handler,
    /// Replaces the children of the element with a single text node.
    TextContent,
    /// Cannot be assigned.
    ReadOnly,
}

use PropertyKind::{Flag, Handler, Number, ReadOnly, Text, TextContent};

const GLOBAL: &[(&str, PropertyKind)] = &[
    ("id", Text),
    ("className", Text),
    ("title", Text),
    ("lang", Text),
    ("dir", Text),
    ("style", Text),
    ("accessKey", Text),
    ("hidden", Flag),
    ("draggable", Flag),
    ("tabIndex", Number),
    ("textContent", TextContent),
    ("innerText", TextContent),
    ("tagName", ReadOnly),
    ("nodeName", ReadOnly),
    ("localName", ReadOnly),
    ("nodeType", ReadOnly),
    ("ownerDocument", ReadOnly),
    ("parentNode", ReadOnly),
    ("parentElement", ReadOnly),
    ("childNodes", ReadOnly),
    ("firstChild", ReadOnly),
    ("lastChild", ReadOnly),
    ("firstElementChild", ReadOnly),
    ("lastElementChild", ReadOnly),
    ("previousSibling", ReadOnly),
    ("nextSibling", ReadOnly),
    ("childElementCount", ReadOnly),
    ("classList", ReadOnly),
    ("attributes", ReadOnly),
    ("isConnected", ReadOnly),
    ("clientWidth", ReadOnly),
    ("clientHeight", ReadOnly),
    ("offsetWidth", ReadOnly),
    ("offsetHeight", ReadOnly),
];

const PER_KIND: &[(&str, &[(&str, PropertyKind)])] = &[
    (
        "a",
        &[
            ("href", Text),
            ("target", Text),
            ("rel", Text),
            ("download", Text),
            ("text", TextContent),
        ],
    ),
    (
        "input",
        &[
            ("type", Text),
            ("name", Text),
            ("value", Text),
            ("placeholder", Text),
            ("min", Text),
            ("max", Text),
            ("step", Text),
            ("pattern", Text),
            ("autofocus", Flag),
            ("checked", Flag),
            ("disabled", Flag),
            ("readOnly", Flag),
            ("required", Flag),
            ("multiple", Flag),
            ("maxLength", Number),
            ("size", Number),
            ("form", ReadOnly),
            ("labels", ReadOnly),
            ("validity", ReadOnly),
        ],
    ),
    (
        "textarea",
        &[
            ("name", Text),
            ("value", Text),
            ("placeholder", Text),
            ("autofocus", Flag),
            ("disabled", Flag),
            ("readOnly", Flag),
            ("required", Flag),
            ("rows", Number),
            ("cols", Number),
            ("maxLength", Number),
            ("form", ReadOnly),
            ("textLength", ReadOnly),
        ],
    ),
    (
        "button",
        &[
            ("type", Text),
            ("name", Text),
            ("value", Text),
            ("autofocus", Flag),
            ("disabled", Flag),
            ("form", ReadOnly),
        ],
    ),
    (
        "select",
        &[
            ("name", Text),
            ("autofocus", Flag),
            ("disabled", Flag),
            ("multiple", Flag),
            ("required", Flag),
            ("size", Number),
            ("form", ReadOnly),
            ("options", ReadOnly),
        ],
    ),
    (
        "option",
        &[
            ("value", Text),
            ("label", Text),
            ("selected", Flag),
            ("disabled", Flag),
            ("text", TextContent),
            ("index", ReadOnly),
        ],
    ),
    (
        "img",
        &[
            ("src", Text),
            ("alt", Text),
            ("width", Number),
            ("height", Number),
            ("complete", ReadOnly),
            ("naturalWidth", ReadOnly),
            ("naturalHeight", ReadOnly),
        ],
    ),
    ("label", &[("htmlFor", Text), ("control", ReadOnly)]),
    (
        "form",
        &[
            ("action", Text),
            ("method", Text),
            ("target", Text),
            ("name", Text),
            ("noValidate", Flag),
            ("elements", ReadOnly),
            ("length", ReadOnly),
        ],
    ),
    (
        "ol",
        &[("start", Number), ("reversed", Flag), ("type", Text)],
    ),
    ("li", &[("value", Number)]),
    ("td", &[("colSpan", Number), ("rowSpan", Number)]),
    ("th", &[("colSpan", Number), ("rowSpan", Number)]),
    (
        "iframe",
        &[
            ("src", Text),
            ("name", Text),
            ("width", Text),
            ("height", Text),
        ],
    ),
];

/// Element kinds accepted when strict tag checking is enabled.
pub const KNOWN_TAGS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "blockquote",
    "body", "br", "button", "canvas", "caption", "code", "col", "colgroup", "dd", "details",
    "dialog", "div", "dl", "dt", "em", "embed", "fieldset", "figcaption", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hr", "html", "i", "iframe",
    "img", "input", "label", "legend", "li", "link", "main", "meta", "nav", "ol", "optgroup",
    "option", "output", "p", "pre", "progress", "section", "select", "small", "source", "span",
    "strong", "style", "sub", "summary", "sup", "table", "tbody", "td", "template", "textarea",
    "tfoot", "th", "thead", "title", "tr", "track", "u", "ul", "video", "wbr",
];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Event handler properties of `GlobalEventHandlers` and friends.
const EVENT_HANDLERS: &[&str] = &[
    "onabort", "onanimationend", "onanimationiteration", "onanimationstart", "onauxclick",
    "onbeforeinput", "onblur", "oncancel", "oncanplay", "oncanplaythrough", "onchange",
    "onclick", "onclose", "oncontextmenu", "oncopy", "oncut", "ondblclick", "ondrag",
    "ondragend", "ondragenter", "ondragleave", "ondragover", "ondragstart", "ondrop",
    "ondurationchange", "onemptied", "onended", "onerror", "onfocus", "onfocusin",
    "onfocusout", "oninput", "oninvalid", "onkeydown", "onkeypress", "onkeyup", "onload",
    "onloadeddata", "onloadedmetadata", "onloadstart", "onmousedown", "onmouseenter",
    "onmouseleave", "onmousemove", "onmouseout", "onmouseover", "onmouseup", "onpaste",
    "onpause", "onplay", "onplaying", "onpointercancel", "onpointerdown", "onpointerenter",
    "onpointerleave", "onpointermove", "onpointerout", "onpointerover", "onpointerup",
    "onprogress", "onratechange", "onreset", "onresize", "onscroll", "onseeked", "onseeking",
    "onselect", "onstalled", "onsubmit", "onsuspend", "ontimeupdate", "ontoggle",
    "ontouchcancel", "ontouchend", "ontouchmove", "ontouchstart", "ontransitionend",
    "onvolumechange", "onwaiting", "onwheel",
];

/// Look up how `name` behaves on an element of kind `tag`.
///
/// Kind-specific entries take precedence over global ones. `None` means the
/// name is not a known property of the kind.
pub fn lookup(tag: &str, name: &str) -> Option<PropertyKind> {
    PER_KIND
        .iter()
        .find(|(kind, _)| *kind == tag)
        .and_then(|(_, props)| find(props, name))
        .or_else(|| find(GLOBAL, name))
        .or_else(|| is_event_handler(name).then_some(Handler))
}

fn find(table: &[(&str, PropertyKind)], name: &str) -> Option<PropertyKind> {
    table
        .iter()
        .find(|(prop, _)| *prop == name)
        .map(|(_, kind)| *kind)
}

/// Known `on<event>` handler property, e.g. `onclick`. Other `on...` names
/// such as `online` are ordinary expandos.
pub fn is_event_handler(name: &str) -> bool {
    EVENT_HANDLERS.contains(&name)
}

pub fn is_known_tag(tag: &str) -> bool {
    KNOWN_TAGS.contains(&tag)
}

/// Elements serialized without a closing tag.
pub fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Attribute that reflects a property, for properties that have one.
pub fn reflected_attribute(tag: &str, name: &str) -> Option<String> {
    match lookup(tag, name)? {
        Text | Flag | Number => Some(match name {
            "className" => "class".to_string(),
            "htmlFor" => "for".to_string(),
            other => other.to_ascii_lowercase(),
        }),
        Handler | TextContent | ReadOnly => None,
    }
}
