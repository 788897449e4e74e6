//! Element data, element kinds, and attribute operations.
//!
//! [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)

use std::borrow::Cow;
use std::collections::HashSet;

use strum_macros::Display;

use crate::attributes::AttributeList;
use crate::error::{DomError, DomResult};
use crate::event::{AttrChange, DOM_ATTR_MODIFIED, Event, MutationDetail};
use crate::mutation::{MutationRecord, PendingEvent};
use crate::{DomTree, NodeId};

/// The HTML namespace.
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
/// The XML namespace, bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// The XMLNS namespace, bound to the `xmlns` prefix.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// - "Elements have an associated namespace, namespace prefix, local name, custom element state,
///    custom element definition, is value."
/// - "When an element is created, its local name is always given."
///
/// NOTE: Custom element state and the `is` value are not modelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub(crate) local_name: String,
    pub(crate) namespace: Option<String>,
    pub(crate) prefix: Option<String>,
    pub(crate) kind: ElementKind,
    pub(crate) attrs: AttributeList,
}

impl ElementData {
    /// Create element data; the concrete [`ElementKind`] is derived from the
    /// namespace and local name.
    #[must_use]
    pub fn new(namespace: Option<&str>, prefix: Option<&str>, local_name: &str) -> Self {
        Self {
            local_name: local_name.to_string(),
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            kind: ElementKind::for_name(namespace, local_name),
            attrs: AttributeList::new(),
        }
    }

    /// Element data in the HTML namespace.
    #[must_use]
    pub fn html(local_name: &str) -> Self {
        Self::new(Some(HTML_NAMESPACE), None, local_name)
    }

    /// "An element's local name"
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// "An element's namespace"
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// "An element's namespace prefix"
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The concrete element subtype chosen at creation.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// "An element has an associated attribute list"
    #[must_use]
    pub const fn attrs(&self) -> &AttributeList {
        &self.attrs
    }

    /// Whether the element is in the HTML namespace.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.namespace.as_deref() == Some(HTML_NAMESPACE)
    }

    /// "An element's qualified name is its local name if its namespace prefix
    /// is null; otherwise its namespace prefix, followed by ":", followed by
    /// its local name."
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#element-html-uppercased-qualified-name)
    ///
    /// The qualified name, ASCII-uppercased for HTML elements.
    #[must_use]
    pub fn tag_name(&self) -> String {
        let qualified = self.qualified_name();
        if self.is_html() {
            qualified.to_ascii_uppercase()
        } else {
            qualified
        }
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.value("id")
    }

    /// Returns the set of class names from the class attribute.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.attrs
            .value("class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }
}

/// The concrete element subtype the factory instantiates for a name.
///
/// The display form is the interface name the bindings expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ElementKind {
    /// `<a>`
    #[strum(serialize = "HTMLAnchorElement")]
    Anchor,
    /// `<body>`
    #[strum(serialize = "HTMLBodyElement")]
    Body,
    /// `<button>`
    #[strum(serialize = "HTMLButtonElement")]
    Button,
    /// `<div>`
    #[strum(serialize = "HTMLDivElement")]
    Div,
    /// `<form>`
    #[strum(serialize = "HTMLFormElement")]
    Form,
    /// `<head>`
    #[strum(serialize = "HTMLHeadElement")]
    Head,
    /// `<html>`
    #[strum(serialize = "HTMLHtmlElement")]
    Html,
    /// `<img>`
    #[strum(serialize = "HTMLImageElement")]
    Image,
    /// `<input>`
    #[strum(serialize = "HTMLInputElement")]
    Input,
    /// `<p>`
    #[strum(serialize = "HTMLParagraphElement")]
    Paragraph,
    /// `<script>`
    #[strum(serialize = "HTMLScriptElement")]
    Script,
    /// `<span>`
    #[strum(serialize = "HTMLSpanElement")]
    Span,
    /// `<style>`
    #[strum(serialize = "HTMLStyleElement")]
    Style,
    /// `<title>`
    #[strum(serialize = "HTMLTitleElement")]
    Title,
    /// Any other element defined by HTML, and valid custom element names.
    #[strum(serialize = "HTMLElement")]
    Generic,
    /// [§ 3.2.2](https://html.spec.whatwg.org/multipage/dom.html#htmlunknownelement)
    /// An HTML-namespace name HTML does not define.
    #[strum(serialize = "HTMLUnknownElement")]
    Unknown,
    /// An element outside the HTML namespace.
    #[strum(serialize = "Element")]
    Foreign,
}

/// HTML element names that map to the generic `HTMLElement` kind.
const GENERIC_HTML_ELEMENTS: &[&str] = &[
    "abbr", "address", "article", "aside", "audio", "b", "base", "bdi", "bdo", "blockquote",
    "br", "canvas", "caption", "cite", "code", "col", "colgroup", "data", "datalist", "dd", "del",
    "details", "dfn", "dialog", "dl", "dt", "em", "embed", "fieldset", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "i", "iframe", "ins",
    "kbd", "label", "legend", "li", "link", "main", "map", "mark", "menu", "meta", "meter", "nav",
    "noscript", "object", "ol", "optgroup", "option", "output", "picture", "pre", "progress", "q",
    "rp", "rt", "ruby", "s", "samp", "search", "section", "select", "slot", "small", "source",
    "strong", "sub", "summary", "sup", "table", "tbody", "td", "template", "textarea", "tfoot",
    "th", "thead", "time", "tr", "track", "u", "ul", "var", "video", "wbr",
];

impl ElementKind {
    /// [§ 3.2.2 Elements in the DOM](https://html.spec.whatwg.org/multipage/dom.html#elements-in-the-dom)
    ///
    /// "The element interface for an element with name name in the HTML
    /// namespace is determined as follows..."
    #[must_use]
    pub fn for_name(namespace: Option<&str>, local_name: &str) -> Self {
        if namespace != Some(HTML_NAMESPACE) {
            return Self::Foreign;
        }
        match local_name {
            "a" => Self::Anchor,
            "body" => Self::Body,
            "button" => Self::Button,
            "div" => Self::Div,
            "form" => Self::Form,
            "head" => Self::Head,
            "html" => Self::Html,
            "img" => Self::Image,
            "input" => Self::Input,
            "p" => Self::Paragraph,
            "script" => Self::Script,
            "span" => Self::Span,
            "style" => Self::Style,
            "title" => Self::Title,
            name if name.contains('-') || GENERIC_HTML_ELEMENTS.contains(&name) => Self::Generic,
            _ => Self::Unknown,
        }
    }
}

const fn is_name_start_char(c: char) -> bool {
    c == ':' || c == '_' || c.is_ascii_alphabetic() || !c.is_ascii()
}

const fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_ascii_digit() || c == '-' || c == '.'
}

/// [§ 1.5 Namespaces](https://dom.spec.whatwg.org/#validate)
///
/// Check a name against the XML `Name` production.
pub(crate) fn validate_name(name: &str) -> DomResult<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char);
    if valid {
        Ok(())
    } else {
        Err(DomError::InvalidCharacter(name.to_string()))
    }
}

/// A namespace, prefix and local name triple extracted from a qualified name.
pub(crate) struct QualifiedName {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
}

/// [§ 1.5](https://dom.spec.whatwg.org/#validate-and-extract)
///
/// "To validate and extract a namespace and qualifiedName..."
pub(crate) fn validate_and_extract(
    namespace: Option<&str>,
    qualified_name: &str,
) -> DomResult<QualifiedName> {
    // STEP 1: "If namespace is the empty string, then set it to null."
    let namespace = namespace.filter(|ns| !ns.is_empty());

    // STEP 2: "Validate qualifiedName."
    validate_name(qualified_name)?;

    // STEP 3-5: split on the first colon.
    let (prefix, local_name) = match qualified_name.split_once(':') {
        Some((prefix, local)) => {
            if prefix.is_empty() || local.is_empty() || local.contains(':') {
                return Err(DomError::InvalidCharacter(qualified_name.to_string()));
            }
            (Some(prefix), local)
        }
        None => (None, qualified_name),
    };

    // STEP 6: "If prefix is non-null and namespace is null, then throw."
    if prefix.is_some() && namespace.is_none() {
        return Err(DomError::Namespace("a prefix requires a namespace"));
    }

    // STEP 7: "If prefix is "xml" and namespace is not the XML namespace, then throw."
    if prefix == Some("xml") && namespace != Some(XML_NAMESPACE) {
        return Err(DomError::Namespace("the xml prefix is bound to the XML namespace"));
    }

    // STEP 8-9: xmlns names and the XMLNS namespace go together.
    let is_xmlns_name = qualified_name == "xmlns" || prefix == Some("xmlns");
    if is_xmlns_name != (namespace == Some(XMLNS_NAMESPACE)) {
        return Err(DomError::Namespace("xmlns names belong to the XMLNS namespace"));
    }

    Ok(QualifiedName {
        namespace: namespace.map(str::to_string),
        prefix: prefix.map(str::to_string),
        local_name: local_name.to_string(),
    })
}

impl DomTree {
    /// Get element data, or fail if the node is not an element.
    ///
    /// # Errors
    ///
    /// `NoSuchNode` for dead ids, `WrongNodeType` for non-elements.
    pub fn element_data(&self, element: NodeId) -> DomResult<&ElementData> {
        self.node(element)?
            .as_element()
            .ok_or(DomError::WrongNodeType {
                node: element,
                expected: "element",
            })
    }

    fn element_data_mut(&mut self, element: NodeId) -> DomResult<&mut ElementData> {
        self.node_mut(element)?
            .as_element_mut()
            .ok_or(DomError::WrongNodeType {
                node: element,
                expected: "element",
            })
    }

    /// "If this is in the HTML namespace and its node document is an HTML
    /// document, then set qualifiedName to qualifiedName in ASCII lowercase."
    fn attribute_key<'a>(&self, element: NodeId, data: &ElementData, name: &'a str) -> Cow<'a, str> {
        let html_document = self
            .node_document(element)
            .is_some_and(|doc| self.is_html_document(doc));
        if data.is_html() && html_document && name.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(name.to_ascii_lowercase())
        } else {
            Cow::Borrowed(name)
        }
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-getattribute)
    ///
    /// "Return the value of the first attribute whose qualified name is
    /// qualifiedName, or null."
    #[must_use]
    pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        let data = self.as_element(element)?;
        let key = self.attribute_key(element, data, name);
        data.attrs.value(&key)
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-hasattribute)
    #[must_use]
    pub fn has_attribute(&self, element: NodeId, name: &str) -> bool {
        self.get_attribute(element, name).is_some()
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-getattributens)
    #[must_use]
    pub fn get_attribute_ns(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<&str> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        self.as_element(element)?
            .attrs
            .get_ns(namespace, local_name)
            .map(|attr| attr.value())
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-getattributenames)
    #[must_use]
    pub fn attribute_names(&self, element: NodeId) -> Vec<String> {
        self.as_element(element)
            .map(|data| data.attrs.names())
            .unwrap_or_default()
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-setattribute)
    ///
    /// # Errors
    ///
    /// `InvalidCharacter` if `name` is not a valid name; `WrongNodeType` if
    /// `element` is not an element.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> DomResult<()> {
        // STEP 1: "If qualifiedName does not match the Name production, throw."
        validate_name(name)?;
        let key = {
            let data = self.element_data(element)?;
            self.attribute_key(element, data, name).into_owned()
        };
        let old = self
            .element_data_mut(element)?
            .attrs
            .set(&key, value.to_string());
        self.attribute_changed(element, &key, None, old, Some(value.to_string()));
        Ok(())
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-setattributens)
    ///
    /// # Errors
    ///
    /// `InvalidCharacter` or `Namespace` from "validate and extract";
    /// `WrongNodeType` if `element` is not an element.
    pub fn set_attribute_ns(
        &mut self,
        element: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> DomResult<()> {
        let name = validate_and_extract(namespace, qualified_name)?;
        let old = self.element_data_mut(element)?.attrs.set_ns(
            name.namespace.as_deref(),
            name.prefix.as_deref(),
            &name.local_name,
            value.to_string(),
        );
        self.attribute_changed(
            element,
            &name.local_name,
            name.namespace.clone(),
            old,
            Some(value.to_string()),
        );
        Ok(())
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-removeattribute)
    ///
    /// Removing an attribute that does not exist is a no-op.
    ///
    /// # Errors
    ///
    /// `WrongNodeType` if `element` is not an element.
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> DomResult<()> {
        let key = {
            let data = self.element_data(element)?;
            self.attribute_key(element, data, name).into_owned()
        };
        if let Some(removed) = self.element_data_mut(element)?.attrs.remove(&key) {
            let name = removed.qualified_name();
            self.attribute_changed(element, &name, removed.namespace, Some(removed.value), None);
        }
        Ok(())
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-removeattributens)
    ///
    /// # Errors
    ///
    /// `WrongNodeType` if `element` is not an element.
    pub fn remove_attribute_ns(
        &mut self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> DomResult<()> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        if let Some(removed) = self
            .element_data_mut(element)?
            .attrs
            .remove_ns(namespace, local_name)
        {
            self.attribute_changed(
                element,
                &removed.local_name,
                removed.namespace,
                Some(removed.value),
                None,
            );
        }
        Ok(())
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-toggleattribute)
    ///
    /// Returns whether the attribute is present afterwards.
    ///
    /// # Errors
    ///
    /// `InvalidCharacter` if `name` is not a valid name; `WrongNodeType` if
    /// `element` is not an element.
    pub fn toggle_attribute(
        &mut self,
        element: NodeId,
        name: &str,
        force: Option<bool>,
    ) -> DomResult<bool> {
        validate_name(name)?;
        let _ = self.element_data(element)?;
        let present = self.has_attribute(element, name);
        match (present, force) {
            (false, None | Some(true)) => {
                self.set_attribute(element, name, "")?;
                Ok(true)
            }
            (true, None | Some(false)) => {
                self.remove_attribute(element, name)?;
                Ok(false)
            }
            (present, Some(_)) => Ok(present),
        }
    }

    /// "To handle attribute changes for an attribute attribute with element,
    /// oldValue, and newValue..."
    fn attribute_changed(
        &mut self,
        element: NodeId,
        name: &str,
        namespace: Option<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        let change = match (&old_value, &new_value) {
            (None, Some(_)) => AttrChange::Addition,
            (Some(_), None) => AttrChange::Removal,
            _ => AttrChange::Modification,
        };
        self.notify(&MutationRecord::Attributes {
            target: element,
            name: name.to_string(),
            namespace,
            old_value: old_value.clone(),
        });
        if self.wants_mutation_event(DOM_ATTR_MODIFIED) {
            let detail = MutationDetail {
                related_node: None,
                prev_value: old_value,
                new_value,
                attr_name: Some(name.to_string()),
                attr_change: Some(change),
            };
            let event = Event::mutation(DOM_ATTR_MODIFIED, true, detail);
            self.flush_mutation_events(vec![PendingEvent::at(element, event)]);
        }
    }
}
