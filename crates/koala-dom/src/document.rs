//! The node factory and document-level lookups.
//!
//! [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)

use koala_common::warning::{Component, warn_once};

use crate::element::{ElementData, ElementKind, validate_and_extract, validate_name};
use crate::error::{DomError, DomResult};
use crate::node::{DocumentData, DocumentKind, DocumentTypeData, NodeType};
use crate::{DomTree, NodeId};

impl DomTree {
    /// Create a new, empty document in this arena.
    pub fn create_document(&mut self, kind: DocumentKind) -> NodeId {
        self.alloc(NodeType::Document(DocumentData { kind }), None)
    }

    /// The kind of a document, or `None` if `document` is not one.
    #[must_use]
    pub fn document_kind(&self, document: NodeId) -> Option<DocumentKind> {
        match self.get(document)?.node_type() {
            NodeType::Document(data) => Some(data.kind),
            _ => None,
        }
    }

    pub(crate) fn expect_document(&self, document: NodeId) -> DomResult<DocumentKind> {
        let _ = self.node(document)?;
        self.document_kind(document).ok_or(DomError::WrongNodeType {
            node: document,
            expected: "document",
        })
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-createelement)
    ///
    /// "1. If localName does not match the Name production, then throw an
    ///     InvalidCharacterError.
    ///  2. If this is an HTML document, then set localName to localName in
    ///     ASCII lowercase.
    ///  ...
    ///  4. Let namespace be the HTML namespace, if this is an HTML document
    ///     ...; otherwise null."
    ///
    /// # Errors
    ///
    /// `InvalidCharacter` for invalid names; `WrongNodeType` if `document`
    /// is not a document.
    pub fn create_element(&mut self, document: NodeId, local_name: &str) -> DomResult<NodeId> {
        let kind = self.expect_document(document)?;
        validate_name(local_name)?;

        let data = match kind {
            DocumentKind::Html => ElementData::html(&local_name.to_ascii_lowercase()),
            DocumentKind::Xml => ElementData::new(None, None, local_name),
        };
        if data.kind() == ElementKind::Unknown {
            warn_once(
                Component::Dom,
                &format!("<{}> is not an HTML element; created as HTMLUnknownElement", data.local_name()),
            );
        }
        Ok(self.alloc(NodeType::Element(data), Some(document)))
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-createelementns)
    ///
    /// # Errors
    ///
    /// `InvalidCharacter` or `Namespace` from "validate and extract";
    /// `WrongNodeType` if `document` is not a document.
    pub fn create_element_ns(
        &mut self,
        document: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> DomResult<NodeId> {
        let _ = self.expect_document(document)?;
        let name = validate_and_extract(namespace, qualified_name)?;
        let data = ElementData::new(
            name.namespace.as_deref(),
            name.prefix.as_deref(),
            &name.local_name,
        );
        Ok(self.alloc(NodeType::Element(data), Some(document)))
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-createtextnode)
    ///
    /// # Errors
    ///
    /// `WrongNodeType` if `document` is not a document.
    pub fn create_text_node(&mut self, document: NodeId, data: &str) -> DomResult<NodeId> {
        let _ = self.expect_document(document)?;
        Ok(self.alloc(NodeType::Text(data.to_string()), Some(document)))
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-createcomment)
    ///
    /// # Errors
    ///
    /// `WrongNodeType` if `document` is not a document.
    pub fn create_comment(&mut self, document: NodeId, data: &str) -> DomResult<NodeId> {
        let _ = self.expect_document(document)?;
        Ok(self.alloc(NodeType::Comment(data.to_string()), Some(document)))
    }

    /// [§ 4.5.1](https://dom.spec.whatwg.org/#dom-domimplementation-createdocumenttype)
    ///
    /// The doctype has no node document until it is inserted into one.
    ///
    /// # Errors
    ///
    /// `InvalidCharacter` if `name` is not a valid name.
    pub fn create_document_type(
        &mut self,
        name: &str,
        public_id: &str,
        system_id: &str,
    ) -> DomResult<NodeId> {
        validate_name(name)?;
        let data = DocumentTypeData {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        };
        Ok(self.alloc(NodeType::DocumentType(data), None))
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-documentelement)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    ///
    /// In practice for HTML documents, this is the `<html>` element.
    #[must_use]
    pub fn document_element(&self, document: NodeId) -> Option<NodeId> {
        self.first_element_child(document)
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-doctype)
    ///
    /// "The doctype getter steps are to return the child of this that is a
    /// doctype; otherwise null."
    #[must_use]
    pub fn doctype(&self, document: NodeId) -> Option<NodeId> {
        self.children(document).find(|&c| {
            matches!(
                self.get(c).map(|n| n.node_type()),
                Some(NodeType::DocumentType(_))
            )
        })
    }

    /// Whether `id` is an HTML-namespace element with the given local name.
    fn is_html_element_named(&self, id: NodeId, local_name: &str) -> bool {
        self.as_element(id)
            .is_some_and(|e| e.is_html() && e.local_name() == local_name)
    }

    /// [§ 3.1.3 The head element](https://html.spec.whatwg.org/multipage/dom.html#the-head-element-2)
    ///
    /// "The head element of a document is the first head element that is a
    /// child of the html element, if there is one, or null otherwise."
    #[must_use]
    pub fn head(&self, document: NodeId) -> Option<NodeId> {
        let html = self
            .document_element(document)
            .filter(|&h| self.is_html_element_named(h, "html"))?;
        self.children(html)
            .find(|&c| self.is_html_element_named(c, "head"))
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self, document: NodeId) -> Option<NodeId> {
        let html = self
            .document_element(document)
            .filter(|&h| self.is_html_element_named(h, "html"))?;
        self.children(html).find(|&c| {
            self.is_html_element_named(c, "body") || self.is_html_element_named(c, "frameset")
        })
    }

    /// [§ 3.1.3 Document.title](https://html.spec.whatwg.org/multipage/dom.html#document.title)
    ///
    /// The text of the first `<title>` element in tree order with ASCII
    /// whitespace stripped and collapsed.
    #[must_use]
    pub fn title(&self, document: NodeId) -> Option<String> {
        let title = self
            .descendants(document)
            .find(|&d| self.is_html_element_named(d, "title"))?;
        let text = self.text_content(title).unwrap_or_default();
        Some(text.split_ascii_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// [§ 4.2.4](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    ///
    /// "The getElementById(elementId) method steps are to return the first
    /// element, in tree order, within this's descendants, whose ID is
    /// elementId; otherwise, if there is no such element, null."
    #[must_use]
    pub fn get_element_by_id(&self, root: NodeId, element_id: &str) -> Option<NodeId> {
        if element_id.is_empty() {
            return None;
        }
        self.descendants(root)
            .find(|&d| self.as_element(d).and_then(ElementData::id) == Some(element_id))
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-getelementsbytagname)
    ///
    /// Elements under `root`, in tree order, whose qualified name matches.
    /// `"*"` matches every element. HTML elements in HTML documents match
    /// the lowercased name. The result is a snapshot, not a live list.
    #[must_use]
    pub fn get_elements_by_tag_name(&self, root: NodeId, qualified_name: &str) -> Vec<NodeId> {
        let lowered = qualified_name.to_ascii_lowercase();
        self.descendants(root)
            .filter(|&d| {
                let Some(data) = self.as_element(d) else {
                    return false;
                };
                if qualified_name == "*" {
                    return true;
                }
                let html_document = self
                    .node_document(d)
                    .is_some_and(|doc| self.is_html_document(doc));
                let wanted = if data.is_html() && html_document {
                    lowered.as_str()
                } else {
                    qualified_name
                };
                data.qualified_name() == wanted
            })
            .collect()
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-getelementsbyclassname)
    ///
    /// Elements under `root`, in tree order, that carry every class in the
    /// space-separated `class_names`. An empty set matches nothing.
    #[must_use]
    pub fn get_elements_by_class_name(&self, root: NodeId, class_names: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = class_names.split_ascii_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.descendants(root)
            .filter(|&d| {
                self.as_element(d).is_some_and(|data| {
                    let classes = data.classes();
                    wanted.iter().all(|class| classes.contains(class))
                })
            })
            .collect()
    }

    /// Elements under `root` in `namespace` with `local_name`, either of
    /// which may be `"*"`.
    #[must_use]
    pub fn get_elements_by_tag_name_ns(
        &self,
        root: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Vec<NodeId> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        self.descendants(root)
            .filter(|&d| {
                self.as_element(d).is_some_and(|data| {
                    (namespace == Some("*") || data.namespace() == namespace)
                        && (local_name == "*" || data.local_name() == local_name)
                })
            })
            .collect()
    }
}

