//! Tests for the document factory, element attributes, document lookups and
//! character data.

use koala_dom::{
    DocumentKind, DomError, DomTree, ElementKind, HTML_NAMESPACE, NodeId, NodeKind,
    XML_NAMESPACE, XMLNS_NAMESPACE,
};

/// Build `<html><head><title>..</title></head><body>..</body></html>` in the
/// root document and return (html, head, body).
fn skeleton(tree: &mut DomTree, title: &str) -> (NodeId, NodeId, NodeId) {
    let doctype = tree.create_document_type("html", "", "").unwrap();
    let html = tree.create_element(NodeId::ROOT, "html").unwrap();
    let head = tree.create_element(NodeId::ROOT, "head").unwrap();
    let title_el = tree.create_element(NodeId::ROOT, "title").unwrap();
    let text = tree.create_text_node(NodeId::ROOT, title).unwrap();
    let body = tree.create_element(NodeId::ROOT, "body").unwrap();

    let _ = tree.append_child(NodeId::ROOT, doctype).unwrap();
    let _ = tree.append_child(NodeId::ROOT, html).unwrap();
    let _ = tree.append_child(html, head).unwrap();
    let _ = tree.append_child(head, title_el).unwrap();
    let _ = tree.append_child(title_el, text).unwrap();
    let _ = tree.append_child(html, body).unwrap();
    (html, head, body)
}

fn append_element(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    let element = tree.create_element(NodeId::ROOT, tag).unwrap();
    let _ = tree.append_child(parent, element).unwrap();
    element
}

// ========== factory ==========

#[test]
fn test_create_element_in_html_document() {
    let mut tree = DomTree::new();
    let div = tree.create_element(NodeId::ROOT, "DIV").unwrap();

    let data = tree.element_data(div).unwrap();
    assert_eq!(data.local_name(), "div");
    assert_eq!(data.namespace(), Some(HTML_NAMESPACE));
    assert_eq!(data.kind(), ElementKind::Div);
    assert_eq!(tree.node_name(div).as_deref(), Some("DIV"));
    assert_eq!(tree.node_kind(div), Some(NodeKind::Element));
    assert_eq!(tree.node_type_code(div), Some(1));
    assert_eq!(tree.owner_document(div), Some(NodeId::ROOT));
    assert_eq!(tree.parent(div), None);
}

#[test]
fn test_element_kinds() {
    let mut tree = DomTree::new();
    let cases = [
        ("a", ElementKind::Anchor),
        ("button", ElementKind::Button),
        ("input", ElementKind::Input),
        ("section", ElementKind::Generic),
        ("my-widget", ElementKind::Generic),
        ("blink", ElementKind::Unknown),
    ];
    for (tag, kind) in cases {
        let id = tree.create_element(NodeId::ROOT, tag).unwrap();
        assert_eq!(tree.element_data(id).unwrap().kind(), kind, "<{tag}>");
    }
    assert_eq!(ElementKind::Unknown.to_string(), "HTMLUnknownElement");
    assert_eq!(ElementKind::Anchor.to_string(), "HTMLAnchorElement");
}

#[test]
fn test_create_element_in_xml_document_keeps_case() {
    let mut tree = DomTree::new();
    let doc = tree.create_document(DocumentKind::Xml);
    let el = tree.create_element(doc, "Item").unwrap();

    let data = tree.element_data(el).unwrap();
    assert_eq!(data.local_name(), "Item");
    assert_eq!(data.namespace(), None);
    assert_eq!(data.kind(), ElementKind::Foreign);
    assert_eq!(tree.node_name(el).as_deref(), Some("Item"));
    assert_eq!(tree.document_kind(doc), Some(DocumentKind::Xml));
    assert!(!tree.is_html_document(doc));
}

#[test]
fn test_invalid_names_are_rejected() {
    let mut tree = DomTree::new();
    for name in ["", "1abc", "a b", "a<b", "x=y"] {
        assert_eq!(
            tree.create_element(NodeId::ROOT, name),
            Err(DomError::InvalidCharacter(name.to_string())),
            "{name:?}"
        );
    }
    assert!(matches!(
        tree.create_document_type("bad name", "", ""),
        Err(DomError::InvalidCharacter(_))
    ));
}

#[test]
fn test_create_element_ns() {
    let mut tree = DomTree::new();
    let svg = tree
        .create_element_ns(NodeId::ROOT, Some("http://www.w3.org/2000/svg"), "svg:rect")
        .unwrap();
    let data = tree.element_data(svg).unwrap();
    assert_eq!(data.prefix(), Some("svg"));
    assert_eq!(data.local_name(), "rect");
    assert_eq!(data.kind(), ElementKind::Foreign);
    assert_eq!(tree.node_name(svg).as_deref(), Some("svg:rect"));

    let html = tree
        .create_element_ns(NodeId::ROOT, Some(HTML_NAMESPACE), "p")
        .unwrap();
    assert_eq!(tree.element_data(html).unwrap().kind(), ElementKind::Paragraph);

    assert!(matches!(
        tree.create_element_ns(NodeId::ROOT, None, "svg:rect"),
        Err(DomError::Namespace(_))
    ));
    assert!(matches!(
        tree.create_element_ns(NodeId::ROOT, Some(HTML_NAMESPACE), "xml:p"),
        Err(DomError::Namespace(_))
    ));
    assert!(matches!(
        tree.create_element_ns(NodeId::ROOT, Some(HTML_NAMESPACE), "a:b:c"),
        Err(DomError::InvalidCharacter(_))
    ));
}

#[test]
fn test_factory_requires_a_document() {
    let mut tree = DomTree::new();
    let div = tree.create_element(NodeId::ROOT, "div").unwrap();
    assert_eq!(
        tree.create_element(div, "p"),
        Err(DomError::WrongNodeType {
            node: div,
            expected: "document",
        })
    );
    assert_eq!(
        tree.create_text_node(NodeId(77), "x"),
        Err(DomError::NoSuchNode(NodeId(77)))
    );
}

#[test]
fn test_node_names_and_values() {
    let mut tree = DomTree::new();
    let text = tree.create_text_node(NodeId::ROOT, "hello").unwrap();
    let comment = tree.create_comment(NodeId::ROOT, "note").unwrap();
    let doctype = tree.create_document_type("html", "-//W3C", "about:legacy").unwrap();

    assert_eq!(tree.node_name(text).as_deref(), Some("#text"));
    assert_eq!(tree.node_name(comment).as_deref(), Some("#comment"));
    assert_eq!(tree.node_name(doctype).as_deref(), Some("html"));
    assert_eq!(tree.node_name(NodeId::ROOT).as_deref(), Some("#document"));

    assert_eq!(tree.node_value(text), Some("hello"));
    assert_eq!(tree.node_value(comment), Some("note"));
    assert_eq!(tree.node_value(doctype), None);
    assert_eq!(tree.node_type_code(comment), Some(8));
    assert_eq!(tree.node_type_code(NodeId::ROOT), Some(9));
    assert_eq!(tree.node_type_code(doctype), Some(10));

    tree.set_node_value(comment, Some("changed")).unwrap();
    tree.set_node_value(text, None).unwrap();
    tree.set_node_value(NodeId::ROOT, Some("ignored")).unwrap();
    assert_eq!(tree.node_value(comment), Some("changed"));
    assert_eq!(tree.node_value(text), Some(""));
}

// ========== lookups ==========

#[test]
fn test_document_structure_lookups() {
    let mut tree = DomTree::new();
    let (html, head, body) = skeleton(&mut tree, "  A   small\n title ");

    assert_eq!(tree.document_element(NodeId::ROOT), Some(html));
    assert!(tree.doctype(NodeId::ROOT).is_some());
    assert_eq!(tree.head(NodeId::ROOT), Some(head));
    assert_eq!(tree.body(NodeId::ROOT), Some(body));
    assert_eq!(tree.title(NodeId::ROOT).as_deref(), Some("A small title"));
}

#[test]
fn test_empty_document_lookups() {
    let tree = DomTree::new();
    assert_eq!(tree.document_element(NodeId::ROOT), None);
    assert_eq!(tree.doctype(NodeId::ROOT), None);
    assert_eq!(tree.head(NodeId::ROOT), None);
    assert_eq!(tree.body(NodeId::ROOT), None);
    assert_eq!(tree.title(NodeId::ROOT), None);
}

#[test]
fn test_get_element_by_id_returns_first_in_tree_order() {
    let mut tree = DomTree::new();
    let (_, _, body) = skeleton(&mut tree, "ids");
    let outer = append_element(&mut tree, body, "div");
    let inner = append_element(&mut tree, outer, "span");
    let later = append_element(&mut tree, body, "p");
    tree.set_attribute(inner, "id", "main").unwrap();
    tree.set_attribute(later, "id", "main").unwrap();

    assert_eq!(tree.get_element_by_id(NodeId::ROOT, "main"), Some(inner));
    assert_eq!(tree.get_element_by_id(later, "main"), None);
    assert_eq!(tree.get_element_by_id(NodeId::ROOT, "missing"), None);
    assert_eq!(tree.get_element_by_id(NodeId::ROOT, ""), None);

    // Detached subtrees are not found from the document.
    let _ = tree.remove_child(outer, inner).unwrap();
    assert_eq!(tree.get_element_by_id(NodeId::ROOT, "main"), Some(later));
}

#[test]
fn test_get_elements_by_tag_and_class_name() {
    let mut tree = DomTree::new();
    let (_, _, body) = skeleton(&mut tree, "lists");
    let a = append_element(&mut tree, body, "p");
    let b = append_element(&mut tree, body, "div");
    let c = append_element(&mut tree, b, "p");
    tree.set_attribute(a, "class", "note  important").unwrap();
    tree.set_attribute(c, "class", "important").unwrap();

    assert_eq!(tree.get_elements_by_tag_name(NodeId::ROOT, "P"), vec![a, c]);
    assert_eq!(tree.get_elements_by_tag_name(body, "*"), vec![a, b, c]);
    assert_eq!(
        tree.get_elements_by_class_name(NodeId::ROOT, "important"),
        vec![a, c]
    );
    assert_eq!(
        tree.get_elements_by_class_name(NodeId::ROOT, " important note "),
        vec![a]
    );
    assert!(tree.get_elements_by_class_name(NodeId::ROOT, "   ").is_empty());
    assert_eq!(
        tree.get_elements_by_tag_name_ns(body, Some(HTML_NAMESPACE), "p"),
        vec![a, c]
    );
    assert_eq!(tree.get_elements_by_tag_name_ns(body, Some("*"), "div"), vec![b]);
}

// ========== attributes ==========

#[test]
fn test_attribute_round_trip() {
    let mut tree = DomTree::new();
    let input = tree.create_element(NodeId::ROOT, "input").unwrap();

    tree.set_attribute(input, "Type", "text").unwrap();
    tree.set_attribute(input, "value", "a").unwrap();
    tree.set_attribute(input, "value", "b").unwrap();

    assert_eq!(tree.get_attribute(input, "type"), Some("text"));
    assert_eq!(tree.get_attribute(input, "TYPE"), Some("text"));
    assert_eq!(tree.get_attribute(input, "value"), Some("b"));
    assert_eq!(tree.attribute_names(input), vec!["type", "value"]);

    tree.remove_attribute(input, "type").unwrap();
    tree.remove_attribute(input, "missing").unwrap();
    assert!(!tree.has_attribute(input, "type"));
    assert_eq!(tree.attribute_names(input), vec!["value"]);
}

#[test]
fn test_attributes_on_non_elements() {
    let mut tree = DomTree::new();
    let text = tree.create_text_node(NodeId::ROOT, "x").unwrap();
    assert!(matches!(
        tree.set_attribute(text, "id", "a"),
        Err(DomError::WrongNodeType { .. })
    ));
    assert_eq!(tree.get_attribute(text, "id"), None);
    assert!(tree.attribute_names(text).is_empty());

    let div = tree.create_element(NodeId::ROOT, "div").unwrap();
    assert!(matches!(
        tree.set_attribute(div, "bad name", "a"),
        Err(DomError::InvalidCharacter(_))
    ));
}

#[test]
fn test_toggle_attribute() {
    let mut tree = DomTree::new();
    let button = tree.create_element(NodeId::ROOT, "button").unwrap();

    assert_eq!(tree.toggle_attribute(button, "disabled", None), Ok(true));
    assert_eq!(tree.get_attribute(button, "disabled"), Some(""));
    assert_eq!(tree.toggle_attribute(button, "disabled", Some(true)), Ok(true));
    assert_eq!(tree.toggle_attribute(button, "disabled", None), Ok(false));
    assert_eq!(tree.toggle_attribute(button, "disabled", Some(false)), Ok(false));
    assert!(!tree.has_attribute(button, "disabled"));
}

#[test]
fn test_namespaced_attributes() {
    let mut tree = DomTree::new();
    let el = tree.create_element(NodeId::ROOT, "div").unwrap();

    tree.set_attribute_ns(el, Some(XML_NAMESPACE), "xml:lang", "en")
        .unwrap();
    tree.set_attribute_ns(el, Some(XMLNS_NAMESPACE), "xmlns:svg", "http://www.w3.org/2000/svg")
        .unwrap();

    assert_eq!(tree.get_attribute_ns(el, Some(XML_NAMESPACE), "lang"), Some("en"));
    assert_eq!(tree.get_attribute(el, "xml:lang"), Some("en"));
    assert_eq!(tree.get_attribute_ns(el, None, "lang"), None);

    assert!(matches!(
        tree.set_attribute_ns(el, None, "xml:lang", "en"),
        Err(DomError::Namespace(_))
    ));
    assert!(matches!(
        tree.set_attribute_ns(el, Some(HTML_NAMESPACE), "xmlns", "x"),
        Err(DomError::Namespace(_))
    ));

    tree.remove_attribute_ns(el, Some(XML_NAMESPACE), "lang")
        .unwrap();
    assert_eq!(tree.get_attribute(el, "xml:lang"), None);
    assert_eq!(tree.attribute_names(el), vec!["xmlns:svg"]);
}

// ========== character data ==========

#[test]
fn test_character_data_editing() {
    let mut tree = DomTree::new();
    let text = tree.create_text_node(NodeId::ROOT, "Hello").unwrap();

    tree.append_data(text, " world").unwrap();
    assert_eq!(tree.data(text).unwrap(), "Hello world");
    assert_eq!(tree.length(text).unwrap(), 11);

    tree.insert_data(text, 5, ",").unwrap();
    assert_eq!(tree.data(text).unwrap(), "Hello, world");

    tree.delete_data(text, 0, 7).unwrap();
    assert_eq!(tree.data(text).unwrap(), "world");

    tree.replace_data(text, 0, 1, "W").unwrap();
    assert_eq!(tree.substring_data(text, 0, 3).unwrap(), "Wor");
    assert_eq!(tree.substring_data(text, 3, 99).unwrap(), "ld");

    assert_eq!(
        tree.substring_data(text, 6, 1),
        Err(DomError::IndexSize {
            offset: 6,
            length: 5
        })
    );
}

#[test]
fn test_character_data_counts_utf16_units() {
    let mut tree = DomTree::new();
    let comment = tree.create_comment(NodeId::ROOT, "é\u{1F600}!").unwrap();
    assert_eq!(tree.length(comment).unwrap(), 4);
    assert_eq!(tree.substring_data(comment, 1, 2).unwrap(), "\u{1F600}");
    tree.delete_data(comment, 1, 2).unwrap();
    assert_eq!(tree.data(comment).unwrap(), "é!");
}

#[test]
fn test_character_data_on_elements_fails() {
    let mut tree = DomTree::new();
    let div = tree.create_element(NodeId::ROOT, "div").unwrap();
    assert!(matches!(
        tree.append_data(div, "x"),
        Err(DomError::WrongNodeType { .. })
    ));
    let comment = tree.create_comment(NodeId::ROOT, "c").unwrap();
    assert!(matches!(
        tree.split_text(comment, 0),
        Err(DomError::WrongNodeType { .. })
    ));
}

#[test]
fn test_split_detached_text() {
    let mut tree = DomTree::new();
    let text = tree.create_text_node(NodeId::ROOT, "abc").unwrap();
    let tail = tree.split_text(text, 1).unwrap();
    assert_eq!(tree.data(text).unwrap(), "a");
    assert_eq!(tree.data(tail).unwrap(), "bc");
    assert_eq!(tree.parent(tail), None);
    assert!(matches!(
        tree.split_text(text, 5),
        Err(DomError::IndexSize { .. })
    ));
}

#[test]
fn test_text_content_of_element() {
    let mut tree = DomTree::new();
    let p = tree.create_element(NodeId::ROOT, "p").unwrap();
    let a = tree.create_text_node(NodeId::ROOT, "one ").unwrap();
    let b = append_element(&mut tree, p, "b");
    let _ = tree.insert_before(p, a, Some(b)).unwrap();
    let bold = tree.create_text_node(NodeId::ROOT, "two").unwrap();
    let comment = tree.create_comment(NodeId::ROOT, "skip").unwrap();
    let _ = tree.append_child(b, bold).unwrap();
    let _ = tree.append_child(p, comment).unwrap();

    assert_eq!(tree.text_content(p).as_deref(), Some("one two"));
    assert_eq!(tree.text_content(comment).as_deref(), Some("skip"));
}
