//! The interface tables of the standard DOM interfaces.
//!
//! Each function below builds the table for one interface and lists only the
//! members that interface declares; inherited members come from the base
//! table when the registry flattens the hierarchy.

use koala_dom::{DocumentTypeData, DomError, ElementData, Event, EventListener, Node, NodeType};

use crate::context::Scope;
use crate::error::BindingResult;
use crate::interface::Interface;
use crate::registry::{InterfaceTable, Member};
use crate::value::{Args, ObjectRef, Value};

/// Every table, bases before the interfaces that inherit from them.
pub(crate) fn standard() -> Vec<InterfaceTable> {
    vec![
        event_target(),
        node(),
        character_data(),
        InterfaceTable::new(Interface::Text, Some(Interface::CharacterData))
            .with_members([Member::method("splitText", text_split_text)]),
        InterfaceTable::new(Interface::Comment, Some(Interface::CharacterData)),
        document_type(),
        element(),
        InterfaceTable::new(Interface::HtmlElement, Some(Interface::Element)).with_members([
            Member::reflect("title", "title"),
            Member::reflect("lang", "lang"),
            Member::reflect("dir", "dir"),
            Member::reflect_bool("hidden", "hidden"),
        ]),
        InterfaceTable::new(Interface::HtmlAnchorElement, Some(Interface::HtmlElement))
            .with_members([
                Member::reflect("href", "href"),
                Member::reflect("target", "target"),
                Member::reflect("rel", "rel"),
                Member::reflect("download", "download"),
            ]),
        InterfaceTable::new(Interface::HtmlInputElement, Some(Interface::HtmlElement))
            .with_members([
                Member::reflect("type", "type"),
                Member::reflect("name", "name"),
                Member::reflect("value", "value"),
                Member::reflect("placeholder", "placeholder"),
                Member::reflect_bool("disabled", "disabled"),
                Member::reflect_bool("checked", "checked"),
                Member::reflect_bool("required", "required"),
            ]),
        InterfaceTable::new(Interface::HtmlButtonElement, Some(Interface::HtmlElement))
            .with_members([
                Member::reflect("type", "type"),
                Member::reflect("name", "name"),
                Member::reflect("value", "value"),
                Member::reflect_bool("disabled", "disabled"),
            ]),
        InterfaceTable::new(Interface::HtmlUnknownElement, Some(Interface::HtmlElement)),
        document(),
        event(),
    ]
}

/// Converts a setter's value the way the member's first argument would be.
fn setter_args<'a>(member: &'static str, value: &'a Value) -> Args<'a> {
    Args::new(member, std::slice::from_ref(value))
}

// [§ 2.7 Interface EventTarget](https://dom.spec.whatwg.org/#interface-eventtarget)

fn event_target() -> InterfaceTable {
    InterfaceTable::new(Interface::EventTarget, None).with_members([
        Member::method("addEventListener", target_add_event_listener),
        Member::method("removeEventListener", target_remove_event_listener),
        Member::method("dispatchEvent", target_dispatch_event),
    ])
}

/// A `null` callback is accepted and ignored.
fn listener_arguments(
    args: &Args<'_>,
) -> BindingResult<Option<(String, EventListener, bool)>> {
    let event_type = args.string(0)?;
    if args.get(1)?.is_nullish() {
        return Ok(None);
    }
    Ok(Some((event_type, args.listener(1)?, args.bool_or(2, false))))
}

fn target_add_event_listener(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let target = ctx.node(this)?;
    if let Some((event_type, listener, capture)) =
        listener_arguments(&Args::new("addEventListener", args))?
    {
        ctx.tree_mut()
            .add_event_listener(target, &event_type, listener, capture)?;
    }
    Ok(Value::Undefined)
}

fn target_remove_event_listener(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let target = ctx.node(this)?;
    if let Some((event_type, listener, capture)) =
        listener_arguments(&Args::new("removeEventListener", args))?
    {
        ctx.tree_mut()
            .remove_event_listener(target, &event_type, &listener, capture)?;
    }
    Ok(Value::Undefined)
}

fn target_dispatch_event(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let target = ctx.node(this)?;
    let handle = Args::new("dispatchEvent", args).event(0)?;
    Ok(Value::Bool(ctx.dispatch(target, handle)?))
}

// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)

fn node() -> InterfaceTable {
    InterfaceTable::new(Interface::Node, Some(Interface::EventTarget))
        .with_members([
            Member::readonly("nodeType", node_type),
            Member::readonly("nodeName", node_name),
            Member::attribute("nodeValue", node_value, node_set_value),
            Member::attribute("textContent", node_text_content, node_set_text_content),
            Member::readonly("parentNode", |ctx, this| {
                Ok(ctx.tree().parent(ctx.node(this)?).into())
            }),
            Member::readonly("parentElement", |ctx, this| {
                Ok(ctx.tree().parent_element(ctx.node(this)?).into())
            }),
            Member::readonly("firstChild", |ctx, this| {
                Ok(ctx.tree().first_child(ctx.node(this)?).into())
            }),
            Member::readonly("lastChild", |ctx, this| {
                Ok(ctx.tree().last_child(ctx.node(this)?).into())
            }),
            Member::readonly("previousSibling", |ctx, this| {
                Ok(ctx.tree().prev_sibling(ctx.node(this)?).into())
            }),
            Member::readonly("nextSibling", |ctx, this| {
                Ok(ctx.tree().next_sibling(ctx.node(this)?).into())
            }),
            Member::readonly("childNodes", |ctx, this| {
                let node = ctx.node(this)?;
                Ok(ctx.tree().children(node).collect::<Vec<_>>().into())
            }),
            Member::readonly("ownerDocument", |ctx, this| {
                Ok(ctx.tree().owner_document(ctx.node(this)?).into())
            }),
            Member::readonly("isConnected", |ctx, this| {
                let tree = ctx.tree();
                Ok(Value::Bool(tree.is_document(tree.root_of(ctx.node(this)?))))
            }),
            Member::method("hasChildNodes", |ctx, this, _| {
                Ok(Value::Bool(ctx.tree().has_child_nodes(ctx.node(this)?)))
            }),
            Member::method("appendChild", node_append_child),
            Member::method("insertBefore", node_insert_before),
            Member::method("removeChild", node_remove_child),
            Member::method("replaceChild", node_replace_child),
            Member::method("cloneNode", node_clone_node),
            Member::method("contains", node_contains),
            Member::method("isEqualNode", node_is_equal_node),
            Member::method("normalize", |ctx, this, _| {
                let node = ctx.node(this)?;
                ctx.tree_mut().normalize(node)?;
                Ok(Value::Undefined)
            }),
        ])
        .with_indexed(node_child_at, Some(node_set_child_at))
}

fn node_type(ctx: &Scope<'_>, this: ObjectRef) -> BindingResult<Value> {
    let node = ctx.node(this)?;
    Ok(Value::Number(f64::from(
        ctx.tree().node_type_code(node).unwrap_or_default(),
    )))
}

fn node_name(ctx: &Scope<'_>, this: ObjectRef) -> BindingResult<Value> {
    let node = ctx.node(this)?;
    Ok(ctx
        .tree()
        .node_name(node)
        .map_or(Value::Null, Value::String))
}

fn node_value(ctx: &Scope<'_>, this: ObjectRef) -> BindingResult<Value> {
    let node = ctx.node(this)?;
    Ok(ctx.tree().node_value(node).map_or(Value::Null, Value::from))
}

fn node_set_value(ctx: &mut Scope<'_>, this: ObjectRef, value: &Value) -> BindingResult<()> {
    let node = ctx.node(this)?;
    let value = setter_args("nodeValue", value).optional_string(0)?;
    ctx.tree_mut().set_node_value(node, value.as_deref())?;
    Ok(())
}

fn node_text_content(ctx: &Scope<'_>, this: ObjectRef) -> BindingResult<Value> {
    let node = ctx.node(this)?;
    Ok(ctx
        .tree()
        .text_content(node)
        .map_or(Value::Null, Value::String))
}

/// `null` clears the node like the empty string does.
fn node_set_text_content(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    value: &Value,
) -> BindingResult<()> {
    let node = ctx.node(this)?;
    let value = setter_args("textContent", value).optional_string(0)?;
    ctx.tree_mut()
        .set_text_content(node, value.as_deref().unwrap_or_default())?;
    Ok(())
}

fn node_append_child(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let parent = ctx.node(this)?;
    let child = Args::new("appendChild", args).node(0)?;
    Ok(ctx.tree_mut().append_child(parent, child)?.into())
}

fn node_insert_before(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let parent = ctx.node(this)?;
    let args = Args::new("insertBefore", args);
    let (node, child) = (args.node(0)?, args.optional_node(1)?);
    Ok(ctx.tree_mut().insert_before(parent, node, child)?.into())
}

fn node_remove_child(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let parent = ctx.node(this)?;
    let child = Args::new("removeChild", args).node(0)?;
    Ok(ctx.tree_mut().remove_child(parent, child)?.into())
}

fn node_replace_child(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let parent = ctx.node(this)?;
    let args = Args::new("replaceChild", args);
    let (node, child) = (args.node(0)?, args.node(1)?);
    Ok(ctx.tree_mut().replace_child(parent, node, child)?.into())
}

fn node_clone_node(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let node = ctx.node(this)?;
    let deep = Args::new("cloneNode", args).bool_or(0, false);
    Ok(ctx.tree_mut().clone_node(node, deep)?.into())
}

/// `contains(null)` is false.
fn node_contains(ctx: &mut Scope<'_>, this: ObjectRef, args: &[Value]) -> BindingResult<Value> {
    let node = ctx.node(this)?;
    let other = Args::new("contains", args).optional_node(0)?;
    Ok(Value::Bool(
        other.is_some_and(|other| ctx.tree().contains(node, other)),
    ))
}

fn node_is_equal_node(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let node = ctx.node(this)?;
    let other = Args::new("isEqualNode", args).optional_node(0)?;
    Ok(Value::Bool(
        other.is_some_and(|other| ctx.tree().is_equal_node(node, other)),
    ))
}

/// Positions past the last child read as `undefined`.
fn node_child_at(ctx: &Scope<'_>, this: ObjectRef, index: usize) -> BindingResult<Value> {
    let node = ctx.node(this)?;
    Ok(ctx
        .tree()
        .child_at(node, index)
        .map_or(Value::Undefined, Value::Node))
}

/// Replaces the child at `index`, or appends when `index` is one past the
/// last child.
fn node_set_child_at(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    index: usize,
    value: &Value,
) -> BindingResult<()> {
    let parent = ctx.node(this)?;
    let node = setter_args("[index]", value).node(0)?;
    let tree = ctx.tree_mut();
    let length = tree.child_count(parent);
    if let Some(child) = tree.child_at(parent, index) {
        let _ = tree.replace_child(parent, node, child)?;
    } else if index == length {
        let _ = tree.append_child(parent, node)?;
    } else {
        return Err(DomError::IndexSize {
            offset: index,
            length,
        }
        .into());
    }
    Ok(())
}

// [§ 4.10 Interface CharacterData](https://dom.spec.whatwg.org/#interface-characterdata)

fn character_data() -> InterfaceTable {
    InterfaceTable::new(Interface::CharacterData, Some(Interface::Node)).with_members([
        Member::attribute(
            "data",
            |ctx, this| Ok(Value::from(ctx.tree().data(ctx.node(this)?)?)),
            |ctx, this, value| {
                let node = ctx.node(this)?;
                let data = setter_args("data", value).string(0)?;
                Ok(ctx.tree_mut().set_data(node, &data)?)
            },
        ),
        Member::readonly("length", |ctx, this| {
            Ok(Value::from(ctx.tree().length(ctx.node(this)?)?))
        }),
        Member::method("appendData", |ctx, this, args| {
            let node = ctx.node(this)?;
            let data = Args::new("appendData", args).string(0)?;
            ctx.tree_mut().append_data(node, &data)?;
            Ok(Value::Undefined)
        }),
        Member::method("insertData", |ctx, this, args| {
            let node = ctx.node(this)?;
            let args = Args::new("insertData", args);
            let (offset, data) = (args.index(0)?, args.string(1)?);
            ctx.tree_mut().insert_data(node, offset, &data)?;
            Ok(Value::Undefined)
        }),
        Member::method("deleteData", |ctx, this, args| {
            let node = ctx.node(this)?;
            let args = Args::new("deleteData", args);
            let (offset, count) = (args.index(0)?, args.index(1)?);
            ctx.tree_mut().delete_data(node, offset, count)?;
            Ok(Value::Undefined)
        }),
        Member::method("replaceData", |ctx, this, args| {
            let node = ctx.node(this)?;
            let args = Args::new("replaceData", args);
            let (offset, count, data) = (args.index(0)?, args.index(1)?, args.string(2)?);
            ctx.tree_mut().replace_data(node, offset, count, &data)?;
            Ok(Value::Undefined)
        }),
        Member::method("substringData", |ctx, this, args| {
            let node = ctx.node(this)?;
            let args = Args::new("substringData", args);
            let (offset, count) = (args.index(0)?, args.index(1)?);
            Ok(Value::String(ctx.tree().substring_data(node, offset, count)?))
        }),
    ])
}

fn text_split_text(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let node = ctx.node(this)?;
    let offset = Args::new("splitText", args).index(0)?;
    Ok(ctx.tree_mut().split_text(node, offset)?.into())
}

// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)

fn document_type() -> InterfaceTable {
    InterfaceTable::new(Interface::DocumentType, Some(Interface::Node)).with_members([
        Member::readonly("name", |ctx, this| {
            Ok(Value::from(doctype_data(ctx, this)?.name.as_str()))
        }),
        Member::readonly("publicId", |ctx, this| {
            Ok(Value::from(doctype_data(ctx, this)?.public_id.as_str()))
        }),
        Member::readonly("systemId", |ctx, this| {
            Ok(Value::from(doctype_data(ctx, this)?.system_id.as_str()))
        }),
    ])
}

fn doctype_data<'a>(ctx: &'a Scope<'_>, this: ObjectRef) -> BindingResult<&'a DocumentTypeData> {
    let node = ctx.node(this)?;
    match ctx.tree().get(node).map(Node::node_type) {
        Some(NodeType::DocumentType(data)) => Ok(data),
        _ => Err(DomError::WrongNodeType {
            node,
            expected: "doctype",
        }
        .into()),
    }
}

// [§ 4.2.6 Mixin ParentNode](https://dom.spec.whatwg.org/#interface-parentnode)

fn parent_node_members() -> [Member; 4] {
    [
        Member::readonly("children", |ctx, this| {
            let node = ctx.node(this)?;
            Ok(ctx.tree().element_children(node).collect::<Vec<_>>().into())
        }),
        Member::readonly("firstElementChild", |ctx, this| {
            Ok(ctx.tree().first_element_child(ctx.node(this)?).into())
        }),
        Member::readonly("lastElementChild", |ctx, this| {
            Ok(ctx.tree().last_element_child(ctx.node(this)?).into())
        }),
        Member::readonly("childElementCount", |ctx, this| {
            Ok(ctx.tree().child_element_count(ctx.node(this)?).into())
        }),
    ]
}

/// `getElementsBy*`, shared by documents and elements.
fn collection_members() -> [Member; 3] {
    [
        Member::method("getElementsByTagName", |ctx, this, args| {
            let root = ctx.node(this)?;
            let name = Args::new("getElementsByTagName", args).string(0)?;
            Ok(ctx.tree().get_elements_by_tag_name(root, &name).into())
        }),
        Member::method("getElementsByTagNameNS", |ctx, this, args| {
            let root = ctx.node(this)?;
            let args = Args::new("getElementsByTagNameNS", args);
            let (namespace, local_name) = (args.optional_string(0)?, args.string(1)?);
            Ok(ctx
                .tree()
                .get_elements_by_tag_name_ns(root, namespace.as_deref(), &local_name)
                .into())
        }),
        Member::method("getElementsByClassName", |ctx, this, args| {
            let root = ctx.node(this)?;
            let names = Args::new("getElementsByClassName", args).string(0)?;
            Ok(ctx.tree().get_elements_by_class_name(root, &names).into())
        }),
    ]
}

// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)

fn element() -> InterfaceTable {
    InterfaceTable::new(Interface::Element, Some(Interface::Node))
        .with_members([
            Member::readonly("tagName", |ctx, this| {
                Ok(Value::String(element_data(ctx, this)?.tag_name()))
            }),
            Member::readonly("localName", |ctx, this| {
                Ok(Value::from(element_data(ctx, this)?.local_name()))
            }),
            Member::readonly("namespaceURI", |ctx, this| {
                Ok(element_data(ctx, this)?
                    .namespace()
                    .map_or(Value::Null, Value::from))
            }),
            Member::readonly("prefix", |ctx, this| {
                Ok(element_data(ctx, this)?
                    .prefix()
                    .map_or(Value::Null, Value::from))
            }),
            Member::reflect("id", "id"),
            Member::reflect("className", "class"),
            Member::readonly("previousElementSibling", |ctx, this| {
                Ok(ctx.tree().previous_element_sibling(ctx.node(this)?).into())
            }),
            Member::readonly("nextElementSibling", |ctx, this| {
                Ok(ctx.tree().next_element_sibling(ctx.node(this)?).into())
            }),
            Member::method("hasAttributes", |ctx, this, _| {
                Ok(Value::Bool(!element_data(ctx, this)?.attrs().is_empty()))
            }),
            Member::method("getAttributeNames", |ctx, this, _| {
                let element = ctx.node(this)?;
                Ok(Value::List(
                    ctx.tree()
                        .attribute_names(element)
                        .into_iter()
                        .map(Value::String)
                        .collect(),
                ))
            }),
            Member::method("getAttribute", element_get_attribute),
            Member::method("getAttributeNS", element_get_attribute_ns),
            Member::method("hasAttribute", |ctx, this, args| {
                let element = ctx.node(this)?;
                let name = Args::new("hasAttribute", args).string(0)?;
                Ok(Value::Bool(ctx.tree().has_attribute(element, &name)))
            }),
            Member::method("setAttribute", element_set_attribute),
            Member::method("setAttributeNS", element_set_attribute_ns),
            Member::method("removeAttribute", |ctx, this, args| {
                let element = ctx.node(this)?;
                let name = Args::new("removeAttribute", args).string(0)?;
                ctx.tree_mut().remove_attribute(element, &name)?;
                Ok(Value::Undefined)
            }),
            Member::method("removeAttributeNS", |ctx, this, args| {
                let element = ctx.node(this)?;
                let args = Args::new("removeAttributeNS", args);
                let (namespace, local_name) = (args.optional_string(0)?, args.string(1)?);
                ctx.tree_mut()
                    .remove_attribute_ns(element, namespace.as_deref(), &local_name)?;
                Ok(Value::Undefined)
            }),
            Member::method("toggleAttribute", |ctx, this, args| {
                let element = ctx.node(this)?;
                let args = Args::new("toggleAttribute", args);
                let name = args.string(0)?;
                let force = args.optional_bool(1);
                Ok(Value::Bool(
                    ctx.tree_mut().toggle_attribute(element, &name, force)?,
                ))
            }),
        ])
        .with_members(parent_node_members())
        .with_members(collection_members())
}

fn element_data<'a>(ctx: &'a Scope<'_>, this: ObjectRef) -> BindingResult<&'a ElementData> {
    Ok(ctx.tree().element_data(ctx.node(this)?)?)
}

fn element_get_attribute(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let element = ctx.node(this)?;
    let name = Args::new("getAttribute", args).string(0)?;
    Ok(ctx
        .tree()
        .get_attribute(element, &name)
        .map_or(Value::Null, Value::from))
}

fn element_get_attribute_ns(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let element = ctx.node(this)?;
    let args = Args::new("getAttributeNS", args);
    let (namespace, local_name) = (args.optional_string(0)?, args.string(1)?);
    Ok(ctx
        .tree()
        .get_attribute_ns(element, namespace.as_deref(), &local_name)
        .map_or(Value::Null, Value::from))
}

fn element_set_attribute(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let element = ctx.node(this)?;
    let args = Args::new("setAttribute", args);
    let (name, value) = (args.string(0)?, args.string(1)?);
    ctx.tree_mut().set_attribute(element, &name, &value)?;
    Ok(Value::Undefined)
}

fn element_set_attribute_ns(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let element = ctx.node(this)?;
    let args = Args::new("setAttributeNS", args);
    let namespace = args.optional_string(0)?;
    let (name, value) = (args.string(1)?, args.string(2)?);
    ctx.tree_mut()
        .set_attribute_ns(element, namespace.as_deref(), &name, &value)?;
    Ok(Value::Undefined)
}

// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)

fn document() -> InterfaceTable {
    InterfaceTable::new(Interface::Document, Some(Interface::Node))
        .with_members([
            Member::readonly("documentElement", |ctx, this| {
                Ok(ctx.tree().document_element(ctx.node(this)?).into())
            }),
            Member::readonly("doctype", |ctx, this| {
                Ok(ctx.tree().doctype(ctx.node(this)?).into())
            }),
            Member::readonly("head", |ctx, this| {
                Ok(ctx.tree().head(ctx.node(this)?).into())
            }),
            Member::readonly("body", |ctx, this| {
                Ok(ctx.tree().body(ctx.node(this)?).into())
            }),
            Member::readonly("title", |ctx, this| {
                let document = ctx.node(this)?;
                Ok(Value::String(ctx.tree().title(document).unwrap_or_default()))
            }),
            Member::method("createElement", |ctx, this, args| {
                let document = ctx.node(this)?;
                let name = Args::new("createElement", args).string(0)?;
                Ok(ctx.tree_mut().create_element(document, &name)?.into())
            }),
            Member::method("createElementNS", |ctx, this, args| {
                let document = ctx.node(this)?;
                let args = Args::new("createElementNS", args);
                let (namespace, name) = (args.optional_string(0)?, args.string(1)?);
                Ok(ctx
                    .tree_mut()
                    .create_element_ns(document, namespace.as_deref(), &name)?
                    .into())
            }),
            Member::method("createTextNode", |ctx, this, args| {
                let document = ctx.node(this)?;
                let data = Args::new("createTextNode", args).string(0)?;
                Ok(ctx.tree_mut().create_text_node(document, &data)?.into())
            }),
            Member::method("createComment", |ctx, this, args| {
                let document = ctx.node(this)?;
                let data = Args::new("createComment", args).string(0)?;
                Ok(ctx.tree_mut().create_comment(document, &data)?.into())
            }),
            Member::method("createEvent", document_create_event),
            Member::method("getElementById", |ctx, this, args| {
                let document = ctx.node(this)?;
                let id = Args::new("getElementById", args).string(0)?;
                Ok(ctx.tree().get_element_by_id(document, &id).into())
            }),
            Member::method("importNode", |ctx, this, args| {
                let document = ctx.node(this)?;
                let args = Args::new("importNode", args);
                let (node, deep) = (args.node(0)?, args.bool_or(1, false));
                Ok(ctx.tree_mut().import_node(document, node, deep)?.into())
            }),
            Member::method("adoptNode", |ctx, this, args| {
                let document = ctx.node(this)?;
                let node = Args::new("adoptNode", args).node(0)?;
                Ok(ctx.tree_mut().adopt_node(document, node)?.into())
            }),
        ])
        .with_members(parent_node_members())
        .with_members(collection_members())
}

/// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-createevent)
///
/// Only the plain `Event` interface is supported. The event starts
/// uninitialized and must go through `initEvent` before dispatch.
fn document_create_event(
    ctx: &mut Scope<'_>,
    this: ObjectRef,
    args: &[Value],
) -> BindingResult<Value> {
    let _ = ctx.node(this)?;
    let interface = Args::new("createEvent", args).string(0)?;
    if !["event", "events", "htmlevents"]
        .iter()
        .any(|name| interface.eq_ignore_ascii_case(name))
    {
        return Err(DomError::NotSupported("createEvent interface").into());
    }
    Ok(ctx.create_event(Event::uninitialized()).into())
}

// [§ 2.2 Interface Event](https://dom.spec.whatwg.org/#interface-event)

fn event() -> InterfaceTable {
    InterfaceTable::new(Interface::Event, None).with_members([
        Member::readonly("type", |ctx, this| {
            ctx.with_event(this, |event| Value::from(event.event_type()))
        }),
        Member::readonly("bubbles", |ctx, this| {
            Ok(Value::Bool(ctx.with_event(this, Event::bubbles)?))
        }),
        Member::readonly("cancelable", |ctx, this| {
            Ok(Value::Bool(ctx.with_event(this, Event::cancelable)?))
        }),
        Member::readonly("target", |ctx, this| {
            Ok(ctx.with_event(this, Event::target)?.into())
        }),
        Member::readonly("currentTarget", |ctx, this| {
            Ok(ctx.with_event(this, Event::current_target)?.into())
        }),
        Member::readonly("eventPhase", |ctx, this| {
            Ok(Value::Number(f64::from(
                ctx.with_event(this, Event::event_phase)?.code(),
            )))
        }),
        Member::readonly("defaultPrevented", |ctx, this| {
            Ok(Value::Bool(ctx.with_event(this, Event::default_prevented)?))
        }),
        Member::readonly("isTrusted", |ctx, this| {
            Ok(Value::Bool(ctx.with_event(this, Event::is_trusted)?))
        }),
        Member::readonly("timeStamp", |ctx, this| {
            Ok(Value::Number(ctx.with_event(this, Event::time_stamp)?))
        }),
        Member::method("initEvent", |ctx, this, args| {
            let args = Args::new("initEvent", args);
            let event_type = args.string(0)?;
            let (bubbles, cancelable) = (args.bool_or(1, false), args.bool_or(2, false));
            ctx.with_event_mut(this, |event| {
                event.init_event(&event_type, bubbles, cancelable);
            })?;
            Ok(Value::Undefined)
        }),
        Member::method("preventDefault", |ctx, this, _| {
            ctx.with_event_mut(this, Event::prevent_default)?;
            Ok(Value::Undefined)
        }),
        Member::method("stopPropagation", |ctx, this, _| {
            ctx.with_event_mut(this, Event::stop_propagation)?;
            Ok(Value::Undefined)
        }),
        Member::method("stopImmediatePropagation", |ctx, this, _| {
            ctx.with_event_mut(this, Event::stop_immediate_propagation)?;
            Ok(Value::Undefined)
        }),
    ])
}
