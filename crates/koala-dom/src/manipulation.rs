//! Tree mutation algorithms.
//!
//! [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
//!
//! Every public mutation validates first and only then touches links, so a
//! returned `Err` means the tree is exactly as it was. Observers are told
//! about each committed change immediately; legacy mutation events are
//! dispatched after the whole operation has committed.

use crate::error::{DomError, DomResult, HierarchyViolation};
use crate::mutation::{MutationRecord, PendingEvent};
use crate::node::{NodeKind, NodeType};
use crate::{DomTree, NodeId};

/// The neighbours a node had before it was unlinked.
struct Unlinked {
    parent: NodeId,
    previous_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl DomTree {
    fn kind_of(&self, id: NodeId) -> DomResult<NodeKind> {
        self.node(id).map(|n| n.kind())
    }

    fn has_child_of_kind(&self, parent: NodeId, kind: NodeKind) -> bool {
        self.children(parent)
            .any(|c| self.node_kind(c) == Some(kind))
    }

    /// Steps shared by pre-insertion and replacement validity: parent kind,
    /// cycles, reference child, and node kind.
    fn ensure_insertable(
        &self,
        node: NodeId,
        parent: NodeId,
        child: Option<NodeId>,
    ) -> DomResult<(NodeKind, NodeKind)> {
        let parent_kind = self.kind_of(parent)?;
        let node_kind = self.kind_of(node)?;
        if let Some(child) = child {
            let _ = self.node(child)?;
        }

        // STEP 1: "If parent is not a Document, DocumentFragment, or Element
        //          node, then throw a HierarchyRequestError."
        if !parent_kind.can_have_children() {
            return Err(HierarchyViolation::ParentCannotHaveChildren.into());
        }

        // STEP 2: "If node is a host-including inclusive ancestor of parent,
        //          then throw a HierarchyRequestError."
        if node == parent || self.is_descendant_of(parent, node) {
            return Err(HierarchyViolation::Cycle.into());
        }

        // STEP 3: "If child is non-null and its parent is not parent, then
        //          throw a NotFoundError."
        if let Some(child) = child
            && self.parent(child) != Some(parent)
        {
            return Err(DomError::NotFound("the reference node is not a child of this node"));
        }

        // STEP 4: "If node is not a DocumentFragment, DocumentType, Element,
        //          or CharacterData node, then throw a HierarchyRequestError."
        if node_kind == NodeKind::Document {
            return Err(HierarchyViolation::DocumentInserted.into());
        }

        // STEP 5: "If either node is a Text node and parent is a document, or
        //          node is a doctype and parent is not a document, then throw
        //          a HierarchyRequestError."
        if node_kind == NodeKind::Text && parent_kind == NodeKind::Document {
            return Err(HierarchyViolation::TextInDocument.into());
        }
        if node_kind == NodeKind::DocumentType && parent_kind != NodeKind::Document {
            return Err(HierarchyViolation::DoctypeOutsideDocument.into());
        }

        Ok((node_kind, parent_kind))
    }

    /// Whether a node of `kind` appears after `child` among its siblings.
    fn kind_follows(&self, child: NodeId, kind: NodeKind) -> bool {
        let mut current = self.next_sibling(child);
        while let Some(sibling) = current {
            if self.node_kind(sibling) == Some(kind) {
                return true;
            }
            current = self.next_sibling(sibling);
        }
        false
    }

    /// Whether a node of `kind` appears before `child` among its siblings.
    fn kind_precedes(&self, child: NodeId, kind: NodeKind) -> bool {
        self.preceding_siblings(child)
            .any(|s| self.node_kind(s) == Some(kind))
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
    ///
    /// "To ensure pre-insertion validity of a node into a parent before a
    /// child..."
    ///
    /// # Errors
    ///
    /// The `HierarchyRequest`, `NotFound` or `NoSuchNode` error that
    /// inserting would raise.
    pub fn ensure_pre_insertion_validity(
        &self,
        node: NodeId,
        parent: NodeId,
        child: Option<NodeId>,
    ) -> DomResult<()> {
        let (node_kind, parent_kind) = self.ensure_insertable(node, parent, child)?;

        // STEP 6: "If parent is a document, and any of the statements below,
        //          switched on the interface node implements, are true, then
        //          throw a HierarchyRequestError."
        if parent_kind != NodeKind::Document {
            return Ok(());
        }
        match node_kind {
            // "parent has an element child, child is a doctype, or child is
            //  non-null and a doctype is following child."
            NodeKind::Element => {
                if self.has_child_of_kind(parent, NodeKind::Element) {
                    return Err(HierarchyViolation::DuplicateDocumentElement.into());
                }
                if let Some(child) = child
                    && (self.node_kind(child) == Some(NodeKind::DocumentType)
                        || self.kind_follows(child, NodeKind::DocumentType))
                {
                    return Err(HierarchyViolation::ElementBeforeDoctype.into());
                }
            }
            // "parent has a doctype child, child is non-null and an element
            //  is preceding child, or child is null and parent has an element
            //  child."
            NodeKind::DocumentType => {
                if self.has_child_of_kind(parent, NodeKind::DocumentType) {
                    return Err(HierarchyViolation::DuplicateDoctype.into());
                }
                let element_before = match child {
                    Some(child) => self.kind_precedes(child, NodeKind::Element),
                    None => self.has_child_of_kind(parent, NodeKind::Element),
                };
                if element_before {
                    return Err(HierarchyViolation::DoctypeAfterElement.into());
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-replace) steps 1-6.
    fn ensure_replace_validity(&self, node: NodeId, child: NodeId, parent: NodeId) -> DomResult<()> {
        let (node_kind, parent_kind) = self.ensure_insertable(node, parent, Some(child))?;
        if parent_kind != NodeKind::Document {
            return Ok(());
        }
        let other_child_of_kind = |kind: NodeKind| {
            self.children(parent)
                .any(|c| c != child && self.node_kind(c) == Some(kind))
        };
        match node_kind {
            // "parent has an element child that is not child or a doctype is
            //  following child."
            NodeKind::Element => {
                if other_child_of_kind(NodeKind::Element) {
                    return Err(HierarchyViolation::DuplicateDocumentElement.into());
                }
                if self.kind_follows(child, NodeKind::DocumentType) {
                    return Err(HierarchyViolation::ElementBeforeDoctype.into());
                }
            }
            // "parent has a doctype child that is not child, or an element is
            //  preceding child."
            NodeKind::DocumentType => {
                if other_child_of_kind(NodeKind::DocumentType) {
                    return Err(HierarchyViolation::DuplicateDoctype.into());
                }
                if self.kind_precedes(child, NodeKind::Element) {
                    return Err(HierarchyViolation::DoctypeAfterElement.into());
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Splice `node` out of its parent's child list. The node keeps its
    /// subtree and becomes the root of its own tree.
    fn unlink(&mut self, node: NodeId) -> Option<Unlinked> {
        let parent = self.parent(node)?;
        let previous_sibling = self.prev_sibling(node);
        let next_sibling = self.next_sibling(node);

        match previous_sibling {
            Some(prev) => self.slot_mut(prev).next_sibling = next_sibling,
            None => self.slot_mut(parent).first_child = next_sibling,
        }
        match next_sibling {
            Some(next) => self.slot_mut(next).prev_sibling = previous_sibling,
            None => self.slot_mut(parent).last_child = previous_sibling,
        }
        self.slot_mut(parent).child_count -= 1;

        let detached = self.slot_mut(node);
        detached.parent = None;
        detached.prev_sibling = None;
        detached.next_sibling = None;

        Some(Unlinked {
            parent,
            previous_sibling,
            next_sibling,
        })
    }

    /// Splice a detached `node` into `parent` before `reference`, or at the
    /// end when `reference` is `None`.
    fn link(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        let previous = match reference {
            Some(reference) => self.prev_sibling(reference),
            None => self.last_child(parent),
        };

        let linked = self.slot_mut(node);
        linked.parent = Some(parent);
        linked.prev_sibling = previous;
        linked.next_sibling = reference;

        match previous {
            Some(prev) => self.slot_mut(prev).next_sibling = Some(node),
            None => self.slot_mut(parent).first_child = Some(node),
        }
        match reference {
            Some(reference) => self.slot_mut(reference).prev_sibling = Some(node),
            None => self.slot_mut(parent).last_child = Some(node),
        }
        self.slot_mut(parent).child_count += 1;
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Unlink `node` if it has a parent, notifying observers and queueing
    /// mutation events.
    fn remove_queued(&mut self, node: NodeId, pending: &mut Vec<PendingEvent>) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        self.queue_removed(node, parent, pending);
        if let Some(unlinked) = self.unlink(node) {
            self.notify(&MutationRecord::ChildList {
                target: unlinked.parent,
                added: Vec::new(),
                removed: vec![node],
                previous_sibling: unlinked.previous_sibling,
                next_sibling: unlinked.next_sibling,
            });
            self.queue_subtree_modified(unlinked.parent, pending);
        }
    }

    /// Set the node document of `node` and its descendants.
    fn stamp_document(&mut self, node: NodeId, document: NodeId) {
        if self.owner_document(node) == Some(document) {
            return;
        }
        let subtree: Vec<NodeId> = std::iter::once(node)
            .chain(self.descendants(node))
            .collect();
        for id in subtree {
            self.slot_mut(id).owner_document = Some(document);
        }
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#concept-node-adopt)
    ///
    /// "1. Let oldDocument be node's node document.
    ///  2. If node's parent is non-null, then remove node.
    ///  3. If document is not oldDocument, then for each inclusiveDescendant
    ///     in node's shadow-including inclusive descendants: set
    ///     inclusiveDescendant's node document to document."
    fn adopt_queued(&mut self, document: NodeId, node: NodeId, pending: &mut Vec<PendingEvent>) {
        self.remove_queued(node, pending);
        self.stamp_document(node, document);
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Adopt `node` into `parent`'s node document and link it before
    /// `reference`. Validity must already have been ensured.
    fn insert_queued(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
        pending: &mut Vec<PendingEvent>,
    ) {
        if let Some(document) = self.node_document(parent) {
            self.adopt_queued(document, node, pending);
        } else {
            self.remove_queued(node, pending);
        }
        self.link(parent, node, reference);
        self.queue_inserted(node, parent, pending);
    }

    /// Insert `node` as a complete childList mutation: link it, notify
    /// observers and queue `DOMSubtreeModified` for `parent`.
    pub(crate) fn insert_committed(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
        pending: &mut Vec<PendingEvent>,
    ) {
        self.insert_queued(parent, node, reference, pending);
        self.notify(&MutationRecord::ChildList {
            target: parent,
            added: vec![node],
            removed: Vec::new(),
            previous_sibling: self.prev_sibling(node),
            next_sibling: reference,
        });
        self.queue_subtree_modified(parent, pending);
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `node` as the last child of `parent`, first removing it from
    /// any parent it already has. Returns `node`.
    ///
    /// # Errors
    ///
    /// See [`DomTree::ensure_pre_insertion_validity`].
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, node, None)
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// "To pre-insert a node into a parent before a child..."
    ///
    /// Inserts `node` before `child`, or at the end when `child` is `None`.
    /// Returns `node`.
    ///
    /// # Errors
    ///
    /// See [`DomTree::ensure_pre_insertion_validity`].
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> DomResult<NodeId> {
        // STEP 1: "Ensure pre-insertion validity of node into parent before child."
        self.ensure_pre_insertion_validity(node, parent, child)?;

        // STEP 2-3: "Let referenceChild be child. If referenceChild is node,
        //            then set referenceChild to node's next sibling."
        let reference = if child == Some(node) {
            self.next_sibling(node)
        } else {
            child
        };

        // STEP 4: "Insert node into parent before referenceChild."
        let mut pending = Vec::new();
        self.insert_committed(parent, node, reference, &mut pending);
        self.flush_mutation_events(pending);

        // STEP 5: "Return node."
        Ok(node)
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-pre-remove)
    ///
    /// "To pre-remove a child from a parent..." Returns the removed child,
    /// which keeps its subtree.
    ///
    /// # Errors
    ///
    /// `NotFound` if `child`'s parent is not `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        let _ = self.node(parent)?;
        let _ = self.node(child)?;

        // STEP 1: "If child's parent is not parent, then throw a NotFoundError."
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound("the node to remove is not a child of this node"));
        }

        // STEP 2: "Remove child."
        let mut pending = Vec::new();
        self.remove_queued(child, &mut pending);
        self.flush_mutation_events(pending);

        // STEP 3: "Return child."
        Ok(child)
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-replace)
    ///
    /// "To replace a child with node within a parent..." Returns the replaced
    /// child.
    ///
    /// # Errors
    ///
    /// The same errors as removal and insertion, checked before anything
    /// changes.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: NodeId,
    ) -> DomResult<NodeId> {
        self.ensure_replace_validity(node, child, parent)?;
        if node == child {
            return Ok(child);
        }

        // STEP 7-8: "Let referenceChild be child's next sibling. If
        //            referenceChild is node, then set referenceChild to
        //            node's next sibling."
        let mut reference = self.next_sibling(child);
        if reference == Some(node) {
            reference = self.next_sibling(node);
        }

        let mut pending = Vec::new();

        // STEP 12: "If child's parent is non-null: ... remove child with the
        //           suppress observers flag set."
        self.queue_removed(child, parent, &mut pending);
        let _ = self.unlink(child);

        // STEP 13-14: insert node before referenceChild, suppressing observers.
        self.insert_queued(parent, node, reference, &mut pending);

        // STEP 15: "Queue a tree mutation record for parent with nodes,
        //           removedNodes, previousSibling, and referenceChild."
        self.notify(&MutationRecord::ChildList {
            target: parent,
            added: vec![node],
            removed: vec![child],
            previous_sibling: self.prev_sibling(node),
            next_sibling: reference,
        });
        self.queue_subtree_modified(parent, &mut pending);
        self.flush_mutation_events(pending);

        // STEP 16: "Return child."
        Ok(child)
    }

    /// Replace all children of `parent` with `node` (or nothing), as one
    /// mutation.
    ///
    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-replace-all)
    fn replace_all(&mut self, parent: NodeId, node: Option<NodeId>) {
        let removed: Vec<NodeId> = self.children(parent).collect();
        if removed.is_empty() && node.is_none() {
            return;
        }
        let mut pending = Vec::new();
        for &child in &removed {
            self.queue_removed(child, parent, &mut pending);
            let _ = self.unlink(child);
        }
        let added: Vec<NodeId> = node.into_iter().collect();
        for &child in &added {
            self.insert_queued(parent, child, None, &mut pending);
        }
        self.notify(&MutationRecord::ChildList {
            target: parent,
            added,
            removed,
            previous_sibling: None,
            next_sibling: None,
        });
        self.queue_subtree_modified(parent, &mut pending);
        self.flush_mutation_events(pending);
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// Elements have their children replaced by a single text node (none for
    /// an empty string); text and comments have their data replaced;
    /// documents and doctypes are left alone.
    ///
    /// # Errors
    ///
    /// `NoSuchNode` if `node` is not live.
    pub fn set_text_content(&mut self, node: NodeId, value: &str) -> DomResult<()> {
        match self.kind_of(node)? {
            NodeKind::Element => {
                let text = if value.is_empty() {
                    None
                } else {
                    let owner = self.owner_document(node);
                    Some(self.alloc(NodeType::Text(value.to_string()), owner))
                };
                self.replace_all(node, text);
                Ok(())
            }
            NodeKind::Text | NodeKind::Comment => self.set_data(node, value),
            NodeKind::Document | NodeKind::DocumentType => Ok(()),
        }
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-normalize)
    ///
    /// "The normalize() method steps are to run these steps for each
    /// descendant exclusive Text node node of this..." Empty text nodes are
    /// removed and runs of adjacent text nodes are merged into the first.
    ///
    /// # Errors
    ///
    /// `NoSuchNode` if `node` is not live.
    pub fn normalize(&mut self, node: NodeId) -> DomResult<()> {
        let _ = self.node(node)?;
        let texts: Vec<NodeId> = self
            .descendants(node)
            .filter(|&d| self.as_text(d).is_some())
            .collect();

        // Mutation events wait until the whole pass has committed.
        let mut pending = Vec::new();
        for text in texts {
            // Merged away earlier in this pass.
            if self.parent(text).is_none() {
                continue;
            }

            // STEP 2: "If length is zero, then remove node and continue."
            let Some(data) = self.as_text(text) else {
                continue;
            };
            if data.is_empty() {
                self.remove_queued(text, &mut pending);
                continue;
            }
            let end = data.len();

            // STEP 3-6: concatenate the data of contiguous following text
            //           nodes into node, then remove them.
            let mut merged = String::new();
            let mut followers = Vec::new();
            let mut current = self.next_sibling(text);
            while let Some(sibling) = current {
                let Some(data) = self.as_text(sibling) else {
                    break;
                };
                merged.push_str(data);
                followers.push(sibling);
                current = self.next_sibling(sibling);
            }
            if !merged.is_empty() {
                self.replace_data_queued(text, end..end, &merged, &mut pending);
            }
            for follower in followers {
                self.remove_queued(follower, &mut pending);
            }
        }
        self.flush_mutation_events(pending);
        Ok(())
    }

    /// Copy `node` (and its subtree when `deep`) into `document`. The copy
    /// is detached and has no listeners.
    fn clone_into(&mut self, node: NodeId, document: Option<NodeId>, deep: bool) -> NodeId {
        let node_type = self[node].node_type.clone();
        let is_document = matches!(node_type, NodeType::Document(_));
        let copy = self.alloc(node_type, if is_document { None } else { document });

        if deep {
            let child_document = if is_document { Some(copy) } else { document };
            let children: Vec<NodeId> = self.children(node).collect();
            for child in children {
                let child_copy = self.clone_into(child, child_document, true);
                self.link(copy, child_copy, None);
            }
        }
        copy
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-node-clone)
    ///
    /// Returns a new detached node of the same kind with the same data and
    /// attributes. When `deep`, children are cloned recursively in order.
    /// Event listeners are never copied.
    ///
    /// # Errors
    ///
    /// `NoSuchNode` if `node` is not live.
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> DomResult<NodeId> {
        let _ = self.node(node)?;
        let document = self.owner_document(node);
        Ok(self.clone_into(node, document, deep))
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-importnode)
    ///
    /// Clone `node` into `document`.
    ///
    /// # Errors
    ///
    /// `NotSupported` if `node` is a document; `WrongNodeType` if `document`
    /// is not a document.
    pub fn import_node(&mut self, document: NodeId, node: NodeId, deep: bool) -> DomResult<NodeId> {
        let _ = self.expect_document(document)?;
        if self.kind_of(node)? == NodeKind::Document {
            return Err(DomError::NotSupported("documents cannot be imported"));
        }
        Ok(self.clone_into(node, Some(document), deep))
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-adoptnode)
    ///
    /// Remove `node` from its parent and move it and its subtree into
    /// `document`. Returns `node`.
    ///
    /// # Errors
    ///
    /// `NotSupported` if `node` is a document; `WrongNodeType` if `document`
    /// is not a document.
    pub fn adopt_node(&mut self, document: NodeId, node: NodeId) -> DomResult<NodeId> {
        let _ = self.expect_document(document)?;
        if self.kind_of(node)? == NodeKind::Document {
            return Err(DomError::NotSupported("documents cannot be adopted"));
        }
        let mut pending = Vec::new();
        self.adopt_queued(document, node, &mut pending);
        self.flush_mutation_events(pending);
        Ok(node)
    }

    /// Free a detached subtree. Its ids stay dead: later lookups report
    /// `NoSuchNode`.
    ///
    /// # Errors
    ///
    /// `HierarchyRequest` if `node` still has a parent; `NotSupported` for
    /// documents.
    pub fn release(&mut self, node: NodeId) -> DomResult<()> {
        if self.kind_of(node)? == NodeKind::Document {
            return Err(DomError::NotSupported("documents cannot be released"));
        }
        if self.parent(node).is_some() {
            return Err(HierarchyViolation::ReleaseAttached.into());
        }
        let subtree: Vec<NodeId> = std::iter::once(node)
            .chain(self.descendants(node))
            .collect();
        for id in subtree {
            if let Some(released) = self.free(id) {
                for (event_type, count) in released.event_target.counts() {
                    self.forget_listeners(event_type, count);
                }
            }
        }
        Ok(())
    }
}
