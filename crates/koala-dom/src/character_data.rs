//! Text and comment data operations.
//!
//! [§ 4.10 Interface CharacterData](https://dom.spec.whatwg.org/#interface-characterdata)
//!
//! Offsets and counts are in UTF-16 code units, as scripts see them. An
//! offset that would split a surrogate pair is rejected with `IndexSize`.

use std::ops::Range;

use crate::error::{DomError, DomResult};
use crate::event::{DOM_CHARACTER_DATA_MODIFIED, Event, MutationDetail};
use crate::mutation::{MutationRecord, PendingEvent};
use crate::node::NodeType;
use crate::{DomTree, NodeId};

/// Length of `data` in UTF-16 code units.
fn utf16_len(data: &str) -> usize {
    data.chars().map(char::len_utf16).sum()
}

/// Byte index of the UTF-16 `offset` in `data`, if it falls on a character
/// boundary.
fn byte_index(data: &str, offset: usize) -> Option<usize> {
    let mut units = 0;
    for (index, c) in data.char_indices() {
        if units == offset {
            return Some(index);
        }
        if units > offset {
            return None;
        }
        units += c.len_utf16();
    }
    (units == offset).then_some(data.len())
}

impl DomTree {
    fn character_data_of(&self, node: NodeId) -> DomResult<&str> {
        self.node(node)?
            .character_data()
            .ok_or(DomError::WrongNodeType {
                node,
                expected: "text or comment",
            })
    }

    /// Resolve a UTF-16 (offset, count) pair to a byte range, clamping
    /// `count` to the end of the data.
    fn byte_range(data: &str, offset: usize, count: usize) -> DomResult<(usize, usize)> {
        let length = utf16_len(data);
        // "If offset is greater than length, then throw an IndexSizeError."
        if offset > length {
            return Err(DomError::IndexSize { offset, length });
        }
        // "If offset plus count is greater than length, then set count to
        //  length minus offset."
        let end = offset + count.min(length - offset);
        let start_byte = byte_index(data, offset).ok_or(DomError::IndexSize { offset, length })?;
        let end_byte = byte_index(data, end).ok_or(DomError::IndexSize {
            offset: end,
            length,
        })?;
        Ok((start_byte, end_byte))
    }

    /// "data"
    ///
    /// # Errors
    ///
    /// `WrongNodeType` unless `node` is a text or comment node.
    pub fn data(&self, node: NodeId) -> DomResult<&str> {
        self.character_data_of(node)
    }

    /// "length", in UTF-16 code units.
    ///
    /// # Errors
    ///
    /// `WrongNodeType` unless `node` is a text or comment node.
    pub fn length(&self, node: NodeId) -> DomResult<usize> {
        self.character_data_of(node).map(utf16_len)
    }

    /// [§ 4.10](https://dom.spec.whatwg.org/#concept-cd-substring)
    ///
    /// # Errors
    ///
    /// `IndexSize` if `offset` is past the end; `WrongNodeType` unless
    /// `node` is a text or comment node.
    pub fn substring_data(&self, node: NodeId, offset: usize, count: usize) -> DomResult<String> {
        let data = self.character_data_of(node)?;
        let (start, end) = Self::byte_range(data, offset, count)?;
        Ok(data[start..end].to_string())
    }

    /// [§ 4.10](https://dom.spec.whatwg.org/#concept-cd-replace)
    ///
    /// "To replace data of node node with offset offset, count count, and
    /// data data..."
    ///
    /// # Errors
    ///
    /// `IndexSize` if `offset` is past the end; `WrongNodeType` unless
    /// `node` is a text or comment node.
    pub fn replace_data(
        &mut self,
        node: NodeId,
        offset: usize,
        count: usize,
        data: &str,
    ) -> DomResult<()> {
        let (start, end) = Self::byte_range(self.character_data_of(node)?, offset, count)?;
        let mut pending = Vec::new();
        self.replace_data_queued(node, start..end, data, &mut pending);
        self.flush_mutation_events(pending);
        Ok(())
    }

    /// Splice `data` over the byte `range` of `node`'s data, notifying
    /// observers and queueing `DOMCharacterDataModified`. The range must
    /// already have been resolved by `byte_range`.
    pub(crate) fn replace_data_queued(
        &mut self,
        node: NodeId,
        range: Range<usize>,
        data: &str,
        pending: &mut Vec<PendingEvent>,
    ) {
        let Some(current) = self.slot_mut(node).character_data_mut() else {
            return;
        };
        let old_value = current.clone();
        current.replace_range(range, data);
        let new_value = current.clone();

        self.notify(&MutationRecord::CharacterData {
            target: node,
            old_value: old_value.clone(),
        });
        if self.wants_mutation_event(DOM_CHARACTER_DATA_MODIFIED) {
            let detail = MutationDetail {
                prev_value: Some(old_value),
                new_value: Some(new_value),
                ..MutationDetail::default()
            };
            let event = Event::mutation(DOM_CHARACTER_DATA_MODIFIED, true, detail);
            pending.push(PendingEvent::at(node, event));
        }
    }

    /// Replace the whole data.
    ///
    /// # Errors
    ///
    /// `WrongNodeType` unless `node` is a text or comment node.
    pub fn set_data(&mut self, node: NodeId, data: &str) -> DomResult<()> {
        let length = self.length(node)?;
        self.replace_data(node, 0, length, data)
    }

    /// [§ 4.10](https://dom.spec.whatwg.org/#dom-characterdata-appenddata)
    ///
    /// # Errors
    ///
    /// `WrongNodeType` unless `node` is a text or comment node.
    pub fn append_data(&mut self, node: NodeId, data: &str) -> DomResult<()> {
        let length = self.length(node)?;
        self.replace_data(node, length, 0, data)
    }

    /// [§ 4.10](https://dom.spec.whatwg.org/#dom-characterdata-insertdata)
    ///
    /// # Errors
    ///
    /// `IndexSize` if `offset` is past the end; `WrongNodeType` unless
    /// `node` is a text or comment node.
    pub fn insert_data(&mut self, node: NodeId, offset: usize, data: &str) -> DomResult<()> {
        self.replace_data(node, offset, 0, data)
    }

    /// [§ 4.10](https://dom.spec.whatwg.org/#dom-characterdata-deletedata)
    ///
    /// # Errors
    ///
    /// `IndexSize` if `offset` is past the end; `WrongNodeType` unless
    /// `node` is a text or comment node.
    pub fn delete_data(&mut self, node: NodeId, offset: usize, count: usize) -> DomResult<()> {
        self.replace_data(node, offset, count, "")
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-nodevalue)
    ///
    /// Sets the data of text and comment nodes (`None` means the empty
    /// string); a no-op for other nodes.
    ///
    /// # Errors
    ///
    /// `NoSuchNode` if `node` is not live.
    pub fn set_node_value(&mut self, node: NodeId, value: Option<&str>) -> DomResult<()> {
        if self.node(node)?.character_data().is_some() {
            self.set_data(node, value.unwrap_or_default())
        } else {
            Ok(())
        }
    }

    /// [§ 4.11](https://dom.spec.whatwg.org/#concept-text-split)
    ///
    /// "To split a Text node node with offset offset..." The new node holds
    /// the data after `offset` and is inserted after `node` if it has a
    /// parent. Returns the new node.
    ///
    /// # Errors
    ///
    /// `IndexSize` if `offset` is past the end; `WrongNodeType` unless
    /// `node` is a text node.
    pub fn split_text(&mut self, node: NodeId, offset: usize) -> DomResult<NodeId> {
        if self.as_text(node).is_none() {
            let _ = self.node(node)?;
            return Err(DomError::WrongNodeType {
                node,
                expected: "text",
            });
        }

        // STEP 1-4: "Let length be node's length. If offset is greater than
        //            length, then throw. Let count be length minus offset.
        //            Let new data be the result of substringing data..."
        let data = self.character_data_of(node)?;
        let (start, end) = Self::byte_range(data, offset, utf16_len(data))?;
        let new_data = data[start..end].to_string();

        // STEP 5: "Let new node be a new Text node, with the same node
        //          document as node. Set new node's data to new data."
        let owner = self.owner_document(node);
        let new_node = self.alloc(NodeType::Text(new_data), owner);

        // Both steps below commit before any mutation event fires.
        let mut pending = Vec::new();

        // STEP 7: "If parent is not null, then insert new node into parent
        //          before node's next sibling."
        if let Some(parent) = self.parent(node) {
            let next = self.next_sibling(node);
            self.insert_committed(parent, new_node, next, &mut pending);
        }

        // STEP 8: "Replace data with node node, offset offset, count count,
        //          and data the empty string."
        self.replace_data_queued(node, start..end, "", &mut pending);
        self.flush_mutation_events(pending);
        Ok(new_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_index_counts_utf16_units() {
        let data = "a\u{1F600}b";
        assert_eq!(utf16_len(data), 4);
        assert_eq!(byte_index(data, 0), Some(0));
        assert_eq!(byte_index(data, 1), Some(1));
        assert_eq!(byte_index(data, 2), None);
        assert_eq!(byte_index(data, 3), Some(5));
        assert_eq!(byte_index(data, 4), Some(6));
        assert_eq!(byte_index(data, 5), None);
    }

    #[test]
    fn test_replace_data_clamps_count() {
        let mut tree = DomTree::new();
        let text = tree.create_text_node(NodeId::ROOT, "hello world").unwrap();
        tree.replace_data(text, 5, 100, "!").unwrap();
        assert_eq!(tree.data(text).unwrap(), "hello!");
        assert_eq!(
            tree.insert_data(text, 7, "x"),
            Err(DomError::IndexSize {
                offset: 7,
                length: 6
            })
        );
    }

    #[test]
    fn test_surrogate_split_is_rejected() {
        let mut tree = DomTree::new();
        let text = tree.create_text_node(NodeId::ROOT, "\u{1F600}").unwrap();
        assert_eq!(tree.length(text).unwrap(), 2);
        assert!(matches!(
            tree.insert_data(text, 1, "x"),
            Err(DomError::IndexSize { .. })
        ));
        assert_eq!(tree.data(text).unwrap(), "\u{1F600}");
    }

    #[test]
    fn test_split_text_inserts_after() {
        let mut tree = DomTree::new();
        let p = tree.create_element(NodeId::ROOT, "p").unwrap();
        let text = tree.create_text_node(NodeId::ROOT, "foobar").unwrap();
        let tail = tree.create_comment(NodeId::ROOT, "end").unwrap();
        let _ = tree.append_child(p, text).unwrap();
        let _ = tree.append_child(p, tail).unwrap();

        let second = tree.split_text(text, 3).unwrap();
        assert_eq!(tree.data(text).unwrap(), "foo");
        assert_eq!(tree.data(second).unwrap(), "bar");
        assert_eq!(tree.children(p).collect::<Vec<_>>(), vec![text, second, tail]);
    }
}
