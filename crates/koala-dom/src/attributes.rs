//! Element attribute storage.
//!
//! [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
//!
//! Attributes are kept in a small ordered list. Lookup by qualified name
//! returns the first match, as "get an attribute by name" does; lookup by
//! namespace and local name is exact.

/// A single attribute of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub(crate) namespace: Option<String>,
    pub(crate) prefix: Option<String>,
    pub(crate) local_name: String,
    pub(crate) value: String,
}

impl Attribute {
    /// The attribute's namespace URI.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The attribute's namespace prefix.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The attribute's local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// The attribute's value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// "An attribute's qualified name is its local name if its namespace
    /// prefix is null, and its namespace prefix, followed by ":", followed
    /// by its local name, otherwise."
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// Compare against a qualified name without allocating.
    fn has_qualified_name(&self, qualified_name: &str) -> bool {
        match &self.prefix {
            None => self.local_name == qualified_name,
            Some(prefix) => qualified_name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|local| local == self.local_name),
        }
    }
}

/// The ordered attribute list of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    attrs: Vec<Attribute>,
}

impl AttributeList {
    /// Create an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Iterate in list order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attrs.iter()
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#concept-element-attributes-get-by-name)
    ///
    /// "Return the first attribute in element's attribute list whose
    /// qualified name is qualifiedName; otherwise null."
    #[must_use]
    pub fn get(&self, qualified_name: &str) -> Option<&Attribute> {
        self.attrs
            .iter()
            .find(|attr| attr.has_qualified_name(qualified_name))
    }

    /// Value of the first attribute with the given qualified name.
    #[must_use]
    pub fn value(&self, qualified_name: &str) -> Option<&str> {
        self.get(qualified_name).map(Attribute::value)
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#concept-element-attributes-get-by-namespace)
    #[must_use]
    pub fn get_ns(&self, namespace: Option<&str>, local_name: &str) -> Option<&Attribute> {
        self.attrs
            .iter()
            .find(|attr| attr.namespace.as_deref() == namespace && attr.local_name == local_name)
    }

    /// Set by qualified name. Replaces the value of the first match or
    /// appends a new null-namespace attribute. Returns the old value.
    pub(crate) fn set(&mut self, qualified_name: &str, value: String) -> Option<String> {
        if let Some(attr) = self
            .attrs
            .iter_mut()
            .find(|attr| attr.has_qualified_name(qualified_name))
        {
            return Some(std::mem::replace(&mut attr.value, value));
        }
        self.attrs.push(Attribute {
            namespace: None,
            prefix: None,
            local_name: qualified_name.to_string(),
            value,
        });
        None
    }

    /// Set by namespace and local name. The prefix of an existing attribute
    /// is left alone. Returns the old value.
    pub(crate) fn set_ns(
        &mut self,
        namespace: Option<&str>,
        prefix: Option<&str>,
        local_name: &str,
        value: String,
    ) -> Option<String> {
        if let Some(attr) = self
            .attrs
            .iter_mut()
            .find(|attr| attr.namespace.as_deref() == namespace && attr.local_name == local_name)
        {
            return Some(std::mem::replace(&mut attr.value, value));
        }
        self.attrs.push(Attribute {
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            value,
        });
        None
    }

    /// Remove the first attribute with the given qualified name.
    pub(crate) fn remove(&mut self, qualified_name: &str) -> Option<Attribute> {
        let index = self
            .attrs
            .iter()
            .position(|attr| attr.has_qualified_name(qualified_name))?;
        Some(self.attrs.remove(index))
    }

    /// Remove the attribute with the given namespace and local name.
    pub(crate) fn remove_ns(
        &mut self,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<Attribute> {
        let index = self
            .attrs
            .iter()
            .position(|attr| attr.namespace.as_deref() == namespace && attr.local_name == local_name)?;
        Some(self.attrs.remove(index))
    }

    /// Qualified names in list order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.attrs.iter().map(Attribute::qualified_name).collect()
    }

    /// Same attributes regardless of order, as "equals" compares them.
    #[must_use]
    pub fn same_set(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.attrs.iter().all(|attr| {
                other
                    .get_ns(attr.namespace(), &attr.local_name)
                    .is_some_and(|theirs| theirs.value == attr.value)
            })
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attrs.iter()
    }
}
