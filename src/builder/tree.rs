//! Schema field tree and its structural operations
//!
//! Fields live in an arena keyed by [`FieldId`]. Every node records its parent and
//! the ordered ids of its children, so moves and deletes only touch the affected
//! sibling lists and cycle checks walk a single ancestor chain.
//!
//! Every mutation either succeeds completely or leaves the tree untouched and
//! returns a [`TreeError`].

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

use super::generate::{generate_default_value, generate_description, is_blank};
use crate::domain::{FieldDraft, FieldId, SchemaField};

/// Rejected structural operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Field not found: {0}")]
    FieldNotFound(FieldId),

    #[error("Cannot move field {0} into itself")]
    SelfParent(FieldId),

    #[error("Cannot move field {field} into its own descendant {target}")]
    CycleDetected { field: FieldId, target: FieldId },

    #[error("Field {0} cannot contain child fields")]
    NotAContainer(FieldId),

    #[error("Field {0} has child fields and cannot become a leaf type")]
    HasChildren(FieldId),

    #[error("Index {index} out of range for {len} siblings")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Field name '{0}' must not contain '.'")]
    InvalidName(String),
}

#[derive(Clone, Debug, PartialEq)]
struct TreeNode {
    field: SchemaField,
    parent: Option<FieldId>,
    children: Vec<FieldId>,
}

/// Ordered forest of schema fields
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaTree {
    nodes: HashMap<FieldId, TreeNode>,
    roots: Vec<FieldId>,
}

fn reject<T>(err: TreeError) -> Result<T, TreeError> {
    warn!("Rejected schema tree operation: {}", err);
    Err(err)
}

impl SchemaTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of fields at any depth
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &FieldId) -> Option<&SchemaField> {
        self.nodes.get(id).map(|n| &n.field)
    }

    pub fn roots(&self) -> &[FieldId] {
        &self.roots
    }

    /// Ordered children of a field (empty for leaves and unknown ids)
    pub fn children(&self, id: &FieldId) -> &[FieldId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Parent of a field; `None` for root fields and unknown ids
    pub fn parent_of(&self, id: &FieldId) -> Option<&FieldId> {
        self.nodes.get(id).and_then(|n| n.parent.as_ref())
    }

    /// Sibling list under `parent`, or the root list when `parent` is `None`
    pub fn siblings(&self, parent: Option<&FieldId>) -> Option<&[FieldId]> {
        match parent {
            None => Some(&self.roots),
            Some(p) => self.nodes.get(p).map(|n| n.children.as_slice()),
        }
    }

    /// Position of a field among its siblings
    pub fn index_in_parent(&self, id: &FieldId) -> Option<usize> {
        let node = self.nodes.get(id)?;
        self.siblings(node.parent.as_ref())?
            .iter()
            .position(|sibling| sibling == id)
    }

    /// True when `ancestor` lies strictly above `descendant`
    pub fn is_ancestor_of(&self, ancestor: &FieldId, descendant: &FieldId) -> bool {
        let mut current = self.parent_of(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// Field ids in depth-first pre-order, following child order
    pub fn preorder(&self) -> Vec<&FieldId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&FieldId> = self.roots.iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Dot path of a field built from its ancestors' names
    pub fn path_of(&self, id: &FieldId) -> Option<String> {
        let mut names = vec![self.get(id)?.name.as_str()];
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            names.push(self.get(parent)?.name.as_str());
            current = self.parent_of(parent);
        }
        names.reverse();
        Some(names.join("."))
    }

    /// First child of `parent` (or root) with the given name
    pub fn find_child_by_name(&self, parent: Option<&FieldId>, name: &str) -> Option<&FieldId> {
        self.siblings(parent)?
            .iter()
            .find(|id| self.get(id).is_some_and(|f| f.name == name))
    }

    /// Resolve a dot path such as `"network.retry.count"`
    pub fn find_by_path(&self, path: &str) -> Option<&FieldId> {
        let mut current: Option<&FieldId> = None;
        for segment in path.split('.') {
            current = Some(self.find_child_by_name(current, segment)?);
        }
        current
    }

    /// Attach an already built field as the last child of `parent` (or root).
    pub(crate) fn insert(
        &mut self,
        parent: Option<&FieldId>,
        field: SchemaField,
    ) -> Result<FieldId, TreeError> {
        let id = field.id.clone();
        match parent {
            Some(parent_id) => {
                let parent_node = match self.nodes.get_mut(parent_id) {
                    Some(node) => node,
                    None => return reject(TreeError::FieldNotFound(parent_id.clone())),
                };
                if !parent_node.field.can_have_children() {
                    return reject(TreeError::NotAContainer(parent_id.clone()));
                }
                parent_node.children.push(id.clone());
            }
            None => self.roots.push(id.clone()),
        }
        self.nodes.insert(
            id.clone(),
            TreeNode {
                field,
                parent: parent.cloned(),
                children: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Create a field from operator input under `parent` (or at root).
    ///
    /// A fresh id is assigned; blank description and default are synthesized.
    pub fn add_field(
        &mut self,
        parent: Option<&FieldId>,
        draft: FieldDraft,
    ) -> Result<FieldId, TreeError> {
        let name = if draft.name.trim().is_empty() {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default();
            format!("field{}", millis)
        } else if draft.name.contains('.') {
            return reject(TreeError::InvalidName(draft.name));
        } else {
            draft.name
        };

        let field = SchemaField {
            id: FieldId::generate(),
            description: if draft.description.trim().is_empty() {
                generate_description(&name)
            } else {
                draft.description
            },
            default_value: Some(if is_blank(draft.default_value.as_ref()) {
                generate_default_value(&draft.kind)
            } else {
                draft.default_value.unwrap_or_default()
            }),
            name,
            kind: draft.kind,
            required: draft.required,
        };

        debug!("Adding field '{}' ({})", field.name, field.field_type());
        self.insert(parent, field)
    }

    /// Replace a field's own data in place, keeping its id, position and children.
    pub fn update_field(&mut self, id: &FieldId, draft: FieldDraft) -> Result<(), TreeError> {
        let node = match self.nodes.get_mut(id) {
            Some(node) => node,
            None => return reject(TreeError::FieldNotFound(id.clone())),
        };
        if !node.children.is_empty() && !draft.kind.can_have_children() {
            return reject(TreeError::HasChildren(id.clone()));
        }

        let name = if draft.name.trim().is_empty() {
            node.field.name.clone()
        } else if draft.name.contains('.') {
            return reject(TreeError::InvalidName(draft.name));
        } else {
            draft.name
        };
        let default_value = if is_blank(draft.default_value.as_ref()) {
            generate_default_value(&draft.kind)
        } else {
            draft.default_value.unwrap_or_default()
        };
        let description = if draft.description.trim().is_empty() {
            generate_description(&name)
        } else {
            draft.description
        };

        node.field = SchemaField {
            id: id.clone(),
            name,
            kind: draft.kind,
            description,
            required: draft.required,
            default_value: Some(default_value),
        };
        Ok(())
    }

    /// Remove a field together with its whole subtree.
    ///
    /// Returns the number of fields removed.
    pub fn delete_field(&mut self, id: &FieldId) -> Result<usize, TreeError> {
        if !self.nodes.contains_key(id) {
            return reject(TreeError::FieldNotFound(id.clone()));
        }
        self.detach(id);

        let mut removed = 0;
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                removed += 1;
                stack.extend(node.children);
            }
        }
        debug!("Deleted field {} ({} fields removed)", id, removed);
        Ok(removed)
    }

    /// Check whether `id` may be moved under `new_parent` without changing anything
    pub fn check_move(&self, id: &FieldId, new_parent: Option<&FieldId>) -> Result<(), TreeError> {
        if !self.nodes.contains_key(id) {
            return Err(TreeError::FieldNotFound(id.clone()));
        }
        let Some(target) = new_parent else {
            return Ok(());
        };
        if target == id {
            return Err(TreeError::SelfParent(id.clone()));
        }
        let Some(target_field) = self.get(target) else {
            return Err(TreeError::FieldNotFound(target.clone()));
        };
        if self.is_ancestor_of(id, target) {
            return Err(TreeError::CycleDetected {
                field: id.clone(),
                target: target.clone(),
            });
        }
        if !target_field.can_have_children() {
            return Err(TreeError::NotAContainer(target.clone()));
        }
        Ok(())
    }

    /// Transplant a field and its subtree to the end of `new_parent`'s children,
    /// or to the end of the root list when `new_parent` is `None`.
    pub fn move_field(&mut self, id: &FieldId, new_parent: Option<&FieldId>) -> Result<(), TreeError> {
        if let Err(err) = self.check_move(id, new_parent) {
            return reject(err);
        }

        self.detach(id);
        match new_parent {
            Some(target) => {
                if let Some(node) = self.nodes.get_mut(target) {
                    node.children.push(id.clone());
                }
            }
            None => self.roots.push(id.clone()),
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = new_parent.cloned();
        }
        debug!(
            "Moved field {} to {}",
            id,
            new_parent.map(FieldId::as_str).unwrap_or("root")
        );
        Ok(())
    }

    /// Move the sibling at `from` to position `to` under `parent` (or root)
    pub fn reorder(
        &mut self,
        parent: Option<&FieldId>,
        from: usize,
        to: usize,
    ) -> Result<(), TreeError> {
        let siblings = match parent {
            None => &mut self.roots,
            Some(p) => match self.nodes.get_mut(p) {
                Some(node) => &mut node.children,
                None => return reject(TreeError::FieldNotFound(p.clone())),
            },
        };
        let len = siblings.len();
        for index in [from, to] {
            if index >= len {
                return reject(TreeError::IndexOutOfRange { index, len });
            }
        }
        let moved = siblings.remove(from);
        siblings.insert(to, moved);
        Ok(())
    }

    fn detach(&mut self, id: &FieldId) {
        let parent = self.nodes.get(id).and_then(|n| n.parent.clone());
        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
                    parent_node.children.retain(|child| child != id);
                }
            }
            None => self.roots.retain(|root| root != id),
        }
    }

    /// Nested view of the forest, in child order
    pub fn to_nested(&self) -> Vec<NestedField<'_>> {
        self.roots.iter().filter_map(|id| self.nested(id)).collect()
    }

    fn nested(&self, id: &FieldId) -> Option<NestedField<'_>> {
        let node = self.nodes.get(id)?;
        Some(NestedField {
            field: &node.field,
            children: node.children.iter().filter_map(|c| self.nested(c)).collect(),
        })
    }
}

/// Borrowed nested rendering of a field and its descendants
#[derive(Debug, Serialize)]
pub struct NestedField<'a> {
    #[serde(flatten)]
    pub field: &'a SchemaField,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NestedField<'a>>,
}

impl Serialize for SchemaTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_nested().serialize(serializer)
    }
}
