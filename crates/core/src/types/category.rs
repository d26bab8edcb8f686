//! Product categories and the nested category tree.
//!
//! The API returns categories either as a flat list (`/category`) or as a
//! nested hierarchy (`/category/all-nested`). Both decode into [`Category`];
//! only the nested form is wrapped in a [`CategoryTree`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::id::CategoryId;

/// A category node. Children are kept in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Raw image path as returned by the API (not yet normalized).
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub children: Vec<Category>,
}

impl Category {
    /// Create a leaf category.
    #[must_use]
    pub fn leaf(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(id),
            name: name.into(),
            image: None,
            children: Vec::new(),
        }
    }

    /// Builder helper used when assembling trees by hand.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Whether this node has any children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Find a direct child by id.
    #[must_use]
    pub fn child(&self, id: CategoryId) -> Option<&Self> {
        self.children.iter().find(|c| c.id == id)
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Self>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

/// Errors raised when building a [`CategoryTree`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The same id appears more than once, which would make the hierarchy a
    /// graph rather than a tree.
    #[error("category {0} appears more than once in the hierarchy")]
    DuplicateId(CategoryId),
}

/// A validated category hierarchy: every id occurs exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    roots: Vec<Category>,
}

impl CategoryTree {
    /// Build a tree from its top-level nodes.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DuplicateId`] if any id occurs twice.
    pub fn new(roots: Vec<Category>) -> Result<Self, TreeError> {
        let mut nodes = Vec::new();
        for root in &roots {
            root.walk(&mut nodes);
        }

        let mut seen = HashSet::with_capacity(nodes.len());
        for node in nodes {
            if !seen.insert(node.id) {
                return Err(TreeError::DuplicateId(node.id));
            }
        }

        Ok(Self { roots })
    }

    /// Top-level categories in display order.
    #[must_use]
    pub fn roots(&self) -> &[Category] {
        &self.roots
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find a category anywhere in the tree.
    #[must_use]
    pub fn find(&self, id: CategoryId) -> Option<&Category> {
        self.path_to(id).and_then(|path| path.last().copied())
    }

    /// The chain of categories from a root down to `id`, inclusive.
    #[must_use]
    pub fn path_to(&self, id: CategoryId) -> Option<Vec<&Category>> {
        fn search<'a>(node: &'a Category, id: CategoryId, path: &mut Vec<&'a Category>) -> bool {
            path.push(node);
            if node.id == id {
                return true;
            }
            for child in &node.children {
                if search(child, id, path) {
                    return true;
                }
            }
            path.pop();
            false
        }

        let mut path = Vec::new();
        self.roots
            .iter()
            .any(|root| search(root, id, &mut path))
            .then_some(path)
    }

    /// `id` plus the ids of all its descendants. Empty if `id` is unknown.
    #[must_use]
    pub fn descendant_ids(&self, id: CategoryId) -> Vec<CategoryId> {
        let mut nodes = Vec::new();
        if let Some(node) = self.find(id) {
            node.walk(&mut nodes);
        }
        nodes.into_iter().map(|c| c.id).collect()
    }

    /// Number of levels in the deepest branch (0 for an empty tree).
    #[must_use]
    pub fn depth(&self) -> usize {
        fn depth_of(node: &Category) -> usize {
            1 + node.children.iter().map(depth_of).max().unwrap_or(0)
        }
        self.roots.iter().map(depth_of).max().unwrap_or(0)
    }
}
