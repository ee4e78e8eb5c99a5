//! Category view over the cache contents.

use std::cmp::Reverse;

use snipdrop_core::{classification_of, preview_classification_of, Category, SnippetDescriptor};

use crate::cache::SnippetCache;

/// One bucket of the category view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: Category,
    /// Most recently updated first.
    pub snippets: Vec<SnippetDescriptor>,
}

/// Output of [`build_groups`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetGroups {
    /// Nothing listable in the cache.
    Empty,
    Groups(Vec<CategoryGroup>),
}

impl SnippetGroups {
    pub fn groups(&self) -> &[CategoryGroup] {
        match self {
            SnippetGroups::Empty => &[],
            SnippetGroups::Groups(groups) => groups,
        }
    }
}

/// Group listable snippets by normalized category.
///
/// A snippet is listable when either its original or its preview is code,
/// text or an image.
///
/// Buckets appear in the order their most recent member was updated, and each
/// bucket keeps its members most recent first.
pub fn build_groups(cache: &SnippetCache) -> SnippetGroups {
    let mut snippets: Vec<_> = cache
        .values()
        .into_iter()
        .filter(|snippet| {
            classification_of(snippet).is_some_and(|c| c.generic.is_listable())
                || preview_classification_of(snippet).is_some_and(|c| c.generic.is_listable())
        })
        .collect();

    if snippets.is_empty() {
        return SnippetGroups::Empty;
    }

    snippets.sort_by_key(|snippet| Reverse(snippet.updated));

    let mut groups: Vec<CategoryGroup> = Vec::new();
    for snippet in &snippets {
        let Some(specific) = classification_of(snippet).map(|c| &c.specific) else {
            continue;
        };
        let category = Category::new(specific.as_str()).normalized();

        match groups.iter_mut().find(|group| group.category == category) {
            Some(group) => group.snippets.push(snippet.into()),
            None => groups.push(CategoryGroup {
                category,
                snippets: vec![snippet.into()],
            }),
        }
    }

    if groups.is_empty() {
        SnippetGroups::Empty
    } else {
        SnippetGroups::Groups(groups)
    }
}

/// A node of the category tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Category(Category),
    Snippet(SnippetDescriptor),
}

/// Path from the (implicit) root to a node, e.g. `[Category(py), Snippet(..)]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePath(Vec<TreeNode>);

impl NodePath {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self(nodes)
    }

    pub fn category(category: Category) -> Self {
        Self(vec![TreeNode::Category(category)])
    }

    pub fn snippet(category: Category, descriptor: SnippetDescriptor) -> Self {
        Self(vec![TreeNode::Category(category), TreeNode::Snippet(descriptor)])
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.0
    }

    pub fn last(&self) -> Option<&TreeNode> {
        self.0.last()
    }

    /// Path of the parent node; the root's children have the empty path as parent.
    pub fn parent(&self) -> Option<NodePath> {
        let (_, parent) = self.0.split_last()?;
        Some(NodePath(parent.to_vec()))
    }

    /// The category this node belongs to: its own for a group node, its
    /// parent group's for a snippet node.
    pub fn effective_category(&self) -> Option<&Category> {
        match self.last()? {
            TreeNode::Category(category) => Some(category),
            TreeNode::Snippet(_) => match self.0.iter().rev().nth(1)? {
                TreeNode::Category(category) => Some(category),
                TreeNode::Snippet(_) => None,
            },
        }
    }
}

/// Where a drop gesture is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropLocation {
    Node(NodePath),
    /// Empty area of the view or anything that is not a tree node.
    Elsewhere,
}

impl DropLocation {
    /// Category a dropped item would be filed under, if any.
    pub fn target_category(&self) -> Option<&Category> {
        match self {
            DropLocation::Node(path) => path.effective_category(),
            DropLocation::Elsewhere => None,
        }
    }

    pub fn path(&self) -> Option<&NodePath> {
        match self {
            DropLocation::Node(path) => Some(path),
            DropLocation::Elsewhere => None,
        }
    }
}
