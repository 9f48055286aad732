// Assembles flat review rows into nested threads

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Review, ReviewAuthor, ReviewWithAuthor};

/// One review with its author and nested replies, as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewNode {
    #[serde(flatten)]
    pub review: Review,
    #[serde(rename = "users")]
    pub author: ReviewAuthor,
    pub replies: Vec<ReviewNode>,
}

/// All reviews of a single product indexed by parent.
pub struct ReviewThread {
    rows: HashMap<String, ReviewWithAuthor>,
    roots: Vec<String>,
    children: HashMap<String, Vec<String>>,
}

impl ReviewThread {
    /// `rows` must be ordered oldest first
    pub fn new(rows: Vec<ReviewWithAuthor>) -> Self {
        let mut roots = Vec::new();
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut by_id = HashMap::with_capacity(rows.len());

        for row in rows {
            let id = row.review.id.clone();
            match &row.review.parent_id {
                Some(parent) => children.entry(parent.clone()).or_default().push(id.clone()),
                None => roots.push(id.clone()),
            }
            by_id.insert(id, row);
        }

        Self {
            rows: by_id,
            roots,
            children,
        }
    }

    /// Root reviews newest first, each carrying at most `levels` levels
    /// including itself
    pub fn roots(&self, levels: usize) -> Vec<ReviewNode> {
        self.roots
            .iter()
            .rev()
            .filter_map(|id| self.node(id, levels))
            .collect()
    }

    /// Direct replies of `parent_id`, oldest first, each carrying at most
    /// `levels` levels including itself
    pub fn replies_of(&self, parent_id: &str, levels: usize) -> Vec<ReviewNode> {
        if levels == 0 {
            return Vec::new();
        }
        self.children
            .get(parent_id)
            .map(|ids| ids.iter().filter_map(|id| self.node(id, levels)).collect())
            .unwrap_or_default()
    }

    pub fn node(&self, id: &str, levels: usize) -> Option<ReviewNode> {
        if levels == 0 {
            return None;
        }
        let row = self.rows.get(id)?;
        Some(ReviewNode {
            review: row.review.clone(),
            author: row.author.clone(),
            replies: self.replies_of(id, levels - 1),
        })
    }
}
