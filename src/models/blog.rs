//! Blog model
//!
//! This module provides:
//! - `Blog` entity representing a published blog record
//! - Input types for creating and updating blogs

use serde::{Deserialize, Serialize};

/// Blog entity
///
/// `id` is assigned by the store on insert and never changes afterwards.
/// `creator` is a weak reference to the user who published the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    /// Public identifier (assigned by the store)
    pub id: String,
    /// Blog title
    pub title: String,
    /// Author name as written by the publisher
    pub author: String,
    /// Link to the blog
    pub url: String,
    /// Like count
    #[serde(default)]
    pub likes: u64,
    /// ID of the user who created the record, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl Blog {
    /// Create a blog record that has not been persisted yet.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        url: impl Into<String>,
        likes: u64,
    ) -> Self {
        Self {
            id: String::new(), // Will be set by the store
            title: title.into(),
            author: author.into(),
            url: url.into(),
            likes,
            creator: None,
        }
    }

    /// Attach the creating user.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Check if the given user created this blog
    pub fn is_created_by(&self, user_id: &str) -> bool {
        self.creator.as_deref() == Some(user_id)
    }
}

/// Input for creating a blog.
///
/// Every field is optional at the wire level so that validation can report
/// missing values instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBlogInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    /// Defaults to 0 when absent
    pub likes: Option<i64>,
}

/// Input for updating a blog. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlogInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}
