//! Post visibility rules.
//!
//! Visibility is computed from the post, its category and the clock; it is
//! never stored. Repositories apply [`PostScope`] when listing so that the
//! same rule governs every feed.

use chrono::{DateTime, Utc};

use crate::domain::{Category, Post};

/// Whether a post may be shown to anyone.
///
/// A post is public when it is published, its publication date has been
/// reached and it belongs to a published category. A post without a
/// category is never public.
pub fn is_public(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && post.pub_date <= now && category.is_some_and(|c| c.is_published)
}

/// Whether `viewer` may open the post's detail page.
pub fn can_view(
    post: &Post,
    category: Option<&Category>,
    viewer: Option<i64>,
    now: DateTime<Utc>,
) -> bool {
    viewer.is_some_and(|id| post.is_authored_by(id)) || is_public(post, category, now)
}

/// Which posts a listing draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// The public feed.
    Public,
    /// Public posts of one category.
    Category(i64),
    /// Posts of one author. Hidden posts are included only when the author
    /// is looking at their own profile.
    Author { author_id: i64, include_hidden: bool },
}

impl PostScope {
    /// Scope for a profile page, depending on who is looking.
    pub fn profile(author_id: i64, viewer: Option<i64>) -> Self {
        Self::Author {
            author_id,
            include_hidden: viewer == Some(author_id),
        }
    }

    /// Whether a post in this scope must also pass [`is_public`].
    pub fn requires_public(&self) -> bool {
        !matches!(
            self,
            Self::Author {
                include_hidden: true,
                ..
            }
        )
    }
}

/// A listing request: scope plus the instant visibility is evaluated at.
#[derive(Debug, Clone, Copy)]
pub struct PostQuery {
    pub scope: PostScope,
    pub now: DateTime<Utc>,
}

impl PostQuery {
    pub fn new(scope: PostScope, now: DateTime<Utc>) -> Self {
        Self { scope, now }
    }

    /// Evaluate the query against a single post.
    pub fn matches(&self, post: &Post, category: Option<&Category>) -> bool {
        let in_scope = match self.scope {
            PostScope::Public => true,
            PostScope::Category(id) => post.category_id == Some(id),
            PostScope::Author { author_id, .. } => post.author_id == author_id,
        };
        in_scope && (!self.scope.requires_public() || is_public(post, category, self.now))
    }
}
