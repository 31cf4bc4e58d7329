use async_trait::async_trait;

use crate::domain::{
    Category, Comment, Location, NewCategory, NewComment, NewLocation, NewUser, Post, PostCard,
    PostDraft, ProfileUpdate, User,
};
use crate::error::RepoError;
use crate::visibility::PostQuery;

/// Lookup and removal shared by every repository.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Fails with [`RepoError::NotFound`] if
    /// nothing was removed.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Users for the given IDs, in no particular order. Unknown IDs are skipped.
    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>, RepoError>;

    /// Fails with [`RepoError::Constraint`] if the username is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> Result<User, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// All categories ordered by title.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;

    async fn create(&self, category: NewCategory) -> Result<Category, RepoError>;
}

#[async_trait]
pub trait LocationRepository: BaseRepository<Location, i64> {
    /// All locations ordered by name.
    async fn list(&self) -> Result<Vec<Location>, RepoError>;

    async fn create(&self, location: NewLocation) -> Result<Location, RepoError>;
}

/// Post repository.
///
/// Listings apply the [`PostQuery`] visibility rules and are ordered by
/// publication date, newest first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    async fn count(&self, query: PostQuery) -> Result<u64, RepoError>;

    async fn list(
        &self,
        query: PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostCard>, RepoError>;

    async fn create(&self, author_id: i64, draft: PostDraft) -> Result<Post, RepoError>;

    /// Replace the editable fields. The author is left untouched.
    async fn update(&self, id: i64, draft: PostDraft) -> Result<Post, RepoError>;
}

/// Comment repository. Deleting a post removes its comments.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    /// Comments of a post, oldest first.
    async fn find_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;

    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    async fn update_text(&self, id: i64, text: String) -> Result<Comment, RepoError>;
}
