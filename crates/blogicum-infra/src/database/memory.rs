//! In-memory store - used when no database is configured, and in tests.
//!
//! All tables sit behind one async `RwLock` so that cascading deletes and
//! reference checks see a consistent state. Data is lost on process restart.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use blogicum_core::domain::{
    Category, Comment, Location, NewCategory, NewComment, NewLocation, NewUser, Post, PostCard,
    PostDraft, ProfileUpdate, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};
use blogicum_core::visibility::PostQuery;

/// Rows of one entity keyed by ID, with a serial counter.
pub struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }
}

#[derive(Default)]
pub struct Tables {
    users: Table<User>,
    categories: Table<Category>,
    locations: Table<Location>,
    posts: Table<Post>,
    comments: Table<Comment>,
}

/// An entity kept in [`Tables`].
pub trait Stored: Clone + Send + Sync + 'static {
    fn table(tables: &Tables) -> &Table<Self>;

    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;

    /// Apply the referential actions for a removed row.
    fn on_delete(_tables: &mut Tables, _id: i64) {}
}

impl Stored for User {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.users
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.users
    }

    fn on_delete(tables: &mut Tables, id: i64) {
        let owned: Vec<i64> = tables
            .posts
            .rows
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.posts.rows.remove(&post_id);
            Post::on_delete(tables, post_id);
        }
        tables.comments.rows.retain(|_, c| c.author_id != id);
    }
}

impl Stored for Category {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.categories
    }

    fn on_delete(tables: &mut Tables, id: i64) {
        for post in tables.posts.rows.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
    }
}

impl Stored for Location {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.locations
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.locations
    }

    fn on_delete(tables: &mut Tables, id: i64) {
        for post in tables.posts.rows.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
    }
}

impl Stored for Post {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.posts
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.posts
    }

    fn on_delete(tables: &mut Tables, id: i64) {
        tables.comments.rows.retain(|_, c| c.post_id != id);
    }
}

impl Stored for Comment {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.comments
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.comments
    }
}

/// Handle to the shared in-memory tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryRepository::new(self.tables.clone())
    }

    pub fn categories(&self) -> InMemoryCategoryRepository {
        InMemoryRepository::new(self.tables.clone())
    }

    pub fn locations(&self) -> InMemoryLocationRepository {
        InMemoryRepository::new(self.tables.clone())
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryRepository::new(self.tables.clone())
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        InMemoryRepository::new(self.tables.clone())
    }
}

/// Generic in-memory repository over one table.
pub struct InMemoryRepository<T> {
    tables: Arc<RwLock<Tables>>,
    _entity: PhantomData<T>,
}

impl<T> InMemoryRepository<T> {
    fn new(tables: Arc<RwLock<Tables>>) -> Self {
        Self {
            tables,
            _entity: PhantomData,
        }
    }
}

pub type InMemoryUserRepository = InMemoryRepository<User>;
pub type InMemoryCategoryRepository = InMemoryRepository<Category>;
pub type InMemoryLocationRepository = InMemoryRepository<Location>;
pub type InMemoryPostRepository = InMemoryRepository<Post>;
pub type InMemoryCommentRepository = InMemoryRepository<Comment>;

#[async_trait]
impl<T: Stored> BaseRepository<T, i64> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: i64) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if T::table_mut(&mut tables).rows.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        T::on_delete(&mut tables, id);
        Ok(())
    }
}

fn username_taken(tables: &Tables, username: &str, except: Option<i64>) -> bool {
    tables
        .users
        .rows
        .values()
        .any(|u| u.username == username && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.rows.get(id).cloned())
            .collect())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if username_taken(&tables, &user.username, None) {
            return Err(RepoError::Constraint("username already exists".to_string()));
        }

        Ok(tables.users.insert_with(|id| User {
            id,
            username: user.username,
            first_name: String::new(),
            last_name: String::new(),
            email: user.email,
            password_hash: user.password_hash,
            date_joined: Utc::now(),
        }))
    }

    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if username_taken(&tables, &update.username, Some(id)) {
            return Err(RepoError::Constraint("username already exists".to_string()));
        }

        let user = tables.users.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.username = update.username;
        user.first_name = update.first_name;
        user.last_name = update.last_name;
        user.email = update.email;
        Ok(user.clone())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .rows
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.rows.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }

    async fn create(&self, category: NewCategory) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .categories
            .rows
            .values()
            .any(|c| c.slug == category.slug)
        {
            return Err(RepoError::Constraint("slug already exists".to_string()));
        }

        Ok(tables.categories.insert_with(|id| Category {
            id,
            title: category.title,
            description: category.description,
            slug: category.slug,
            is_published: category.is_published,
            created_at: Utc::now(),
        }))
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        let tables = self.tables.read().await;
        let mut locations: Vec<Location> = tables.locations.rows.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    async fn create(&self, location: NewLocation) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        Ok(tables.locations.insert_with(|id| Location {
            id,
            name: location.name,
            is_published: location.is_published,
            created_at: Utc::now(),
        }))
    }
}

impl Tables {
    fn matching_posts(&self, query: &PostQuery) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .rows
            .values()
            .filter(|post| {
                let category = post.category_id.and_then(|id| self.categories.rows.get(&id));
                query.matches(post, category)
            })
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }

    fn check_post_references(&self, draft: &PostDraft) -> Result<(), RepoError> {
        if let Some(id) = draft.category_id {
            if !self.categories.rows.contains_key(&id) {
                return Err(RepoError::Constraint(format!("category {id} does not exist")));
            }
        }
        if let Some(id) = draft.location_id {
            if !self.locations.rows.contains_key(&id) {
                return Err(RepoError::Constraint(format!("location {id} does not exist")));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn count(&self, query: PostQuery) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.matching_posts(&query).len() as u64)
    }

    async fn list(
        &self,
        query: PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostCard>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .matching_posts(&query)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|post| PostCard {
                post: post.clone(),
                comment_count: tables
                    .comments
                    .rows
                    .values()
                    .filter(|c| c.post_id == post.id)
                    .count() as u64,
            })
            .collect())
    }

    async fn create(&self, author_id: i64, draft: PostDraft) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.rows.contains_key(&author_id) {
            return Err(RepoError::Constraint(format!("user {author_id} does not exist")));
        }
        tables.check_post_references(&draft)?;

        Ok(tables.posts.insert_with(|id| Post {
            id,
            author_id,
            title: draft.title,
            text: draft.text,
            pub_date: draft.pub_date,
            location_id: draft.location_id,
            category_id: draft.category_id,
            is_published: draft.is_published,
            image: draft.image,
            created_at: Utc::now(),
        }))
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_post_references(&draft)?;

        let post = tables.posts.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.title = draft.title;
        post.text = draft.text;
        post.pub_date = draft.pub_date;
        post.location_id = draft.location_id;
        post.category_id = draft.category_id;
        post.is_published = draft.is_published;
        post.image = draft.image;
        Ok(post.clone())
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .rows
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.rows.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        if !tables.users.rows.contains_key(&comment.author_id) {
            return Err(RepoError::Constraint(format!(
                "user {} does not exist",
                comment.author_id
            )));
        }

        Ok(tables.comments.insert_with(|id| Comment {
            id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: Utc::now(),
        }))
    }

    async fn update_text(&self, id: i64, text: String) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        let comment = tables.comments.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        comment.text = text;
        Ok(comment.clone())
    }
}
