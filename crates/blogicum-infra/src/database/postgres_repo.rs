//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, JoinType, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};

use blogicum_core::domain::{
    Category, Comment, Location, NewCategory, NewComment, NewLocation, NewUser, Post, PostCard,
    PostDraft, ProfileUpdate, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use blogicum_core::visibility::{PostQuery, PostScope};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, db_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            id: NotSet,
            username: Set(new.username),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            date_joined: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_error)?;

        Ok(model.into())
    }

    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            id: Set(id),
            username: Set(update.username),
            first_name: Set(update.first_name),
            last_name: Set(update.last_name),
            email: Set(update.email),
            password_hash: NotSet,
            date_joined: NotSet,
        }
        .update(&self.db)
        .await
        .map_err(db_error)?;

        Ok(model.into())
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new: NewCategory) -> Result<Category, RepoError> {
        let model = category::ActiveModel {
            id: NotSet,
            title: Set(new.title),
            description: Set(new.description),
            slug: Set(new.slug),
            is_published: Set(new.is_published),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_error)?;

        Ok(model.into())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new: NewLocation) -> Result<Location, RepoError> {
        let model = location::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            is_published: Set(new.is_published),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_error)?;

        Ok(model.into())
    }
}

/// Posts matching a listing query, before ordering and paging.
fn scoped_posts(query: PostQuery) -> Select<PostEntity> {
    let select = match query.scope {
        PostScope::Public => PostEntity::find(),
        PostScope::Category(id) => PostEntity::find().filter(post::Column::CategoryId.eq(id)),
        PostScope::Author { author_id, .. } => {
            PostEntity::find().filter(post::Column::AuthorId.eq(author_id))
        }
    };

    if !query.scope.requires_public() {
        return select;
    }

    select
        .join(JoinType::InnerJoin, post::Relation::Category.def())
        .filter(post::Column::IsPublished.eq(true))
        .filter(post::Column::PubDate.lte(query.now))
        .filter(category::Column::IsPublished.eq(true))
}

#[derive(Debug, FromQueryResult)]
struct CommentCount {
    post_id: i64,
    comment_count: i64,
}

impl PostgresPostRepository {
    async fn comment_counts(&self, post_ids: Vec<i64>) -> Result<HashMap<i64, i64>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = CommentEntity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "comment_count")
            .filter(comment::Column::PostId.is_in(post_ids))
            .group_by(comment::Column::PostId)
            .into_model::<CommentCount>()
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.post_id, row.comment_count))
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count(&self, query: PostQuery) -> Result<u64, RepoError> {
        scoped_posts(query).count(&self.db).await.map_err(db_error)
    }

    async fn list(
        &self,
        query: PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostCard>, RepoError> {
        let posts = scoped_posts(query)
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        let counts = self
            .comment_counts(posts.iter().map(|p| p.id).collect())
            .await?;

        Ok(posts
            .into_iter()
            .map(|model| {
                let comment_count = counts.get(&model.id).copied().unwrap_or(0) as u64;
                PostCard {
                    post: model.into(),
                    comment_count,
                }
            })
            .collect())
    }

    async fn create(&self, author_id: i64, draft: PostDraft) -> Result<Post, RepoError> {
        let mut model = post::ActiveModel::from_draft(draft);
        model.author_id = Set(author_id);
        model.created_at = Set(Utc::now().into());

        let model = model.insert(&self.db).await.map_err(db_error)?;
        tracing::debug!(post_id = model.id, author_id, "Post created");

        Ok(model.into())
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<Post, RepoError> {
        let mut model = post::ActiveModel::from_draft(draft);
        model.id = Set(id);

        let model = model.update(&self.db).await.map_err(db_error)?;

        Ok(model.into())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel {
            id: NotSet,
            post_id: Set(new.post_id),
            author_id: Set(new.author_id),
            text: Set(new.text),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_error)?;

        Ok(model.into())
    }

    async fn update_text(&self, id: i64, text: String) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel {
            id: Set(id),
            post_id: NotSet,
            author_id: NotSet,
            text: Set(text),
            created_at: NotSet,
        }
        .update(&self.db)
        .await
        .map_err(db_error)?;

        Ok(model.into())
    }
}
