//! Conversion of domain values into response DTOs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use blogicum_core::domain::{Category, Comment, Location, Post, User};
use blogicum_core::pagination::Page;
use blogicum_shared::dto::{
    AuthorResponse, CategoryResponse, CommentResponse, LocationResponse, PageResponse,
    PostChoices, PostResponse, UserResponse,
};

use crate::middleware::error::AppResult;
use crate::state::AppState;

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub fn user(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        date_joined: timestamp(user.date_joined),
    }
}

pub fn category(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        title: category.title.clone(),
        description: category.description.clone(),
        slug: category.slug.clone(),
        is_published: category.is_published,
    }
}

pub fn location(location: &Location) -> LocationResponse {
    LocationResponse {
        id: location.id,
        name: location.name.clone(),
    }
}

pub fn page<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> PageResponse<U> {
    let page = page.map(f);
    PageResponse {
        items: page.items,
        number: page.number,
        num_pages: page.num_pages,
        total: page.total,
        has_next: page.has_next,
        has_previous: page.has_previous,
        next_page_number: page.next_page_number,
        previous_page_number: page.previous_page_number,
    }
}

pub async fn post_choices(state: &AppState) -> AppResult<(Vec<Category>, Vec<Location>)> {
    let categories = state.categories.list().await?;
    let locations = state.locations.list().await?;
    Ok((categories, locations))
}

pub fn choices(categories: &[Category], locations: &[Location]) -> PostChoices {
    PostChoices {
        categories: categories.iter().map(category).collect(),
        locations: locations.iter().map(location).collect(),
    }
}

/// Related rows needed to render a batch of posts and comments.
pub struct Lookup {
    users: HashMap<i64, User>,
    categories: HashMap<i64, Category>,
    locations: HashMap<i64, Location>,
}

impl Lookup {
    pub async fn load(
        state: &AppState,
        author_ids: impl IntoIterator<Item = i64>,
    ) -> AppResult<Self> {
        let mut ids: Vec<i64> = author_ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let users = state.users.find_many(&ids).await?;
        let (categories, locations) = post_choices(state).await?;

        Ok(Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
            locations: locations.into_iter().map(|l| (l.id, l)).collect(),
        })
    }

    fn author(&self, id: i64) -> AuthorResponse {
        AuthorResponse {
            id,
            username: self
                .users
                .get(&id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
        }
    }

    pub fn post(&self, post: &Post, comment_count: Option<u64>) -> PostResponse {
        PostResponse {
            id: post.id,
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: timestamp(post.pub_date),
            author: self.author(post.author_id),
            category: post
                .category_id
                .and_then(|id| self.categories.get(&id))
                .map(category),
            location: post
                .location_id
                .and_then(|id| self.locations.get(&id))
                .map(location),
            is_published: post.is_published,
            image: post.image.clone(),
            created_at: timestamp(post.created_at),
            comment_count,
        }
    }

    pub fn comment(&self, comment: &Comment) -> CommentResponse {
        CommentResponse {
            id: comment.id,
            post_id: comment.post_id,
            text: comment.text.clone(),
            author: self.author(comment.author_id),
            created_at: timestamp(comment.created_at),
        }
    }
}
