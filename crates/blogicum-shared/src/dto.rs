//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Login form submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Context of the login page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// A user's profile as shown on their page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: String,
}

/// The short author reference embedded in posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: String,
    pub author: AuthorResponse,
    pub category: Option<CategoryResponse>,
    pub location: Option<LocationResponse>,
    pub is_published: bool,
    pub image: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub text: String,
    pub author: AuthorResponse,
    pub created_at: String,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_number: Option<u64>,
}

/// Index page context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub page_obj: PageResponse<PostResponse>,
}

/// Category page context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPageResponse {
    pub category: CategoryResponse,
    pub page_obj: PageResponse<PostResponse>,
}

/// Profile page context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: UserResponse,
    pub page_obj: PageResponse<PostResponse>,
}

/// Post detail context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

/// Context of the post delete confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPageResponse {
    pub post: PostResponse,
}

/// A form ready to be displayed: current values plus available choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormResponse<F, C = ()> {
    pub form: F,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<C>,
}

impl<F> FormResponse<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            choices: None,
        }
    }
}

impl<F, C> FormResponse<F, C> {
    pub fn with_choices(form: F, choices: C) -> Self {
        Self {
            form,
            choices: Some(choices),
        }
    }
}

/// Choices offered by the post form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostChoices {
    pub categories: Vec<CategoryResponse>,
    pub locations: Vec<LocationResponse>,
}

/// Context of the comment edit/delete pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPageResponse<F> {
    pub comment: CommentResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<F>,
}
