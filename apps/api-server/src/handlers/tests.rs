use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::{App, http::StatusCode, http::header, test, web};
use chrono::{Duration, Utc};
use serde_json::Value;

use blogicum_core::domain::{Category, NewCategory, NewComment, NewUser, Post, PostDraft, User};
use blogicum_core::visibility::{PostQuery, PostScope};
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::config::AppConfig;
use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn test_state() -> AppState {
    let tokens = JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
        issuer: "blogicum".to_string(),
    });

    AppState::in_memory(
        InMemoryStore::new(),
        Arc::new(tokens),
        Arc::new(Argon2PasswordService::new()),
        &AppConfig::default(),
    )
}

/// A stored user and a bearer header for them.
async fn user(state: &AppState, username: &str) -> (User, (header::HeaderName, String)) {
    let user = state
        .users
        .create(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "unused".to_string(),
        })
        .await
        .unwrap();
    let token = state.tokens.generate_token(user.id, &user.username).unwrap();

    (user, (header::AUTHORIZATION, format!("Bearer {token}")))
}

async fn category(state: &AppState, slug: &str, is_published: bool) -> Category {
    state
        .categories
        .create(NewCategory {
            title: slug.to_string(),
            description: String::new(),
            slug: slug.to_string(),
            is_published,
        })
        .await
        .unwrap()
}

fn draft(title: &str, category: &Category) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        text: "Some text".to_string(),
        pub_date: Utc::now() - Duration::hours(1),
        location_id: None,
        category_id: Some(category.id),
        is_published: true,
        image: None,
    }
}

async fn post(state: &AppState, author: &User, draft: PostDraft) -> Post {
    state.posts.create(author.id, draft).await.unwrap()
}

fn titles(page_obj: &Value) -> Vec<String> {
    page_obj["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect()
}

fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[actix_rt::test]
async fn test_index_hides_unpublished_future_and_hidden_category_posts() {
    let state = test_state();
    let (author, _) = user(&state, "author").await;
    let travel = category(&state, "travel", true).await;
    let drafts = category(&state, "drafts", false).await;

    post(&state, &author, draft("visible", &travel)).await;
    post(
        &state,
        &author,
        PostDraft {
            is_published: false,
            ..draft("unpublished", &travel)
        },
    )
    .await;
    post(
        &state,
        &author,
        PostDraft {
            pub_date: Utc::now() + Duration::days(1),
            ..draft("future", &travel)
        },
    )
    .await;
    post(&state, &author, draft("in hidden category", &drafts)).await;

    let app = app!(state);
    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(titles(&body["page_obj"]), vec!["visible"]);
    assert_eq!(body["page_obj"]["items"][0]["comment_count"], 0);
}

#[actix_rt::test]
async fn test_index_paginates_ten_per_page() {
    let state = test_state();
    let (author, _) = user(&state, "author").await;
    let travel = category(&state, "travel", true).await;
    for i in 0..11 {
        post(
            &state,
            &author,
            PostDraft {
                pub_date: Utc::now() - Duration::hours(i + 1),
                ..draft(&format!("post {i}"), &travel)
            },
        )
        .await;
    }

    let app = app!(state);

    let first: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(first["page_obj"]["items"].as_array().unwrap().len(), 10);
    assert_eq!(first["page_obj"]["num_pages"], 2);
    assert_eq!(first["page_obj"]["has_next"], true);
    assert_eq!(titles(&first["page_obj"])[0], "post 0");

    let second: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=2").to_request(),
    )
    .await;
    assert_eq!(titles(&second["page_obj"]), vec!["post 10"]);

    let clamped: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=99").to_request(),
    )
    .await;
    assert_eq!(clamped["page_obj"]["number"], 2);
}

#[actix_rt::test]
async fn test_profile_shows_hidden_posts_to_owner_only() {
    let state = test_state();
    let (author, author_auth) = user(&state, "author").await;
    let (_, reader_auth) = user(&state, "reader").await;
    let travel = category(&state, "travel", true).await;

    post(&state, &author, draft("public", &travel)).await;
    post(
        &state,
        &author,
        PostDraft {
            is_published: false,
            ..draft("hidden", &travel)
        },
    )
    .await;

    let app = app!(state);

    let own: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/author/")
            .insert_header(author_auth)
            .to_request(),
    )
    .await;
    assert_eq!(titles(&own["page_obj"]), vec!["hidden", "public"]);

    let other: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/author/")
            .insert_header(reader_auth)
            .to_request(),
    )
    .await;
    assert_eq!(titles(&other["page_obj"]), vec!["public"]);
    assert_eq!(other["profile"]["username"], "author");

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/profile/nobody/").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_hidden_post_detail_is_visible_to_author_only() {
    let state = test_state();
    let (author, author_auth) = user(&state, "author").await;
    let (_, reader_auth) = user(&state, "reader").await;
    let travel = category(&state, "travel", true).await;
    let hidden = post(
        &state,
        &author,
        PostDraft {
            is_published: false,
            ..draft("hidden", &travel)
        },
    )
    .await;
    let uri = format!("/posts/{}/", hidden.id);

    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header(reader_auth)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header(author_auth)
            .to_request(),
    )
    .await;
    assert_eq!(body["post"]["title"], "hidden");
}

#[actix_rt::test]
async fn test_post_detail_lists_comments_oldest_first() {
    let state = test_state();
    let (author, _) = user(&state, "author").await;
    let travel = category(&state, "travel", true).await;
    let entry = post(&state, &author, draft("entry", &travel)).await;
    for text in ["first", "second"] {
        state
            .comments
            .create(NewComment {
                post_id: entry.id,
                author_id: author.id,
                text: text.to_string(),
            })
            .await
            .unwrap();
    }

    let app = app!(state);
    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", entry.id))
            .to_request(),
    )
    .await;

    assert_eq!(body["comments"][0]["text"], "first");
    assert_eq!(body["comments"][1]["text"], "second");
    assert_eq!(body["comments"][0]["author"]["username"], "author");
    assert_eq!(body["post"]["comment_count"], 2);
}

#[actix_rt::test]
async fn test_category_page_requires_published_category() {
    let state = test_state();
    let (author, _) = user(&state, "author").await;
    let travel = category(&state, "travel", true).await;
    category(&state, "drafts", false).await;
    post(&state, &author, draft("trip", &travel)).await;

    let app = app!(state);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/category/travel/").to_request(),
    )
    .await;
    assert_eq!(body["category"]["slug"], "travel");
    assert_eq!(titles(&body["page_obj"]), vec!["trip"]);

    for uri in ["/category/drafts/", "/category/missing/"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_rt::test]
async fn test_protected_routes_redirect_to_login() {
    let state = test_state();
    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/posts/create/").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=%2Fposts%2Fcreate%2F");
}

#[actix_rt::test]
async fn test_create_post_redirects_to_profile() {
    let state = test_state();
    let (author, auth) = user(&state, "author").await;
    let travel = category(&state, "travel", true).await;
    let category_id = travel.id.to_string();

    let app = app!(state);
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .insert_header(auth)
            .set_form(&[
                ("title", "Hello"),
                ("text", "World"),
                ("pub_date", "2024-05-01"),
                ("category", category_id.as_str()),
                ("is_published", "on"),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/author/");

    let listed: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(titles(&listed["page_obj"]), vec!["Hello"]);
    assert_eq!(listed["page_obj"]["items"][0]["author"]["id"], author.id);
}

#[actix_rt::test]
async fn test_create_post_with_empty_pub_date_is_rejected() {
    let state = test_state();
    let (author, auth) = user(&state, "author").await;
    let travel = category(&state, "travel", true).await;
    let category_id = travel.id.to_string();

    let app = app!(state);
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .insert_header(auth)
            .set_form(&[
                ("title", "Hello"),
                ("text", "World"),
                ("pub_date", ""),
                ("category", category_id.as_str()),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["pub_date"].is_array());
    assert_eq!(body["form"]["title"], "Hello");

    let posts = state
        .posts
        .count(PostQuery::new(
            PostScope::Author {
                author_id: author.id,
                include_hidden: true,
            },
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(posts, 0);
}

#[actix_rt::test]
async fn test_non_author_cannot_edit_or_delete_post() {
    let state = test_state();
    let (author, _) = user(&state, "author").await;
    let (_, intruder_auth) = user(&state, "intruder").await;
    let travel = category(&state, "travel", true).await;
    let entry = post(&state, &author, draft("original", &travel)).await;
    let detail = format!("/posts/{}/", entry.id);
    let category_id = travel.id.to_string();

    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", entry.id))
            .insert_header(intruder_auth.clone())
            .set_form(&[
                ("title", "defaced"),
                ("text", "defaced"),
                ("pub_date", "2024-05-01"),
                ("category", category_id.as_str()),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/delete/", entry.id))
            .insert_header(intruder_auth)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let stored = state.posts.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "original");
}

#[actix_rt::test]
async fn test_non_author_json_edit_redirects_before_decoding() {
    let state = test_state();
    let (author, _) = user(&state, "author").await;
    let (_, intruder_auth) = user(&state, "intruder").await;
    let travel = category(&state, "travel", true).await;
    let entry = post(&state, &author, draft("original", &travel)).await;
    let comment = state
        .comments
        .create(NewComment {
            post_id: entry.id,
            author_id: author.id,
            text: "mine".to_string(),
        })
        .await
        .unwrap();
    let detail = format!("/posts/{}/", entry.id);

    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", entry.id))
            .insert_header(intruder_auth.clone())
            .set_json(serde_json::json!({ "title": "defaced" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit_comment/{}/", entry.id, comment.id))
            .insert_header(intruder_auth)
            .set_json(serde_json::json!({ "text": "hijacked" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let stored = state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "mine");
}

#[actix_rt::test]
async fn test_author_edits_post() {
    let state = test_state();
    let (author, auth) = user(&state, "author").await;
    let travel = category(&state, "travel", true).await;
    let entry = post(&state, &author, draft("original", &travel)).await;
    let category_id = travel.id.to_string();

    let app = app!(state);

    let form: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/edit/", entry.id))
            .insert_header(auth.clone())
            .to_request(),
    )
    .await;
    assert_eq!(form["form"]["title"], "original");
    assert_eq!(form["choices"]["categories"][0]["slug"], "travel");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", entry.id))
            .insert_header(auth)
            .set_form(&[
                ("title", "revised"),
                ("text", "new text"),
                ("pub_date", "2024-05-01 10:30"),
                ("category", category_id.as_str()),
                ("is_published", "on"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", entry.id));

    let stored = state.posts.find_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "revised");
    assert_eq!(stored.author_id, author.id);
}

#[actix_rt::test]
async fn test_deleting_post_removes_comments() {
    let state = test_state();
    let (author, auth) = user(&state, "author").await;
    let travel = category(&state, "travel", true).await;
    let entry = post(&state, &author, draft("doomed", &travel)).await;
    let comment = state
        .comments
        .create(NewComment {
            post_id: entry.id,
            author_id: author.id,
            text: "bye".to_string(),
        })
        .await
        .unwrap();

    let app = app!(state);
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/delete/", entry.id))
            .insert_header(auth)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/author/");
    assert!(state.posts.find_by_id(entry.id).await.unwrap().is_none());
    assert!(state.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_add_comment_redirects_to_post() {
    let state = test_state();
    let (author, _) = user(&state, "author").await;
    let (_, reader_auth) = user(&state, "reader").await;
    let travel = category(&state, "travel", true).await;
    let entry = post(&state, &author, draft("entry", &travel)).await;

    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment", entry.id))
            .insert_header(reader_auth.clone())
            .set_form(&[("text", "Nice!")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", entry.id));

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment", entry.id))
            .insert_header(reader_auth)
            .set_form(&[("text", "   ")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let comments = state.comments.find_by_post(entry.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "Nice!");
}

#[actix_rt::test]
async fn test_comment_posted_to_detail_page() {
    let state = test_state();
    let (author, _) = user(&state, "author").await;
    let (_, reader_auth) = user(&state, "reader").await;
    let travel = category(&state, "travel", true).await;
    let entry = post(&state, &author, draft("entry", &travel)).await;
    let detail = format!("/posts/{}/", entry.id);

    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&detail)
            .insert_header(reader_auth)
            .set_form(&[("text", "From the detail page")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&detail)
            .set_form(&[("text", "anonymous")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert!(location(&res).starts_with("/auth/login/?next="));

    let comments = state.comments.find_by_post(entry.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "From the detail page");
}

#[actix_rt::test]
async fn test_cannot_comment_on_hidden_post() {
    let state = test_state();
    let (author, _) = user(&state, "author").await;
    let (_, reader_auth) = user(&state, "reader").await;
    let travel = category(&state, "travel", true).await;
    let hidden = post(
        &state,
        &author,
        PostDraft {
            is_published: false,
            ..draft("hidden", &travel)
        },
    )
    .await;

    let app = app!(state);
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment", hidden.id))
            .insert_header(reader_auth)
            .set_form(&[("text", "sneaky")])
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(state.comments.find_by_post(hidden.id).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_only_comment_author_can_edit_or_delete() {
    let state = test_state();
    let (author, author_auth) = user(&state, "author").await;
    let (_, intruder_auth) = user(&state, "intruder").await;
    let travel = category(&state, "travel", true).await;
    let entry = post(&state, &author, draft("entry", &travel)).await;
    let comment = state
        .comments
        .create(NewComment {
            post_id: entry.id,
            author_id: author.id,
            text: "mine".to_string(),
        })
        .await
        .unwrap();
    let detail = format!("/posts/{}/", entry.id);
    let edit = format!("/posts/{}/edit_comment/{}/", entry.id, comment.id);
    let delete = format!("/posts/{}/delete_comment/{}/", entry.id, comment.id);

    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&edit)
            .insert_header(intruder_auth.clone())
            .set_form(&[("text", "hijacked")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&delete)
            .insert_header(intruder_auth)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let stored = state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "mine");

    let page: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&edit)
            .insert_header(author_auth.clone())
            .to_request(),
    )
    .await;
    assert_eq!(page["form"]["text"], "mine");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&edit)
            .insert_header(author_auth.clone())
            .set_form(&[("text", "edited")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    let stored = state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "edited");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&delete)
            .insert_header(author_auth)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);
    assert!(state.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_comment_addressed_through_wrong_post_is_not_found() {
    let state = test_state();
    let (author, auth) = user(&state, "author").await;
    let travel = category(&state, "travel", true).await;
    let first = post(&state, &author, draft("first", &travel)).await;
    let second = post(&state, &author, draft("second", &travel)).await;
    let comment = state
        .comments
        .create(NewComment {
            post_id: first.id,
            author_id: author.id,
            text: "on first".to_string(),
        })
        .await
        .unwrap();

    let app = app!(state);
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/delete_comment/{}/", second.id, comment.id))
            .insert_header(auth)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_edit_profile() {
    let state = test_state();
    let (_, auth) = user(&state, "leo").await;
    user(&state, "taken").await;

    let app = app!(state);

    let form: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/edit_profile/")
            .insert_header(auth.clone())
            .to_request(),
    )
    .await;
    assert_eq!(form["form"]["username"], "leo");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/profile/edit_profile/")
            .insert_header(auth.clone())
            .set_form(&[("username", "taken"), ("email", "leo@example.com")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["username"].is_array());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/profile/edit_profile/")
            .insert_header(auth)
            .set_form(&[
                ("username", "tolstoy"),
                ("first_name", "Leo"),
                ("last_name", "Tolstoy"),
                ("email", "leo@example.com"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/tolstoy/");

    let updated = state.users.find_by_username("tolstoy").await.unwrap().unwrap();
    assert_eq!(updated.first_name, "Leo");
}

#[actix_rt::test]
async fn test_register_then_login() {
    let state = test_state();
    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/registration/")
            .set_form(&[
                ("username", "newbie"),
                ("email", "newbie@example.com"),
                ("password", "correct horse"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["token_type"], "Bearer");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/registration/")
            .set_form(&[
                ("username", "newbie"),
                ("email", "other@example.com"),
                ("password", "correct horse"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login/")
            .set_form(&[("username", "newbie"), ("password", "wrong password")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/auth/login/?next=%2Fposts%2Fcreate%2F")
            .set_form(&[("username", "newbie"), ("password", "correct horse")])
            .to_request(),
    )
    .await;
    assert_eq!(body["next"], "/posts/create/");

    let token = body["access_token"].as_str().unwrap().to_string();
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/posts/create/")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_health_check() {
    let state = test_state();
    let app = app!(state);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/health").to_request(),
    )
    .await;

    assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn test_health_check_reports_request_id() {
    let state = test_state();
    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes),
    )
    .await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/health")
            .insert_header(("X-Request-ID", "health-42"))
            .to_request(),
    )
    .await;

    assert_eq!(body["request_id"], "health-42");
}
