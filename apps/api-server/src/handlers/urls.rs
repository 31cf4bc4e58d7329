//! URL reversal for redirect targets.

pub fn post_detail(id: i64) -> String {
    format!("/posts/{id}/")
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

/// The login page, remembering where to go afterwards.
pub fn login(login_url: &str, next: &str) -> String {
    format!("{login_url}?next={}", urlencoding::encode(next))
}
