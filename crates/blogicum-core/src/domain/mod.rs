//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod user;

pub use category::{Category, NewCategory};
pub use comment::{Comment, NewComment};
pub use location::{Location, NewLocation};
pub use post::{Post, PostCard, PostDraft};
pub use user::{NewUser, ProfileUpdate, User};
