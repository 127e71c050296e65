//! Domain entities - the core business objects.

mod form;
mod group;
mod post;
mod user;

pub use form::{FieldErrors, INVALID_CHOICE_MESSAGE, PostForm, REQUIRED_MESSAGE};
pub use group::{Group, NewGroup};
pub use post::{NewPost, Post, PostScope};
pub use user::{Actor, User};
