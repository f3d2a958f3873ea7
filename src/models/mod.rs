pub mod follow;
pub mod post;
pub mod user;

pub use follow::Follow;
pub use post::{Post, ShowPost};
pub use user::{Role, ShowAdmin, ShowUser, User};
