pub mod admin;
pub mod auth;
pub mod follows;
pub mod health;
pub mod posts;
pub mod users;

pub use admin::{grant_admin_privilege, revoke_admin_privilege};
pub use auth::login;
pub use follows::{follow_status, follow_user, list_followers, list_following, unfollow_user};
pub use health::health_check;
pub use posts::{
    add_reaction, clear_reactions, create_post, delete_post, get_post, list_posts_by_title,
    remove_reaction, restore_post, update_post,
};
pub use users::{delete_account, get_user, register_user, restore_account, update_profile};
