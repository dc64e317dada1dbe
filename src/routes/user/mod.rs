mod handler;
mod model;

pub use handler::{create_user, delete_user, get_user, get_users, login, update_user};
pub use model::{LoginResponse, User, UserAction, UserRequest};
