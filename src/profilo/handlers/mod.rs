pub mod health;
pub use self::health::health;

pub mod profile;
pub use self::profile::{delete_by_id, get_by_id, list, patch, update};

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

// shared state for the handlers
use crate::profile::{pg::PgProfileStore, service::ProfileService};
use std::sync::Arc;

pub type SharedProfileService = Arc<ProfileService<PgProfileStore>>;
