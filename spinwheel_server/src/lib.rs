pub mod routes;
pub mod store;

pub use crate::routes::{router, AppState};
pub use crate::store::{SessionEntry, SessionStore};
