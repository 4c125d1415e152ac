pub mod auth;
pub mod handlers;
pub mod storage;
pub mod store;

pub use auth::{Authenticator, LocalAuthenticator};
pub use storage::{FileStorage, MemoryStorage, RedisStorage, SessionStorage};
pub use store::SessionStore;
