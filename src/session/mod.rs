pub mod storage;
pub mod store;

pub use storage::{
    clear_session, customer_cookie_name, token_cookie_name, DiagnosticSink, LoggingNavigator,
    MemoryJar, Navigator, SessionCookie, SessionStorage, StorageError, TracingSink,
};
pub use store::{AuthState, AuthStore};
