mod session;

pub use session::SESSION_TTL_MINUTES;
pub use session::SessionStore;
