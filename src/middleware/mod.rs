pub mod session_auth;

pub use session_auth::{
    current_user, require_admin, require_auth, school_scope, SessionUser, SESSION_USER_KEY,
};
