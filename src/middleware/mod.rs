pub mod flash;
pub mod session;

pub use flash::{set_flash, take_flash, Flash, FlashKind};
pub use session::{
    end_session, get_current_user, purge_expired_sessions, require_api_user, require_page_user, start_session,
    CurrentUser, AUTH_COOKIE,
};
