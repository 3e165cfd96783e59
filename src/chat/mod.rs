mod message;
mod panel;
mod sessions;

pub use message::{Message, Role};
pub use panel::{KeyPress, SendError};
pub use sessions::SessionStore;
