pub mod api;
pub mod loader;
pub mod playback;
pub mod session;
pub mod source;

pub use session::Session;
