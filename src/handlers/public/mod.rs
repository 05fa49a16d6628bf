// handlers/public/mod.rs - Public handlers (no authentication required)
pub mod login;
pub mod root;

pub use login::login;
pub use root::{health, root};
