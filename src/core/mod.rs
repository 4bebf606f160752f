pub mod services;
pub mod session;
pub mod sync_store;
pub mod time;
pub mod utils;
