pub mod app_store;
pub mod event;
pub mod state;

pub use app_store::*;
pub use event::*;
pub use state::*;
