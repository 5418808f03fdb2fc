pub mod bbox;
pub mod bus_data;
pub mod clustering;
pub mod entity;
pub mod route;
pub mod source;
pub mod stop;
pub mod traffic;

pub use bbox::*;
pub use bus_data::*;
pub use clustering::*;
pub use entity::*;
pub use route::*;
pub use source::*;
pub use stop::*;
pub use traffic::*;
