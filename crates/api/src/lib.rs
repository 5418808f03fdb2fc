//! Client side of the transit-data backend.
//!
//! [`Backend`] is the seam the viewer talks to. [`HttpBackend`] speaks the REST
//! API over reqwest; [`MemoryBackend`] keeps everything in process for tests and
//! offline sessions.

pub mod backend;
pub mod client;
pub mod error;
pub mod memory;

pub use backend::*;
pub use client::*;
pub use error::*;
pub use memory::*;
