//! Type definitions

pub mod job;
pub mod messages;
pub mod property;
pub mod route;
pub mod service;
pub mod slot;
pub mod technician;

pub use job::*;
pub use messages::*;
pub use property::*;
pub use route::*;
pub use service::*;
pub use slot::*;
pub use technician::*;
