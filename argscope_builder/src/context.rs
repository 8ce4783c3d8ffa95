mod config;
pub(crate) mod entity;
mod registry;
mod universe;

pub use config::*;
pub(crate) use entity::*;
pub(crate) use registry::*;
pub(crate) use universe::*;
