mod group;
mod kind;

pub use group::*;
pub use kind::*;
