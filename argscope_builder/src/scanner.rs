mod lexer;
mod model;
mod stream;

pub(crate) use lexer::*;
pub(crate) use model::*;
pub(crate) use stream::*;
