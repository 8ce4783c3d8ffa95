mod ast;
mod descent;
mod positionals;

pub(crate) use ast::*;
pub(crate) use descent::*;
pub(crate) use positionals::*;
