mod combinators;
mod grammar;
mod state;

pub use combinators::*;
pub use grammar::parse;
pub use state::{ParseError, ParseResult, ParseState, Parser};
