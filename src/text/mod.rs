//! Borrowed byte spans and the quote-aware splitter used for rows and fields.

mod cut;
mod span;

pub use cut::{cut, Cut, Pieces};
pub use span::Str;
