pub mod core;
pub mod sentences;

pub use core::{Corpus, BUILTIN_CORPUS};
pub use sentences::{leading_words, TextGenerator, TIME_MODE_SENTENCES};
