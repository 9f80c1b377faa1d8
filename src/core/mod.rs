pub mod errors;
pub mod http;
pub mod models;
pub mod pipeline;
pub mod utils;

pub use errors::{
    ErrorKind,
    Service,
    WaniWordsError,
};
pub use models::{
    Deck,
    VocabularyId,
    WordList,
};
