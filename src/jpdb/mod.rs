pub mod api;
pub mod sync;
mod types;

pub use api::{
    DeckService,
    JpdbClient,
};
pub use sync::{
    DeckSynchronizer,
    SyncOptions,
    SyncReport,
    DEFAULT_DECK_NAME,
};
