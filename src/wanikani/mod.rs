pub mod api;
pub mod state;
pub mod types;

pub use api::{
    ProgressService,
    WaniKaniClient,
};
pub use state::{
    KnowledgeCache,
    KnowledgeConfig,
    KnowledgeStore,
    RefreshMode,
    RefreshSummary,
};
