//! Builds a study list of frequent Japanese words the learner can already read but has not
//! studied yet, using WaniKani progress, and keeps a jpdb deck in sync with it.

pub mod config;
pub mod core;
pub mod corpus;
pub mod filters;
pub mod jpdb;
pub mod logging;
pub mod persistence;
pub mod wanikani;

pub use crate::core::{
    pipeline::{
        generate_study_list,
        StudyListOutcome,
        StudyListRequest,
    },
    ErrorKind,
    Service,
    WaniWordsError,
};
