pub mod cache;
pub mod compare;
pub mod context;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod options;
pub mod providers;
pub mod report;
pub mod retry;
pub mod service;
pub mod strategies;
pub mod translate;

pub use context::Context;
pub use error::{Result, SyncError};
pub use options::SyncOptions;
