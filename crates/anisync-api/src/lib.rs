pub mod anilist;
pub mod error;
pub mod mal;
pub mod providers;

pub use anilist::AniListClient;
pub use error::ApiError;
pub use mal::MalClient;
pub use providers::{ArmProvider, HatoProvider, JikanProvider, OfflineDbProvider};
