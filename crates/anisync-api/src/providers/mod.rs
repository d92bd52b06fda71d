mod arm;
mod hato;
mod jikan;
mod offline_db;

pub use arm::ArmProvider;
pub use hato::HatoProvider;
pub use jikan::JikanProvider;
pub use offline_db::OfflineDbProvider;
