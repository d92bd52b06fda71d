mod media;

pub use media::{Direction, FuzzyDate, MediaEntity, MediaTitle, MediaVariant, Status};
