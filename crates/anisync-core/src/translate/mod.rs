mod date;
mod score;
mod status;

pub use date::{should_include_in_update, source_equal_to_target};
pub use score::{denormalize_to_anilist, denormalize_to_mal, normalize_from_anilist, ScoreFormat};
pub use status::{from_anilist_str, from_mal_str, to_anilist_str, to_mal_str};
