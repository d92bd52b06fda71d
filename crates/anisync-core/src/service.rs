use crate::context::Context;
use crate::error::Result;
use crate::models::{FuzzyDate, MediaEntity, MediaVariant, Status};
use crate::translate::ScoreFormat;

/// The minimal set of fields an update can change. Always carries status,
/// progress, and score; date fields are optional under the conditional
/// inclusion rule, and `progress_volumes` only applies to manga.
#[derive(Debug, Clone, Default)]
pub struct UpdateFields {
    pub status: Option<Status>,
    pub progress: Option<u32>,
    pub progress_volumes: Option<u32>,
    pub score: Option<u8>,
    pub started_at: Option<FuzzyDate>,
    pub finished_at: Option<FuzzyDate>,
}

/// The contract the reconciliation engine needs from each service, per
/// variant. AniList and MyAnimeList each implement this once per
/// variant they support; the `get_by_mal_id`/`get_user_score_format`/
/// `toggle_favourite` members only make sense for an AniList adapter, so they
/// default to "not found"/passthrough for the MyAnimeList implementation.
pub trait ServiceAdapter: Send + Sync {
    fn variant(&self) -> MediaVariant;

    fn get_user_list(&self, ctx: &Context) -> impl std::future::Future<Output = Result<Vec<MediaEntity>>> + Send;

    fn get_by_id(&self, ctx: &Context, id: u64) -> impl std::future::Future<Output = Result<Option<MediaEntity>>> + Send;

    fn get_by_name(&self, ctx: &Context, name: &str) -> impl std::future::Future<Output = Result<Vec<MediaEntity>>> + Send;

    /// Cross-namespace lookup by MyAnimeList ID. Only meaningful on the
    /// AniList adapter; a MyAnimeList adapter should return `Ok(None)`.
    fn get_by_mal_id(&self, ctx: &Context, mal_id: u64) -> impl std::future::Future<Output = Result<Option<MediaEntity>>> + Send;

    fn update(&self, ctx: &Context, id: u64, fields: UpdateFields) -> impl std::future::Future<Output = Result<()>> + Send;

    /// The viewer's AniList scoring format. A MyAnimeList adapter has no such
    /// concept and should return [`ScoreFormat::default`].
    fn get_user_score_format(&self, ctx: &Context) -> impl std::future::Future<Output = Result<ScoreFormat>> + Send;

    /// Idempotent favourite toggle. AniList-only and optional; the default
    /// implementation is a no-op for adapters that don't support it.
    fn toggle_favourite(&self, _ctx: &Context, _id: u64) -> impl std::future::Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}
