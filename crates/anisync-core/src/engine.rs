use std::sync::Arc;

use tracing::{info, instrument};

use crate::compare::{diff_fields, render_diff, same_progress_with_target};
use crate::context::Context;
use crate::error::Result;
use crate::models::{MediaVariant, Status};
use crate::options::SyncOptions;
use crate::report::{Outcome, SkipReason, SyncReport};
use crate::service::{ServiceAdapter, UpdateFields};
use crate::strategies::{StrategyChain, TargetIndex};
use crate::translate::should_include_in_update;

/// Runs one (variant, direction) reconciliation pass: fetch both lists,
/// resolve each source entry through the strategy chain, compare, diff, and
/// dispatch updates to the target service.
///
/// Generic over both adapters rather than boxed, since a process only ever
/// wires up two concrete adapters (AniList, MyAnimeList) and there's no need
/// to swap them at runtime.
pub struct Engine<S: ServiceAdapter, T: ServiceAdapter> {
    source: Arc<S>,
    chain: StrategyChain<T>,
    options: SyncOptions,
}

impl<S: ServiceAdapter, T: ServiceAdapter> Engine<S, T> {
    pub fn new(source: Arc<S>, chain: StrategyChain<T>, options: SyncOptions) -> Self {
        Self { source, chain, options }
    }

    #[instrument(skip_all, fields(variant = ?self.source.variant(), direction = ?self.options.direction))]
    pub async fn run(&self, ctx: &Context) -> Result<Arc<SyncReport>> {
        let report = Arc::new(SyncReport::new());
        let variant = self.source.variant();

        let source_list = self.source.get_user_list(ctx).await?;
        let target_list = self.chain.target_adapter.get_user_list(ctx).await?;
        let index = TargetIndex::build(target_list);

        for source_entry in &source_list {
            ctx.check()?;
            let title = source_entry.title.preferred().to_string();

            if source_entry.status == Status::Unknown {
                report.record_outcome(Outcome::Skipped { title, reason: SkipReason::UnknownStatus });
                continue;
            }
            if self.options.is_ignored(&title) {
                report.record_outcome(Outcome::Skipped { title, reason: SkipReason::Ignored });
                continue;
            }
            if source_entry.id_anilist == 0 && source_entry.id_mal == 0 && title.is_empty() {
                report.record_outcome(Outcome::Skipped { title, reason: SkipReason::NoIdentifier });
                continue;
            }

            report.record_status(source_entry.status, variant);

            let resolved = match self
                .chain
                .resolve(ctx, source_entry, &index, self.options.direction, &report)
                .await
            {
                Ok(resolved) => resolved,
                Err(err) if err.is_pass_fatal() => return Err(err),
                Err(err) => {
                    report.record_outcome(Outcome::Errored { title, message: err.to_string() });
                    continue;
                }
            };

            let Some(target_entry) = resolved else {
                report.record_outcome(Outcome::Unmapped {
                    title,
                    id_anilist: source_entry.id_anilist,
                    id_mal: source_entry.id_mal,
                    media_type: variant,
                });
                continue;
            };

            let fields = diff_fields(source_entry, &target_entry);
            if !self.options.force && same_progress_with_target(source_entry, &target_entry) {
                report.record_outcome(Outcome::Skipped { title, reason: SkipReason::NoChanges });
                continue;
            }

            let diff = render_diff(source_entry, &target_entry, &fields);

            if self.options.dry_run {
                report.record_outcome(Outcome::WouldUpdate { title, diff });
                continue;
            }

            let update = build_update_fields(source_entry, variant);
            let target_id = target_entry.id_on(self.options.direction);
            match self.chain.target_adapter.update(ctx, target_id, update).await {
                Ok(()) => {
                    info!(%title, %diff, "updated");
                    report.record_outcome(Outcome::Updated { title, diff });
                }
                Err(err) => {
                    report.record_outcome(Outcome::Errored { title, message: err.to_string() });
                }
            }
        }

        report.finish();
        Ok(report)
    }
}

fn build_update_fields(source: &crate::models::MediaEntity, variant: MediaVariant) -> UpdateFields {
    UpdateFields {
        status: Some(source.status),
        progress: Some(source.progress),
        progress_volumes: if variant == MediaVariant::Manga { source.progress_volumes } else { None },
        score: Some(source.score),
        started_at: should_include_in_update(source.started_at).then_some(source.started_at).flatten(),
        finished_at: (source.status == Status::Completed && should_include_in_update(source.finished_at))
            .then_some(source.finished_at)
            .flatten(),
    }
}
