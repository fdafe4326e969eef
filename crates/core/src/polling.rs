//! Polling Refresher for live pages (dispatch center, emergency calls, patient tracking).
//!
//! Each tick fans out one refresh task per target so a slow backend never delays the timer.
//! Overlap is prevented by the targets themselves: a [`ListViewModel`](crate::ListViewModel)
//! refresh is single-flight and reports [`RefreshOutcome::Skipped`] while one is pending.

use crate::constants::DEFAULT_POLL_INTERVAL;
use crate::view_model::RefreshOutcome;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Something that can be re-fetched on a timer.
#[async_trait]
pub trait Refresh: Send + Sync {
    fn label(&self) -> &'static str;

    async fn refresh(&self) -> RefreshOutcome;
}

#[async_trait]
impl<R, C> Refresh for crate::view_model::ListViewModel<R, C>
where
    R: crate::resource::Resource,
    C: crate::client::ResourceApi<R> + 'static,
{
    fn label(&self) -> &'static str {
        R::LABEL
    }

    async fn refresh(&self) -> RefreshOutcome {
        crate::view_model::ListViewModel::refresh(self).await
    }
}

/// Background timer re-fetching a set of targets.
///
/// Dropping the refresher stops it.
pub struct PollingRefresher {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PollingRefresher {
    /// Start polling `targets` every `period`; the first refresh happens immediately.
    ///
    /// Cancelling `token` (or any parent of it) stops the timer.
    pub fn start(
        targets: Vec<Arc<dyn Refresh>>,
        period: Duration,
        token: CancellationToken,
    ) -> Self {
        let period = if period.is_zero() {
            tracing::warn!(
                "zero polling period requested; using {}s",
                DEFAULT_POLL_INTERVAL.as_secs()
            );
            DEFAULT_POLL_INTERVAL
        } else {
            period
        };

        let token = token.child_token();
        let stop = token.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => {
                        for target in &targets {
                            tokio::spawn(refresh_one(Arc::clone(target)));
                        }
                    }
                }
            }
            tracing::debug!("polling stopped");
        });

        tracing::info!("polling every {}s", period.as_secs_f32());
        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Stop the timer and wait for its task to finish.
    ///
    /// Refreshes already started run to completion; the targets' own scopes decide whether their
    /// results are applied.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("polling task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for PollingRefresher {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn refresh_one(target: Arc<dyn Refresh>) {
    match target.refresh().await {
        RefreshOutcome::Loaded(n) => tracing::debug!("polled {}: {} records", target.label(), n),
        RefreshOutcome::Skipped => {
            tracing::debug!("{} still fetching; tick skipped", target.label())
        }
        RefreshOutcome::Cancelled => {}
        RefreshOutcome::Failed(e) => tracing::warn!("polling {} failed: {}", target.label(), e),
    }
}
