pub mod api;
pub mod dispatch;
pub mod render;
pub mod types;

use crate::feed::ListingSource;
use anyhow::Result;
use api::TelegramApi;
use dispatch::Dispatcher;
use std::time::Duration;

const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Long-poll Telegram and handle updates until Ctrl-C.
///
/// Telegram errors are logged and polling resumes after a pause; a failed
/// reply does not stop the remaining replies for the same update.
pub async fn run<S: ListingSource>(api: &TelegramApi, dispatcher: &mut Dispatcher<S>) -> Result<()> {
    let mut offset: Option<i64> = None;

    loop {
        let updates = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                return Ok(());
            }
            res = api.get_updates(offset) => res,
        };

        let updates = match updates {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!("getUpdates failed: {:#}", e);
                tokio::time::sleep(POLL_ERROR_PAUSE).await;
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            for reply in dispatcher.handle(&update).await {
                if let Err(e) = api.execute(reply).await {
                    tracing::warn!(update_id = update.update_id, "reply failed: {:#}", e);
                }
            }
        }
    }
}
