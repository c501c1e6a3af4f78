use crate::TaskError;
use sagw_wells::api::Connector;
use std::time::Duration;

/// Pause before the second connection attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Open a session, trying exactly once more after `retry_delay` when the
/// first attempt could not reach the service.
pub async fn acquire_session<C: Connector>(
    connector: &C,
    retry_delay: Duration,
) -> Result<C::Session, TaskError> {
    match connector.connect().await {
        Ok(session) => Ok(session),
        Err(e) if e.is_connection() => {
            log::warn!("Connection failed ({}), retrying in {:?}", e, retry_delay);
            tokio::time::sleep(retry_delay).await;
            connector.connect().await.map_err(|e| {
                log::error!("Connection failed again: {}", e);
                TaskError::session(&e)
            })
        }
        Err(e) => Err(TaskError::session(&e)),
    }
}
