use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancels `cancelation` once the process receives ctrl-c, or returns early if something else
/// cancelled it first.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received ctrl-c, stopping");
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => {},
    };
}
