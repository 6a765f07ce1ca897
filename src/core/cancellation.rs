use std::future::Future;

use tokio_util::sync::{CancellationToken, DropGuard};

use crate::core::{AppError, Result};

/// Race a read model round trip against the request's cancellation token.
pub async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AppError::Cancelled),
        result = fut => result,
    }
}

/// Token for one HTTP request.
///
/// The guard cancels the token when dropped, so keeping it alive for the
/// lifetime of the handler future ties cancellation to client disconnects.
pub fn request_token() -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}
