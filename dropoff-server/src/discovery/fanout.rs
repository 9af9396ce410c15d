//! Bounded concurrent fan-out.

use std::future::Future;

use futures::stream::{self, StreamExt};

use super::error::DiscoveryError;
use super::generation::GenerationToken;

/// Run `f` over `items` with at most `limit` futures in flight.
///
/// Results come back in input order whatever order the futures finish in.
/// The token is checked before each launch; once it goes stale no further
/// work starts and the whole batch reports [`DiscoveryError::Superseded`].
pub async fn bounded_map<T, R, F, Fut>(
    items: Vec<T>,
    limit: usize,
    token: &GenerationToken,
    f: F,
) -> Result<Vec<R>, DiscoveryError>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    let results: Vec<Option<R>> = stream::iter(items)
        .map(|item| {
            let work = token.is_current().then(|| f(item));
            async move {
                match work {
                    Some(work) => Some(work.await),
                    None => None,
                }
            }
        })
        .buffered(limit.max(1))
        .collect()
        .await;

    token.ensure_current()?;
    results
        .into_iter()
        .collect::<Option<Vec<R>>>()
        .ok_or(DiscoveryError::Superseded)
}
