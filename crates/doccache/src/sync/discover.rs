use super::errors::{Result, SyncError};
use super::progress::{ProgressCallback, SyncProgress, emit};
use crate::platform::RemoteClient;

/// List every repository name in `org`.
///
/// All pages are flattened and empty names dropped. A listing failure
/// aborts: there is no partial discovery.
#[tracing::instrument(skip(client, on_progress))]
pub async fn discover_repos<C: RemoteClient + ?Sized>(
    client: &C,
    org: &str,
    on_progress: Option<&ProgressCallback>,
) -> Result<Vec<String>> {
    emit(
        on_progress,
        SyncProgress::DiscoveringRepos {
            org: org.to_string(),
        },
    );

    let listings = client.list_org_repos(org).await.map_err(|source| {
        tracing::error!(org = %org, error = %source, "Failed to list repositories");
        SyncError::Discovery {
            org: org.to_string(),
            source,
        }
    })?;

    let names: Vec<String> = listings
        .into_iter()
        .map(|listing| listing.name)
        .filter(|name| !name.trim().is_empty())
        .collect();

    emit(
        on_progress,
        SyncProgress::DiscoveryComplete {
            org: org.to_string(),
            total: names.len(),
        },
    );

    Ok(names)
}
