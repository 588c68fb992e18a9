use console::{Term, style};
use doccache::{SyncOutcome, SyncRequest};

use crate::commands::catalog::CliCatalog;

/// Build the request: an empty repository list means the whole organization.
fn build_request(repos: Vec<String>, force: bool) -> SyncRequest {
    let request = if repos.is_empty() {
        SyncRequest::all()
    } else {
        SyncRequest::repos(repos)
    };
    request.force(force)
}

pub(crate) async fn handle_sync(
    catalog: &CliCatalog,
    repos: Vec<String>,
    force: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = build_request(repos, force);
    tracing::info!(
        org = %catalog.settings().org,
        repos = ?request.repos,
        force = request.force,
        "Starting sync"
    );

    let outcome = catalog.sync(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome);
    }

    if outcome.failed > 0 || outcome.skipped > 0 {
        return Err(format!(
            "{} of {} repositories did not sync",
            outcome.failed + outcome.skipped,
            outcome.total
        )
        .into());
    }
    Ok(())
}

fn print_summary(outcome: &SyncOutcome) {
    let is_tty = Term::stdout().is_term();
    let seconds = outcome.duration_ms as f64 / 1000.0;

    if is_tty {
        println!(
            "{} {} synced, {} failed, {} skipped of {} in {:.1}s",
            style("Sync complete:").bold(),
            style(outcome.succeeded).green(),
            style(outcome.failed).red(),
            style(outcome.skipped).yellow(),
            outcome.total,
            seconds
        );
    } else {
        println!(
            "Sync complete: {} synced, {} failed, {} skipped of {} in {:.1}s",
            outcome.succeeded, outcome.failed, outcome.skipped, outcome.total, seconds
        );
    }

    for failure in &outcome.failures {
        println!("  - {failure}");
    }

    if outcome.rate_limited {
        println!(
            "Stopped early: GitHub rate limit reached. Remaining repositories were not synced."
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_repo_list_syncs_everything() {
        let request = build_request(Vec::new(), false);
        assert!(request.repos.is_none());
        assert!(!request.force);
    }

    #[test]
    fn named_repos_are_passed_through() {
        let request = build_request(vec!["payments".to_string()], true);
        assert_eq!(request.repos, Some(vec!["payments".to_string()]));
        assert!(request.force);
    }
}
