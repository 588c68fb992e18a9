//! Sync status of a cached repository entry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of the most recent sync of a repository.
///
/// Written only by the sync pipeline, never by a read path.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Entry exists but has never completed a sync.
    #[sea_orm(string_value = "idle")]
    #[default]
    Idle,
    #[sea_orm(string_value = "ok")]
    Ok,
    /// Reserved for syncs that kept some documents but not others.
    #[sea_orm(string_value = "partial")]
    Partial,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "rate_limited")]
    RateLimited,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Idle => write!(f, "idle"),
            SyncStatus::Ok => write!(f, "ok"),
            SyncStatus::Partial => write!(f, "partial"),
            SyncStatus::Failed => write!(f, "failed"),
            SyncStatus::RateLimited => write!(f, "rate_limited"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(SyncStatus::default(), SyncStatus::Idle);
    }

    #[test]
    fn display_matches_stored_values() {
        assert_eq!(SyncStatus::Ok.to_string(), "ok");
        assert_eq!(SyncStatus::RateLimited.to_string(), "rate_limited");
        assert_eq!(
            serde_json::to_value(SyncStatus::RateLimited).unwrap(),
            "rate_limited"
        );
    }
}
