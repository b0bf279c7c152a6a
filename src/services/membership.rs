//! Cohort membership and authorization provider
//!
//! The engine never derives cohort membership itself; it asks this
//! collaborator for the active member list (bulk registration) and for
//! administrator authorization (payment recording).

use std::collections::HashMap;

use crate::models::cohort::CohortMember;
use crate::utils::errors::Result;

#[allow(async_fn_in_trait)]
pub trait CohortDirectory: Send + Sync {
    /// Active members of a cohort, including their admin flag
    async fn active_members(&self, cohort_id: i64) -> Result<Vec<CohortMember>>;

    /// Whether `user_id` is an authorized administrator for the cohort
    async fn is_cohort_admin(&self, cohort_id: i64, user_id: i64) -> Result<bool>;
}

/// In-memory directory backed by a fixed membership map.
///
/// Used by tests and by deployments that resolve membership ahead of time.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    members: HashMap<i64, Vec<CohortMember>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cohort(mut self, cohort_id: i64, members: Vec<CohortMember>) -> Self {
        self.members.insert(cohort_id, members);
        self
    }

    pub fn add_member(&mut self, cohort_id: i64, user_id: i64, is_admin: bool) {
        self.members.entry(cohort_id).or_default().push(CohortMember {
            user_id,
            cohort_id,
            is_admin,
        });
    }
}

impl CohortDirectory for StaticDirectory {
    async fn active_members(&self, cohort_id: i64) -> Result<Vec<CohortMember>> {
        Ok(self.members.get(&cohort_id).cloned().unwrap_or_default())
    }

    async fn is_cohort_admin(&self, cohort_id: i64, user_id: i64) -> Result<bool> {
        Ok(self
            .members
            .get(&cohort_id)
            .map(|members| {
                members
                    .iter()
                    .any(|m| m.user_id == user_id && m.is_admin)
            })
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_directory_resolves_members_and_admins() {
        let mut directory = StaticDirectory::new();
        directory.add_member(5, 100, true);
        directory.add_member(5, 101, false);

        let members = directory.active_members(5).await.unwrap();
        assert_eq!(members.len(), 2);

        assert!(directory.is_cohort_admin(5, 100).await.unwrap());
        assert!(!directory.is_cohort_admin(5, 101).await.unwrap());
        assert!(!directory.is_cohort_admin(6, 100).await.unwrap());
    }
}
