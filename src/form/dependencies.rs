//! Staged edits to a monitor's upstream dependencies.
//!
//! Nothing here talks to the API until [`DependencyEditor::commit`] runs,
//! which happens only after the monitor itself was saved.

use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::api::models::{BulkCreateDependencies, DependencyId, MonitorDependency, MonitorId};
use crate::api::{ApiError, MonitorApi};
use crate::error::ReconcileStep;

/// One row of the dependency list as the user sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedDependency {
    Existing {
        dependency_id: DependencyId,
        upstream_id: MonitorId,
    },
    Pending {
        upstream_id: MonitorId,
    },
}

impl StagedDependency {
    pub fn upstream_id(&self) -> &str {
        match self {
            StagedDependency::Existing { upstream_id, .. } | StagedDependency::Pending { upstream_id } => upstream_id,
        }
    }
}

/// The step that failed during [`DependencyEditor::commit`].
#[derive(Debug)]
pub struct ReconcileFailure {
    pub step: ReconcileStep,
    pub source: ApiError,
}

#[derive(Debug, Clone)]
pub struct DependencyEditor {
    monitor_id: MonitorId,
    existing: Vec<MonitorDependency>,
    pending: Vec<MonitorId>,
    removed: Vec<DependencyId>,
}

impl DependencyEditor {
    pub fn new(monitor_id: impl Into<MonitorId>, existing: Vec<MonitorDependency>) -> Self {
        Self {
            monitor_id: monitor_id.into(),
            existing,
            pending: Vec::new(),
            removed: Vec::new(),
        }
    }

    pub fn monitor_id(&self) -> &str {
        &self.monitor_id
    }

    /// Stages new upstream monitors. Ids that are already visible, already
    /// pending or equal to the monitor itself are ignored.
    pub fn add_pending<I, S>(&mut self, upstream_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<MonitorId>,
    {
        for id in upstream_ids {
            let id = id.into();
            if self.excluded_ids().contains(&id) {
                continue;
            }
            self.pending.push(id);
        }
    }

    /// Removes a row. A pending row is simply dropped; an existing one is
    /// staged for deletion.
    pub fn mark_removed(&mut self, dependency_id: Option<&str>, upstream_id: &str) {
        if let Some(pos) = self.pending.iter().position(|id| id == upstream_id) {
            self.pending.remove(pos);
            return;
        }
        let target = self.existing.iter().find(|dep| match dependency_id {
            Some(dependency_id) => dep.id == dependency_id,
            None => dep.upstream_monitor_id == upstream_id,
        });
        if let Some(dep) = target {
            if !self.removed.contains(&dep.id) {
                self.removed.push(dep.id.clone());
            }
        }
    }

    /// Ids the upstream picker must not offer.
    pub fn excluded_ids(&self) -> BTreeSet<MonitorId> {
        let mut ids: BTreeSet<MonitorId> = self.visible().iter().map(|row| row.upstream_id().to_string()).collect();
        ids.insert(self.monitor_id.clone());
        ids
    }

    pub fn visible(&self) -> Vec<StagedDependency> {
        let existing = self
            .existing
            .iter()
            .filter(|dep| !self.removed.contains(&dep.id))
            .map(|dep| StagedDependency::Existing {
                dependency_id: dep.id.clone(),
                upstream_id: dep.upstream_monitor_id.clone(),
            });
        let pending = self.pending.iter().map(|id| StagedDependency::Pending {
            upstream_id: id.clone(),
        });
        existing.chain(pending).collect()
    }

    pub fn pending(&self) -> &[MonitorId] {
        &self.pending
    }

    pub fn removed(&self) -> &[DependencyId] {
        &self.removed
    }

    pub fn has_changes(&self) -> bool {
        !self.pending.is_empty() || !self.removed.is_empty()
    }

    /// Applies staged edits: every deletion first, then one bulk create.
    ///
    /// Each step that succeeds is dropped from the staging lists before the
    /// next one starts, so calling this again after a failure only issues the
    /// steps that have not been applied yet.
    pub async fn commit(&mut self, api: &dyn MonitorApi) -> Result<(), ReconcileFailure> {
        while let Some(dependency_id) = self.removed.first().cloned() {
            if let Err(source) = api.delete_dependency(&dependency_id).await {
                warn!(
                    monitor_id = %self.monitor_id,
                    dependency_id = %dependency_id,
                    error = %source,
                    "Failed to remove monitor dependency"
                );
                return Err(ReconcileFailure {
                    step: ReconcileStep::DeleteDependency { dependency_id },
                    source,
                });
            }
            info!(monitor_id = %self.monitor_id, dependency_id = %dependency_id, "Removed monitor dependency");
            self.removed.remove(0);
            self.existing.retain(|dep| dep.id != dependency_id);
        }

        if self.pending.is_empty() {
            return Ok(());
        }
        let request = BulkCreateDependencies {
            downstream_monitor_id: self.monitor_id.clone(),
            upstream_monitor_ids: self.pending.clone(),
        };
        if let Err(source) = api.bulk_create_dependencies(&request).await {
            warn!(
                monitor_id = %self.monitor_id,
                count = request.upstream_monitor_ids.len(),
                error = %source,
                "Failed to add monitor dependencies"
            );
            return Err(ReconcileFailure {
                step: ReconcileStep::CreateDependencies {
                    upstream_ids: request.upstream_monitor_ids,
                },
                source,
            });
        }
        info!(
            monitor_id = %self.monitor_id,
            count = request.upstream_monitor_ids.len(),
            "Added monitor dependencies"
        );
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;

    fn dependency(id: &str, upstream: &str) -> MonitorDependency {
        MonitorDependency {
            id: id.to_string(),
            downstream_monitor_id: "self".to_string(),
            upstream_monitor_id: upstream.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_excluded_ids_cover_self_existing_and_pending() {
        let mut editor = DependencyEditor::new("self", vec![dependency("d1", "B")]);
        editor.add_pending(["A"]);

        let excluded = editor.excluded_ids();
        assert!(excluded.contains("self"));
        assert!(excluded.contains("A"));
        assert!(excluded.contains("B"));

        editor.add_pending(["self", "A", "B", "C"]);
        assert_eq!(editor.pending(), ["A", "C"]);
    }

    #[test]
    fn test_removed_existing_can_be_offered_again() {
        let mut editor = DependencyEditor::new("self", vec![dependency("d1", "B")]);
        editor.mark_removed(Some("d1"), "B");
        assert!(!editor.excluded_ids().contains("B"));
        assert!(editor.visible().is_empty());
        assert!(editor.has_changes());
    }

    #[tokio::test]
    async fn test_pending_then_removed_issues_no_calls() {
        let api = FakeApi::default();
        let mut editor = DependencyEditor::new("self", vec![]);
        editor.add_pending(["A"]);
        editor.mark_removed(None, "A");
        assert!(!editor.has_changes());

        editor.commit(&api).await.unwrap();
        assert!(api.calls().iter().all(|call| !call.contains('A')));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_commit_deletes_before_creating() {
        let api = FakeApi::default();
        api.add_dependency(dependency("d1", "B"));
        let mut editor = DependencyEditor::new("self", vec![dependency("d1", "B")]);
        editor.mark_removed(Some("d1"), "B");
        editor.add_pending(["C", "D"]);

        editor.commit(&api).await.unwrap();
        assert_eq!(
            api.calls(),
            vec!["delete_dependency:d1", "bulk_create_dependencies:C,D"]
        );
        assert!(!editor.has_changes());
    }

    #[tokio::test]
    async fn test_retry_skips_applied_steps() {
        let api = FakeApi::default();
        let existing = vec![dependency("d1", "B"), dependency("d2", "C")];
        let mut editor = DependencyEditor::new("self", existing);
        editor.mark_removed(Some("d1"), "B");
        editor.mark_removed(Some("d2"), "C");
        editor.add_pending(["E"]);

        api.fail("delete_dependency:d2");
        let failure = editor.commit(&api).await.unwrap_err();
        assert_eq!(
            failure.step,
            ReconcileStep::DeleteDependency {
                dependency_id: "d2".to_string()
            }
        );
        assert_eq!(editor.removed(), ["d2"]);
        assert_eq!(editor.pending(), ["E"]);

        api.heal("delete_dependency:d2");
        editor.commit(&api).await.unwrap();
        assert_eq!(api.calls().iter().filter(|c| *c == "delete_dependency:d1").count(), 1);
        assert_eq!(api.calls_named("bulk_create_dependencies"), 1);
    }
}
