//! # In-Memory Task Execution DAO
//!
//! Backed by a [`DashMap`] keyed by execution id plus an [`AtomicIdAllocator`].
//!
//! Single-key operations (`save`, `update`, `get`) are linearizable. Scans
//! (counts, finds, task names) walk the shards one at a time and are only
//! weakly consistent: a scan racing an insert may or may not include the new
//! execution, but never sees a partially written one. Counts and pages are
//! computed from a single scan, so a page's total always matches its content.
//!
//! Intended for tests and ephemeral runs; every query is a linear scan.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use super::{ensure_end_time_kept, TaskExecutionDao};
use crate::error::{Result, TaskRepositoryError};
use crate::models::{Page, PageRequest, TaskExecution};
use crate::repository::id_allocator::AtomicIdAllocator;

#[derive(Debug, Default)]
pub struct MapTaskExecutionDao {
    executions: DashMap<i64, TaskExecution>,
    id_allocator: AtomicIdAllocator,
}

impl MapTaskExecutionDao {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored execution keyed by id
    pub fn task_executions(&self) -> HashMap<i64, TaskExecution> {
        self.executions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    fn collect_sorted<F>(&self, filter: F) -> Vec<TaskExecution>
    where
        F: Fn(&TaskExecution) -> bool,
    {
        let mut matches: Vec<TaskExecution> = self
            .executions
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by(TaskExecution::chronological_cmp);
        matches
    }

    fn count_matching<F>(&self, filter: F) -> u64
    where
        F: Fn(&TaskExecution) -> bool,
    {
        self.executions
            .iter()
            .filter(|entry| filter(entry.value()))
            .count() as u64
    }

    fn page_of(matches: Vec<TaskExecution>, request: &PageRequest) -> Page<TaskExecution> {
        let total = matches.len() as u64;
        Page::new(request.slice(&matches), request, total)
    }
}

#[async_trait]
impl TaskExecutionDao for MapTaskExecutionDao {
    async fn save(&self, execution: &TaskExecution) -> Result<()> {
        match self.executions.entry(execution.execution_id) {
            Entry::Occupied(_) => Err(TaskRepositoryError::DuplicateKey {
                execution_id: execution.execution_id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(execution.clone());
                debug!(
                    execution_id = execution.execution_id,
                    task_name = %execution.task_name,
                    "Saved task execution"
                );
                Ok(())
            }
        }
    }

    async fn update(&self, execution: &TaskExecution) -> Result<()> {
        let mut stored = self
            .executions
            .get_mut(&execution.execution_id)
            .ok_or(TaskRepositoryError::NotFound {
                execution_id: execution.execution_id,
            })?;

        ensure_end_time_kept(&stored, execution)?;
        stored.end_time = execution.end_time;
        stored.exit_code = execution.exit_code;
        stored.exit_message = execution.exit_message.clone();

        debug!(
            execution_id = execution.execution_id,
            exit_code = execution.exit_code,
            "Updated task execution"
        );
        Ok(())
    }

    async fn get(&self, execution_id: i64) -> Result<Option<TaskExecution>> {
        Ok(self
            .executions
            .get(&execution_id)
            .map(|entry| entry.value().clone()))
    }

    async fn count_by_name(&self, task_name: &str) -> Result<u64> {
        Ok(self.count_matching(|execution| execution.task_name == task_name))
    }

    async fn count_running_by_name(&self, task_name: &str) -> Result<u64> {
        Ok(self.count_matching(|execution| {
            execution.task_name == task_name && execution.is_running()
        }))
    }

    async fn count_all(&self) -> Result<u64> {
        Ok(self.executions.len() as u64)
    }

    async fn find_running_by_name(
        &self,
        task_name: &str,
        request: &PageRequest,
    ) -> Result<Page<TaskExecution>> {
        let matches = self.collect_sorted(|execution| {
            execution.task_name == task_name && execution.is_running()
        });
        Ok(Self::page_of(matches, request))
    }

    async fn find_by_name(
        &self,
        task_name: &str,
        request: &PageRequest,
    ) -> Result<Page<TaskExecution>> {
        let matches = self.collect_sorted(|execution| execution.task_name == task_name);
        Ok(Self::page_of(matches, request))
    }

    async fn list_distinct_task_names(&self) -> Result<Vec<String>> {
        let names: BTreeSet<String> = self
            .executions
            .iter()
            .map(|entry| entry.value().task_name.clone())
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn find_all(&self, request: &PageRequest) -> Result<Page<TaskExecution>> {
        let mut matches = self.collect_sorted(|_| true);
        matches.reverse();
        Ok(Self::page_of(matches, request))
    }

    async fn next_execution_id(&self) -> Result<i64> {
        Ok(self.id_allocator.allocate())
    }
}
