use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::types::{TaskRecord, TaskStatus};

static COUNTER: AtomicUsize = AtomicUsize::new(1);

pub struct TaskStore {
    inner: RwLock<Tasks>,
}

#[derive(Default)]
struct Tasks {
    by_id: HashMap<String, TaskRecord>,
    // insertion order, oldest first
    order: Vec<String>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Tasks::default()),
        }
    }

    pub fn create(&self, command: &str) -> TaskRecord {
        let id = next_id();
        let task = TaskRecord {
            id: id.clone(),
            command: command.to_string(),
            status: TaskStatus::Pending,
            report: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        let mut tasks = self.write();
        tasks.order.push(id.clone());
        tasks.by_id.insert(id, task.clone());
        task
    }

    pub fn update(&self, id: &str, status: TaskStatus, report: Option<String>) -> Option<TaskRecord> {
        let mut tasks = self.write();
        let task = tasks.by_id.get_mut(id)?;
        task.status = status;
        if report.is_some() {
            task.report = report;
        }
        if task.status.is_terminal() {
            task.completed_at = Some(Utc::now());
        }
        Some(task.clone())
    }

    pub fn get(&self, id: &str) -> Option<TaskRecord> {
        self.read().by_id.get(id).cloned()
    }

    /// Newest first.
    pub fn list(&self, limit: usize) -> Vec<TaskRecord> {
        let tasks = self.read();
        tasks
            .order
            .iter()
            .rev()
            .filter_map(|id| tasks.by_id.get(id).cloned())
            .take(limit)
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tasks> {
        match self.inner.read() {
            Ok(tasks) => tasks,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tasks> {
        match self.inner.write() {
            Ok(tasks) => tasks,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

fn next_id() -> String {
    let count = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("task_{}_{}", Utc::now().timestamp_millis(), count)
}
