//! Context persisted to a snapshot file.

use super::{Context, ContextError, ContextSnapshot, ContextVariable, InMemoryContext, Scope};
use crate::expr::Value;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A context whose variables are written through to a JSON snapshot file.
///
/// Opening the context takes an exclusive lock file next to the snapshot
/// (`<path>.lock`) holding the owner's process id. The lock is released by
/// [`FileContext::close`] or, on any other exit path, when the context is
/// dropped. A process that dies without unwinding leaves the lock behind;
/// it is never broken automatically; see [`FileContext::lock_owner`].
///
/// Every mutation is persisted before it is applied in memory: if the
/// write fails the operation reports [`ContextError::Storage`] and the
/// in-memory variables are unchanged.
#[derive(Debug)]
pub struct FileContext {
    path: PathBuf,
    lock_path: PathBuf,
    inner: InMemoryContext,
    released: bool,
}

impl FileContext {
    /// Open (or create) the snapshot file at `path`.
    ///
    /// Fails with [`ContextError::Storage`] if another `FileContext` holds
    /// the lock, or if an existing snapshot cannot be read or has a
    /// different scope. A lock-held error names the owning process id.
    ///
    /// A lock left by a crashed process is stale but still honored: once
    /// that process is confirmed gone, delete `<path>.lock` by hand.
    pub fn open(path: impl Into<PathBuf>, scope: Scope) -> Result<Self, ContextError> {
        let path = path.into();
        let lock_path = lock_path_for(&path);
        acquire_lock(&path, &lock_path)?;

        // from here on, dropping `context` releases the lock
        let mut context = Self {
            path,
            lock_path,
            inner: InMemoryContext::new(scope),
            released: false,
        };

        if context.path.exists() {
            let json = fs::read_to_string(&context.path)
                .map_err(|e| ContextError::Storage(e.to_string()))?;
            let snapshot = ContextSnapshot::from_json(&json)
                .map_err(|e| ContextError::Storage(e.to_string()))?;
            if snapshot.scope != scope {
                return Err(ContextError::Storage(format!(
                    "{} holds a {} context, expected {}",
                    context.path.display(),
                    snapshot.scope,
                    scope
                )));
            }
            context.inner = InMemoryContext::from_snapshot(&snapshot)?;
        }

        debug!(
            path = %context.path.display(),
            variables = context.inner.len(),
            "opened file context"
        );
        Ok(context)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Process id recorded in the lock of the snapshot at `path`, if the
    /// snapshot is locked and the lock is readable.
    pub fn lock_owner(path: impl AsRef<Path>) -> Option<u32> {
        fs::read_to_string(lock_path_for(path.as_ref()))
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    /// Release the lock, reporting any failure.
    pub fn close(mut self) -> Result<(), ContextError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), ContextError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        fs::remove_file(&self.lock_path).map_err(|e| {
            ContextError::Storage(format!("cannot unlock {}: {e}", self.path.display()))
        })
    }

    /// Apply `op` to a copy, persist the copy, then commit it.
    fn mutate<F>(&mut self, op: F) -> Result<(), ContextError>
    where
        F: FnOnce(&mut InMemoryContext) -> Result<(), ContextError>,
    {
        let mut next = self.inner.clone();
        op(&mut next)?;
        self.persist(&next)?;
        self.inner = next;
        Ok(())
    }

    fn persist(&self, next: &InMemoryContext) -> Result<(), ContextError> {
        let json = next
            .snapshot()
            .to_json()
            .map_err(|e| ContextError::Storage(e.to_string()))?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, json).map_err(|e| ContextError::Storage(e.to_string()))?;
        fs::rename(&staging, &self.path).map_err(|e| ContextError::Storage(e.to_string()))
    }
}

impl Context for FileContext {
    fn scope(&self) -> Scope {
        self.inner.scope()
    }

    fn get(&self, name: &str) -> Result<Value, ContextError> {
        self.inner.get(name)
    }

    fn create(&mut self, name: &str, value: Value) -> Result<(), ContextError> {
        self.mutate(|ctx| ctx.create(name, value))
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<(), ContextError> {
        self.mutate(|ctx| ctx.assign(name, value))
    }

    fn delete(&mut self, name: &str) -> Result<(), ContextError> {
        self.mutate(|ctx| ctx.delete(name))
    }

    fn get_all(&self) -> Result<Vec<ContextVariable>, ContextError> {
        self.inner.get_all()
    }

    fn contains(&self, name: &str) -> Result<bool, ContextError> {
        self.inner.contains(name)
    }
}

impl Drop for FileContext {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "failed to release file context");
        }
    }
}

fn acquire_lock(path: &Path, lock_path: &Path) -> Result<(), ContextError> {
    let mut lock = match OpenOptions::new().write(true).create_new(true).open(lock_path) {
        Ok(lock) => lock,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            let owner = match FileContext::lock_owner(path) {
                Some(pid) => format!("process {pid}"),
                None => "an unknown process".to_string(),
            };
            return Err(ContextError::Storage(format!(
                "cannot lock {}: held by {owner}, remove {} if it is no longer running",
                path.display(),
                lock_path.display()
            )));
        }
        Err(e) => {
            return Err(ContextError::Storage(format!(
                "cannot lock {}: {e}",
                path.display()
            )))
        }
    };

    if let Err(e) = write!(lock, "{}", std::process::id()) {
        if let Err(cleanup) = fs::remove_file(lock_path) {
            warn!(error = %cleanup, lock = %lock_path.display(), "failed to remove partial lock");
        }
        return Err(ContextError::Storage(format!(
            "cannot lock {}: {e}",
            path.display()
        )));
    }
    Ok(())
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock = path.as_os_str().to_owned();
    lock.push(".lock");
    PathBuf::from(lock)
}
