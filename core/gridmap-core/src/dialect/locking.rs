//! Lock modes and locking strategies.

use crate::error::{GridError, GridResult};
use crate::model::{EntityKey, Value};
use std::fmt;
use std::time::Duration;

/// Lock modes the engine may request for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    None,
    Read,
    Write,
    Optimistic,
    OptimisticForceIncrement,
    PessimisticRead,
    PessimisticWrite,
    PessimisticForceIncrement,
    UpgradeNowait,
    UpgradeSkipLocked,
    Force,
}

impl LockMode {
    pub const ALL: [LockMode; 11] = [
        LockMode::None,
        LockMode::Read,
        LockMode::Write,
        LockMode::Optimistic,
        LockMode::OptimisticForceIncrement,
        LockMode::PessimisticRead,
        LockMode::PessimisticWrite,
        LockMode::PessimisticForceIncrement,
        LockMode::UpgradeNowait,
        LockMode::UpgradeSkipLocked,
        LockMode::Force,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LockMode::None => "NONE",
            LockMode::Read => "READ",
            LockMode::Write => "WRITE",
            LockMode::Optimistic => "OPTIMISTIC",
            LockMode::OptimisticForceIncrement => "OPTIMISTIC_FORCE_INCREMENT",
            LockMode::PessimisticRead => "PESSIMISTIC_READ",
            LockMode::PessimisticWrite => "PESSIMISTIC_WRITE",
            LockMode::PessimisticForceIncrement => "PESSIMISTIC_FORCE_INCREMENT",
            LockMode::UpgradeNowait => "UPGRADE_NOWAIT",
            LockMode::UpgradeSkipLocked => "UPGRADE_SKIPLOCKED",
            LockMode::Force => "FORCE",
        }
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acquires a lock on one entity instance.
pub trait LockingStrategy: Send + Sync {
    /// `version` is the entity's current version value, if it is versioned.
    fn lock(&self, key: &EntityKey, version: Option<&Value>, timeout: Option<Duration>)
    -> GridResult<()>;
}

/// Strategy handed out for lock modes a dialect cannot honor.
///
/// Every call to [`lock`](LockingStrategy::lock) fails with
/// [`GridError::UnsupportedCapability`].
#[derive(Debug, Clone)]
pub struct ExceptionThrowingLockingStrategy {
    dialect: String,
    lock_mode: LockMode,
}

impl ExceptionThrowingLockingStrategy {
    pub fn new(dialect: impl Into<String>, lock_mode: LockMode) -> Self {
        Self {
            dialect: dialect.into(),
            lock_mode,
        }
    }

    pub fn lock_mode(&self) -> LockMode {
        self.lock_mode
    }
}

impl LockingStrategy for ExceptionThrowingLockingStrategy {
    fn lock(
        &self,
        key: &EntityKey,
        _version: Option<&Value>,
        _timeout: Option<Duration>,
    ) -> GridResult<()> {
        tracing::debug!(target: "gridmap", dialect = %self.dialect, mode = %self.lock_mode, key = %key, "lock request rejected");
        Err(GridError::unsupported(
            self.dialect.clone(),
            format!("locking with mode {}", self.lock_mode),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKeyMetadata;
    use std::sync::Arc;

    #[test]
    fn exception_throwing_strategy_always_fails() {
        let key = EntityKey::new(
            Arc::new(EntityKeyMetadata::new("users", ["id"])),
            [Value::Int(1)],
        )
        .unwrap();
        for mode in LockMode::ALL {
            let strategy = ExceptionThrowingLockingStrategy::new("test", mode);
            let err = strategy
                .lock(&key, None, Some(Duration::from_millis(10)))
                .unwrap_err();
            assert!(matches!(err, GridError::UnsupportedCapability { .. }));
            assert!(err.to_string().contains(mode.as_str()));
        }
    }
}
