//! Service layer enforcing the rule engine around every write.
//!
//! `StrataService` wraps `StrataDb` and the requester the calls are made
//! for. All repo methods are implemented as `impl StrataService` blocks in
//! [`crate::repos`]. Every write follows the same protocol:
//!
//! 1. Resolve the records the rules need (parents, visible siblings)
//! 2. Run every rule and collect failures into one `ValidationErrors`
//! 3. Reject with `DatabaseError::Validation` if any rule failed
//! 4. Execute SQL (multi-row writes inside one transaction)

use strata_config::StrataConfig;
use strata_core::identity::Requester;
use strata_core::validation::ValidationErrors;

use crate::StrataDb;
use crate::error::DatabaseError;

/// Default page size when no configuration is supplied.
const DEFAULT_LIMIT: u32 = 50;

pub struct StrataService {
    db: StrataDb,
    requester: Option<Requester>,
    default_limit: u32,
}

impl StrataService {
    /// Open a local database and serve calls on behalf of `requester`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(
        db_path: &str,
        requester: Option<Requester>,
    ) -> Result<Self, DatabaseError> {
        let db = StrataDb::open_local(db_path).await?;
        Ok(Self::from_db(db, requester))
    }

    /// Open the database named by the configuration.
    ///
    /// Creates the parent directory of the database file when needed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for an invalid configuration and
    /// `DatabaseError` if the database cannot be opened.
    pub async fn from_config(
        config: &StrataConfig,
        requester: Option<Requester>,
    ) -> Result<Self, DatabaseError> {
        config
            .validate()
            .map_err(|e| DatabaseError::InvalidState(e.to_string()))?;

        if let Some(dir) = config.database.parent_dir() {
            std::fs::create_dir_all(&dir).map_err(|e| DatabaseError::Other(e.into()))?;
        }

        let db = StrataDb::open(&config.database.path, config.database.foreign_keys).await?;
        tracing::debug!(path = %config.database.path, "opened strata database");
        Ok(Self {
            db,
            requester,
            default_limit: config.general.default_limit,
        })
    }

    /// Create from an existing `StrataDb` (for testing).
    #[must_use]
    pub const fn from_db(db: StrataDb, requester: Option<Requester>) -> Self {
        Self {
            db,
            requester,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &StrataDb {
        &self.db
    }

    #[must_use]
    pub const fn requester(&self) -> Option<&Requester> {
        self.requester.as_ref()
    }

    /// Switch the requester subsequent calls are evaluated for.
    pub fn set_requester(&mut self, requester: Option<Requester>) {
        self.requester = requester;
    }

    /// Organization whose records, besides global ones, the requester may see.
    #[must_use]
    pub fn requester_org(&self) -> Option<&str> {
        self.requester.as_ref().and_then(Requester::organization)
    }

    /// Page size for list operations.
    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.default_limit
    }
}

/// Turn collected rule failures into a rejection, logging it.
pub(crate) fn reject(entity_type: &str, errors: ValidationErrors) -> DatabaseError {
    tracing::warn!(entity_type, %errors, "write rejected by validation");
    DatabaseError::Validation(errors)
}

/// `Ok(())` when no rule failed, otherwise the logged rejection.
pub(crate) fn ensure_valid(entity_type: &str, errors: ValidationErrors) -> Result<(), DatabaseError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(reject(entity_type, errors))
    }
}

/// Roll back a transaction whose write failed and hand back the write's
/// error. A failing rollback is only logged.
pub(crate) async fn roll_back(tx: libsql::Transaction, err: DatabaseError) -> DatabaseError {
    if let Err(rollback_err) = tx.rollback().await {
        tracing::warn!(error = %rollback_err, original = %err, "rollback failed");
    }
    err
}
