use sqlx::error::DatabaseError;

use crate::application::repos::RepoError;

/// Classify a sqlx failure into the repository error taxonomy.
///
/// Unique violations come from `identities_email_key` and
/// `sessions_token_prefix_key`; foreign-key violations from the
/// `posts.owner_id` and `sessions.identity_id` references.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => map_database_error(db.as_ref()),
        other => RepoError::from_persistence(other),
    }
}

// Postgres SQLSTATE classes: 23505 unique violation, 23503 foreign key,
// 22xxx data exception, 23xxx other integrity, 57014 query canceled.
fn map_database_error(db: &dyn DatabaseError) -> RepoError {
    match db.code().as_deref() {
        Some("23505") => RepoError::Duplicate {
            constraint: db.constraint().unwrap_or("unknown").to_string(),
        },
        Some("23503") => RepoError::InvalidInput {
            message: db.message().to_string(),
        },
        Some("57014") => RepoError::Timeout,
        Some(code) if code.starts_with("22") => RepoError::InvalidInput {
            message: db.message().to_string(),
        },
        Some(code) if code.starts_with("23") => RepoError::Integrity {
            message: db.message().to_string(),
        },
        _ => RepoError::from_persistence(db.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_row_maps_to_not_found() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            RepoError::NotFound
        ));
    }

    #[test]
    fn pool_exhaustion_maps_to_timeout() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            RepoError::Timeout
        ));
    }

    #[test]
    fn unclassified_errors_fall_back_to_persistence() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::WorkerCrashed),
            RepoError::Persistence(_)
        ));
    }
}
