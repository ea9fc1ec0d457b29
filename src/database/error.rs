use thiserror::Error;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    /// A unique column already holds the value
    #[error("{field} already exists")]
    Conflict { field: String },

    /// A foreign key names a row that does not exist
    #[error("{field} does not reference an existing record")]
    MissingReference { field: String },

    /// A delete was refused because other rows point at the target
    #[error("{entity} is still referenced by {by}")]
    Referenced { entity: &'static str, by: String },

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify a failed insert or update by its Postgres error code
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let table = db.table().unwrap_or_default();
            let constraint = db.constraint().unwrap_or_default();
            match db.code().as_deref() {
                Some("23505") => {
                    return DatabaseError::Conflict {
                        field: constraint_field(table, constraint),
                    }
                }
                Some("23503") => {
                    return DatabaseError::MissingReference {
                        field: constraint_field(table, constraint),
                    }
                }
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }

    /// Classify a failed delete of an `entity` row
    pub(crate) fn from_delete(err: sqlx::Error, entity: &'static str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some("23503") {
                return DatabaseError::Referenced {
                    entity,
                    by: db.table().unwrap_or("other records").to_string(),
                };
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Recover the camelCase field name from a default Postgres constraint name,
/// e.g. `teachers_employee_id_key` -> `employeeId`
pub(crate) fn constraint_field(table: &str, constraint: &str) -> String {
    let column = constraint
        .strip_prefix(table)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(constraint);
    let column = column
        .strip_suffix("_fkey")
        .or_else(|| column.strip_suffix("_key"))
        .unwrap_or(column);
    to_camel_case(column)
}

pub(crate) fn to_camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_from_constraint_names() {
        assert_eq!(constraint_field("teachers", "teachers_employee_id_key"), "employeeId");
        assert_eq!(constraint_field("students", "students_parent_id_fkey"), "parentId");
        assert_eq!(constraint_field("users", "users_email_key"), "email");
        assert_eq!(
            constraint_field("fee_payments", "fee_payments_fee_structure_id_fkey"),
            "feeStructureId"
        );
    }

    #[test]
    fn camel_case() {
        assert_eq!(to_camel_case("receipt_number"), "receiptNumber");
        assert_eq!(to_camel_case("date"), "date");
    }
}
