//! SQL template composition.
//!
//! Pure string building over a parameter list. Placeholders follow the
//! connection's backend: `$n` for Postgres, `?` for SQLite and MySQL.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, Statement, Value};

use common::{StoreError, StoreResult};

/// Parameter values collected while a statement is composed.
#[derive(Debug)]
pub struct Params {
    backend: DbBackend,
    values: Vec<Value>,
}

impl Params {
    pub fn new(backend: DbBackend) -> Self {
        Self {
            backend,
            values: Vec::new(),
        }
    }

    /// Bind a value and return its placeholder.
    ///
    /// A value referenced twice in the SQL text must be bound twice.
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        match self.backend {
            DbBackend::Postgres => format!("${}", self.values.len()),
            DbBackend::MySql | DbBackend::Sqlite => "?".to_string(),
        }
    }

    /// Bind `value` and return `column = <placeholder>`
    pub fn eq(&mut self, column: &str, value: impl Into<Value>) -> String {
        let placeholder = self.bind(value);
        format!("{} = {}", column, placeholder)
    }

    /// Finish the statement with its SQL text
    pub fn into_statement(self, sql: impl Into<String>) -> Statement {
        Statement::from_sql_and_values(self.backend, sql, self.values)
    }
}

fn check_pairs(columns: &[&str], placeholders: &[String]) -> StoreResult<()> {
    if columns.is_empty() {
        return Err(StoreError::template("column list is empty"));
    }
    if columns.len() != placeholders.len() {
        return Err(StoreError::template(format!(
            "{} columns but {} parameters",
            columns.len(),
            placeholders.len()
        )));
    }
    Ok(())
}

/// `(c1, c2) VALUES (p1, p2)`
pub fn insert_clause(columns: &[&str], placeholders: &[String]) -> StoreResult<String> {
    check_pairs(columns, placeholders)?;
    Ok(format!(
        "({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    ))
}

/// `SET c1 = p1, c2 = p2`
pub fn set_clause(columns: &[&str], placeholders: &[String]) -> StoreResult<String> {
    check_pairs(columns, placeholders)?;
    let assignments: Vec<String> = columns
        .iter()
        .zip(placeholders)
        .map(|(column, placeholder)| format!("{} = {}", column, placeholder))
        .collect();
    Ok(format!("SET {}", assignments.join(", ")))
}

/// `WHERE p1 AND p2`
pub fn where_clause(predicates: &[String]) -> StoreResult<String> {
    if predicates.is_empty() {
        return Err(StoreError::template("predicate list is empty"));
    }
    Ok(format!("WHERE {}", predicates.join(" AND ")))
}

/// Column list for a SELECT, each column prefixed with a table alias
pub fn projection(alias: &str, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|column| format!("{}.{}", alias, column))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Statements executed in order on one connection as a single unit of work.
///
/// No transaction is opened around the batch; a concurrent caller can
/// interleave between its statements.
#[derive(Debug, Default)]
pub struct Batch {
    statements: Vec<Statement>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Run every statement, returning the total number of affected rows
    pub async fn execute(self, conn: &DatabaseConnection) -> Result<u64, DbErr> {
        let mut affected = 0;
        for statement in self.statements {
            affected += conn.execute(statement).await?.rows_affected();
        }
        Ok(affected)
    }
}
