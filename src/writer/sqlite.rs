use super::{PathPolicy, TableWriter};
use crate::error::{SheetflatError, SheetflatResult};
use crate::sanitize::sanitize;
use crate::table::Table;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Storage class of a target column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    #[default]
    Text,
    Real,
    Integer,
}

impl SqlType {
    fn declaration(self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Real => "REAL",
            SqlType::Integer => "INTEGER",
        }
    }
}

/// One target column: which table column feeds it and how it is typed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMapping {
    pub source: String,
    #[serde(rename = "type", default)]
    pub target_type: SqlType,
}

impl ColumnMapping {
    pub fn new(source: impl Into<String>, target_type: SqlType) -> Self {
        Self {
            source: source.into(),
            target_type,
        }
    }
}

/// Writes a table into a SQLite database file.
///
/// The target table is created when missing and emptied before the insert.
/// Without mappings every column is stored as text.
#[derive(Debug, Clone)]
pub struct SqliteWriter {
    policy: PathPolicy,
    table_name: String,
    mappings: Vec<ColumnMapping>,
}

struct TargetColumn {
    index: usize,
    name: String,
    sql_type: SqlType,
}

impl SqliteWriter {
    pub fn new(policy: PathPolicy, table_name: &str) -> SheetflatResult<Self> {
        let table_name = sanitize(table_name);
        if table_name.is_empty() {
            return Err(SheetflatError::Config(
                "SQLite table name is empty after sanitizing".to_string(),
            ));
        }
        Ok(Self {
            policy,
            table_name,
            mappings: Vec::new(),
        })
    }

    pub fn with_mappings(mut self, mappings: Vec<ColumnMapping>) -> Self {
        self.mappings = mappings;
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn plan(&self, table: &Table) -> SheetflatResult<Vec<TargetColumn>> {
        let mut targets = self.targets(table)?;
        deduplicate_names(&mut targets);
        Ok(targets)
    }

    fn targets(&self, table: &Table) -> SheetflatResult<Vec<TargetColumn>> {
        let sanitized = table.sanitized_columns();
        if self.mappings.is_empty() {
            return Ok(sanitized
                .into_iter()
                .enumerate()
                .map(|(index, name)| TargetColumn {
                    index,
                    name: column_name(name, index),
                    sql_type: SqlType::Text,
                })
                .collect());
        }

        self.mappings
            .iter()
            .map(|mapping| {
                let index = table
                    .column_index(&mapping.source)
                    .or_else(|| {
                        let wanted = sanitize(&mapping.source);
                        sanitized.iter().position(|c| *c == wanted)
                    })
                    .ok_or_else(|| SheetflatError::MissingColumn(mapping.source.clone()))?;
                Ok(TargetColumn {
                    index,
                    name: column_name(sanitize(&mapping.source), index),
                    sql_type: mapping.target_type,
                })
            })
            .collect()
    }
}

fn column_name(name: String, index: usize) -> String {
    if name.is_empty() {
        format!("column_{}", index + 1)
    } else {
        name
    }
}

/// SQLite column names are case-insensitive; later repeats get `_2`, `_3`, ...
fn deduplicate_names(targets: &mut [TargetColumn]) {
    let mut taken: HashSet<String> = HashSet::new();
    for target in targets.iter_mut() {
        let base = target.name.clone();
        let mut occurrence = 1;
        while !taken.insert(target.name.to_lowercase()) {
            occurrence += 1;
            target.name = format!("{}_{}", base, occurrence);
        }
        if occurrence > 1 {
            debug!("Repeated column '{}' stored as '{}'", base, target.name);
        }
    }
}

fn coerce(text: &str, column: &TargetColumn, row: usize) -> SheetflatResult<Value> {
    let trimmed = text.trim();
    let invalid = || SheetflatError::Coercion {
        column: column.name.clone(),
        row,
        value: text.to_string(),
    };

    match column.sql_type {
        SqlType::Text => Ok(Value::Text(text.to_string())),
        // Missing numbers are stored as zero
        SqlType::Real if trimmed.is_empty() => Ok(Value::Real(0.0)),
        SqlType::Integer if trimmed.is_empty() => Ok(Value::Integer(0)),
        SqlType::Real => trimmed.parse::<f64>().map(Value::Real).map_err(|_| invalid()),
        SqlType::Integer => match trimmed.parse::<i64>() {
            Ok(value) => Ok(Value::Integer(value)),
            Err(_) => match trimmed.parse::<f64>() {
                Ok(value) if value.fract() == 0.0 => Ok(Value::Integer(value as i64)),
                _ => Err(invalid()),
            },
        },
    }
}

impl TableWriter for SqliteWriter {
    fn write(&self, table: &Table, destination: &Path) -> SheetflatResult<()> {
        self.policy.prepare(destination)?;
        let targets = self.plan(table)?;

        let declarations: Vec<String> = targets
            .iter()
            .map(|t| format!("\"{}\" {}", t.name, t.sql_type.declaration()))
            .collect();
        let names: Vec<String> = targets.iter().map(|t| format!("\"{}\"", t.name)).collect();
        let placeholders: Vec<String> = (1..=targets.len()).map(|n| format!("?{}", n)).collect();

        let mut connection = Connection::open(destination)?;
        let transaction = connection.transaction()?;
        transaction.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
                self.table_name,
                declarations.join(", ")
            ),
            [],
        )?;
        let removed = transaction.execute(&format!("DELETE FROM \"{}\"", self.table_name), [])?;
        debug!("Emptied {} ({} old rows)", self.table_name, removed);

        {
            let mut insert = transaction.prepare(&format!(
                "INSERT INTO \"{}\" ({}) VALUES ({})",
                self.table_name,
                names.join(", "),
                placeholders.join(", ")
            ))?;
            for (row_idx, row) in table.rows().iter().enumerate() {
                let values = targets
                    .iter()
                    .map(|target| coerce(&row[target.index], target, row_idx))
                    .collect::<SheetflatResult<Vec<Value>>>()?;
                insert.execute(params_from_iter(values))?;
            }
        }
        transaction.commit()?;

        info!(
            "Saved {} rows into {} ({})",
            table.row_count(),
            self.table_name,
            destination.display()
        );
        Ok(())
    }
}
