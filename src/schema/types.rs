use std::collections::HashSet;

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    /// Stored as INTEGER 0/1
    Boolean,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "BOOLEAN",
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    /// Closed set of accepted text values, if any
    pub allowed: Option<&'static [&'static str]>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            primary_key: false,
            unique: false,
            allowed: None,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            nullable: false,
            ..Self::new(name, col_type)
        }
    }

    /// Create the table's primary key column
    pub const fn key(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            primary_key: true,
            ..Self::required(name, col_type)
        }
    }

    /// Add a UNIQUE constraint
    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    /// Restrict the column to a closed set of values
    pub const fn one_of(self, values: &'static [&'static str]) -> Self {
        Self {
            allowed: Some(values),
            ..self
        }
    }

    /// Whether `value` is acceptable for a closed-set column
    pub fn accepts(&self, value: &str) -> bool {
        self.allowed.map_or(true, |set| set.contains(&value))
    }

    /// Whether other tables may reference this column
    pub fn is_key(&self) -> bool {
        self.primary_key || self.unique
    }
}

/// Foreign key reference; several columns make a composite key
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub columns: &'static [&'static str],
    pub references_table: &'static str,
    pub references_columns: &'static [&'static str],
}

impl ForeignKey {
    pub const fn new(
        columns: &'static [&'static str],
        references_table: &'static str,
        references_columns: &'static [&'static str],
    ) -> Self {
        Self {
            columns,
            references_table,
            references_columns,
        }
    }

    /// Column list used in index names, e.g. `body_system`
    pub fn label(&self) -> String {
        self.columns.join("_")
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
    /// Multi-column UNIQUE constraints
    pub unique_keys: &'static [&'static [&'static str]],
}

impl TableSchema {
    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Whether `columns` together identify at most one row: a single key
    /// column, or exactly one of the table's unique keys
    pub fn is_unique_key(&self, columns: &[&str]) -> bool {
        match columns {
            [single] => self.column(single).is_some_and(Column::is_key),
            _ => self.unique_keys.iter().any(|key| {
                key.len() == columns.len() && columns.iter().all(|c| key.contains(c))
            }),
        }
    }
}
