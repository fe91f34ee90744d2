use super::types::TableSchema;
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Validates a set of table definitions and orders them for insertion
pub struct DependencyResolver {
    tables: Vec<&'static TableSchema>,
    /// Map of table name -> tables it depends on, in FK declaration order
    deps: HashMap<&'static str, Vec<&'static str>>,
}

impl DependencyResolver {
    /// Check that every foreign key points at a keyed column of a known table
    pub fn new(tables: &[&'static TableSchema]) -> Result<Self> {
        let mut by_name: HashMap<&'static str, &'static TableSchema> = HashMap::new();
        for table in tables {
            if table.columns.is_empty() {
                return Err(Error::Schema(format!("table {} has no columns", table.name)));
            }
            if by_name.insert(table.name, *table).is_some() {
                return Err(Error::Schema(format!("table {} is defined twice", table.name)));
            }
            let mut seen = HashSet::new();
            for col in table.columns {
                if !seen.insert(col.name) {
                    return Err(Error::Schema(format!(
                        "column {}.{} is defined twice",
                        table.name, col.name
                    )));
                }
            }
            for key in table.unique_keys {
                if let Some(col) = key.iter().find(|c| table.column(c).is_none()) {
                    return Err(Error::Schema(format!(
                        "unique key on unknown column {}.{}",
                        table.name, col
                    )));
                }
            }
        }

        let mut deps: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for table in tables {
            let mut table_deps = Vec::new();
            for fk in table.foreign_keys {
                if fk.columns.is_empty() || fk.columns.len() != fk.references_columns.len() {
                    return Err(Error::Schema(format!(
                        "foreign key {}({}) does not match {}({})",
                        table.name,
                        fk.columns.join(", "),
                        fk.references_table,
                        fk.references_columns.join(", ")
                    )));
                }
                if let Some(col) = fk.columns.iter().find(|c| table.column(c).is_none()) {
                    return Err(Error::Schema(format!(
                        "foreign key on unknown column {}.{}",
                        table.name, col
                    )));
                }
                let parent = by_name.get(fk.references_table).ok_or_else(|| {
                    Error::Schema(format!(
                        "{}.{} references unknown table {}",
                        table.name,
                        fk.label(),
                        fk.references_table
                    ))
                })?;
                if let Some(col) = fk
                    .references_columns
                    .iter()
                    .find(|c| parent.column(c).is_none())
                {
                    return Err(Error::Schema(format!(
                        "{}.{} references unknown column {}.{}",
                        table.name,
                        fk.label(),
                        parent.name,
                        col
                    )));
                }
                if !parent.is_unique_key(fk.references_columns) {
                    return Err(Error::Schema(format!(
                        "{}.{} references {}({}), which is not a key",
                        table.name,
                        fk.label(),
                        parent.name,
                        fk.references_columns.join(", ")
                    )));
                }
                if !table_deps.contains(&fk.references_table) {
                    table_deps.push(fk.references_table);
                }
            }
            deps.insert(table.name, table_deps);
        }

        Ok(Self {
            tables: tables.to_vec(),
            deps,
        })
    }

    /// All tables in dependency order (parents before children)
    pub fn insertion_order(&self) -> Result<Vec<&'static TableSchema>> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        for table in &self.tables {
            if !visited.contains(table.name) {
                self.visit(table.name, &mut visited, &mut temp_visited, &mut result)?;
            }
        }

        Ok(result)
    }

    fn visit(
        &self,
        name: &'static str,
        visited: &mut HashSet<&'static str>,
        temp_visited: &mut HashSet<&'static str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<()> {
        if temp_visited.contains(name) {
            return Err(Error::Schema(format!(
                "circular dependency detected at: {}",
                name
            )));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        if let Some(deps) = self.deps.get(name) {
            for dep in deps {
                // Self-references do not constrain insertion order
                if *dep != name {
                    self.visit(*dep, visited, temp_visited, result)?;
                }
            }
        }

        temp_visited.remove(name);
        visited.insert(name);

        if let Some(table) = self.tables.iter().copied().find(|t| t.name == name) {
            result.push(table);
        }

        Ok(())
    }
}
