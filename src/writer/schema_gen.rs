use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let pk = if col.primary_key { " PRIMARY KEY" } else { "" };
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let unique = if col.unique { " UNIQUE" } else { "" };
        let check = match col.allowed {
            Some(values) => format!(
                " CHECK (\"{}\" IN ({}))",
                col.name,
                values
                    .iter()
                    .map(|v| format!("'{}'", v.replace('\'', "''")))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            None => String::new(),
        };

        columns.push(format!(
            "    \"{}\" {}{}{}{}{}",
            col.name,
            col.col_type.sql_type(),
            pk,
            null_constraint,
            unique,
            check
        ));
    }

    for key in schema.unique_keys {
        columns.push(format!("    UNIQUE ({})", quoted_list(key)));
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            quoted_list(fk.columns),
            fk.references_table,
            quoted_list(fk.references_columns)
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX idx_{}_{} ON {}({})",
                schema.name,
                fk.label(),
                schema.name,
                quoted_list(fk.columns)
            )
        })
        .collect()
}

fn quoted_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Full DDL script for the given tables
pub fn generate_schema_sql(tables: &[&TableSchema]) -> String {
    let mut statements = Vec::new();
    for schema in tables {
        statements.push(generate_create_table(schema));
        statements.extend(generate_indexes(schema));
    }

    let mut sql = statements.join(";\n\n");
    sql.push_str(";\n");
    sql
}
