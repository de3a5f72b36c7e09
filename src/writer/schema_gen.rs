use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let pk = if col.name == "id" { " PRIMARY KEY" } else { "" };

        columns.push(format!(
            "    {} {}{}{}",
            col.name,
            col.col_type.sql_type(),
            pk,
            null_constraint
        ));
    }

    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
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
                schema.name, fk.column, schema.name, fk.column
            )
        })
        .collect()
}

/// Generate the INSERT statement binding every column in order
pub fn generate_insert(schema: &TableSchema) -> String {
    let columns = schema.column_names();
    let placeholders = vec!["?"; columns.len()];
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.name,
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{ITEMS, ITEM_RECIPES, RECIPE_BENCHES};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&ITEMS);
        assert!(sql.contains("CREATE TABLE items"));
        assert!(sql.contains("id TEXT PRIMARY KEY NOT NULL"));
        assert!(sql.contains("total_tier REAL NOT NULL"));
        assert!(sql.contains("anchor_bench TEXT,"));
        assert!(sql.contains("is_orbital INTEGER NOT NULL"));

        let sql = generate_create_table(&ITEM_RECIPES);
        assert!(sql.contains("FOREIGN KEY (item_id) REFERENCES items(id)"));
        assert!(sql.contains("FOREIGN KEY (recipe_id) REFERENCES recipes(id)"));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes(&RECIPE_BENCHES);
        assert_eq!(indexes, vec!["CREATE INDEX idx_recipe_benches_recipe_id ON recipe_benches(recipe_id)"]);
        assert!(generate_indexes(&ITEMS).is_empty());
    }

    #[test]
    fn test_generate_insert() {
        assert_eq!(
            generate_insert(&RECIPE_BENCHES),
            "INSERT INTO recipe_benches (recipe_id, position, bench, bench_name) VALUES (?, ?, ?, ?)"
        );
    }
}
