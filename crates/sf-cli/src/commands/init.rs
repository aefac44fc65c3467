//! Init command implementation - scaffolds a new SchemaForge project

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::cli::InitArgs;

const USERS_UP_SQL: &str = r#"CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    email VARCHAR NOT NULL UNIQUE,
    role VARCHAR NOT NULL DEFAULT 'member',
    password_hash VARCHAR,
    created_at TIMESTAMP DEFAULT current_timestamp
);
"#;

const USERS_DOWN_SQL: &str = "DROP TABLE IF EXISTS users;\n";

const CATEGORIES_UNIT_YML: &str = r#"description: Product categories
up:
  - op: create_table
    table: categories
    columns:
      - { name: id, type: INTEGER, primary_key: true }
      - { name: slug, type: VARCHAR, nullable: false, unique: true }
      - { name: title, type: VARCHAR, nullable: false }
  - op: create_index
    name: idx_categories_title
    table: categories
    columns: [title]
down:
  - op: drop_index
    name: idx_categories_title
  - op: drop_table
    table: categories
"#;

const ADMIN_SEED_YML: &str = r#"table: users
key: email
description: Administrative account; the password is hashed before it is stored
rows:
  - id: 1
    email: admin@example.com
    role: admin
    password_hash: { secret_env: SF_ADMIN_PASSWORD }
"#;

const CATEGORIES_SEED_YML: &str = r#"table: categories
key: slug
rows:
  - { id: 1, slug: books, title: Books }
  - { id: 2, slug: games, title: Games }
  - { id: 3, slug: music, title: Music }
"#;

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs) -> Result<()> {
    // Reject names that could cause path traversal or confusing directory names
    if args.name.contains('/')
        || args.name.contains('\\')
        || args.name.contains("..")
        || args.name.starts_with('.')
        || args.name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not contain '/', '\\', '..', or start with '.' or '-'",
            args.name
        );
    }

    let project_dir = Path::new(&args.name);

    if project_dir.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Choose a different project name.",
            args.name
        );
    }

    println!("Creating new SchemaForge project: {}\n", args.name);

    let dirs = [
        "",
        "migrations",
        "migrations/001_create_users",
        "migrations/002_create_categories",
        "seeds",
    ];
    for dir in &dirs {
        let path = project_dir.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }

    // Escape YAML special characters in interpolated values
    let safe_name = args.name.replace('"', "\\\"");
    let safe_db_path = args.database_path.replace('"', "\\\"");
    let config_content = format!(
        r#"name: "{name}"

database:
  path: "{db_path}"

migration_paths: ["migrations"]
seed_paths: ["seeds"]

ledger:
  table: sf_schema_ledger
  verify_checksums: true

targets:
  test:
    database:
      path: ":memory:"
"#,
        name = safe_name,
        db_path = safe_db_path,
    );

    let files = [
        ("schemaforge.yml", config_content.as_str()),
        ("migrations/001_create_users/up.sql", USERS_UP_SQL),
        ("migrations/001_create_users/down.sql", USERS_DOWN_SQL),
        ("migrations/002_create_categories/unit.yml", CATEGORIES_UNIT_YML),
        ("seeds/admin.yml", ADMIN_SEED_YML),
        ("seeds/categories.yml", CATEGORIES_SEED_YML),
        (".gitignore", "*.duckdb\n*.duckdb.wal\n"),
    ];
    for (relative, content) in files {
        fs::write(project_dir.join(relative), content)
            .with_context(|| format!("Failed to write {relative}"))?;
        println!("  Created {relative}");
    }

    println!();
    println!("Project '{}' initialized successfully!", args.name);
    println!();
    println!("Next steps:");
    println!("  cd {}", args.name);
    println!("  export SF_ADMIN_PASSWORD=...   # password for admin@example.com");
    println!("  sf setup                       # Apply migrations and seeds");

    Ok(())
}
