//! Schema migrations
//!
//! Run explicitly (`rectrack migrate`), never as part of serving. Every step is
//! idempotent and the whole run happens in one transaction, so a failed run
//! leaves the database as it was.
//!
//! Databases created by the older schema carry three boolean columns
//! (`done`, `ongoing`, `unsure`) instead of `status`, a nullable `status`
//! column, and nullable `name`/`text`/`number`/`section_id`. Flags are folded
//! into `status` and dropped; a row with more than one flag set aborts the
//! run. Rows still missing a status become `notStarted`, and a NULL in any
//! other column the API reads aborts the run with the offending ids.

use sqlx::{PgConnection, PgPool};

use super::repos::DbError;

/// Legacy boolean columns, in conversion priority order
const LEGACY_FLAGS: [&str; 3] = ["done", "ongoing", "unsure"];

/// Columns the read queries decode as non-null, per table
const REQUIRED_COLUMNS: [(&str, &[&str]); 2] = [
    ("sections", &["name"]),
    ("recommendations", &["section_id", "text", "number"]),
];

/// What a migration run changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Legacy flag columns that were converted and dropped
    pub dropped_columns: Vec<String>,
    /// Rows whose status was derived from legacy flags
    pub converted_rows: u64,
    /// Rows with no status that were set to `notStarted`
    pub defaulted_rows: u64,
}

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<MigrationReport, DbError> {
    tracing::info!("Running migrations...");
    let mut tx = pool.begin().await?;

    create_tables(&mut tx).await?;

    let legacy = legacy_columns(&mut tx).await?;
    let mut report = MigrationReport::default();
    if !legacy.is_empty() {
        tracing::info!(columns = ?legacy, "Converting legacy status flags");
        report.converted_rows = convert_legacy_flags(&mut tx, &legacy).await?;
        report.dropped_columns = legacy;
    }

    report.defaulted_rows = backfill_status(&mut tx).await?;
    for (table, columns) in REQUIRED_COLUMNS {
        require_not_null(&mut tx, table, columns).await?;
    }
    ensure_status_constraint(&mut tx).await?;

    tx.commit().await?;
    tracing::info!(
        converted_rows = report.converted_rows,
        defaulted_rows = report.defaulted_rows,
        "Migrations complete"
    );
    Ok(report)
}

async fn create_tables(conn: &mut PgConnection) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sections (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recommendations (
            id INTEGER PRIMARY KEY,
            section_id INTEGER NOT NULL REFERENCES sections(id) ON DELETE RESTRICT,
            text TEXT NOT NULL,
            number INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'notStarted',
            link TEXT
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Tables from the older schema may predate these columns
    sqlx::query(
        "ALTER TABLE recommendations ADD COLUMN IF NOT EXISTS status TEXT NOT NULL DEFAULT 'notStarted'",
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query("ALTER TABLE recommendations ADD COLUMN IF NOT EXISTS link TEXT")
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS recommendations_section_id_idx ON recommendations (section_id)",
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS recommendations_status_idx ON recommendations (status)")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

async fn legacy_columns(conn: &mut PgConnection) -> Result<Vec<String>, DbError> {
    let present: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT column_name::TEXT
        FROM information_schema.columns
        WHERE table_schema = current_schema()
          AND table_name = 'recommendations'
          AND column_name IN ('done', 'ongoing', 'unsure')
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    // Keep priority order regardless of catalog order
    Ok(LEGACY_FLAGS
        .iter()
        .filter(|column| present.iter().any(|p| p.as_str() == **column))
        .map(|column| (*column).to_owned())
        .collect())
}

async fn convert_legacy_flags(
    conn: &mut PgConnection,
    columns: &[String],
) -> Result<u64, DbError> {
    let conflicting: Vec<i32> = sqlx::query_scalar(&format!(
        "SELECT id FROM recommendations WHERE {} > 1 ORDER BY id",
        flag_sum_expr(columns)
    ))
    .fetch_all(&mut *conn)
    .await?;

    if !conflicting.is_empty() {
        return Err(DbError::Migration(format!(
            "recommendations with more than one status flag set: {:?}",
            conflicting
        )));
    }

    // Rows already moved off the default keep their status
    let converted = sqlx::query(&format!(
        "UPDATE recommendations SET status = {} \
         WHERE (status IS NULL OR status = 'notStarted') AND {} = 1",
        status_case_expr(columns),
        flag_sum_expr(columns)
    ))
    .execute(&mut *conn)
    .await?
    .rows_affected();

    for column in columns {
        sqlx::query(&format!(
            "ALTER TABLE recommendations DROP COLUMN IF EXISTS {}",
            column
        ))
        .execute(&mut *conn)
        .await?;
    }

    Ok(converted)
}

/// Give rows without a status the default and make the column match the
/// fresh schema. `ADD COLUMN IF NOT EXISTS` leaves an older nullable
/// `status` column untouched.
async fn backfill_status(conn: &mut PgConnection) -> Result<u64, DbError> {
    let defaulted =
        sqlx::query("UPDATE recommendations SET status = 'notStarted' WHERE status IS NULL")
            .execute(&mut *conn)
            .await?
            .rows_affected();
    if defaulted > 0 {
        tracing::info!(rows = defaulted, "Defaulted missing statuses to notStarted");
    }

    sqlx::query(
        "ALTER TABLE recommendations ALTER COLUMN status SET DEFAULT 'notStarted', \
         ALTER COLUMN status SET NOT NULL",
    )
    .execute(&mut *conn)
    .await?;

    Ok(defaulted)
}

async fn require_not_null(
    conn: &mut PgConnection,
    table: &str,
    columns: &[&str],
) -> Result<(), DbError> {
    let missing: Vec<i32> = sqlx::query_scalar(&format!(
        "SELECT id FROM {} WHERE {} ORDER BY id",
        table,
        null_filter_expr(columns)
    ))
    .fetch_all(&mut *conn)
    .await?;

    if !missing.is_empty() {
        return Err(DbError::Migration(format!(
            "{} with a NULL {}: {:?}",
            table,
            columns.join("/"),
            missing
        )));
    }

    for column in columns {
        sqlx::query(&format!(
            "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL",
            table, column
        ))
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn ensure_status_constraint(conn: &mut PgConnection) -> Result<(), DbError> {
    sqlx::query("ALTER TABLE recommendations DROP CONSTRAINT IF EXISTS recommendations_status_check")
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        ALTER TABLE recommendations ADD CONSTRAINT recommendations_status_check
        CHECK (status IN ('notStarted', 'ongoing', 'unsure', 'done'))
        "#,
    )
    .execute(&mut *conn)
    .await
    .map_err(|e| DbError::Migration(format!("stored status values are invalid: {}", e)))?;

    Ok(())
}

/// Matches rows where any of `columns` is NULL.
fn null_filter_expr(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("{} IS NULL", c))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Number of flags set on a row, treating NULL as false.
fn flag_sum_expr(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("COALESCE({}, FALSE)::INT", c))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Status derived from flags, first set flag wins. The flag columns carry
/// the same names as the statuses they encode.
fn status_case_expr(columns: &[String]) -> String {
    let arms: String = LEGACY_FLAGS
        .iter()
        .filter(|column| columns.iter().any(|c| c.as_str() == **column))
        .map(|column| format!("WHEN COALESCE({0}, FALSE) THEN '{0}' ", column))
        .collect();
    format!("CASE {}ELSE 'notStarted' END", arms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, create_pool_with, PgStore, PoolSettings, TrackerStore};

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn flag_sum_covers_present_columns() {
        assert_eq!(
            flag_sum_expr(&cols(&["done", "unsure"])),
            "COALESCE(done, FALSE)::INT + COALESCE(unsure, FALSE)::INT"
        );
    }

    #[test]
    fn status_case_keeps_priority_order() {
        assert_eq!(
            status_case_expr(&cols(&["unsure", "done"])),
            "CASE WHEN COALESCE(done, FALSE) THEN 'done' WHEN COALESCE(unsure, FALSE) THEN 'unsure' ELSE 'notStarted' END"
        );
    }

    #[test]
    fn null_filter_checks_every_column() {
        assert_eq!(
            null_filter_expr(&["section_id", "text", "number"]),
            "section_id IS NULL OR text IS NULL OR number IS NULL"
        );
        assert_eq!(null_filter_expr(&["name"]), "name IS NULL");
    }

    // Postgres-backed tests. Each one works in its own schema so they can run
    // in parallel against the same database:
    // DATABASE_URL=postgres://... cargo test -p rectrack-server -- --ignored

    /// Tables as the boolean-era schema created them: every column nullable,
    /// `status` added later without a server-side default.
    const LEGACY_TABLES: [&str; 2] = [
        "CREATE TABLE sections (id SERIAL PRIMARY KEY, name VARCHAR)",
        "CREATE TABLE recommendations (
            id SERIAL PRIMARY KEY,
            section_id INTEGER REFERENCES sections(id),
            text VARCHAR,
            number INTEGER,
            ongoing BOOLEAN,
            unsure BOOLEAN,
            done BOOLEAN,
            status VARCHAR
        )",
    ];

    async fn execute_all(pool: &PgPool, statements: &[&str]) {
        for statement in statements {
            sqlx::query(statement)
                .execute(pool)
                .await
                .unwrap_or_else(|e| panic!("{} failed: {}", statement, e));
        }
    }

    /// Fresh schema holding the legacy tables, and a pool pinned to it.
    async fn legacy_schema(schema: &str, rows: &[&str]) -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let admin = create_pool(&url).await.expect("pool creation failed");
        execute_all(
            &admin,
            &[
                format!("DROP SCHEMA IF EXISTS {} CASCADE", schema).as_str(),
                format!("CREATE SCHEMA {}", schema).as_str(),
            ],
        )
        .await;
        admin.close().await;

        let settings = PoolSettings {
            max_connections: 1,
            schema: Some(schema.to_owned()),
            ..PoolSettings::default()
        };
        let pool = create_pool_with(&url, &settings)
            .await
            .expect("pool creation failed");
        execute_all(&pool, &LEGACY_TABLES).await;
        execute_all(&pool, rows).await;
        pool
    }

    async fn drop_schema(pool: PgPool, schema: &str) {
        execute_all(&pool, &[format!("DROP SCHEMA {} CASCADE", schema).as_str()]).await;
        pool.close().await;
    }

    async fn statuses(pool: &PgPool) -> Vec<(i32, Option<String>)> {
        sqlx::query_as("SELECT id, status::TEXT FROM recommendations ORDER BY id")
            .fetch_all(pool)
            .await
            .expect("status query failed")
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_are_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");

        run(&pool).await.expect("first run failed");
        let second = run(&pool).await.expect("second run failed");
        assert_eq!(second, MigrationReport::default());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn legacy_flags_become_statuses() {
        const SCHEMA: &str = "rectrack_legacy_convert";
        let pool = legacy_schema(
            SCHEMA,
            &[
                "INSERT INTO sections (id, name) VALUES (1, 'Housing')",
                "INSERT INTO recommendations (id, section_id, text, number, done, ongoing, unsure, status) VALUES
                    (1, 1, 'a', 1, TRUE, NULL, NULL, NULL),
                    (2, 1, 'b', 2, FALSE, TRUE, FALSE, NULL),
                    (3, 1, 'c', 3, NULL, NULL, TRUE, 'notStarted'),
                    (4, 1, 'd', 4, NULL, NULL, NULL, NULL),
                    (5, 1, 'e', 5, TRUE, FALSE, FALSE, 'unsure')",
            ],
        )
        .await;

        let report = run(&pool).await.expect("migration failed");
        assert_eq!(report.dropped_columns, cols(&["done", "ongoing", "unsure"]));
        assert_eq!(report.converted_rows, 3);
        assert_eq!(report.defaulted_rows, 1);

        assert_eq!(
            statuses(&pool).await,
            vec![
                (1, Some("done".to_owned())),
                (2, Some("ongoing".to_owned())),
                (3, Some("unsure".to_owned())),
                (4, Some("notStarted".to_owned())),
                (5, Some("unsure".to_owned())),
            ]
        );

        // The read path decodes every row after the upgrade
        let store = PgStore::new(pool.clone());
        let counts = store.status_counts().await.expect("stats failed");
        assert_eq!(
            (counts.done, counts.ongoing, counts.unsure, counts.not_started),
            (1, 1, 2, 1)
        );
        assert_eq!(store.section_rows().await.expect("listing failed").len(), 5);

        let nullable: String = sqlx::query_scalar(
            "SELECT is_nullable::TEXT FROM information_schema.columns \
             WHERE table_schema = current_schema() \
               AND table_name = 'recommendations' AND column_name = 'status'",
        )
        .fetch_one(&pool)
        .await
        .expect("catalog query failed");
        assert_eq!(nullable, "NO");

        let again = run(&pool).await.expect("second run failed");
        assert_eq!(again, MigrationReport::default());

        drop_schema(pool, SCHEMA).await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn conflicting_flags_abort_and_roll_back() {
        const SCHEMA: &str = "rectrack_legacy_conflict";
        let pool = legacy_schema(
            SCHEMA,
            &[
                "INSERT INTO sections (id, name) VALUES (1, 'Housing')",
                "INSERT INTO recommendations (id, section_id, text, number, done, ongoing, unsure) VALUES
                    (1, 1, 'a', 1, TRUE, FALSE, FALSE),
                    (7, 1, 'b', 2, TRUE, TRUE, FALSE)",
            ],
        )
        .await;

        match run(&pool).await {
            Err(DbError::Migration(message)) => assert!(message.contains("[7]"), "{}", message),
            other => panic!("expected a migration error, got {:?}", other),
        }

        let mut conn = pool.acquire().await.expect("acquire failed");
        assert_eq!(
            legacy_columns(&mut *conn).await.expect("catalog query failed"),
            cols(&["done", "ongoing", "unsure"])
        );
        drop(conn);
        assert_eq!(statuses(&pool).await, vec![(1, None), (7, None)]);

        drop_schema(pool, SCHEMA).await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn null_text_aborts_with_row_ids() {
        const SCHEMA: &str = "rectrack_legacy_nulls";
        let pool = legacy_schema(
            SCHEMA,
            &[
                "INSERT INTO sections (id, name) VALUES (1, 'Housing')",
                "INSERT INTO recommendations (id, section_id, text, number, done) VALUES
                    (3, 1, 'a', 1, TRUE),
                    (4, 1, NULL, 2, FALSE)",
            ],
        )
        .await;

        match run(&pool).await {
            Err(DbError::Migration(message)) => {
                assert!(message.starts_with("recommendations"), "{}", message);
                assert!(message.contains("[4]"), "{}", message);
            }
            other => panic!("expected a migration error, got {:?}", other),
        }
        assert_eq!(statuses(&pool).await, vec![(3, None), (4, None)]);

        drop_schema(pool, SCHEMA).await;
    }
}
