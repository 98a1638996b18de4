use sqlx::postgres::PgPool;
use std::env;

#[tokio::main]
async fn main() -> Result<(), sqlx::Error> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let Ok(database_url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL must be set");
        std::process::exit(1);
    };

    println!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    for table in ["users", "chats"] {
        let result = sqlx::query_as::<_, (i64,)>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pool)
            .await;

        match result {
            Ok((count,)) => println!("✅ {} table EXISTS ({} rows)", table, count),
            Err(e) => println!("❌ {} table NOT FOUND: {}", table, e),
        }
    }

    println!("\nChecking _sqlx_migrations table...");
    let migrations = sqlx::query_as::<_, (i64, String, bool)>(
        "SELECT version, description, success FROM _sqlx_migrations ORDER BY version DESC",
    )
    .fetch_all(&pool)
    .await;

    match migrations {
        Ok(migrations) => {
            println!("✅ Migrations:");
            for (version, description, success) in migrations {
                println!("  - {} {} (Succeeded: {})", version, description, success);
            }
        }
        Err(e) => println!("❌ Error querying _sqlx_migrations: {}", e),
    }

    Ok(())
}
