#![deny(warnings)]

use persistence::default_sqlite_url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| default_sqlite_url().to_string());
    // Ensure the parent directory exists; SQLite creates the file itself.
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"));
    if let Some(path) = path {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    let pool = persistence::init_db(&url).await?;
    let slots: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_slots")
        .fetch_one(&pool)
        .await?;
    println!("DB migrated at {} ({} save slots)", url, slots);
    Ok(())
}
