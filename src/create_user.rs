// create_user.rs
// Utility to create (or reset) an account that can log in with a password

#[allow(dead_code)]
#[path = "auth/passwords.rs"]
mod passwords;

#[allow(dead_code)]
#[path = "common/id_generator.rs"]
mod id_generator;

use anyhow::{bail, Context};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::str::FromStr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let [username, email, password] = args.as_slice() else {
        bail!("usage: create_user <username> <email> <password>");
    };
    let email = email.trim().to_lowercase();
    if username.trim().is_empty() || !email.contains('@') {
        bail!("username must not be empty and email must be an address");
    }

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://resume_api.db".to_string());
    let options = SqliteConnectOptions::from_str(&database_url)?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("could not open {} (start the server once to create it)", database_url))?;

    let password_hash = passwords::hash_password(password)?;

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(&pool)
        .await?;

    match existing {
        Some((id,)) => {
            sqlx::query("UPDATE users SET email = ?, password_hash = ?, is_active = 1 WHERE id = ?")
                .bind(&email)
                .bind(&password_hash)
                .bind(&id)
                .execute(&pool)
                .await?;
            println!("✅ Updated password for {} ({})", username, id);
        }
        None => {
            let id = id_generator::generate_user_id();
            sqlx::query(
                "INSERT INTO users (id, username, email, first_name, last_name, password_hash) VALUES (?, ?, ?, '', '', ?)",
            )
            .bind(&id)
            .bind(username)
            .bind(&email)
            .bind(&password_hash)
            .execute(&pool)
            .await
            .context("insert failed (is the email already taken?)")?;
            println!("✅ Created user {} ({})", username, id);
        }
    }

    Ok(())
}
