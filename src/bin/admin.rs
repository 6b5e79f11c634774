//! CLI administration tool for minify.
//!
//! Provides commands for managing accounts and API tokens, viewing statistics,
//! and performing database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Create an account
//! cargo run --bin admin -- account create alice
//!
//! # Soft-delete an account (deactivates all of its links)
//! cargo run --bin admin -- account delete 1
//!
//! # Finish a reactivation whose link update failed
//! cargo run --bin admin -- account relink 1
//!
//! # Issue an API token for account 1
//! cargo run --bin admin -- token create --account 1 --name "CI"
//!
//! # Revoke a token
//! cargo run --bin admin -- token revoke "CI"
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` (required): PostgreSQL connection
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): must match the server

use minify::application::services::AccountService;
use minify::application::services::account_service::ReactivationRecord;
use minify::application::services::auth_service::hash_token;
use minify::config::{Config, mask_connection_string};
use minify::domain::lifecycle::{self, AccountStatus};
use minify::domain::repositories::{AccountRepository, TokenRepository};
use minify::infrastructure::persistence::{
    PgAccountRepository, PgLinkRepository, PgTokenRepository,
};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing minify.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Account management subcommands.
#[derive(Subcommand)]
enum AccountAction {
    /// Create a new account
    Create {
        /// Display name
        name: Option<String>,
    },

    /// List all accounts
    List,

    /// Show one account and its status
    Show { id: i64 },

    /// Soft-delete an account and deactivate its links
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Reactivate a soft-deleted account and its links
    Reactivate { id: i64 },

    /// Reactivate the links of an active account after a failed reactivation
    Relink { id: i64 },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Account the token authenticates as
        #[arg(short, long)]
        account: i64,

        /// Token name (e.g., "Production API", "Mobile App")
        #[arg(short, long)]
        name: Option<String>,

        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;

    let pool = PgPool::connect(&database_url)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database at {}",
                mask_connection_string(&database_url)
            )
        })?;

    match cli.command {
        Commands::Account { action } => handle_account_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches account management commands.
async fn handle_account_action(action: AccountAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let accounts = Arc::new(PgAccountRepository::new(pool.clone()));
    let links = Arc::new(PgLinkRepository::new(pool));
    let service = AccountService::new(accounts.clone(), links);

    match action {
        AccountAction::Create { name } => {
            let name = match name {
                Some(n) => n,
                None => Input::new().with_prompt("Account name").interact_text()?,
            };

            let account = accounts
                .create(&name)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create account: {}", e))?;

            println!(
                "{} account {} ({})",
                "✅ Created".green().bold(),
                account.id.to_string().bright_white().bold(),
                account.name.cyan()
            );
        }
        AccountAction::List => {
            let all = accounts
                .list()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list accounts: {}", e))?;

            println!("{}", "👤 Accounts".bright_blue().bold());
            println!();

            if all.is_empty() {
                println!("{}", "  No accounts found".yellow());
                return Ok(());
            }

            println!(
                "  {:<5} {:<30} {:<20} {:<10}",
                "ID".bright_white().bold(),
                "Name".bright_white().bold(),
                "Created".bright_white().bold(),
                "Status".bright_white().bold()
            );
            println!("  {}", "─".repeat(70).bright_black());

            for account in &all {
                let status = if account.is_deleted() {
                    "DELETED".red()
                } else {
                    "ACTIVE".green()
                };

                println!(
                    "  {:<5} {:<30} {:<20} {}",
                    account.id.to_string().bright_black(),
                    account.name.cyan(),
                    account
                        .created_at
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                        .bright_black(),
                    status
                );
            }
            println!();
        }
        AccountAction::Show { id } => {
            let (account, status) = service
                .status(id, Utc::now())
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            println!("  ID:      {}", account.id.to_string().bright_white());
            println!("  Name:    {}", account.name.cyan());
            println!("  Created: {}", account.created_at.format("%Y-%m-%d %H:%M"));
            match status {
                AccountStatus::Active => println!("  Status:  {}", "ACTIVE".green()),
                AccountStatus::SoftDeleted {
                    deleted_at,
                    deletion_deadline,
                } => {
                    println!("  Status:  {}", "DELETED".red());
                    println!("  Deleted: {}", deleted_at.format("%Y-%m-%d %H:%M"));
                    println!(
                        "  Purge after: {}",
                        deletion_deadline.format("%Y-%m-%d %H:%M").to_string().yellow()
                    );
                }
            }
        }
        AccountAction::Delete { id, yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Soft-delete account {id} and deactivate its links? It will be purged after {} days.",
                        lifecycle::DELETION_GRACE_DAYS
                    ))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let record = service
                .soft_delete(id)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            if record.already_deleted {
                println!("{}", "⚠️  Account was already deleted; links re-deactivated".yellow());
            } else {
                println!("{}", "✅ Account soft-deleted".green().bold());
            }
            println!("  Links deactivated: {}", record.links_deactivated);
            println!(
                "  Purge after:       {}",
                record.deletion_deadline.format("%Y-%m-%d %H:%M")
            );
        }
        AccountAction::Reactivate { id } => {
            let record = service
                .reactivate(id)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            print_reactivation(&record);
        }
        AccountAction::Relink { id } => {
            let record = service
                .resume_reactivation(id)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            print_reactivation(&record);
        }
    }

    Ok(())
}

fn print_reactivation(record: &ReactivationRecord) {
    match record {
        ReactivationRecord::AlreadyActive { .. } => {
            println!("{}", "⚠️  Account is already active".yellow());
        }
        ReactivationRecord::Reactivated {
            links_reactivated, ..
        } => {
            println!("{}", "✅ Account reactivated".green().bold());
            println!("  Links reactivated: {links_reactivated}");
        }
        ReactivationRecord::Resumed {
            links_reactivated, ..
        } => {
            println!("{}", "✅ Account links reactivated".green().bold());
            println!("  Links reactivated: {links_reactivated}");
        }
    }
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let repo = Arc::new(PgTokenRepository::new(pool.clone()));

    match action {
        TokenAction::Create {
            account,
            name,
            token,
            yes,
        } => {
            let accounts = PgAccountRepository::new(pool);
            let owner = accounts
                .find_by_id(account)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
                .with_context(|| format!("Account {account} not found"))?;

            if owner.is_deleted() {
                anyhow::bail!("Account {account} is deleted; reactivate it first");
            }

            create_token(repo, account, name, token, yes).await?;
        }
        TokenAction::List => {
            list_tokens(repo).await?;
        }
        TokenAction::Revoke { name_or_id } => {
            revoke_token(repo, name_or_id).await?;
        }
    }

    Ok(())
}

/// Creates a new API token with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for token name (or use provided)
/// 2. Generate random token or use provided value
/// 3. Display token details with warning
/// 4. Confirm creation (unless `--yes` flag)
/// 5. Hash token with HMAC-SHA256 using `TOKEN_SIGNING_SECRET`
/// 6. Store in database
///
/// # Security
///
/// - Only the HMAC hash is stored in the database
/// - Raw token is displayed once and cannot be retrieved later
async fn create_token(
    repo: Arc<PgTokenRepository>,
    account_id: i64,
    name: Option<String>,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    let signing_secret =
        std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;
    if signing_secret.is_empty() {
        anyhow::bail!("TOKEN_SIGNING_SECRET must not be empty");
    }

    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "⚠️  Using provided token value".yellow());
            t
        }
        None => generate_token(),
    };

    println!("{}", "Token details:".bright_white().bold());
    println!("  Account: {}", account_id.to_string().cyan());
    println!("  Name:    {}", token_name.cyan());
    println!("  Token:   {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(&signing_secret, &token_value);

    repo.create_token(account_id, &token_name, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/links",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists all API tokens with status indicators.
async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        return Ok(());
    }

    println!(
        "  {:<5} {:<8} {:<25} {:<18} {:<18} {:<10}",
        "ID".bright_white().bold(),
        "Account".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(90).bright_black());

    for token in &tokens {
        let status = if token.is_revoked() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<5} {:<8} {:<25} {:<18} {:<18} {}",
            token.id.to_string().bright_black(),
            token.account_id,
            token.name.cyan(),
            token.created_at.format("%Y-%m-%d %H:%M").to_string(),
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a token by name or ID with confirmation prompt.
///
/// Numeric input is treated as an ID, anything else as an exact name.
async fn revoke_token(repo: Arc<PgTokenRepository>, name_or_id: String) -> Result<()> {
    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(&name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Token not found")?;

    if token.is_revoked() {
        println!("{}", "⚠️  This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!("{}", "✅ Token revoked successfully!".green().bold());

    Ok(())
}

/// Displays system statistics.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (accounts, deleted_accounts): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE deleted_at IS NOT NULL) FROM accounts",
    )
    .fetch_one(pool)
    .await?;

    let (links, live_links): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active AND expires_at > NOW()) FROM links",
    )
    .fetch_one(pool)
    .await?;

    let tokens_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    println!(
        "  Accounts:      {} ({} deleted)",
        accounts.to_string().bright_green().bold(),
        deleted_accounts.to_string().red()
    );
    println!(
        "  Links:         {} ({} live)",
        links.to_string().bright_green().bold(),
        live_links.to_string().green()
    );
    println!(
        "  Active tokens: {}",
        tokens_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a random 48-character alphanumeric token (~286 bits of entropy).
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
