//! hybrid-authz administration CLI
//!
//! Registers manifests, manages role and attribute assignments, issues and
//! verifies tokens, and watches the invalidation channel.

#![allow(missing_docs)]

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use hybrid_authz::auth::authority::ServiceManifest;
use hybrid_authz::auth::jwt::{TokenIssuer, TokenValidator};
use hybrid_authz::storage::AuthzStorage;
use hybrid_authz::utils::logging::init_logging;
use hybrid_authz::utils::{SharedClock, system_clock};
use hybrid_authz::{Config, build_info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "hybrid-authz", version, about = "Hybrid RBAC/ABAC authorization admin tool")]
struct Cli {
    /// Configuration file; environment variables are used when absent
    #[arg(short, long, env = "HYBRID_AUTHZ_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register or update a service manifest (YAML or JSON)
    Manifest {
        file: PathBuf,
    },
    /// Grant a declared role to a subject
    Grant {
        #[command(flatten)]
        target: RoleTarget,
        /// Administrator recorded as the grantor
        #[arg(long, default_value = "cli")]
        granted_by: String,
        /// Expire the assignment after this many seconds
        #[arg(long)]
        expires_in: Option<u64>,
    },
    /// Revoke a role from a subject
    Revoke {
        #[command(flatten)]
        target: RoleTarget,
    },
    /// Set a declared attribute; the value is parsed by the declared type
    SetAttr {
        #[command(flatten)]
        target: SubjectTarget,
        #[arg(long)]
        name: String,
        #[arg(long)]
        value: String,
    },
    /// Remove an attribute value so the declared default applies
    ClearAttr {
        #[command(flatten)]
        target: SubjectTarget,
        #[arg(long)]
        name: String,
    },
    /// Show a subject's profile as the attribute cache serves it
    Profile {
        #[command(flatten)]
        target: SubjectTarget,
    },
    /// Issue or verify tokens
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
    /// Log invalidation events until interrupted
    Watch,
}

#[derive(Debug, Args)]
struct SubjectTarget {
    #[arg(long)]
    subject: String,
    #[arg(long)]
    service: String,
}

#[derive(Debug, Args)]
struct RoleTarget {
    #[arg(long)]
    subject: String,
    #[arg(long)]
    role: String,
    #[arg(long)]
    service: String,
}

#[derive(Debug, Subcommand)]
enum TokenCommand {
    /// Sign a token for a subject
    Issue {
        #[arg(long)]
        subject: String,
        /// Lifetime in seconds; the configured lifetime when absent
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Validate a token and print its subject
    Verify { token: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::from_env().context("loading configuration from environment")?,
    };
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref()).await?;
    init_logging(&config.logging)?;

    let build = build_info();
    info!("hybrid-authz {} ({})", build.version, build.git_hash);

    let clock = system_clock();

    match cli.command {
        Command::Token { command } => token_command(&config, clock, command).await,
        command => {
            let storage = AuthzStorage::connect(&config, clock.clone()).await?;
            admin_command(&config, &storage, clock, command).await
        }
    }
}

async fn token_command(config: &Config, clock: SharedClock, command: TokenCommand) -> Result<()> {
    match command {
        TokenCommand::Issue { subject, ttl } => {
            let issuer = TokenIssuer::new(&config.auth, clock).await?;
            let token = match ttl {
                Some(secs) => issuer.issue_with_ttl(&subject, Duration::from_secs(secs))?,
                None => issuer.issue(&subject)?,
            };
            println!("{}", token);
        }
        TokenCommand::Verify { token } => {
            let validator = TokenValidator::new(&config.auth, clock).await?;
            let subject = validator.validate(&token)?;
            println!("{}", subject);
        }
    }
    Ok(())
}

async fn admin_command(
    config: &Config,
    storage: &AuthzStorage,
    clock: SharedClock,
    command: Command,
) -> Result<()> {
    let authority = storage.identity_authority(clock.clone());

    match command {
        Command::Manifest { file } => {
            let manifest = ServiceManifest::from_file(&file).await?;
            let report = authority.register_manifest(&manifest).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Grant {
            target,
            granted_by,
            expires_in,
        } => {
            let expires_at = match expires_in {
                Some(secs) => {
                    let secs = i64::try_from(secs).context("expiry is too large")?;
                    let delta = chrono::Duration::try_seconds(secs).context("expiry is too large")?;
                    Some(clock.now() + delta)
                }
                None => None,
            };
            let assignment = authority
                .grant_role(&target.subject, &target.role, &target.service, &granted_by, expires_at)
                .await?;
            println!("{}", serde_json::to_string_pretty(&assignment)?);
        }
        Command::Revoke { target } => {
            let removed = authority
                .revoke_role(&target.subject, &target.role, &target.service)
                .await?;
            if !removed {
                bail!(
                    "{} does not hold role '{}' in '{}'",
                    target.subject,
                    target.role,
                    target.service
                );
            }
            println!("revoked");
        }
        Command::SetAttr {
            target,
            name,
            value,
        } => {
            let assignment = authority
                .set_attribute_str(&target.subject, &target.service, &name, &value)
                .await?;
            println!("{}", serde_json::to_string_pretty(&assignment)?);
        }
        Command::ClearAttr { target, name } => {
            let removed = authority
                .clear_attribute(&target.subject, &target.service, &name)
                .await?;
            println!("{}", if removed { "cleared" } else { "not set" });
        }
        Command::Profile { target } => {
            let cache = storage.profile_cache(config, Arc::new(authority), clock);
            let profile = cache.get_profile(&target.subject, &target.service).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::Watch => {
            let mut events = storage.bus.subscribe().await?;
            info!("Watching invalidation events; Ctrl-C to stop");
            loop {
                tokio::select! {
                    event = events.next() => match event {
                        Some(event) => info!("invalidate {}/{}", event.service, event.subject_id),
                        None => bail!("invalidation stream closed"),
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Command::Token { .. } => bail!("token commands run without storage"),
    }
    Ok(())
}
