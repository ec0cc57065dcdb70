//! GoalPath command-line client
//!
//! # Usage
//! ```bash
//! goalpath login --email ada@example.com
//! goalpath goals create --title "Learn Go" --category "Education & Learning" --complexity beginner
//! goalpath milestone <goal-id> 3 completed
//! goalpath chat
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use goalpath_core::{CheckIn, ClientConfig, Complexity, Confidence, ProgressStatus};

mod chat;
mod commands;
mod render;

/// GoalPath - plan learning goals week by week and chat with your AI tutor
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Goal service base URL
    #[arg(long, env = "GOALPATH_API_URL", global = true)]
    api_url: Option<String>,

    /// Tutor WebSocket endpoint
    #[arg(long, env = "GOALPATH_TUTOR_URL", global = true)]
    tutor_url: Option<String>,

    /// Where the login token is kept
    #[arg(long, env = "GOALPATH_TOKEN_FILE", global = true)]
    token_file: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the access token
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "GOALPATH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "GOALPATH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// Manage goals
    Goals {
        #[command(subcommand)]
        command: GoalCommands,
    },

    /// Set the status of one milestone
    Milestone {
        goal: String,
        week: u32,
        /// not_started, in_progress or completed
        status: ProgressStatus,
    },

    /// Submit a weekly check-in
    Checkin {
        goal: String,
        /// What you did this week
        #[arg(long)]
        notes: String,
        /// Weeks whose milestones you finished, e.g. 1,2
        #[arg(long, value_delimiter = ',')]
        completed: Vec<u32>,
        #[arg(long, default_value = "")]
        challenges: String,
        #[arg(long, default_value = "")]
        next_steps: String,
        #[arg(long)]
        hours: Option<f32>,
        /// very_low, low, medium, high or very_high
        #[arg(long)]
        confidence: Option<Confidence>,
    },

    /// Show the suggested duration and default timeline for a goal type
    Suggest {
        complexity: Complexity,
        category: String,
    },

    /// Chat with the AI tutor
    Chat,
}

#[derive(Subcommand)]
pub(crate) enum GoalCommands {
    /// List all goals
    List {
        /// Output JSON for integrations
        #[arg(long)]
        json: bool,
    },

    /// Show one goal with its milestones
    Show { id: String },

    /// Create a goal
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "intermediate")]
        complexity: Complexity,
        /// Defaults to the suggested duration for complexity and category
        #[arg(long)]
        weeks: Option<u32>,
        /// Custom milestone as WEEK:OBJECTIVE; repeatable. Omit for the suggested timeline
        #[arg(long = "milestone", value_name = "WEEK:OBJECTIVE")]
        milestones: Vec<String>,
    },

    /// Change goal fields
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        complexity: Option<Complexity>,
        #[arg(long)]
        weeks: Option<u32>,
        #[arg(long)]
        status: Option<ProgressStatus>,
    },

    /// Delete a goal
    Delete { id: String },

    /// Show server-side progress for a goal
    Progress { id: String },

    /// Totals across all goals
    Summary,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the config file, then environment, then flags
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => ClientConfig::default(),
    };
    config = config.with_env().context("invalid GOALPATH_* environment")?;

    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url.clone());
    }
    if let Some(url) = &cli.tutor_url {
        config = config.with_tutor_url(url.clone());
    }
    if let Some(path) = &cli.token_file {
        config = config.with_token_file(path.clone());
    }
    if config.token_file.is_none() {
        config = config.with_token_file(default_token_file());
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn default_token_file() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".goalpath").join("credentials.json"),
        None => PathBuf::from(".goalpath-credentials.json"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    tracing::debug!("Using goal service at {}", config.api_url);
    let app = commands::App::new(&config)?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = commands::password_or_prompt(password)?;
            app.login(&email, &password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            let password = commands::password_or_prompt(password)?;
            app.register(&name, &email, &password).await?;
        }
        Commands::Logout => app.logout()?,
        Commands::Goals { command } => app.goals(command).await?,
        Commands::Milestone { goal, week, status } => {
            app.milestone(&goal, week, status).await?;
        }
        Commands::Checkin {
            goal,
            notes,
            completed,
            challenges,
            next_steps,
            hours,
            confidence,
        } => {
            let mut checkin = CheckIn::new(goal.into(), notes)
                .with_completed(completed)
                .with_challenges(challenges)
                .with_next_steps(next_steps);
            if let Some(hours) = hours {
                checkin = checkin.with_hours(hours);
            }
            if let Some(confidence) = confidence {
                checkin = checkin.with_confidence(confidence);
            }
            app.checkin(checkin).await?;
        }
        Commands::Suggest {
            complexity,
            category,
        } => render::suggestion(complexity, &category),
        Commands::Chat => chat::run(&config, app.guard()).await?,
    }

    Ok(())
}
