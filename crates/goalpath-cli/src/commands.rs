//! Goal and account commands

use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufRead, Write};
use std::sync::Arc;

use goalpath_core::{
    AuthClient, AuthGuard, CheckIn, ClientConfig, CredentialStore, FileCredentialStore,
    GoalDraft, GoalError, GoalId, GoalPatch, GoalStore, HttpGoalService, Milestone,
    ProgressStatus,
};

use crate::render;
use crate::GoalCommands;

/// Wired-up client for one CLI invocation
pub(crate) struct App {
    guard: AuthGuard,
    auth: AuthClient,
    store: GoalStore,
}

impl App {
    pub(crate) fn new(config: &ClientConfig) -> Result<Self> {
        let http = config.http_client()?;
        let token_file = config
            .token_file
            .clone()
            .context("no token file configured")?;
        let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(token_file));
        let guard = AuthGuard::new(credentials);

        let auth = AuthClient::new(http.clone(), config.api_url.clone(), guard.clone());
        let service = HttpGoalService::new(http, config.api_url.clone(), guard.clone());

        Ok(Self {
            guard,
            auth,
            store: GoalStore::new(Arc::new(service)),
        })
    }

    pub(crate) fn guard(&self) -> &AuthGuard {
        &self.guard
    }

    pub(crate) async fn login(&self, email: &str, password: &str) -> Result<()> {
        let credentials = self.auth.login(email, password).await?;
        render::signed_in(&credentials);
        Ok(())
    }

    pub(crate) async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let credentials = self.auth.register(name, email, password).await?;
        render::signed_in(&credentials);
        Ok(())
    }

    pub(crate) fn logout(&self) -> Result<()> {
        self.auth.logout()?;
        self.store.teardown();
        println!("Signed out.");
        Ok(())
    }

    pub(crate) async fn goals(&self, command: GoalCommands) -> Result<()> {
        self.load().await?;

        match command {
            GoalCommands::List { json } => {
                let goals = self.store.goals();
                if json {
                    println!("{}", serde_json::to_string_pretty(&goals)?);
                } else {
                    render::goal_table(&goals);
                }
            }
            GoalCommands::Show { id } => {
                let id = GoalId::from(id);
                let goal = self
                    .store
                    .get(&id)
                    .ok_or_else(|| explain(GoalError::NotFound(id)))?;
                render::goal_detail(&goal);
            }
            GoalCommands::Create {
                title,
                category,
                description,
                complexity,
                weeks,
                milestones,
            } => {
                let mut builder = GoalDraft::builder()
                    .title(title)
                    .category(category)
                    .description(description)
                    .complexity(complexity);
                if let Some(weeks) = weeks {
                    builder = builder.duration_weeks(weeks);
                }
                for entry in &milestones {
                    builder = builder.add_milestone(parse_milestone(entry)?);
                }
                let draft = builder.build().map_err(explain)?;
                let goal = self.store.create(draft).await.map_err(explain)?;
                println!("Created goal {}", goal.id);
                render::goal_detail(&goal);
            }
            GoalCommands::Update {
                id,
                title,
                description,
                category,
                complexity,
                weeks,
                status,
            } => {
                let patch = GoalPatch {
                    title,
                    description,
                    category,
                    complexity,
                    duration_weeks: weeks,
                    status,
                    current_week: None,
                };
                if patch.is_empty() {
                    bail!("Nothing to update; pass at least one field");
                }
                let goal = self
                    .store
                    .update(&GoalId::from(id), patch)
                    .await
                    .map_err(explain)?;
                render::goal_detail(&goal);
            }
            GoalCommands::Delete { id } => {
                let id = GoalId::from(id);
                self.store.remove(&id).await.map_err(explain)?;
                println!("Deleted goal {}", id);
            }
            GoalCommands::Progress { id } => {
                let id = GoalId::from(id);
                let progress = self.store.progress(&id).await.map_err(explain)?;
                render::progress(&id, &progress);
            }
            GoalCommands::Summary => render::summary(&self.store.summary()),
        }

        Ok(())
    }

    pub(crate) async fn milestone(&self, goal: &str, week: u32, status: ProgressStatus) -> Result<()> {
        self.load().await?;
        let goal = self
            .store
            .update_milestone_status(&GoalId::from(goal), week, status)
            .await
            .map_err(explain)?;
        println!(
            "Week {} marked {} - {} is {}% complete",
            week, status, goal.title, goal.progress_percent
        );
        Ok(())
    }

    pub(crate) async fn checkin(&self, checkin: CheckIn) -> Result<()> {
        self.load().await?;
        self.store.submit_checkin(&checkin).await.map_err(explain)?;
        println!("Check-in recorded for goal {}", checkin.goal_id);
        Ok(())
    }

    async fn load(&self) -> Result<()> {
        if !self.guard.is_authenticated() {
            bail!("Not signed in. Run `goalpath login` first.");
        }
        self.store.load().await.map_err(explain)
    }
}

/// Attach a next step to errors the user can act on
fn explain(error: GoalError) -> anyhow::Error {
    match error {
        GoalError::Unauthorized => anyhow!("{}. Run `goalpath login`.", error),
        other => anyhow::Error::new(other),
    }
}

/// Parse `WEEK:OBJECTIVE`
fn parse_milestone(entry: &str) -> Result<Milestone> {
    let (week, objective) = entry
        .split_once(':')
        .with_context(|| format!("milestone '{}' must look like WEEK:OBJECTIVE", entry))?;
    let week: u32 = week
        .trim()
        .parse()
        .with_context(|| format!("invalid week in milestone '{}'", entry))?;
    Ok(Milestone::new(week, objective.trim(), ""))
}

/// Use the given password or read one line from stdin
pub(crate) fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    Ok(password)
}
