// ABOUTME: CLI account commands - login, register, logout, whoami, profile
//
// Establishes or tears down the persisted session shared with the TUI.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

use super::util::{password_or_prompt, print_json, CommandContext};
use super::{LoginArgs, OutputFormat, ProfileArgs, RegisterArgs};
use crate::api::{CardioApiClient, RegisterRequest, UserDetails};
use crate::credentials::mask_token;

#[derive(Debug, Serialize)]
struct SessionSummary<'a> {
    authenticated: bool,
    token: Option<String>,
    user: Option<&'a UserDetails>,
    established_at: Option<String>,
}

pub async fn login(args: LoginArgs, format: OutputFormat) -> Result<()> {
    let mut ctx = CommandContext::load()?;
    let password = password_or_prompt(args.password)?;

    let token = ctx.client.login(&args.email, &password).await.context("Login failed")?;
    establish(&mut ctx, token).await?;
    report(&ctx, format, "Logged in")
}

pub async fn register(args: RegisterArgs, format: OutputFormat) -> Result<()> {
    let mut ctx = CommandContext::load()?;
    let request = RegisterRequest {
        email: args.email.trim().to_string(),
        password: password_or_prompt(args.password)?,
        first_name: args.first_name,
        last_name: args.last_name,
        phone_number: args.phone,
    };

    let token = ctx.client.register(&request).await.context("Registration failed")?;
    establish(&mut ctx, token).await?;
    report(&ctx, format, "Account created")
}

pub fn logout(format: OutputFormat) -> Result<()> {
    let mut ctx = CommandContext::load()?;
    ctx.store.clear().context("Failed to clear stored session")?;
    ctx.session.teardown();

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "authenticated": false })),
        OutputFormat::Text => {
            println!("Logged out.");
            Ok(())
        }
    }
}

/// Print the cached user, refreshed from the service when possible
pub async fn whoami(format: OutputFormat) -> Result<()> {
    let mut ctx = CommandContext::load()?;
    if ctx.session.is_authenticated() {
        match ctx.client.user_details().await {
            Ok(user) => {
                ctx.session.set_user(user);
                if let Err(e) = ctx.store.save(&ctx.session) {
                    warn!("Failed to update cached user: {}", e);
                }
            }
            Err(e) => warn!("Using cached user details: {}", e),
        }
    }
    report(&ctx, format, "")
}

/// Send profile changes and cache the user the service returns
pub async fn profile(args: ProfileArgs, format: OutputFormat) -> Result<()> {
    let changes = args.into_request();
    if changes.is_empty() {
        anyhow::bail!("Nothing to update: pass --first-name, --last-name, --username or --phone");
    }

    let mut ctx = CommandContext::load()?;
    ctx.require_login()?;

    let user = ctx
        .client
        .edit_user_details(&changes)
        .await
        .context("Profile update failed")?;
    ctx.session.set_user(user);
    ctx.store.save(&ctx.session).context("Failed to persist session")?;

    report(&ctx, format, "Profile updated")
}

async fn establish(ctx: &mut CommandContext, token: String) -> Result<()> {
    let client: CardioApiClient = ctx.client.clone().with_token(Some(token.clone()));
    let user = match client.user_details().await {
        Ok(user) => Some(user),
        Err(e) => {
            warn!("Could not fetch user details: {}", e);
            None
        }
    };

    ctx.session.establish(token, user);
    ctx.client = client;
    ctx.store.save(&ctx.session).context("Failed to persist session")?;
    Ok(())
}

fn report(ctx: &CommandContext, format: OutputFormat, headline: &str) -> Result<()> {
    let summary = SessionSummary {
        authenticated: ctx.session.is_authenticated(),
        token: ctx.session.bearer().map(mask_token),
        user: ctx.session.user(),
        established_at: ctx.session.established_at().map(|t| t.to_rfc3339()),
    };

    match format {
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Text => {
            if !summary.authenticated {
                println!("Not logged in.");
                return Ok(());
            }
            if !headline.is_empty() {
                println!("✅ {}", headline);
            }
            if let Some(user) = summary.user {
                println!("User:   {} <{}>", user.display_name(), user.email);
            }
            if let Some(token) = &summary.token {
                println!("Token:  {}", token);
            }
            if let Some(at) = &summary.established_at {
                println!("Since:  {}", at);
            }
            Ok(())
        }
    }
}
