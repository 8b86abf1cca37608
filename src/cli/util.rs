// ABOUTME: Shared CLI utilities for config/session setup, password prompts and output
//
// Keeps command modules free of terminal and persistence plumbing.

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

use super::LocationArgs;
use crate::api::{CardioApiClient, Coordinates};
use crate::config::AppConfig;
use crate::session::{SessionContext, SessionStore};

/// Everything a command needs to talk to the service
pub struct CommandContext {
    pub config: AppConfig,
    pub store: SessionStore,
    pub session: SessionContext,
    pub client: CardioApiClient,
}

impl CommandContext {
    pub fn load() -> Result<Self> {
        let config = AppConfig::load().context("Failed to load configuration")?;
        let store = SessionStore::open_default()?;
        let session = store.load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring stored session: {}", e);
            SessionContext::new()
        });
        let client = CardioApiClient::new(&config)?.with_token(session.bearer().map(str::to_string));

        Ok(Self {
            config,
            store,
            session,
            client,
        })
    }

    pub fn require_login(&self) -> Result<()> {
        self.session
            .require_bearer()
            .map(|_| ())
            .context("Run 'cardiocheck login' first")
    }
}

/// Flags win over `[location]` in config
pub fn resolve_location(args: &LocationArgs, config: &AppConfig) -> Option<Coordinates> {
    match (args.lat, args.lng) {
        (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
        _ => config.location.map(Coordinates::from),
    }
}

/// Use the flag if given, otherwise `CARDIOCHECK_PASSWORD`, otherwise prompt
pub fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    if let Ok(password) = std::env::var("CARDIOCHECK_PASSWORD") {
        return Ok(password);
    }
    prompt_password("Password: ")
}

/// Read a line without echoing it
pub fn prompt_password(prompt: &str) -> Result<String> {
    if !io::stdin().is_terminal() {
        let mut line = String::new();
        io::stdin().read_line(&mut line).context("Failed to read password from stdin")?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    print!("{}", prompt);
    io::stdout().flush()?;

    enable_raw_mode().context("Failed to enable raw mode")?;
    let result = read_hidden_line();
    let _ = disable_raw_mode();
    println!();

    result
}

fn read_hidden_line() -> Result<String> {
    let mut password = String::new();
    loop {
        if let Event::Key(KeyEvent {
            code, modifiers, kind, ..
        }) = event::read()?
        {
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Enter => return Ok(password),
                KeyCode::Backspace => {
                    password.pop();
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    anyhow::bail!("Cancelled");
                }
                KeyCode::Char(c) => password.push(c),
                KeyCode::Esc => anyhow::bail!("Cancelled"),
                _ => {}
            }
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocationConfig;

    #[test]
    fn test_flags_override_configured_location() {
        let mut config = AppConfig::default();
        config.location = Some(LocationConfig {
            latitude: 1.0,
            longitude: 2.0,
        });

        let flags = LocationArgs {
            lat: Some(40.7),
            lng: Some(-74.0),
        };
        assert_eq!(
            resolve_location(&flags, &config),
            Some(Coordinates {
                latitude: 40.7,
                longitude: -74.0
            })
        );

        let none = LocationArgs::default();
        assert_eq!(
            resolve_location(&none, &config),
            Some(Coordinates {
                latitude: 1.0,
                longitude: 2.0
            })
        );
        assert_eq!(resolve_location(&none, &AppConfig::default()), None);
    }
}
