//! Interactive setup: asks for whatever the configuration is still missing,
//! resolves the realm and saves the result.

use std::io::Stdout;
use std::path::Path;

use crossterm::event::{self, Event as CEvent, KeyEvent, KeyEventKind};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info, warn};

use crate::app::{KeyOutcome, Wizard, closest_match};
use crate::bnet::{BnetClient, BnetError};
use crate::config::{Config, ConfigError, Locale, Region};
use crate::model::{Fetch, Field, Prompt, Realm};
use crate::ui::draw_ui;

const KNOWN_STATS: &str = "AGILITY, INTELLECT, STAMINA, STRENGTH, CRIT_RATING, HASTE_RATING, MASTERY_RATING, VERSATILITY";

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] BnetError),
    #[error("Could not read the realms list: {0}")]
    RealmsUnavailable(String),
    #[error("Setup cancelled")]
    Cancelled,
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// How the configured realm matched the realm list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealmMatch {
    Slug,
    Name(String),
    NotFound { closest: Option<String> },
}

/// Complete the configuration and return a client ready for the ranking run.
pub async fn run(config: &mut Config, config_path: &Path) -> Result<BnetClient, SetupError> {
    let prompts = missing_prompts(
        config,
        &[Field::ClientId, Field::ClientSecret, Field::Locale, Field::Region],
        &[],
    );
    prompt_user(config, prompts)?;

    let mut client = BnetClient::new(config);
    info!("Reading realms list...");
    let realms = match client.realms_list().await? {
        Fetch::Data(realms) => realms,
        Fetch::Unavailable(reason) => return Err(SetupError::RealmsUnavailable(reason)),
    };
    debug!("{} realms available", realms.len());

    let prompts = missing_prompts(
        config,
        &[Field::Realm, Field::Character, Field::StatWeights],
        &realms,
    );
    prompt_user(config, prompts)?;

    match resolve_realm(&config.realm, &realms) {
        RealmMatch::Slug => {}
        RealmMatch::Name(slug) => config.realm = slug,
        RealmMatch::NotFound { closest } => match closest {
            Some(c) => warn!("Could not find realm ({}), did you mean {}?", config.realm, c),
            None => warn!("Could not find realm ({})", config.realm),
        },
    }
    client.set_character(&config.realm, &config.character);

    config.save(config_path)?;
    Ok(client)
}

/// Prompts for each of `fields` that has no value yet, in order.
pub fn missing_prompts(config: &Config, fields: &[Field], realms: &[Realm]) -> Vec<Prompt> {
    fields
        .iter()
        .copied()
        .filter(|f| config.is_missing(*f))
        .map(|field| {
            let text = |label: &str, masked: bool| Prompt::Text {
                field,
                label: label.to_string(),
                value: String::new(),
                masked,
            };
            let choice = |label: &str, choices: Vec<String>| Prompt::Choice {
                field,
                label: label.to_string(),
                choices,
            };
            match field {
                Field::ClientId => text("API client id", false),
                Field::ClientSecret => text("API client secret", true),
                Field::Locale => choice(
                    "Locale",
                    Locale::ALL.iter().map(|l| l.to_string()).collect(),
                ),
                Field::Region => choice(
                    "Region",
                    Region::ALL.iter().map(|r| r.to_string()).collect(),
                ),
                Field::Realm => choice("Realm", realms.iter().map(|r| r.name.clone()).collect()),
                Field::Character => text("Character name", false),
                Field::StatWeights => text(
                    &format!("Stat weights as STAT=weight,... ({})", KNOWN_STATS),
                    false,
                ),
            }
        })
        .collect()
}

/// Match a realm given either by slug or by display name.
pub fn resolve_realm(realm: &str, realms: &[Realm]) -> RealmMatch {
    if realms.iter().any(|r| r.slug == realm) {
        return RealmMatch::Slug;
    }
    if let Some(r) = realms.iter().find(|r| r.name == realm) {
        return RealmMatch::Name(r.slug.clone());
    }
    let closest = closest_match(realm, realms.iter().map(|r| r.name.as_str())).map(str::to_string);
    RealmMatch::NotFound { closest }
}

/// Run the terminal UI for `prompts`. Nothing is shown when there is nothing to ask.
fn prompt_user(config: &mut Config, prompts: Vec<Prompt>) -> Result<(), SetupError> {
    if prompts.is_empty() {
        return Ok(());
    }

    let outcome = guarded(
        || execute!(std::io::stdout(), EnterAlternateScreen),
        || {
            crossterm::terminal::enable_raw_mode()?;
            run_wizard(prompts, config)
        },
        || {
            let raw = crossterm::terminal::disable_raw_mode();
            execute!(std::io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)?;
            raw
        },
    )?;

    match outcome {
        KeyOutcome::Cancelled => Err(SetupError::Cancelled),
        _ => Ok(()),
    }
}

/// Run `body` between `enter` and `leave`. Once `enter` succeeded, `leave`
/// runs even if `body` fails, and the first error wins.
fn guarded<T>(
    enter: impl FnOnce() -> std::io::Result<()>,
    body: impl FnOnce() -> Result<T, SetupError>,
    leave: impl FnOnce() -> std::io::Result<()>,
) -> Result<T, SetupError> {
    enter()?;
    let outcome = body();
    let left = leave();
    let value = outcome?;
    left?;
    Ok(value)
}

fn run_wizard(prompts: Vec<Prompt>, config: &mut Config) -> Result<KeyOutcome, SetupError> {
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;
    let mut wizard = Wizard::new(prompts);
    event_loop(&mut terminal, &mut wizard, config)
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    wizard: &mut Wizard,
    config: &mut Config,
) -> Result<KeyOutcome, SetupError> {
    loop {
        terminal.draw(|f| draw_ui(f, wizard))?;

        if let CEvent::Key(KeyEvent { code, kind, .. }) = event::read()? {
            if kind != KeyEventKind::Press {
                continue;
            }
            match wizard.handle_key(code, config) {
                KeyOutcome::Continue => {}
                outcome => return Ok(outcome),
            }
        }
    }
}
