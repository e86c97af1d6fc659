use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ConfigError};

/// WoW Next BiS: rank a character's possible gear upgrades by stat weights.
///
/// Any value not given here or in the configuration file is prompted for.
#[derive(Debug, Parser)]
#[command(name = "wnb", version, about)]
pub struct Cli {
    /// API client id
    #[arg(short = 'i', long, env = "WNB_CLIENT_ID")]
    pub client_id: Option<String>,

    /// API client secret
    #[arg(short = 's', long, env = "WNB_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Preferred locale, e.g. en_US
    #[arg(short = 'l', long)]
    pub locale: Option<String>,

    /// Region: us, eu, kr, tw or cn
    #[arg(long)]
    pub region: Option<String>,

    /// Realm slug or name
    #[arg(long)]
    pub realm: Option<String>,

    /// Character name
    #[arg(short = 'c', long)]
    pub character: Option<String>,

    /// Comma separated stat weights, e.g. "INTELLECT=1,CRIT_RATING=0.2,HASTE_RATING=0.7".
    /// Stats: AGILITY, INTELLECT, STAMINA, STRENGTH, CRIT_RATING, HASTE_RATING,
    /// MASTERY_RATING, VERSATILITY
    #[arg(short = 'w', long)]
    pub weights: Option<String>,

    /// Verbose logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Configuration file (default: .wnb.yml next to the executable)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Item cache file (default: .wnb.itemCache.json next to the executable)
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Spreadsheet to write (default: <character>_<YYYYMMDD>.xlsx)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Override configuration values with the ones given on the command line.
    pub fn apply_to(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(id) = &self.client_id {
            config.client.id = id.clone();
        }
        if let Some(secret) = &self.client_secret {
            config.client.secret = secret.clone();
        }
        if let Some(locale) = &self.locale {
            config.set_locale(locale)?;
        }
        if let Some(region) = &self.region {
            config.set_region(region)?;
        }
        if let Some(realm) = &self.realm {
            config.realm = realm.clone();
        }
        if let Some(character) = &self.character {
            config.character = character.clone();
        }
        if let Some(weights) = &self.weights {
            config.set_stat_weights(weights)?;
        }
        Ok(())
    }
}
