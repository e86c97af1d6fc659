//! YAML configuration for wnb.
//!
//! The file layout matches what earlier versions of the tool wrote, so empty
//! strings are accepted (and written) for values that are not set yet.

use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::info;

pub const CONFIG_FILE_NAME: &str = ".wnb.yml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid region ({0}), expected one of: [{list}]", list = Region::list())]
    InvalidRegion(String),
    #[error("Invalid locale ({0}), expected one of: [{list}]", list = Locale::list())]
    InvalidLocale(String),
    #[error("Invalid stat weight '{0}', expected STAT=weight with a positive weight")]
    InvalidWeight(String),
    #[error("Failed to read config from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write config to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("Could not determine the executable directory: {0}")]
    ExecutableDir(std::io::Error),
}

/// Battle.net API region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Us,
    Eu,
    Kr,
    Tw,
    Cn,
}

impl Region {
    pub const ALL: [Region; 5] = [Region::Us, Region::Eu, Region::Kr, Region::Tw, Region::Cn];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
            Region::Kr => "kr",
            Region::Tw => "tw",
            Region::Cn => "cn",
        }
    }

    fn list() -> String {
        Self::ALL.map(Region::as_str).join(", ")
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidRegion(s.to_string()))
    }
}

/// Locale the API answers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    EnUs,
    EsMx,
    PtBr,
    DeDe,
    EnGb,
    EsEs,
    FrFr,
    ItIt,
    RuRu,
    KoKr,
    ZhTw,
    ZhCn,
}

impl Locale {
    pub const ALL: [Locale; 12] = [
        Locale::EnUs,
        Locale::EsMx,
        Locale::PtBr,
        Locale::DeDe,
        Locale::EnGb,
        Locale::EsEs,
        Locale::FrFr,
        Locale::ItIt,
        Locale::RuRu,
        Locale::KoKr,
        Locale::ZhTw,
        Locale::ZhCn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::EnUs => "en_US",
            Locale::EsMx => "es_MX",
            Locale::PtBr => "pt_BR",
            Locale::DeDe => "de_DE",
            Locale::EnGb => "en_GB",
            Locale::EsEs => "es_ES",
            Locale::FrFr => "fr_FR",
            Locale::ItIt => "it_IT",
            Locale::RuRu => "ru_RU",
            Locale::KoKr => "ko_KR",
            Locale::ZhTw => "zh_TW",
            Locale::ZhCn => "zh_CN",
        }
    }

    /// Wowhead subdomain for this locale.
    pub fn wowhead_subdomain(self) -> &'static str {
        match self {
            Locale::EnUs | Locale::EnGb => "www",
            Locale::EsMx | Locale::EsEs => "es",
            Locale::PtBr => "pt",
            Locale::DeDe => "de",
            Locale::FrFr => "fr",
            Locale::ItIt => "it",
            Locale::RuRu => "ru",
            Locale::KoKr => "ko",
            Locale::ZhTw | Locale::ZhCn => "cn",
        }
    }

    fn list() -> String {
        Self::ALL.map(Locale::as_str).join(", ")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidLocale(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub client: ClientCredentials,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub localization: Option<Locale>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub region: Option<Region>,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub stat_weights: BTreeMap<String, f64>,
}

impl Config {
    /// `.wnb.yml` next to the running executable.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        beside_executable(CONFIG_FILE_NAME)
    }

    /// Load the configuration, writing a default one if the file is missing.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration file: {}", path.display());

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_yaml(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Configuration file does not exist, creating default one");
                let config = Config::default();
                config.save(path)?;
                Ok(config)
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file parses as YAML null
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(contents)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn set_region(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.region = parse_optional(raw)?;
        Ok(())
    }

    pub fn set_locale(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.localization = parse_optional(raw)?;
        Ok(())
    }

    /// Parse `STAT=weight,STAT=weight`. An empty string clears the weights.
    /// On error the previous weights are kept.
    pub fn set_stat_weights(&mut self, raw: &str) -> Result<(), ConfigError> {
        let mut weights = BTreeMap::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (stat, weight) = pair
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidWeight(pair.to_string()))?;
            let stat = stat.trim();
            let weight: f64 = weight
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidWeight(pair.to_string()))?;
            if stat.is_empty() || !weight.is_finite() || weight <= 0.0 {
                return Err(ConfigError::InvalidWeight(pair.to_string()));
            }
            weights.insert(stat.to_string(), weight);
        }
        self.stat_weights = weights;
        Ok(())
    }

    /// Assign a value collected by the setup wizard.
    pub fn set_field(&mut self, field: crate::model::Field, value: &str) -> Result<(), ConfigError> {
        use crate::model::Field;

        match field {
            Field::ClientId => self.client.id = value.trim().to_string(),
            Field::ClientSecret => self.client.secret = value.trim().to_string(),
            Field::Locale => self.set_locale(value)?,
            Field::Region => self.set_region(value)?,
            Field::Realm => self.realm = value.trim().to_string(),
            Field::Character => self.character = value.trim().to_string(),
            Field::StatWeights => self.set_stat_weights(value)?,
        }
        Ok(())
    }

    pub fn is_missing(&self, field: crate::model::Field) -> bool {
        use crate::model::Field;

        match field {
            Field::ClientId => self.client.id.is_empty(),
            Field::ClientSecret => self.client.secret.is_empty(),
            Field::Locale => self.localization.is_none(),
            Field::Region => self.region.is_none(),
            Field::Realm => self.realm.is_empty(),
            Field::Character => self.character.is_empty(),
            Field::StatWeights => self.stat_weights.is_empty(),
        }
    }

    pub fn region(&self) -> Region {
        self.region.unwrap_or(Region::Us)
    }

    pub fn locale(&self) -> Locale {
        self.localization.unwrap_or(Locale::EnUs)
    }
}

/// Path of `name` in the directory holding the running executable.
pub fn beside_executable(name: &str) -> Result<PathBuf, ConfigError> {
    let exe = std::env::current_exe().map_err(ConfigError::ExecutableDir)?;
    let exe = exe.canonicalize().unwrap_or(exe);
    let dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(dir.join(name))
}

fn parse_optional<T: FromStr<Err = ConfigError>>(raw: &str) -> Result<Option<T>, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = ConfigError>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    parse_optional(raw.as_deref().unwrap_or_default()).map_err(D::Error::custom)
}

fn none_as_empty<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: fmt::Display,
{
    match value {
        Some(v) => serializer.collect_str(v),
        None => serializer.serialize_str(""),
    }
}
