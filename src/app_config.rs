use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Error as ConfigError, Figment,
};
use serde::{Deserialize, Serialize};

use crate::portal::PortalQueryParams;

/// Fetch behavior for a single webmap or webscene resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSettings {
    /// Whether to resolve this resource at all.
    pub fetch: bool,
    /// Read a local JSON payload instead of querying the portal.
    pub use_local: bool,
    /// Path of the local payload, only used when `use_local` is set.
    pub local_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSettings {
    pub fetch_info: bool,
    pub fetch_items: bool,
    /// Overrides for the group item query; defaults to sorting by `modified`
    /// descending with a page of 9 starting at item 1.
    pub item_params: Option<PortalQueryParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    /// Whether to load the organization's self-descriptor.
    pub fetch: bool,
}

/// Application settings. Fixed at construction and never mutated afterward;
/// runtime values live in the config layers instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub webscene: ResourceSettings,
    pub webmap: ResourceSettings,
    pub group: GroupSettings,
    pub portal: PortalSettings,

    /// Allow-list of URL parameters imported into the config.
    pub url_items: Vec<String>,

    /// Detect hosted portal/proxy URLs from the application's own location.
    pub esri_environment: bool,

    /// Register the organization's authorized cross-origin domains as
    /// credentialed trusted hosts.
    pub web_tier_security: bool,

    /// Path of the static JSON configuration file (the defaults layer).
    pub config_file: PathBuf,

    /// The location the application was launched from, including its query
    /// string. Absent when not running behind a URL.
    pub app_url: Option<String>,

    /// Active locale, used for language direction and units fallback.
    pub locale: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webscene: ResourceSettings::default(),
            webmap: ResourceSettings::default(),
            group: GroupSettings::default(),
            portal: PortalSettings::default(),
            url_items: [
                "webscene", "webmap", "appid", "oauthappid", "group", "viewpoint", "components",
                "title",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            esri_environment: false,
            web_tier_security: false,
            config_file: PathBuf::from("config/config.json"),
            app_url: None,
            locale: String::from("en-us"),
        }
    }
}

impl Settings {
    pub fn build() -> Result<Self, ConfigError> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("Settings.toml"))
            .merge(Toml::file("Settings-dev.toml"))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()
    }
}
