use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named, identifiable portal resource (map, scene, or application).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortalItem {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// `[[xmin, ymin], [xmax, ymax]]`
    #[serde(default)]
    pub extent: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub app_proxies: Vec<AppProxy>,
}

/// A layer-proxy declaration carried on an application item.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppProxy {
    pub source_url: String,
    pub proxy_url: String,
}

/// An application item together with its stored configuration values.
#[derive(Debug, Clone)]
pub struct ApplicationItem {
    pub item: PortalItem,
    /// Custom configuration saved against the item, if any.
    pub values: Option<Map<String, Value>>,
}

/// The `/data` payload of an item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemData {
    pub values: Option<Map<String, Value>>,
}

/// The organization self-descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortalSelf {
    pub id: Option<String>,
    pub name: Option<String>,
    pub units: Option<String>,
    pub region: Option<String>,
    pub ip_cntry_code: Option<String>,
    pub user: Option<PortalUser>,
    pub authorized_cross_origin_domains: Vec<String>,
    pub helper_services: Option<HelperServices>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortalUser {
    pub username: Option<String>,
    pub units: Option<String>,
    pub region: Option<String>,
    pub role_id: Option<String>,
    pub privileges: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HelperServices {
    pub geometry: Option<HelperService>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HelperService {
    pub url: Option<String>,
}

/// The signed-in user, if any. Used only for the sign-in check.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommunitySelf {
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalGroup {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupQueryResult {
    pub total: i64,
    pub start: i64,
    pub next_start: i64,
    pub results: Vec<PortalGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemQueryResult {
    pub total: i64,
    pub start: i64,
    pub next_start: i64,
    pub results: Vec<PortalItem>,
}

/// Query parameters for items within a group. The query template may contain
/// a `{groupid}` placeholder which is substituted before the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PortalQueryParams {
    pub query: String,
    pub sort_field: String,
    pub sort_order: String,
    pub num: u32,
    pub start: u32,
}

impl Default for PortalQueryParams {
    fn default() -> Self {
        Self {
            query: String::from("group:\"{groupid}\" AND -type:\"Code Attachment\""),
            sort_field: String::from("modified"),
            sort_order: String::from("desc"),
            num: 9,
            start: 1,
        }
    }
}

impl PortalQueryParams {
    /// Substitute every `{groupid}` occurrence in the query template.
    pub fn with_group_id(mut self, group_id: &str) -> Self {
        self.query = self.query.replace("{groupid}", group_id);
        self
    }
}

/// An OAuth application registration for the identity layer.
#[derive(Debug, Clone)]
pub struct OAuthInfo {
    pub app_id: String,
    pub portal_url: String,
    pub popup: bool,
}

/// An error payload from the sharing API. The portal reports errors with a
/// 200 status and an `error` body.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}
