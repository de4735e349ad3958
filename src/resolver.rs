use std::path::Path;

use reqwest::Url;
use serde_json::{json, Value};
use tokio::fs;
use tracing::{error, info};

use crate::{
    app_config::{GroupSettings, ResourceSettings, Settings},
    common::{APPS_PATH, DEFAULT_PORTAL_URL, DEFAULT_WEBMAP, DEFAULT_WEBSCENE, HOME_PATH,
        PROXY_PATH, RTL_LANGS},
    config::{keys, ConfigMap, Extent},
    error::BootstrapError,
    portal::{ApplicationItem, GroupQueryResult, ItemQueryResult, OAuthInfo, PortalClient,
        PortalItem, PortalSelf},
    request_config::RequestConfig,
    url_params,
};

const ERR_APPLICATION_ITEM: &str = "Error retrieving application configuration.";
const ERR_PORTAL: &str = "Error retrieving organization information.";
const ERR_WEBMAP_ITEM: &str = "Error retrieving webmap item.";
const ERR_WEBSCENE_ITEM: &str = "Error retrieving webscene item.";
const ERR_GROUP_INFO: &str = "Error retrieving group info.";
const ERR_GROUP_ITEMS: &str = "Error retrieving group items.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

/// A resolved item: either a live portal item or a static JSON payload,
/// never both.
#[derive(Debug, Clone)]
pub enum ItemResult {
    Remote { data: PortalItem },
    Payload { json: Value },
}

/// The application item together with the config layer extracted from it.
#[derive(Debug, Clone)]
pub struct ApplicationItemResult {
    pub data: ApplicationItem,
    pub config: ConfigMap,
}

#[derive(Debug, Clone, Default)]
pub struct GroupResult {
    pub info_data: Option<GroupQueryResult>,
    pub items_data: Option<ItemQueryResult>,
}

/// One entry per logical resource whose settings flag was enabled.
#[derive(Debug, Default)]
pub struct Results {
    pub url_params: ConfigMap,
    pub application_item: Option<ApplicationItemResult>,
    pub portal: Option<PortalSelf>,
    pub webmap_item: Option<ItemResult>,
    pub webscene_item: Option<ItemResult>,
    pub group: Option<GroupResult>,
}

/// Everything the view bootstrapper needs: the merged config, the fetched
/// resources, and the branch errors collected along the way.
#[derive(Debug)]
pub struct Resolved {
    pub config: ConfigMap,
    pub results: Results,
    pub units: Option<String>,
    pub user_privileges: Option<Vec<String>>,
    pub direction: Direction,
    pub request_config: RequestConfig,
    /// The single error channel: every failed branch surfaces here exactly
    /// once. Branch failures never halt sibling fetches.
    pub errors: Vec<BootstrapError>,
}

/// Orchestrates configuration resolution: URL parameters, the static config
/// file, and the conditional portal fetches, merged in a fixed precedence
/// order across two concurrent phases.
pub struct Resolver {
    settings: Settings,
    defaults: ConfigMap,
    application: ConfigMap,
    config: ConfigMap,
    results: Results,
    request_config: RequestConfig,
    units: Option<String>,
    user_privileges: Option<Vec<String>>,
    errors: Vec<BootstrapError>,
}

impl Resolver {
    pub fn new(settings: Settings) -> Result<Self, BootstrapError> {
        let defaults = ConfigMap::from_file(&settings.config_file)?;
        Ok(Self::with_defaults(settings, defaults))
    }

    /// Build a resolver over an already-loaded defaults layer.
    pub fn with_defaults(settings: Settings, defaults: ConfigMap) -> Self {
        Self {
            settings,
            defaults,
            application: ConfigMap::default(),
            config: ConfigMap::default(),
            results: Results::default(),
            request_config: RequestConfig::default(),
            units: None,
            user_privileges: None,
            errors: Vec::new(),
        }
    }

    /// Run every enabled step to completion. Resolves once all branches have
    /// settled; branch failures land in `Resolved::errors` while their
    /// siblings run to completion. The only fatal error here is failing to
    /// construct the HTTP client.
    pub async fn resolve(mut self) -> Result<Resolved, BootstrapError> {
        // URL parameters first; they must win every later merge.
        self.results.url_params = match self.query_string() {
            Some(query) => url_params::url_param_values(&query, &self.settings.url_items),
            None => ConfigMap::default(),
        };
        self.mixin_all_configs();

        // Portal and proxy URLs have to exist before any network call.
        self.initialize_application();
        let direction = derive_direction(&self.settings.locale);

        let portal_url = self
            .config
            .portal_url()
            .unwrap_or(DEFAULT_PORTAL_URL)
            .to_string();
        let mut portal = PortalClient::new(&portal_url)?;

        if let Some(app_id) = self.config.oauthappid() {
            portal.register_oauth(OAuthInfo {
                app_id: app_id.to_string(),
                portal_url: portal_url.clone(),
                popup: true,
            });
        }
        // Fire and continue: the app proceeds whether or not sign-in works.
        match portal.check_sign_in().await {
            Ok(signed_in) => info!("Sign-in status: {signed_in}"),
            Err(err) => info!("Sign-in check did not complete: {err}"),
        }

        // Phase one: the application item and the organization descriptor.
        let appid = self.config.appid().map(str::to_string);
        let (application_item, portal_self) = tokio::join!(
            query_application_item(&portal, appid.as_deref()),
            query_portal(&portal, self.settings.portal.fetch),
        );

        if let Some(outcome) = application_item {
            match outcome {
                Ok(result) => {
                    self.application = result.config.clone();
                    self.results.application_item = Some(result);
                }
                Err(err) => self.record_branch_error(err),
            }
        }
        if let Some(outcome) = portal_self {
            match outcome {
                Ok(response) => self.apply_portal_response(response),
                // Non-fatal: the application continues without org info.
                Err(err) => self.record_branch_error(err),
            }
        }

        // The webmap/webscene/group fetches depend on the re-merged ids.
        self.mixin_all_configs();
        self.resolve_helper_services();

        // Phase two: items and group metadata, all independent of each other.
        let group_id = self.config.group().map(str::to_string);
        let (webmap_item, webscene_item, group_info, group_items) = tokio::join!(
            query_map_item(
                &portal,
                &self.settings.webmap,
                self.config.webmap(),
                &DEFAULT_WEBMAP,
                ERR_WEBMAP_ITEM,
            ),
            query_map_item(
                &portal,
                &self.settings.webscene,
                self.config.webscene(),
                &DEFAULT_WEBSCENE,
                ERR_WEBSCENE_ITEM,
            ),
            query_group_info(&portal, self.settings.group.fetch_info, group_id.as_deref()),
            query_group_items(&portal, &self.settings.group, group_id.as_deref()),
        );

        if let Some(outcome) = webmap_item {
            match outcome {
                Ok(result) => self.results.webmap_item = Some(result),
                Err(err) => self.record_branch_error(err),
            }
        }
        if let Some(outcome) = webscene_item {
            match outcome {
                Ok(result) => self.results.webscene_item = Some(result),
                Err(err) => self.record_branch_error(err),
            }
        }

        let mut group = GroupResult::default();
        if let Some(outcome) = group_info {
            match outcome {
                Ok(data) => group.info_data = Some(data),
                Err(err) => self.record_branch_error(err),
            }
        }
        if let Some(outcome) = group_items {
            match outcome {
                Ok(data) => group.items_data = Some(data),
                Err(err) => self.record_branch_error(err),
            }
        }
        if group.info_data.is_some() || group.items_data.is_some() {
            self.results.group = Some(group);
        }

        self.apply_application_extent();

        Ok(Resolved {
            config: self.config,
            results: self.results,
            units: self.units,
            user_privileges: self.user_privileges,
            direction,
            request_config: self.request_config,
            errors: self.errors,
        })
    }

    fn record_branch_error(&mut self, err: BootstrapError) {
        error!("{err}");
        self.errors.push(err);
    }

    fn query_string(&self) -> Option<String> {
        let url = Url::parse(self.settings.app_url.as_deref()?).ok()?;
        url.query().map(str::to_string)
    }

    /// Re-merge the config layers in their fixed order:
    /// static defaults <- application item <- URL parameters.
    fn mixin_all_configs(&mut self) {
        self.config =
            ConfigMap::merge_layers(&self.defaults, &self.application, &self.results.url_params);
    }

    /// Derive the portal and proxy URLs when running inside a recognized
    /// hosting environment, then publish both to the request config. Derived
    /// values land in the defaults layer so the application item and URL
    /// parameters can still override them.
    fn initialize_application(&mut self) {
        if self.settings.esri_environment {
            if let Some((portal_url, proxy_url)) = self
                .settings
                .app_url
                .as_deref()
                .and_then(derive_hosted_urls)
            {
                self.defaults.insert(keys::PORTAL_URL, json!(portal_url));
                self.defaults.insert(keys::PROXY_URL, json!(proxy_url));
                self.mixin_all_configs();
            }
        }
        self.request_config.portal_url = self.config.portal_url().map(str::to_string);
        self.request_config.proxy_url = self.config.proxy_url().map(str::to_string);
    }

    fn apply_portal_response(&mut self, response: PortalSelf) {
        self.units = Some(derive_units(&response, &self.settings.locale));

        // Custom privileges only exist when the org defines custom roles.
        if let Some(user) = &response.user {
            if user.role_id.is_some() {
                self.user_privileges = user.privileges.clone();
            }
        }

        if self.settings.web_tier_security {
            for host in &response.authorized_cross_origin_domains {
                self.request_config.add_trusted_host(host);
            }
        }

        self.results.portal = Some(response);
    }

    /// Pick the geometry service with precedence organization-declared over
    /// statically-configured, and publish it to the request config.
    fn resolve_helper_services(&mut self) {
        let portal_geometry = self
            .results
            .portal
            .as_ref()
            .and_then(|portal| portal.helper_services.as_ref())
            .and_then(|services| services.geometry.as_ref())
            .and_then(|geometry| geometry.url.clone());

        self.request_config.geometry_service_url = portal_geometry
            .or_else(|| self.config.geometry_service_url().map(str::to_string));
    }

    /// Overwrite the extent of the resolved webmap and webscene items with
    /// the application item's extent, when one was declared.
    fn apply_application_extent(&mut self) {
        if self.config.appid().is_none() {
            return;
        }
        let Some(extent) = self.config.application_extent() else {
            return;
        };
        overwrite_extent(self.results.webscene_item.as_mut(), extent);
        overwrite_extent(self.results.webmap_item.as_mut(), extent);
    }
}

fn overwrite_extent(result: Option<&mut ItemResult>, extent: Extent) {
    if let Some(ItemResult::Remote { data }) = result {
        data.extent = Some(vec![
            [extent[0][0], extent[0][1]],
            [extent[1][0], extent[1][1]],
        ]);
    }
}

/// Derive portal and proxy URLs from a hosted application location. The app
/// is hosted when its path contains an `/apps/` or `/home/` segment; the
/// path prefix before the marker names the portal instance.
fn derive_hosted_urls(app_url: &str) -> Option<(String, String)> {
    let url = Url::parse(app_url).ok()?;
    let path = url.path();
    let marker = path.find(APPS_PATH).or_else(|| path.find(HOME_PATH))?;
    let instance = &path[..marker];
    let host = url.host_str()?;

    Some((
        format!("https://{host}{instance}"),
        format!("https://{host}{instance}{PROXY_PATH}"),
    ))
}

pub fn derive_direction(locale: &str) -> Direction {
    if RTL_LANGS.iter().any(|lang| locale.contains(lang)) {
        Direction::RightToLeft
    } else {
        Direction::LeftToRight
    }
}

/// Units precedence: user-level units, then org-level units, then "english"
/// when the user's or IP-derived region is US (or no region is available and
/// the locale is en-us), otherwise "metric".
pub fn derive_units(portal: &PortalSelf, locale: &str) -> String {
    if let Some(units) = portal.user.as_ref().and_then(|user| user.units.as_ref()) {
        return units.clone();
    }
    if let Some(units) = &portal.units {
        return units.clone();
    }

    let region = portal
        .user
        .as_ref()
        .and_then(|user| user.region.as_deref())
        .or(portal.region.as_deref())
        .or(portal.ip_cntry_code.as_deref());

    let english = match region {
        Some("US") => true,
        Some(_) => false,
        None => locale.eq_ignore_ascii_case("en-us"),
    };

    if english {
        String::from("english")
    } else {
        String::from("metric")
    }
}

async fn query_application_item(
    portal: &PortalClient,
    appid: Option<&str>,
) -> Option<Result<ApplicationItemResult, BootstrapError>> {
    let appid = appid?;
    Some(load_application_item(portal, appid).await)
}

async fn load_application_item(
    portal: &PortalClient,
    appid: &str,
) -> Result<ApplicationItemResult, BootstrapError> {
    let application = portal
        .fetch_application_item(appid)
        .await
        .map_err(|err| BootstrapError::fetch(ERR_APPLICATION_ITEM, err))?;

    let mut config = ConfigMap::default();
    if let Some(values) = &application.values {
        for (key, value) in values {
            config.insert(key, value.clone());
        }
    }
    if let Some(extent) = &application.item.extent {
        if !extent.is_empty() {
            config.insert(keys::APPLICATION_EXTENT, json!(extent));
        }
    }
    if !application.item.app_proxies.is_empty() {
        let layer_mixins: Vec<Value> = application
            .item
            .app_proxies
            .iter()
            .map(|proxy| {
                json!({
                    "url": proxy.source_url,
                    "mixin": { "url": proxy.proxy_url },
                })
            })
            .collect();
        config.insert(keys::LAYER_MIXINS, Value::Array(layer_mixins));
    }

    Ok(ApplicationItemResult {
        data: application,
        config,
    })
}

async fn query_portal(
    portal: &PortalClient,
    fetch: bool,
) -> Option<Result<PortalSelf, BootstrapError>> {
    if !fetch {
        return None;
    }
    Some(
        portal
            .fetch_self()
            .await
            .map_err(|err| BootstrapError::fetch(ERR_PORTAL, err)),
    )
}

/// Resolve a webmap or webscene item. Exactly one of three branches runs:
/// a local JSON payload, the built-in default payload when no id is
/// configured, or the remote item by id.
async fn query_map_item(
    portal: &PortalClient,
    settings: &ResourceSettings,
    id: Option<&str>,
    default_payload: &Value,
    error_context: &'static str,
) -> Option<Result<ItemResult, BootstrapError>> {
    if !settings.fetch {
        return None;
    }

    if settings.use_local {
        let path = settings.local_file.as_deref();
        return Some(read_local_payload(path, error_context).await);
    }

    let Some(id) = id else {
        return Some(Ok(ItemResult::Payload {
            json: default_payload.clone(),
        }));
    };

    Some(
        portal
            .fetch_item(id)
            .await
            .map(|data| ItemResult::Remote { data })
            .map_err(|err| BootstrapError::fetch(error_context, err)),
    )
}

async fn read_local_payload(
    path: Option<&Path>,
    error_context: &'static str,
) -> Result<ItemResult, BootstrapError> {
    let Some(path) = path else {
        let err = std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "use_local is set but no local_file is configured",
        );
        return Err(BootstrapError::fetch(error_context, err));
    };

    let text = fs::read_to_string(path)
        .await
        .map_err(|err| BootstrapError::fetch(error_context, err))?;
    let json: Value =
        serde_json::from_str(&text).map_err(|err| BootstrapError::fetch(error_context, err))?;

    Ok(ItemResult::Payload { json })
}

async fn query_group_info(
    portal: &PortalClient,
    fetch: bool,
    group_id: Option<&str>,
) -> Option<Result<GroupQueryResult, BootstrapError>> {
    if !fetch {
        return None;
    }
    let group_id = group_id?;
    Some(
        portal
            .query_groups(&format!("id:\"{group_id}\""))
            .await
            .map_err(|err| BootstrapError::fetch(ERR_GROUP_INFO, err)),
    )
}

async fn query_group_items(
    portal: &PortalClient,
    settings: &GroupSettings,
    group_id: Option<&str>,
) -> Option<Result<ItemQueryResult, BootstrapError>> {
    if !settings.fetch_items {
        return None;
    }
    let group_id = group_id?;
    let params = settings
        .item_params
        .clone()
        .unwrap_or_default()
        .with_group_id(group_id);
    Some(
        portal
            .query_items(&params)
            .await
            .map_err(|err| BootstrapError::fetch(ERR_GROUP_ITEMS, err)),
    )
}
