use serde_json::Value;
use tracing::{error, info};

use crate::{
    error::BootstrapError,
    portal::PortalItem,
    resolver::{Direction, ItemResult, Resolved},
    viewpoint::{self, Camera},
};

/// The scene document handed to the renderer: a live portal item, or a
/// static payload with its item metadata attached separately.
#[derive(Debug, Clone)]
pub enum SceneSource {
    Item(PortalItem),
    Json {
        item: Option<Value>,
        item_data: Value,
    },
}

impl SceneSource {
    fn title(&self) -> Option<String> {
        match self {
            SceneSource::Item(item) => item.title.clone(),
            SceneSource::Json { item, .. } => item
                .as_ref()
                .and_then(|meta| meta.get("title"))
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewProperties {
    pub scene: SceneSource,
    pub ui_components: Option<Vec<String>>,
    pub camera: Option<Camera>,
}

/// The rendering subsystem. The bootstrapper only signals it; everything
/// about drawing is behind this seam.
pub trait SceneRenderer {
    fn create_scene_view(&mut self, properties: &ViewProperties) -> Result<(), BootstrapError>;
}

/// Renderer used by the binary: logs what would be drawn.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl SceneRenderer for LogRenderer {
    fn create_scene_view(&mut self, properties: &ViewProperties) -> Result<(), BootstrapError> {
        match &properties.scene {
            SceneSource::Item(item) => info!("Creating scene view from portal item {}", item.id),
            SceneSource::Json { .. } => info!("Creating scene view from a static payload"),
        }
        if let Some(camera) = &properties.camera {
            info!(
                "Initial camera at ({}, {}, {}), heading {}, tilt {}",
                camera.position.x, camera.position.y, camera.position.z, camera.heading,
                camera.tilt
            );
        }
        Ok(())
    }
}

/// Page-level presentation state mutated by the bootstrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub loading: bool,
    pub error: bool,
    pub direction: Direction,
    pub title: Option<String>,
    pub message: Option<String>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            loading: true,
            error: false,
            direction: Direction::LeftToRight,
            title: None,
            message: None,
        }
    }
}

/// Localized user-facing labels.
#[derive(Debug, Clone)]
pub struct Strings {
    pub error: String,
    pub scene_error: String,
}

impl Default for Strings {
    fn default() -> Self {
        Self {
            error: String::from("Error"),
            scene_error: String::from("An error occurred while loading the scene"),
        }
    }
}

/// Consumes the resolved configuration and results, derives the view
/// properties, and signals the renderer. Top-level failures mutate the page
/// state instead of propagating silently.
#[derive(Debug, Default)]
pub struct App {
    pub page: PageState,
    strings: Strings,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bootstrap the view. A missing resolved config is the one fatal
    /// bootstrap error; everything else either renders or reports.
    pub fn init(
        &mut self,
        resolved: Option<&Resolved>,
        renderer: &mut dyn SceneRenderer,
    ) -> Result<(), BootstrapError> {
        let Some(resolved) = resolved else {
            let err = BootstrapError::MissingConfig;
            self.report_error(&err);
            return Err(err);
        };

        // Direction must be set before any visible content is shown.
        self.page.direction = resolved.direction;
        self.create_webscene(resolved, renderer)
    }

    fn create_webscene(
        &mut self,
        resolved: &Resolved,
        renderer: &mut dyn SceneRenderer,
    ) -> Result<(), BootstrapError> {
        let scene = match &resolved.results.webscene_item {
            Some(ItemResult::Remote { data }) => SceneSource::Item(data.clone()),
            Some(ItemResult::Payload { json }) => SceneSource::Json {
                item: json.get("item").cloned(),
                item_data: json.get("itemData").cloned().unwrap_or(Value::Null),
            },
            // No webscene was resolved; creating nothing is acceptable.
            None => return Ok(()),
        };

        let ui_components = resolved.config.components().map(|components| {
            components
                .split(',')
                .map(str::to_string)
                .collect::<Vec<_>>()
        });
        let camera = resolved
            .config
            .viewpoint()
            .and_then(viewpoint::parse_viewpoint);

        // The portal item's title applies only when none was configured.
        let title = resolved
            .config
            .title()
            .map(str::to_string)
            .or_else(|| scene.title());

        let properties = ViewProperties {
            scene,
            ui_components,
            camera,
        };

        match renderer.create_scene_view(&properties) {
            Ok(()) => {
                self.page.loading = false;
                self.page.title = title;
                Ok(())
            }
            Err(err) => {
                self.report_error(&err);
                Err(err)
            }
        }
    }

    /// Report a fatal error: clear the loading state, flag the error state,
    /// and write a user-facing message combining the localized label with
    /// the underlying error text.
    pub fn report_error(&mut self, err: &BootstrapError) {
        self.page.loading = false;
        self.page.error = true;
        self.page.message = Some(format!("{}: {err}", self.strings.scene_error));
        error!("{}: {err}", self.strings.error);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        config::ConfigMap,
        request_config::RequestConfig,
        resolver::Results,
    };

    #[derive(Debug, Default)]
    struct RecordingRenderer {
        created: Vec<ViewProperties>,
        fail: bool,
    }

    impl SceneRenderer for RecordingRenderer {
        fn create_scene_view(&mut self, properties: &ViewProperties) -> Result<(), BootstrapError> {
            if self.fail {
                return Err(BootstrapError::fetch(
                    "Error retrieving webscene item.",
                    std::io::Error::new(std::io::ErrorKind::Other, "render failed"),
                ));
            }
            self.created.push(properties.clone());
            Ok(())
        }
    }

    fn resolved_with(results: Results, config: ConfigMap) -> Resolved {
        Resolved {
            config,
            results,
            units: None,
            user_privileges: None,
            direction: Direction::LeftToRight,
            request_config: RequestConfig::default(),
            errors: Vec::new(),
        }
    }

    fn config_with(pairs: &[(&str, serde_json::Value)]) -> ConfigMap {
        let mut map = serde_json::Map::new();
        for (key, value) in pairs {
            map.insert((*key).to_string(), value.clone());
        }
        ConfigMap::from(map)
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let mut app = App::new();
        let mut renderer = RecordingRenderer::default();

        let result = app.init(None, &mut renderer);

        assert!(matches!(result, Err(BootstrapError::MissingConfig)));
        assert!(!app.page.loading);
        assert!(app.page.error);
        assert!(app.page.message.is_some());
        assert!(renderer.created.is_empty());
    }

    #[test]
    fn test_no_webscene_result_is_a_no_op() {
        let mut app = App::new();
        let mut renderer = RecordingRenderer::default();
        let resolved = resolved_with(Results::default(), ConfigMap::default());

        app.init(Some(&resolved), &mut renderer).unwrap();

        assert!(renderer.created.is_empty());
        // Still loading: no view was created and no error occurred.
        assert!(app.page.loading);
        assert!(!app.page.error);
    }

    #[test]
    fn test_payload_scene_defaults_title_from_item() {
        let mut results = Results::default();
        results.webscene_item = Some(ItemResult::Payload {
            json: json!({
                "item": { "title": "Default Webscene" },
                "itemData": { "operationalLayers": [] }
            }),
        });
        let resolved = resolved_with(results, ConfigMap::default());

        let mut app = App::new();
        let mut renderer = RecordingRenderer::default();
        app.init(Some(&resolved), &mut renderer).unwrap();

        assert_eq!(app.page.title.as_deref(), Some("Default Webscene"));
        assert!(!app.page.loading);
        let SceneSource::Json { item_data, .. } = &renderer.created[0].scene else {
            panic!("expected a payload scene source");
        };
        assert_eq!(item_data["operationalLayers"], json!([]));
    }

    #[test]
    fn test_configured_title_wins_over_item_title() {
        let mut results = Results::default();
        results.webscene_item = Some(ItemResult::Payload {
            json: json!({ "item": { "title": "Item Title" }, "itemData": {} }),
        });
        let config = config_with(&[("title", json!("Configured Title"))]);
        let resolved = resolved_with(results, config);

        let mut app = App::new();
        let mut renderer = RecordingRenderer::default();
        app.init(Some(&resolved), &mut renderer).unwrap();

        assert_eq!(app.page.title.as_deref(), Some("Configured Title"));
    }

    #[test]
    fn test_components_and_camera_are_derived_from_config() {
        let mut results = Results::default();
        results.webscene_item = Some(ItemResult::Payload {
            json: json!({ "item": {}, "itemData": {} }),
        });
        let config = config_with(&[
            ("components", json!("zoom,compass")),
            ("viewpoint", json!("cam:10,20,30;45,15")),
        ]);
        let resolved = resolved_with(results, config);

        let mut app = App::new();
        let mut renderer = RecordingRenderer::default();
        app.init(Some(&resolved), &mut renderer).unwrap();

        let properties = &renderer.created[0];
        assert_eq!(
            properties.ui_components,
            Some(vec![String::from("zoom"), String::from("compass")])
        );
        let camera = properties.camera.unwrap();
        assert_eq!(camera.heading, 45.0);
        assert_eq!(camera.tilt, 15.0);
    }

    #[test]
    fn test_render_failure_reports_error() {
        let mut results = Results::default();
        results.webscene_item = Some(ItemResult::Payload {
            json: json!({ "item": {}, "itemData": {} }),
        });
        let resolved = resolved_with(results, ConfigMap::default());

        let mut app = App::new();
        let mut renderer = RecordingRenderer {
            fail: true,
            ..RecordingRenderer::default()
        };

        assert!(app.init(Some(&resolved), &mut renderer).is_err());
        assert!(app.page.error);
        assert!(!app.page.loading);
        let message = app.page.message.unwrap();
        assert!(message.contains("Error retrieving webscene item."));
    }

    #[test]
    fn test_direction_is_applied_before_rendering() {
        let mut resolved = resolved_with(Results::default(), ConfigMap::default());
        resolved.direction = Direction::RightToLeft;

        let mut app = App::new();
        let mut renderer = RecordingRenderer::default();
        app.init(Some(&resolved), &mut renderer).unwrap();

        assert_eq!(app.page.direction, Direction::RightToLeft);
    }
}
