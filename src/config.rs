use std::{fs, path::Path};

use serde_json::{Map, Value};

use crate::error::BootstrapError;

/// Well-known configuration keys recognized by the application.
pub mod keys {
    pub const WEBSCENE: &str = "webscene";
    pub const WEBMAP: &str = "webmap";
    pub const APPID: &str = "appid";
    pub const OAUTHAPPID: &str = "oauthappid";
    pub const GROUP: &str = "group";
    pub const PORTAL_URL: &str = "portalUrl";
    pub const PROXY_URL: &str = "proxyUrl";
    pub const VIEWPOINT: &str = "viewpoint";
    pub const TITLE: &str = "title";
    pub const COMPONENTS: &str = "components";
    pub const HELPER_SERVICES: &str = "helperServices";
    pub const APPLICATION_EXTENT: &str = "application_extent";
    pub const LAYER_MIXINS: &str = "layerMixins";
}

/// An extent as a pair of `[x, y]` corner coordinates.
pub type Extent = [[f64; 2]; 2];

/// A flat key/value configuration layer. The application's resolved config is
/// always the merge of three of these: static defaults, application-item
/// values, and URL parameters, in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigMap(Map<String, Value>);

impl ConfigMap {
    /// Load the static defaults layer from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, BootstrapError> {
        let text = fs::read_to_string(path)?;
        let map: Map<String, Value> = serde_json::from_str(&text)?;
        Ok(Self(map))
    }

    /// Merge the three config layers in their fixed precedence order. A key
    /// present in more than one layer resolves to the highest-precedence
    /// layer that defines it: URL parameters win over application-item
    /// values, which win over the static defaults.
    pub fn merge_layers(defaults: &ConfigMap, application: &ConfigMap, url: &ConfigMap) -> Self {
        let mut merged = defaults.0.clone();
        for layer in [application, url] {
            for (key, value) in &layer.0 {
                merged.insert(key.clone(), value.clone());
            }
        }
        Self(merged)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A string value for `key`; empty strings count as unset.
    fn non_empty_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key)?.as_str()? {
            "" => None,
            value => Some(value),
        }
    }

    pub fn webscene(&self) -> Option<&str> {
        self.non_empty_str(keys::WEBSCENE)
    }

    pub fn webmap(&self) -> Option<&str> {
        self.non_empty_str(keys::WEBMAP)
    }

    pub fn appid(&self) -> Option<&str> {
        self.non_empty_str(keys::APPID)
    }

    pub fn oauthappid(&self) -> Option<&str> {
        self.non_empty_str(keys::OAUTHAPPID)
    }

    pub fn group(&self) -> Option<&str> {
        self.non_empty_str(keys::GROUP)
    }

    pub fn portal_url(&self) -> Option<&str> {
        self.non_empty_str(keys::PORTAL_URL)
    }

    pub fn proxy_url(&self) -> Option<&str> {
        self.non_empty_str(keys::PROXY_URL)
    }

    pub fn viewpoint(&self) -> Option<&str> {
        self.non_empty_str(keys::VIEWPOINT)
    }

    pub fn title(&self) -> Option<&str> {
        self.non_empty_str(keys::TITLE)
    }

    pub fn components(&self) -> Option<&str> {
        self.non_empty_str(keys::COMPONENTS)
    }

    /// The geometry helper-service URL configured under `helperServices`.
    pub fn geometry_service_url(&self) -> Option<&str> {
        self.0
            .get(keys::HELPER_SERVICES)?
            .get("geometry")?
            .get("url")?
            .as_str()
    }

    /// The application-level extent, with each coordinate coerced to floating
    /// point. Numeric strings are accepted since item extents round-trip
    /// through JSON as either numbers or strings.
    pub fn application_extent(&self) -> Option<Extent> {
        let corners = self.0.get(keys::APPLICATION_EXTENT)?.as_array()?;
        if corners.len() < 2 {
            return None;
        }

        let coordinate = |value: &Value| -> Option<f64> {
            match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            }
        };
        let corner = |value: &Value| -> Option<[f64; 2]> {
            let pair = value.as_array()?;
            Some([coordinate(pair.first()?)?, coordinate(pair.get(1)?)?])
        };

        Some([corner(&corners[0])?, corner(&corners[1])?])
    }
}

impl From<Map<String, Value>> for ConfigMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn layer(pairs: &[(&str, Value)]) -> ConfigMap {
        let mut map = Map::new();
        for (key, value) in pairs {
            map.insert((*key).to_string(), value.clone());
        }
        ConfigMap::from(map)
    }

    #[test]
    fn test_merge_precedence() {
        let defaults = layer(&[
            ("webscene", json!("default-id")),
            ("title", json!("Default Title")),
            ("units", json!("metric")),
        ]);
        let application = layer(&[
            ("webscene", json!("app-id")),
            ("components", json!("zoom,compass")),
        ]);
        let url = layer(&[("webscene", json!("url-id"))]);

        let merged = ConfigMap::merge_layers(&defaults, &application, &url);

        // URL params > application-item config > static defaults.
        assert_eq!(merged.webscene(), Some("url-id"));
        assert_eq!(merged.components(), Some("zoom,compass"));
        assert_eq!(merged.title(), Some("Default Title"));
        assert_eq!(merged.get("units"), Some(&json!("metric")));
    }

    #[test]
    fn test_empty_strings_count_as_unset() {
        let config = layer(&[("appid", json!("")), ("webmap", json!("abc123"))]);
        assert_eq!(config.appid(), None);
        assert_eq!(config.webmap(), Some("abc123"));
    }

    #[test]
    fn test_application_extent_coerces_strings() {
        let config = layer(&[("application_extent", json!([["1", 2], [3, "4.5"]]))]);
        assert_eq!(config.application_extent(), Some([[1.0, 2.0], [3.0, 4.5]]));
    }

    #[test]
    fn test_application_extent_rejects_short_arrays() {
        let config = layer(&[("application_extent", json!([[1, 2]]))]);
        assert_eq!(config.application_extent(), None);
    }

    #[test]
    fn test_geometry_service_url() {
        let config = layer(&[(
            "helperServices",
            json!({ "geometry": { "url": "https://example.net/Geometry/GeometryServer" } }),
        )]);
        assert_eq!(
            config.geometry_service_url(),
            Some("https://example.net/Geometry/GeometryServer")
        );
    }
}
