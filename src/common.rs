use once_cell::sync::Lazy;
use serde_json::{json, Value};

pub const SHARING_PATH: &str = "/sharing";
pub const PROXY_PATH: &str = "/sharing/proxy";
pub const APPS_PATH: &str = "/apps/";
pub const HOME_PATH: &str = "/home/";

pub const RTL_LANGS: [&str; 2] = ["ar", "he"];

/// Portal queried when the configuration does not name one.
pub const DEFAULT_PORTAL_URL: &str = "https://www.arcgis.com";

/// Built-in webmap payload used when no webmap id is configured.
pub static DEFAULT_WEBMAP: Lazy<Value> = Lazy::new(|| {
    json!({
        "item": {
            "title": "Default Webmap",
            "type": "Web Map",
            "description": "A webmap with the default basemap and extent.",
            "snippet": "A webmap with the default basemap and extent."
        },
        "itemData": {
            "operationalLayers": [],
            "baseMap": {
                "baseMapLayers": [{
                    "id": "defaultBasemap",
                    "layerType": "ArcGISTiledMapServiceLayer",
                    "opacity": 1,
                    "visibility": true,
                    "url": "http://services.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer"
                }],
                "title": "Topographic"
            },
            "spatialReference": {
                "wkid": 102100,
                "latestWkid": 3857
            },
            "version": "2.1"
        }
    })
});

/// Built-in webscene payload used when no webscene id is configured.
pub static DEFAULT_WEBSCENE: Lazy<Value> = Lazy::new(|| {
    json!({
        "item": {
            "title": "Default Webscene",
            "type": "Web Scene",
            "description": "A web scene with the default basemap and extent.",
            "snippet": "A web scene with the default basemap and extent."
        },
        "itemData": {
            "operationalLayers": [],
            "version": "1.3",
            "baseMap": {
                "baseMapLayers": [{
                    "id": "defaultBasemap",
                    "layerType": "ArcGISTiledMapServiceLayer",
                    "opacity": 1,
                    "visibility": true,
                    "url": "http://services.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer"
                }],
                "title": "Topographic"
            }
        }
    })
});
