//! The compact `viewpoint` URL parameter: a semicolon-separated list of at
//! most two tokens in any order. The token starting with `cam:` is
//! `x,y,z[,wkid]`; the other is `heading[,tilt]`.

const CAMERA_PREFIX: &str = "cam:";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialReference {
    pub wkid: i32,
}

impl SpatialReference {
    pub const WGS84: Self = Self { wkid: 4326 };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub spatial_reference: SpatialReference,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point,
    pub heading: f64,
    pub tilt: f64,
}

fn number(token: &str) -> Option<f64> {
    token.trim().parse().ok()
}

/// Decode a viewpoint string into a camera. Returns `None` when there is no
/// `cam:` token, fewer than three position components, or an unparsable
/// number.
pub fn parse_viewpoint(viewpoint: &str) -> Option<Camera> {
    let mut camera_token = None;
    let mut tilt_heading_token = None;

    for token in viewpoint.split(';') {
        if let Some(position) = token.strip_prefix(CAMERA_PREFIX) {
            camera_token = Some(position);
        } else if !token.is_empty() {
            tilt_heading_token = Some(token);
        }
    }

    let position: Vec<&str> = camera_token?.split(',').collect();
    if position.len() < 3 {
        return None;
    }

    let x = number(position[0])?;
    let y = number(position[1])?;
    let z = number(position[2])?;
    let spatial_reference = if position.len() == 4 {
        SpatialReference {
            wkid: position[3].trim().parse().ok()?,
        }
    } else {
        SpatialReference::WGS84
    };

    let (mut heading, mut tilt) = (0.0, 0.0);
    if let Some(token) = tilt_heading_token {
        let parts: Vec<&str> = token.split(',').collect();
        if let Some(value) = parts.first().and_then(|t| number(t)) {
            heading = value;
        }
        if let Some(value) = parts.get(1).and_then(|t| number(t)) {
            tilt = value;
        }
    }

    Some(Camera {
        position: Point {
            x,
            y,
            z,
            spatial_reference,
        },
        heading,
        tilt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_with_heading_and_tilt() {
        let camera = parse_viewpoint("cam:10,20,30;45,15").unwrap();
        assert_eq!(camera.position.x, 10.0);
        assert_eq!(camera.position.y, 20.0);
        assert_eq!(camera.position.z, 30.0);
        assert_eq!(camera.position.spatial_reference, SpatialReference::WGS84);
        assert_eq!(camera.heading, 45.0);
        assert_eq!(camera.tilt, 15.0);
    }

    #[test]
    fn test_projected_spatial_reference() {
        let camera = parse_viewpoint("cam:10,20,30,3857").unwrap();
        assert_eq!(camera.position.spatial_reference.wkid, 3857);
    }

    #[test]
    fn test_token_order_is_irrelevant() {
        let camera = parse_viewpoint("45,15;cam:10,20,30").unwrap();
        assert_eq!(camera.heading, 45.0);
        assert_eq!(camera.tilt, 15.0);
        assert_eq!(camera.position.x, 10.0);
    }

    #[test]
    fn test_heading_only_defaults_tilt() {
        let camera = parse_viewpoint("cam:1,2,3;90").unwrap();
        assert_eq!(camera.heading, 90.0);
        assert_eq!(camera.tilt, 0.0);
    }

    #[test]
    fn test_missing_camera_token_yields_none() {
        assert_eq!(parse_viewpoint(""), None);
        assert_eq!(parse_viewpoint("45,15"), None);
    }

    #[test]
    fn test_short_position_yields_none() {
        assert_eq!(parse_viewpoint("cam:10,20"), None);
    }

    #[test]
    fn test_unparsable_number_yields_none() {
        assert_eq!(parse_viewpoint("cam:10,twenty,30"), None);
    }
}
