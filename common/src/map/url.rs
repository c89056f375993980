const STATIC_IMAGES_BASE: &str = "https://api.mapbox.com/styles/v1";

/// Builds the request URL for the Mapbox Static Images API.
///
/// Longitude and latitude are rendered with exactly six fractional digits so
/// the output is byte-identical for identical inputs. The token must already
/// be URL-safe; no escaping is applied.
pub fn build_image_url(
    style_id: &str,
    lon: f64,
    lat: f64,
    zoom: u32,
    width: u32,
    height: u32,
    token: &str,
) -> String {
    format!(
        "{STATIC_IMAGES_BASE}/{style_id}/static/{lon:.6},{lat:.6},{zoom}/{width}x{height}?access_token={token}"
    )
}

/// One static-map request: a geographic location, a style and the output
/// size of the physical panel. Immutable for the process lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticMapRequest {
    pub style_id: String,
    pub lon: f64,
    pub lat: f64,
    pub zoom: u32,
    pub width: u32,
    pub height: u32,
    pub token: String,
}

impl StaticMapRequest {
    pub fn url(&self) -> String {
        build_image_url(
            &self.style_id,
            self.lon,
            self.lat,
            self.zoom,
            self.width,
            self.height,
            &self.token,
        )
    }
}

/// Strips the access token from a URL so it can be logged.
pub fn redact_token(url: &str) -> String {
    match url.split_once("access_token=") {
        Some((prefix, _)) => format!("{prefix}access_token=<redacted>"),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_documented_url() {
        let url = build_image_url("mapbox/streets-v11", -84.3895, 33.7490, 13, 128, 128, "test_token");
        assert_eq!(
            url,
            "https://api.mapbox.com/styles/v1/mapbox/streets-v11/static/-84.389500,33.749000,13/128x128?access_token=test_token"
        );
    }

    #[test]
    fn coordinates_always_carry_six_fractional_digits() {
        let url = build_image_url("s", 2.0, -51.0, 15, 64, 64, "t");
        assert!(url.contains("/static/2.000000,-51.000000,15/64x64?"));

        // Excess precision is rounded, not truncated.
        let url = build_image_url("s", 0.12345678, 0.9999999, 0, 64, 64, "t");
        assert!(url.contains("/static/0.123457,1.000000,0/64x64?"));
    }

    #[test]
    fn request_url_matches_the_free_function() {
        let request = StaticMapRequest {
            style_id: "mapbox/streets-v12".into(),
            lon: -2.2129,
            lat: 51.8675,
            zoom: 15,
            width: 128,
            height: 128,
            token: "pk.abc".into(),
        };
        assert_eq!(
            request.url(),
            build_image_url("mapbox/streets-v12", -2.2129, 51.8675, 15, 128, 128, "pk.abc")
        );
    }

    #[test]
    fn redaction_hides_the_token() {
        let url = build_image_url("s", 1.0, 2.0, 3, 64, 64, "pk.secret");
        let redacted = redact_token(&url);
        assert!(!redacted.contains("pk.secret"));
        assert!(redacted.ends_with("access_token=<redacted>"));
    }
}
