//! Rest-stop map artifact
//!
//! Renders the reference location and ranked stops into one HTML page backed
//! by Leaflet. Tiles and the Leaflet bundle are fetched by the viewer; the
//! page itself carries all recommendation data.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::geo::GeoPoint;
use crate::ranker::RankedStop;
use crate::RecommendError;

/// Default artifact file name (overwritten on every recommendation)
pub const DEFAULT_MAP_FILE: &str = "rest_stops_map.html";

const DEFAULT_ZOOM: u8 = 12;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Nearby Rest Stops</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
html, body { height: 100%; margin: 0; }
#map { height: 100%; }
.alert-banner {
    position: fixed;
    top: 10px;
    left: 50%;
    transform: translateX(-50%);
    z-index: 9999;
    background-color: #d9534f;
    color: white;
    font-family: sans-serif;
    font-size: 16pt;
    padding: 10px;
    border-radius: 5px;
    text-align: center;
}
.alert-banner small { display: block; font-size: 9pt; opacity: 0.85; }
.directions {
    background-color: #4CAF50;
    color: white;
    padding: 5px 10px;
    text-decoration: none;
    border-radius: 4px;
}
</style>
</head>
<body>
<div class="alert-banner">Drowsiness Detected! Find a place to rest safely.<small>__GENERATED__</small></div>
<div id="map"></div>
<script>
var origin = [__LAT__, __LNG__];
var stops = __STOPS__;
var map = L.map('map').setView(origin, __ZOOM__);
L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    maxZoom: 19,
    attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);
L.circleMarker(origin, { radius: 10, color: 'red', fillColor: 'red', fillOpacity: 0.9 })
    .bindPopup('Your Current Location')
    .addTo(map);
stops.forEach(function (s) {
    L.circleMarker([s.lat, s.lng], { radius: 8, color: 'green', fillColor: 'green', fillOpacity: 0.8 })
        .bindPopup(s.popup, { maxWidth: 300 })
        .addTo(map);
    L.polyline([origin, [s.lat, s.lng]], { color: 'blue', weight: 2, opacity: 0.7 }).addTo(map);
});
</script>
</body>
</html>
"#;

#[derive(Serialize)]
struct Marker {
    id: String,
    lat: f64,
    lng: f64,
    popup: String,
}

/// Builds and writes the rest-stop map
#[derive(Debug, Clone)]
pub struct MapArtifactBuilder {
    path: PathBuf,
    zoom: u8,
}

impl MapArtifactBuilder {
    /// Builder writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            zoom: DEFAULT_ZOOM,
        }
    }

    /// Where the artifact is written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the HTML document
    pub fn render(
        &self,
        reference: GeoPoint,
        stops: &[RankedStop],
        generated_at: DateTime<Local>,
    ) -> String {
        let markers: Vec<Marker> = stops
            .iter()
            .map(|r| Marker {
                id: r.stop.id.clone(),
                lat: r.stop.location.lat,
                lng: r.stop.location.lng,
                popup: popup_html(r),
            })
            .collect();

        // Infallible for plain structs of strings and floats
        let json = serde_json::to_string(&markers).unwrap_or_else(|_| "[]".to_string());

        TEMPLATE
            .replace("__GENERATED__", &escape_html(&format!(
                "Generated {}",
                generated_at.format("%Y-%m-%d %H:%M:%S")
            )))
            .replace("__LAT__", &format!("{:.6}", reference.lat))
            .replace("__LNG__", &format!("{:.6}", reference.lng))
            .replace("__ZOOM__", &self.zoom.to_string())
            .replace("__STOPS__", &script_safe(&json))
    }

    /// Render and write the artifact, returning its absolute path
    pub async fn build(
        &self,
        reference: GeoPoint,
        stops: &[RankedStop],
    ) -> Result<PathBuf, RecommendError> {
        let html = self.render(reference, stops, Local::now());
        let write_err = |source| RecommendError::ArtifactWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        tokio::fs::write(&self.path, html.as_bytes())
            .await
            .map_err(write_err)?;
        let path = tokio::fs::canonicalize(&self.path).await.map_err(write_err)?;

        info!("Rest stop map written to {} ({} stops)", path.display(), stops.len());
        Ok(path)
    }
}

impl Default for MapArtifactBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_FILE)
    }
}

/// Turn-by-turn directions link for a stop
pub fn directions_url(location: GeoPoint) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={:.6},{:.6}&travelmode=driving",
        location.lat, location.lng
    )
}

fn popup_html(ranked: &RankedStop) -> String {
    let stop = &ranked.stop;
    debug!("Popup for {} at {:.1} km", stop.id, ranked.distance_km);
    format!(
        concat!(
            r#"<div style="width: 200px">"#,
            "<h4>{name}</h4>",
            "<p><strong>Type:</strong> {kind}</p>",
            "<p><strong>Distance:</strong> {distance:.1} km</p>",
            "<p><strong>Rating:</strong> {rating:.1} / 5.0</p>",
            "<p><strong>Amenities:</strong> {amenities}</p>",
            r#"<a class="directions" href="{url}" target="_blank" rel="noopener">Get Directions</a>"#,
            "</div>"
        ),
        name = escape_html(&stop.name),
        kind = escape_html(stop.kind.as_str()),
        distance = ranked.distance_km,
        rating = stop.rating,
        amenities = escape_html(&stop.amenities.join(", ")),
        url = escape_html(&directions_url(stop.location)),
    )
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keep embedded JSON from closing the surrounding `<script>` element
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
