use serde::Deserialize;

/// Settings for the workout map app. Every field has a default, so a partial
/// JSON document is enough to override single values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Key the workout history is stored under.
    pub storage_key: String,
    pub map_zoom: f64,
    /// How long the form stays forced hidden after a submission.
    pub form_reveal_delay_ms: u32,
    pub tile_url: String,
    pub tile_attribution: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: "workouts".to_owned(),
            map_zoom: 13.0,
            form_reveal_delay_ms: 1000,
            tile_url: "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png".to_owned(),
            tile_attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
                .to_owned(),
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{"mapZoom": 15, "storageKey": "runs"}"#).unwrap();

        assert_eq!(config.map_zoom, 15.0);
        assert_eq!(config.storage_key, "runs");
        assert_eq!(config.form_reveal_delay_ms, 1000);
    }
}
