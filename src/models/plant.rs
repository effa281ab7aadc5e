//! Plant reference types returned by search and detail lookups.

use serde::{Deserialize, Serialize};

/// Response of `GET /plant/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<PlantSummary>,
}

impl SearchResponse {
    /// PIDs of all results, in response order.
    pub fn pids(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|p| p.pid.as_str())
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSummary {
    pub pid: String,
    #[serde(default)]
    pub display_pid: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response of `GET /plant/detail/{pid}`: care ranges for one plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantDetail {
    pub pid: String,
    #[serde(default)]
    pub display_pid: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub max_light_mmol: Option<f64>,
    #[serde(default)]
    pub min_light_mmol: Option<f64>,
    #[serde(default)]
    pub max_light_lux: Option<f64>,
    #[serde(default)]
    pub min_light_lux: Option<f64>,
    #[serde(default)]
    pub max_temp: Option<f64>,
    #[serde(default)]
    pub min_temp: Option<f64>,
    #[serde(default)]
    pub max_env_humid: Option<f64>,
    #[serde(default)]
    pub min_env_humid: Option<f64>,
    #[serde(default)]
    pub max_soil_moist: Option<f64>,
    #[serde(default)]
    pub min_soil_moist: Option<f64>,
    #[serde(default)]
    pub max_soil_ec: Option<f64>,
    #[serde(default)]
    pub min_soil_ec: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Fields not modelled above (localized names, etc.).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An inclusive min/max range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    fn from_parts(min: Option<f64>, max: Option<f64>) -> Option<Self> {
        Some(Self { min: min?, max: max? })
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl PlantDetail {
    pub fn light_lux(&self) -> Option<Range> {
        Range::from_parts(self.min_light_lux, self.max_light_lux)
    }

    pub fn light_mmol(&self) -> Option<Range> {
        Range::from_parts(self.min_light_mmol, self.max_light_mmol)
    }

    pub fn temperature(&self) -> Option<Range> {
        Range::from_parts(self.min_temp, self.max_temp)
    }

    pub fn env_humidity(&self) -> Option<Range> {
        Range::from_parts(self.min_env_humid, self.max_env_humid)
    }

    pub fn soil_moisture(&self) -> Option<Range> {
        Range::from_parts(self.min_soil_moist, self.max_soil_moist)
    }

    pub fn soil_ec(&self) -> Option<Range> {
        Range::from_parts(self.min_soil_ec, self.max_soil_ec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_parses_ranges_and_keeps_unknown_fields() {
        let detail: PlantDetail = serde_json::from_value(json!({
            "pid": "abelia chinensis",
            "display_pid": "Abelia chinensis",
            "alias": "chinese abelia",
            "category": "Caprifoliaceae, Abelia",
            "max_light_mmol": 4500, "min_light_mmol": 2500,
            "max_light_lux": 30000, "min_light_lux": 3500,
            "max_temp": 35, "min_temp": 8,
            "max_env_humid": 85, "min_env_humid": 30,
            "max_soil_moist": 60, "min_soil_moist": 15,
            "max_soil_ec": 2000, "min_soil_ec": 350,
            "image_url": "https://opb-img.plantbook.io/abelia%20chinensis.jpg",
            "display_name_de": "Abelie"
        }))
        .unwrap();

        assert_eq!(detail.temperature(), Some(Range { min: 8.0, max: 35.0 }));
        assert!(detail.soil_moisture().unwrap().contains(30.0));
        assert!(!detail.light_lux().unwrap().contains(100.0));
        assert_eq!(detail.extra.get("display_name_de"), Some(&json!("Abelie")));
    }

    #[test]
    fn test_detail_missing_range_half() {
        let detail: PlantDetail = serde_json::from_value(json!({"pid": "x", "max_temp": 30})).unwrap();
        assert!(detail.temperature().is_none());
    }

    #[test]
    fn test_search_response() {
        let resp: SearchResponse = serde_json::from_value(json!({
            "count": 2,
            "results": [
                {"pid": "acer rubrum", "display_pid": "Acer rubrum", "alias": "red maple", "category": "Sapindaceae, Acer"},
                {"pid": "acer palmatum", "alias": "japanese maple"}
            ]
        }))
        .unwrap();
        assert_eq!(resp.count, 2);
        assert_eq!(resp.pids().collect::<Vec<_>>(), vec!["acer rubrum", "acer palmatum"]);
        assert!(resp.results[1].category.is_none());
    }
}
