//! Askama templates for chat-style HTML answers.
//!
//! The markup mirrors a chat message: one block per facility with a map
//! link, the road distance and time, and the address.

use askama::Template;

use super::dto::{FacilityResult, NearbyResponse, NearestResponse};

/// Nearby search answer.
#[derive(Template)]
#[template(path = "nearby.html")]
pub struct NearbyTemplate {
    pub results: Vec<FacilityResult>,
    pub message: String,
}

impl From<NearbyResponse> for NearbyTemplate {
    fn from(response: NearbyResponse) -> Self {
        Self {
            results: response.results,
            message: response.message.unwrap_or_default(),
        }
    }
}

/// Nearest search answer.
#[derive(Template)]
#[template(path = "nearest.html")]
pub struct NearestTemplate {
    pub result: Option<FacilityResult>,
    pub message: String,
}

impl From<NearestResponse> for NearestTemplate {
    fn from(response: NearestResponse) -> Self {
        Self {
            result: response.result,
            message: response.message.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rank: usize, name: &str) -> FacilityResult {
        FacilityResult {
            rank,
            name: name.to_string(),
            latitude: 41.3,
            longitude: 69.2,
            map_url: "http://www.google.com/maps/place/41.3,69.2".to_string(),
            distance: "1.2 km".to_string(),
            duration: "unknown".to_string(),
            address: "Amir Temur 1".to_string(),
            straight_line_km: 1.0,
        }
    }

    #[test]
    fn nearby_lists_every_result() {
        let html = NearbyTemplate {
            results: vec![result(1, "Alpha"), result(2, "Beta")],
            message: String::new(),
        }
        .render()
        .unwrap();

        assert!(html.contains("1. Alpha"));
        assert!(html.contains("2. Beta"));
        assert!(html.contains("1.2 km"));
        assert!(html.contains("Amir Temur 1"));
    }

    #[test]
    fn nearby_empty_shows_message() {
        let html = NearbyTemplate {
            results: vec![],
            message: "No parking found within 5 km.".to_string(),
        }
        .render()
        .unwrap();

        assert!(html.contains("No parking found within 5 km."));
    }

    #[test]
    fn names_are_escaped() {
        let html = NearbyTemplate {
            results: vec![result(1, "<b>Evil</b>")],
            message: String::new(),
        }
        .render()
        .unwrap();

        assert!(!html.contains("<b>Evil</b>"));
        assert!(html.contains("&lt;b&gt;Evil"));
    }

    #[test]
    fn nearest_unknown_metrics() {
        let html = NearestTemplate {
            result: Some(result(1, "Alpha")),
            message: String::new(),
        }
        .render()
        .unwrap();

        assert!(html.contains("Alpha"));
        assert!(html.contains("unknown"));

        let html = NearestTemplate {
            result: None,
            message: "No parking facilities are on file.".to_string(),
        }
        .render()
        .unwrap();
        assert!(html.contains("No parking facilities are on file."));
    }
}
