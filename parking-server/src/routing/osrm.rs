//! OSRM Route service response types.
//!
//! Only the fields the enricher needs are deserialised. See
//! <http://project-osrm.org/docs/v5.24.0/api/#route-service>.

use serde::Deserialize;

use crate::domain::RoadMetrics;

use super::error::RoutingError;

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// `"Ok"` on success; otherwise e.g. `"NoRoute"`, `"NoSegment"`,
    /// `"InvalidQuery"`.
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Alternative routes, best first.
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// A single route.
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Route length in metres.
    pub distance: f64,

    /// Travel time in seconds.
    pub duration: f64,
}

impl RouteResponse {
    /// Check if the response indicates success.
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Road metrics of the first route.
    pub fn into_metrics(self) -> Result<RoadMetrics, RoutingError> {
        if !self.is_ok() {
            return Err(RoutingError::NoRoute {
                code: self.code,
                message: self.message.unwrap_or_default(),
            });
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::NoRoute {
                code: "Ok".to_string(),
                message: "response contained no routes".to_string(),
            })?;

        if !route.distance.is_finite()
            || !route.duration.is_finite()
            || route.distance < 0.0
            || route.duration < 0.0
        {
            return Err(RoutingError::Json {
                message: format!(
                    "invalid route values: distance={} duration={}",
                    route.distance, route.duration
                ),
                body: None,
            });
        }

        Ok(RoadMetrics::from_route(route.distance, route.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "code": "Ok",
            "routes": [
                {"distance": 3456.7, "duration": 512.3, "weight": 512.3, "legs": []},
                {"distance": 4000.0, "duration": 480.0}
            ],
            "waypoints": []
        }"#;

        let response: RouteResponse = serde_json::from_str(json).unwrap();
        assert!(response.is_ok());

        let metrics = response.into_metrics().unwrap();
        assert_eq!(metrics.distance_km, 3.5);
        assert_eq!(metrics.duration_min, 9.0);
    }

    #[test]
    fn deserialise_error_response() {
        let json = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;

        let response: RouteResponse = serde_json::from_str(json).unwrap();
        assert!(!response.is_ok());
        assert!(response.routes.is_empty());

        let err = response.into_metrics().unwrap_err();
        match err {
            RoutingError::NoRoute { code, message } => {
                assert_eq!(code, "NoRoute");
                assert_eq!(message, "Impossible route between points");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ok_without_routes_is_no_route() {
        let response: RouteResponse = serde_json::from_str(r#"{"code": "Ok", "routes": []}"#).unwrap();
        assert!(matches!(
            response.into_metrics(),
            Err(RoutingError::NoRoute { .. })
        ));
    }

    #[test]
    fn negative_values_are_rejected() {
        let response: RouteResponse =
            serde_json::from_str(r#"{"code": "Ok", "routes": [{"distance": -1.0, "duration": 3.0}]}"#)
                .unwrap();
        assert!(matches!(
            response.into_metrics(),
            Err(RoutingError::Json { .. })
        ));
    }

    #[test]
    fn missing_code_fails_to_deserialise() {
        assert!(serde_json::from_str::<RouteResponse>(r#"{"routes": []}"#).is_err());
    }
}
