// ABOUTME: Wire types for the CardioCheck prediction service
// Request bodies, response envelopes, user details, and nearby hospital records

use serde::{Deserialize, Serialize};

const DIRECTIONS_BASE: &str = "https://www.google.com/maps/dir/?api=1&destination=";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Profile changes; omitted fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditUserDetailsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl EditUserDetailsRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.username.is_none() && self.phone_number.is_none()
    }
}

/// `{status, message, token}` returned by the login and register endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub token: Option<String>,
}

impl AuthResponse {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

/// `{success, message, ...}` envelope used by the authenticated endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub body: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDetailsBody {
    pub user_details: Option<UserDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionBody {
    pub prediction: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HospitalsBody {
    #[serde(default)]
    pub hospitals: Vec<Hospital>,
}

/// Minimal body used to recover `message` from a failed response
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl UserDetails {
    /// "First Last", falling back to the email address
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: bool,
}

/// A nearby cardiac centre as returned by the places search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    #[serde(default)]
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub vicinity: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub opening_hours: Option<OpeningHours>,
    pub geometry: Geometry,
}

impl Hospital {
    pub fn is_open_now(&self) -> Option<bool> {
        self.opening_hours.map(|hours| hours.open_now)
    }

    pub fn directions_url(&self) -> String {
        let location = self.geometry.location;
        format!("{}{},{}", DIRECTIONS_BASE, location.lat, location.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hospital_deserializes_places_result() {
        let json = r#"{
            "place_id": "abc123",
            "name": "City Heart Institute",
            "vicinity": "12 Main Street",
            "rating": 4.5,
            "user_ratings_total": 210,
            "opening_hours": {"open_now": true},
            "geometry": {"location": {"lat": 40.7128, "lng": -74.006}},
            "types": ["hospital"]
        }"#;

        let hospital: Hospital = serde_json::from_str(json).unwrap();
        assert_eq!(hospital.name, "City Heart Institute");
        assert_eq!(hospital.is_open_now(), Some(true));
        assert_eq!(
            hospital.directions_url(),
            "https://www.google.com/maps/dir/?api=1&destination=40.7128,-74.006"
        );
    }

    #[test]
    fn test_hospital_without_optional_fields() {
        let json = r#"{"name": "Clinic", "geometry": {"location": {"lat": 1.0, "lng": 2.0}}}"#;
        let hospital: Hospital = serde_json::from_str(json).unwrap();
        assert_eq!(hospital.rating, None);
        assert_eq!(hospital.is_open_now(), None);
    }

    #[test]
    fn test_envelope_flattens_body() {
        let json = r#"{"success": true, "message": "Prediction made successfully.", "prediction": "not likely"}"#;
        let envelope: Envelope<PredictionBody> = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.body.prediction.as_deref(), Some("not likely"));
    }

    #[test]
    fn test_display_name() {
        let mut user = UserDetails {
            email: "ana@example.com".to_string(),
            first_name: Some("Ana".to_string()),
            last_name: Some("Lima".to_string()),
            username: None,
            phone_number: None,
        };
        assert_eq!(user.display_name(), "Ana Lima");

        user.first_name = None;
        user.last_name = Some(" ".to_string());
        assert_eq!(user.display_name(), "ana@example.com");
    }
}
