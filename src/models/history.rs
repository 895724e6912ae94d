use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One successful generation, as kept in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub id: String,
    pub prompt: String,
    pub image_url: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl GeneratedImage {
    /// Stamps a new entry with the current time; the id is the same instant.
    pub fn new(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self::at(Utc::now().timestamp_millis(), prompt, image_url)
    }

    pub fn at(timestamp: i64, prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: timestamp.to_string(),
            prompt: prompt.into(),
            image_url: image_url.into(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_fields() {
        let image = GeneratedImage {
            id: "1700000000000".to_string(),
            prompt: "a funky cat".to_string(),
            image_url: "https://store.example/pop-art-images/abc-123.jpeg".to_string(),
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["imageUrl"], "https://store.example/pop-art-images/abc-123.jpeg");
        assert_eq!(json["timestamp"], 1_700_000_000_000i64);
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_new_uses_timestamp_as_id() {
        let image = GeneratedImage::new("robot", "https://store.example/x.jpeg");
        assert_eq!(image.id, image.timestamp.to_string());
        assert!(image.timestamp > 0);
    }
}
