pub mod artist;
pub mod event;
pub mod event_artist;
pub mod majesty;
pub mod paid_feature;
pub mod purchased_feature;
pub mod rating;
pub mod user;
pub mod venue;

/// Decode a `gallery` column. Malformed JSON reads as an empty gallery.
pub fn parse_gallery(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Encode a gallery for storage in a `gallery` column
pub fn encode_gallery(paths: &[String]) -> String {
    serde_json::to_string(paths).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallery_column_round_trips_and_tolerates_garbage() {
        let paths = vec!["1_ana/artists/3/gallery/a.png".to_string()];
        assert_eq!(parse_gallery(&encode_gallery(&paths)), paths);
        assert!(parse_gallery("not json").is_empty());
        assert!(parse_gallery("[]").is_empty());
    }
}
