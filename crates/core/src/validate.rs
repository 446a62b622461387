//! Pre-submission input validation.
//!
//! These checks run locally before any network call; a violation is
//! immediately user-visible and fully recoverable.

use crate::error::CoreError;

/// Validate that a source file name is present and non-empty.
pub fn validate_source_file(file_name: &str) -> Result<(), CoreError> {
    if file_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "No audio file selected".to_string(),
        ));
    }
    Ok(())
}

/// Validate an artist selection against the server-provided list.
///
/// An empty list disables submission entirely: there is nothing valid
/// to select.
pub fn validate_artist_selection(artist: &str, available: &[String]) -> Result<(), CoreError> {
    if available.is_empty() {
        return Err(CoreError::Validation(
            "No artist models available on the server".to_string(),
        ));
    }
    if artist.trim().is_empty() {
        return Err(CoreError::Validation("No artist selected".to_string()));
    }
    if !available.iter().any(|a| a == artist) {
        return Err(CoreError::Validation(format!(
            "Unknown artist: '{artist}'. Available artists: {}",
            available.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn artists(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_file_name_is_rejected() {
        assert_matches!(validate_source_file(""), Err(CoreError::Validation(_)));
        assert_matches!(validate_source_file("   "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn file_name_accepted() {
        assert!(validate_source_file("song.wav").is_ok());
    }

    #[test]
    fn empty_artist_list_disables_submission() {
        let err = validate_artist_selection("alice", &[]).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("No artist models"));
    }

    #[test]
    fn empty_selection_is_rejected() {
        let available = artists(&["alice"]);
        assert_matches!(
            validate_artist_selection("", &available),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn unknown_artist_lists_the_valid_ones() {
        let available = artists(&["alice", "bob"]);
        let err = validate_artist_selection("carol", &available).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("alice, bob"));
    }

    #[test]
    fn known_artist_accepted() {
        let available = artists(&["alice", "bob"]);
        assert!(validate_artist_selection("bob", &available).is_ok());
    }
}
