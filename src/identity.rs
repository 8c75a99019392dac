//! Student identity derivation.

use sha2::{Digest, Sha256};

/// Derive the stable 8-character ledger key for a student.
///
/// The identifier is a content hash of `"{name}_{class}"`, truncated to the
/// first 8 hex characters and upper-cased. It is deterministic and both
/// case- and whitespace-sensitive: renaming a student or moving them to a
/// different class category produces a new identifier. Distinct pairs that
/// happen to collide share a ledger; there is no collision detection.
pub fn derive_student_id(student_name: &str, class_category: &str) -> String {
    let digest = Sha256::digest(format!("{student_name}_{class_category}").as_bytes());
    hex::encode(&digest[..4]).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(
            derive_student_id("Ali Khan", "Class 3"),
            derive_student_id("Ali Khan", "Class 3")
        );
    }

    #[test]
    fn eight_upper_hex_chars() {
        let id = derive_student_id("Ali Khan", "Class 3");
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn sensitive_to_both_arguments() {
        let base = derive_student_id("Ali Khan", "Class 3");
        assert_ne!(base, derive_student_id("Ali Khan", "Class 4"));
        assert_ne!(base, derive_student_id("ali khan", "Class 3"));
        assert_ne!(base, derive_student_id("Ali  Khan", "Class 3"));
    }
}
