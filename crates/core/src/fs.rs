//! Filesystem checks

use std::path::Path;

/// Check if a path is a regular file
pub fn is_file(path: &str) -> bool {
    Path::new(path).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_file() {
        assert!(is_file("Cargo.toml"));
        assert!(!is_file("."));
    }
}
