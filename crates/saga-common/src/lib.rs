//! # Saga Common
//!
//! Common types, utilities, and shared abstractions for Saga.
//!
//! This crate provides foundational types used across all Saga subsystems:
//! - Identifier types (QuestId)
//! - Positions and rectangular areas
//! - Version information for save and content schemas
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_contains_position() {
        let area = AreaBounds::new(10.0, 10.0, 20.0, 5.0);
        assert!(area.contains(Position::new(15.0, 12.0)));
        assert!(!area.contains(Position::new(31.0, 12.0)));
    }

    #[test]
    fn test_quest_id_lookup_by_str() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(QuestId::new("q_intro"), 1);
        assert_eq!(map.get("q_intro"), Some(&1));
    }

    #[test]
    fn test_io_error_converts() {
        let err: SagaError = std::io::Error::new(std::io::ErrorKind::NotFound, "slot").into();
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_version_compatibility() {
        let v1 = SchemaVersion::new(1, 0, 0);
        let v2 = SchemaVersion::new(1, 1, 0);
        let v3 = SchemaVersion::new(2, 0, 0);

        assert!(v2.is_compatible_with(&v1));
        assert!(!v1.is_compatible_with(&v3));
    }
}
