//! UUID helpers shared across crates.

pub use uuid::Uuid;

/// Deterministic UUIDv5 from an arbitrary string id.
///
/// Used for chunk ids so that re-indexing the same corpus yields the same ids.
pub fn stable_uuid(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

/// Random UUIDv4, used as an opaque session identifier.
pub fn random_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Parses a UUID from a cookie/header value, ignoring surrounding whitespace.
pub fn parse_uuid(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_uuid_is_deterministic() {
        assert_eq!(stable_uuid("bio.txt#0"), stable_uuid("bio.txt#0"));
        assert_ne!(stable_uuid("bio.txt#0"), stable_uuid("bio.txt#1"));
    }

    #[test]
    fn parse_rejects_garbage() {
        let id = random_uuid();
        assert_eq!(parse_uuid(&format!(" {id} ")), Some(id));
        assert_eq!(parse_uuid("not-a-uuid"), None);
    }
}
