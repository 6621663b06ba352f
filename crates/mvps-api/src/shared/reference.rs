//! Human readable document references

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// `<PREFIX>-<YYYY-MM-DD>-<8 uppercase hex>`
pub fn dated_reference(prefix: &str, at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("{}-{}-{}", prefix, at.format("%Y-%m-%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_differ_per_call() {
        let at = DateTime::parse_from_rfc3339("2024-12-31T23:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let a = dated_reference("PO", at);
        let b = dated_reference("PO", at);
        assert!(a.starts_with("PO-2024-12-31-"));
        assert_eq!(a.len(), "PO-2024-12-31-".len() + 8);
        assert_ne!(a, b);
    }
}
