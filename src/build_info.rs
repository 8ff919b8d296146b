//! Build-time metadata exposed at runtime.

use crate::model::VersionIdentity;

/// Monotonically increasing build sequence number.
pub const BUILD_SEQUENCE: u64 = parse_sequence(env!("APP_BUILD_SEQUENCE"));
/// Human-readable version label.
pub const BUILD_LABEL: &str = env!("APP_BUILD_LABEL");
pub const BUILD_COMMIT: &str = env!("APP_BUILD_COMMIT");
pub const BUILD_TIMESTAMP: &str = env!("APP_BUILD_TIMESTAMP");

/// Deployment identifier this binary registers under by default.
pub const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");

/// Version identity compiled into this binary.
pub fn identity() -> VersionIdentity {
    VersionIdentity::new(BUILD_SEQUENCE, BUILD_LABEL)
}

/// Human-readable summary combining the build identity and build metadata.
pub fn summary() -> String {
    format!(
        "{} {} (commit {}, built at {})",
        PACKAGE_NAME,
        identity(),
        BUILD_COMMIT,
        BUILD_TIMESTAMP
    )
}

/// Decimal parser usable in const context; a bad value fails compilation.
pub const fn parse_sequence(raw: &str) -> u64 {
    let bytes = raw.as_bytes();
    assert!(!bytes.is_empty(), "build sequence must not be empty");

    let mut value: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        assert!(digit.is_ascii_digit(), "build sequence must be decimal");
        value = match value.checked_mul(10) {
            Some(v) => match v.checked_add((digit - b'0') as u64) {
                Some(v) => v,
                None => panic!("build sequence overflows u64"),
            },
            None => panic!("build sequence overflows u64"),
        };
        i += 1;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matches_constants() {
        let identity = identity();
        assert_eq!(identity.sequence(), BUILD_SEQUENCE);
        assert_eq!(identity.label(), BUILD_LABEL);
        assert_eq!(identity, super::identity());
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("0"), 0);
        assert_eq!(parse_sequence("7"), 7);
        assert_eq!(parse_sequence("18446744073709551615"), u64::MAX);
    }

    #[test]
    #[should_panic(expected = "build sequence must be decimal")]
    fn test_parse_sequence_rejects_non_digits() {
        parse_sequence("12a");
    }

    #[test]
    fn test_summary_mentions_identity() {
        assert!(summary().contains(&identity().to_string()));
        assert!(summary().contains(BUILD_COMMIT));
    }
}
