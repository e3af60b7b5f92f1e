//! Conversation group naming.

/// Compute the canonical group name for a two-party conversation.
///
/// The two usernames are ordered by ordinal (byte-wise) comparison and joined
/// with `-`, so both participants arrive at the same name no matter who
/// initiates. Callers pass usernames already canonicalized to lowercase; the
/// identity boundary (token validation and request parsing) enforces that
/// policy so every lookup in the system sees one casing.
pub fn group_name(caller: &str, other: &str) -> String {
    if caller < other {
        format!("{caller}-{other}")
    } else {
        format!("{other}-{caller}")
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("alice", "bob")]
    #[test_case("bob", "alice")]
    #[test_case("zoe", "adam")]
    #[test_case("anna", "anna-belle")]
    fn name_is_order_independent(a: &str, b: &str) {
        assert_eq!(group_name(a, b), group_name(b, a));
    }

    #[test]
    fn lower_ordinal_name_comes_first() {
        assert_eq!(group_name("bob", "alice"), "alice-bob");
        assert_eq!(group_name("alice", "bob"), "alice-bob");
    }

    #[test]
    fn comparison_is_ordinal_not_numeric() {
        // "user10" < "user2" byte-wise
        assert_eq!(group_name("user2", "user10"), "user10-user2");
    }

    #[test]
    fn identical_names_still_form_a_name() {
        assert_eq!(group_name("alice", "alice"), "alice-alice");
    }
}
