pub fn normalize_email(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Structural check only: one `@`, a non-empty local part, a dotted domain
/// and no whitespace anywhere.
pub fn is_plausible_email(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = trimmed.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

#[cfg(test)]
mod tests {
    use super::{is_plausible_email, normalize_email};

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  Ada@Example.com ");
        assert_eq!(value.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn normalize_email_folds_non_ascii_case() {
        assert_eq!(normalize_email("ÉLODIE@x.fr"), normalize_email("élodie@x.fr"));
        assert_eq!(normalize_email("ÉLODIE@X.FR").as_deref(), Some("élodie@x.fr"));
    }

    #[test]
    fn normalize_email_rejects_blank() {
        assert!(normalize_email("   ").is_none());
    }

    #[test]
    fn plausible_email_accepts_common_shapes() {
        assert!(is_plausible_email("a@b.com"));
        assert!(is_plausible_email(" first.last+tag@mail.example.org "));
    }

    #[test]
    fn plausible_email_rejects_broken_values() {
        assert!(!is_plausible_email("ada"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("ada@"));
        assert!(!is_plausible_email("ada@example"));
        assert!(!is_plausible_email("ada@@example.com"));
        assert!(!is_plausible_email("ada lovelace@example.com"));
    }
}
