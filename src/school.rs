//! School-name normalization.
//!
//! Every ledger and fee-profile row is scoped by a slug derived from the
//! school name: lower-cased with everything that is not alphanumeric
//! stripped. "Green Valley" and "green-valley" therefore share one scope.

pub fn school_slug(school_name: &str) -> String {
    school_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_whitespace() {
        assert_eq!(school_slug("Green Valley"), "greenvalley");
        assert_eq!(school_slug("St. Mary's High-School #2"), "stmaryshighschool2");
    }

    #[test]
    fn lower_cases() {
        assert_eq!(school_slug("GREEN VALLEY"), school_slug("green valley"));
    }

    #[test]
    fn empty_name_gives_empty_slug() {
        assert_eq!(school_slug(""), "");
        assert_eq!(school_slug("!!!"), "");
    }
}
