/// check whether a prefix is usable for selection; filters out prefixes
/// which have special meaning to the chooser's input parser
pub fn is_valid_prefix(prefix: &str) -> bool {
    let Some(first) = prefix.chars().next() else {
        return false;
    };

    if first.is_ascii_digit() || first == '-' {
        // digits select by index, '-' is reserved for deselection
        return false;
    }
    if prefix
        .bytes()
        .any(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b','))
    {
        // token separators
        return false;
    }
    if prefix.len() == 1 && (first == '*' || first == '?') {
        // "all" wildcard and prompt help
        return false;
    }

    true
}

/// compute the shortest unique prefix of each name, bounded by `min` and
/// `max`; a length of 0 means no valid unique prefix exists within the bounds
pub fn find_unique_prefixes(names: &[&str], min: usize, max: usize) -> Vec<usize> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            for len in min..=max {
                let Some(prefix) = name.get(..len) else {
                    break;
                };
                if !is_valid_prefix(prefix) {
                    continue;
                }
                if names
                    .iter()
                    .enumerate()
                    .all(|(j, other)| j == i || !other.starts_with(prefix))
                {
                    return len;
                }
            }
            0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_first_letters() {
        let lengths = find_unique_prefixes(&["status", "patch", "quit", "help"], 1, 4);
        assert_eq!(lengths, vec![1, 1, 1, 1]);
    }

    #[test]
    fn shared_prefix_extends_until_divergence() {
        let lengths = find_unique_prefixes(&["status", "stage", "stash"], 1, 4);
        assert_eq!(lengths, vec![4, 4, 4]);
    }

    #[test]
    fn no_prefix_within_bounds() {
        // the names only diverge at byte 5, past the maximum
        let lengths = find_unique_prefixes(&["prefixes", "prefixed"], 1, 4);
        assert_eq!(lengths, vec![0, 0]);
    }

    #[test]
    fn prefix_of_another_name_is_skipped() {
        // "st" uniquely belongs to neither: it prefixes both names
        let lengths = find_unique_prefixes(&["st", "stage"], 1, 4);
        // "st" cannot be distinguished from "stage" at any length of itself
        assert_eq!(lengths[0], 0);
        assert_eq!(lengths[1], 3);
    }

    #[test]
    fn digit_and_dash_leads_are_invalid() {
        assert!(!is_valid_prefix("1st"));
        assert!(!is_valid_prefix("-x"));
        let lengths = find_unique_prefixes(&["7zip", "tar"], 1, 4);
        assert_eq!(lengths, vec![0, 1]);
    }

    #[test]
    fn separators_and_wildcards_are_invalid() {
        assert!(!is_valid_prefix("a b"));
        assert!(!is_valid_prefix("a,b"));
        assert!(!is_valid_prefix("*"));
        assert!(!is_valid_prefix("?"));
        assert!(is_valid_prefix("*x"));
        assert!(!is_valid_prefix(""));
    }

    #[test]
    fn computed_prefixes_are_unique_and_valid() {
        let names = ["status", "stage", "stash", "update", "revert", "diff"];
        let lengths = find_unique_prefixes(&names, 1, 4);
        for (i, (&name, &len)) in names.iter().zip(&lengths).enumerate() {
            if len == 0 {
                continue;
            }
            let prefix = &name[..len];
            assert!(is_valid_prefix(prefix));
            for (j, other) in names.iter().enumerate() {
                if i != j {
                    assert!(!other.starts_with(prefix), "{prefix} also prefixes {other}");
                }
            }
        }
    }
}
