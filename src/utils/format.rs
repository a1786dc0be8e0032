//! `%placeholder` expansion for format templates

/// Replace `%name` placeholders in `template`.
///
/// The longest matching name wins, so `%percentage_used` is not read as
/// `%percentage` followed by `_used`. `%%` is a literal percent sign and
/// unknown placeholders are copied through unchanged.
pub fn expand(template: &str, values: &[(&str, String)]) -> String {
    let mut names: Vec<&(&str, String)> = values.iter().collect();
    names.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(stripped) = after.strip_prefix('%') {
            out.push('%');
            rest = stripped;
            continue;
        }

        match names.iter().find(|(name, _)| after.starts_with(name)) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len()..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_name_wins() {
        let values = [
            ("percentage", "a".to_string()),
            ("percentage_used", "b".to_string()),
        ];
        assert_eq!(expand("%percentage_used/%percentage", &values), "b/a");
    }

    #[test]
    fn unknown_and_literal_percent() {
        let values = [("1min", "0.42".to_string())];
        assert_eq!(expand("%1min %nope 100%%", &values), "0.42 %nope 100%");
        assert_eq!(expand("trailing %", &values), "trailing %");
    }

    #[test]
    fn similar_prefixes_stay_distinct() {
        let values = [
            ("1min", "1".to_string()),
            ("5min", "5".to_string()),
            ("15min", "15".to_string()),
        ];
        assert_eq!(expand("%1min %5min %15min", &values), "1 5 15");
    }
}
