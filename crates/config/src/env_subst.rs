/// Replace `${ENV_VAR}` and `${ENV_VAR:-fallback}` placeholders in raw
/// config text.
///
/// A variable that is unset uses its fallback when one is given; otherwise
/// the placeholder is left as-is so validation can point at it.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated: emit the remainder literally.
            result.push_str(&rest[start..]);
            return result;
        };
        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name), fallback) {
            (false, Some(value), _) => result.push_str(&value),
            (false, None, Some(fallback)) => result.push_str(fallback),
            _ => {
                result.push_str("${");
                result.push_str(body);
                result.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "LOGRELAY_TEST_TOKEN" => Some("tok".to_string()),
            _ => None,
        }
    }

    #[rstest]
    #[case("token = \"${LOGRELAY_TEST_TOKEN}\"", "token = \"tok\"")]
    #[case("${LOGRELAY_MISSING_XYZ}", "${LOGRELAY_MISSING_XYZ}")]
    #[case("${LOGRELAY_MISSING_XYZ:-5000}", "5000")]
    #[case("${LOGRELAY_TEST_TOKEN:-unused}", "tok")]
    #[case("${}", "${}")]
    #[case("a ${LOGRELAY_TEST_TOKEN", "a ${LOGRELAY_TEST_TOKEN")]
    #[case("${LOGRELAY_TEST_TOKEN}-${LOGRELAY_TEST_TOKEN}", "tok-tok")]
    #[case("plain text", "plain text")]
    fn substitution(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(substitute_env_with(input, lookup), expected);
    }

    #[test]
    fn keeps_dollar_without_brace() {
        assert_eq!(substitute_env("cost: $5"), "cost: $5");
    }
}
