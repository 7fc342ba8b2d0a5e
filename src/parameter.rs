//! Classify one parameter token into a `(paramName, paramValue)` pair and
//! apply its side effects (the `ENCODING` parameter updates the active
//! encoding in `ParserState`; unknown `TYPE`/`VALUE` values are logged once
//! per distinct offender).

use crate::state::{ParserState, VersionProfile};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("line {line}: unknown ENCODING value {value:?}")]
    UnknownEncoding { line: usize, value: String },
    #[error("line {line}: malformed LANGUAGE value {value:?}")]
    InvalidLanguage { line: usize, value: String },
    #[error("line {line}: unrecognised parameter name {name:?}")]
    UnknownParam { line: usize, name: String },
}

const RECOGNISED_ENCODINGS: &[&str] = &["7BIT", "8BIT", "QUOTED-PRINTABLE", "BASE64", "B"];

pub fn classify(
    token: &str,
    line_number: usize,
    state: &mut ParserState,
    profile: &VersionProfile,
) -> Result<(String, String), ParamError> {
    let (name, value) = match token.split_once('=') {
        Some((name, value)) => (name.trim().to_ascii_uppercase(), value.trim().to_string()),
        // 2.1 shorthand: a bare token with no '=' is an unnamed TYPE value.
        None => ("TYPE".to_string(), token.trim().to_string()),
    };

    match name.as_str() {
        "TYPE" => {
            warn_if_unknown(
                &value,
                profile.known_types,
                &mut state.unknown_type_seen,
                "TYPE",
                line_number,
            );
            Ok(("TYPE".to_string(), value))
        }
        "VALUE" => {
            warn_if_unknown(
                &value,
                profile.known_values,
                &mut state.unknown_value_seen,
                "VALUE",
                line_number,
            );
            Ok(("VALUE".to_string(), value))
        }
        "ENCODING" => {
            let upper = value.to_ascii_uppercase();
            let recognised = RECOGNISED_ENCODINGS.contains(&upper.as_str()) || upper.starts_with("X-");
            if !recognised {
                return Err(ParamError::UnknownEncoding {
                    line: line_number,
                    value,
                });
            }
            state.current_encoding = upper;
            Ok(("ENCODING".to_string(), value))
        }
        "CHARSET" => Ok(("CHARSET".to_string(), value)),
        "LANGUAGE" => {
            if is_valid_language_tag(&value) {
                Ok(("LANGUAGE".to_string(), value))
            } else {
                Err(ParamError::InvalidLanguage {
                    line: line_number,
                    value,
                })
            }
        }
        other if other.starts_with("X-") => Ok((other.to_string(), value)),
        other => Err(ParamError::UnknownParam {
            line: line_number,
            name: other.to_string(),
        }),
    }
}

fn warn_if_unknown(
    value: &str,
    known: &[&str],
    seen: &mut std::collections::HashSet<String>,
    param_name: &str,
    line_number: usize,
) {
    let upper = value.to_ascii_uppercase();
    if known.contains(&upper.as_str()) || upper.starts_with("X-") {
        return;
    }
    if seen.insert(upper) {
        log::warn!("line {line_number}: unknown {param_name} value {value:?}");
    }
}

fn is_valid_language_tag(value: &str) -> bool {
    match value.split_once('-') {
        Some((primary, sub)) => {
            !primary.is_empty()
                && !sub.is_empty()
                && primary.chars().all(|c| c.is_ascii_alphabetic())
                && sub.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn state() -> ParserState {
        ParserState::default()
    }

    #[test]
    fn unnamed_token_is_type_shorthand() {
        let mut st = state();
        let profile = VersionProfile::v2_1();
        let (name, value) = classify("HOME", 1, &mut st, &profile).unwrap();
        assert_eq!(name, "TYPE");
        assert_eq!(value, "HOME");
    }

    #[test]
    fn encoding_updates_state() {
        let mut st = state();
        let profile = VersionProfile::v2_1();
        classify("ENCODING=QUOTED-PRINTABLE", 1, &mut st, &profile).unwrap();
        assert_eq!(st.current_encoding, "QUOTED-PRINTABLE");
    }

    #[test]
    fn unknown_encoding_fails() {
        let mut st = state();
        let profile = VersionProfile::v2_1();
        assert_eq!(
            classify("ENCODING=ROT13", 4, &mut st, &profile),
            Err(ParamError::UnknownEncoding {
                line: 4,
                value: "ROT13".to_string()
            })
        );
    }

    #[rstest]
    #[case("en-us", true)]
    #[case("en-US", true)]
    #[case("en", false)]
    #[case("en-", false)]
    #[case("-us", false)]
    #[case("en-u5", false)]
    fn language_tag_shape(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(is_valid_language_tag(value), valid);
    }

    #[test]
    fn x_prefixed_name_is_verbatim() {
        let mut st = state();
        let profile = VersionProfile::v2_1();
        let (name, value) = classify("X-FOO=bar", 1, &mut st, &profile).unwrap();
        assert_eq!(name, "X-FOO");
        assert_eq!(value, "bar");
    }

    #[test]
    fn unknown_param_name_fails() {
        let mut st = state();
        let profile = VersionProfile::v2_1();
        assert_eq!(
            classify("BOGUS=1", 9, &mut st, &profile),
            Err(ParamError::UnknownParam {
                line: 9,
                name: "BOGUS".to_string()
            })
        );
    }
}
