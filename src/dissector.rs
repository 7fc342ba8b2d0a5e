//! Split a logical line into groups, property name, parameter tokens, and
//! the raw value tail.
//!
//! This is purely structural: it does not interpret parameter tokens (that
//! is [`crate::parameter::classify`]'s job) or decode the value (that is
//! [`crate::decoder`]'s job). The caller loops over [`SplitLine::param_tokens`]
//! and assembles the classified result into a `VCardProperty`.

use crate::line::Line;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DissectError {
    #[error("line {0}: line begins with '#'")]
    InvalidComment(usize),
    #[error("line {0}: no unquoted ':' found before end of line")]
    InvalidLine(usize),
}

/// The structural result of dissecting one line, before parameter
/// classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitLine {
    pub groups: Vec<String>,
    pub name: String,
    pub param_tokens: Vec<String>,
    pub raw_value: String,
}

enum State {
    GroupOrName,
    Params,
    ParamsInDquote,
}

pub fn split_line(line: &Line) -> Result<SplitLine, DissectError> {
    let text = line.as_str();
    if text.starts_with('#') {
        return Err(DissectError::InvalidComment(line.number()));
    }

    let mut state = State::GroupOrName;
    let mut groups = Vec::new();
    let mut name = String::new();
    let mut param_tokens = Vec::new();
    let mut run = String::new();

    for (idx, c) in text.char_indices() {
        match state {
            State::GroupOrName => match c {
                ':' => {
                    name = std::mem::take(&mut run);
                    return finish(groups, name, param_tokens, text[idx + c.len_utf8()..].to_string(), line.number());
                }
                '.' => {
                    if run.is_empty() {
                        log::warn!("line {}: empty group token dropped", line.number());
                    } else {
                        groups.push(std::mem::take(&mut run));
                    }
                }
                ';' => {
                    name = std::mem::take(&mut run);
                    state = State::Params;
                }
                other => run.push(other),
            },
            State::Params => match c {
                '"' => {
                    run.push(c);
                    state = State::ParamsInDquote;
                }
                ';' => param_tokens.push(std::mem::take(&mut run)),
                ':' => {
                    param_tokens.push(std::mem::take(&mut run));
                    return finish(groups, name, param_tokens, text[idx + c.len_utf8()..].to_string(), line.number());
                }
                other => run.push(other),
            },
            State::ParamsInDquote => {
                run.push(c);
                if c == '"' {
                    log::warn!(
                        "line {}: double-quoted parameter value (non-conforming in 2.1, accepted)",
                        line.number()
                    );
                    state = State::Params;
                }
            }
        }
    }

    Err(DissectError::InvalidLine(line.number()))
}

fn finish(
    groups: Vec<String>,
    name: String,
    param_tokens: Vec<String>,
    raw_value: String,
    line_number: usize,
) -> Result<SplitLine, DissectError> {
    if name.is_empty() {
        return Err(DissectError::InvalidLine(line_number));
    }
    Ok(SplitLine {
        groups,
        name,
        param_tokens,
        raw_value,
    })
}
