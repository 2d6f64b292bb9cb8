// src/params.rs

//! Placeholder resolution for descriptor parameters.
//!
//! Turns a descriptor's parameter list into the literal argument vector
//! passed to the OS:
//!
//! - literal parameters pass through unchanged, in order;
//! - placeholder parameters have their answer substituted at the first
//!   *unescaped* `$` in the template (a `$` not immediately preceded by a
//!   backslash). Only the first unescaped occurrence is substituted; any
//!   further markers are left intact.
//!
//! A template containing no `$` at all resolves to the answer alone. A
//! template whose only markers are escaped resolves unchanged.

use crate::descriptor::CommandParameter;
use crate::errors::{ProcdockError, Result};

/// Resolve a parameter list into the argument vector for process invocation.
///
/// A placeholder without an answer is a validation error; answers must be
/// injected (e.g. via `CommandSupervisor::set_parameters`) before resolving.
pub fn resolve_command_parameters(parameters: &[CommandParameter]) -> Result<Vec<String>> {
    parameters
        .iter()
        .map(|p| match p {
            CommandParameter::Literal(s) => Ok(s.clone()),
            CommandParameter::Placeholder { parameter, answer } => {
                let answer = answer.as_deref().ok_or_else(|| {
                    ProcdockError::Validation(format!(
                        "placeholder parameter '{parameter}' has no answer"
                    ))
                })?;
                Ok(substitute_first_unescaped(parameter, answer))
            }
        })
        .collect()
}

/// Substitute `answer` at the first unescaped `$` in `template`.
fn substitute_first_unescaped(template: &str, answer: &str) -> String {
    if !template.contains('$') {
        return answer.to_string();
    }

    match find_unescaped_marker(template) {
        Some(idx) => {
            let mut out = String::with_capacity(template.len() + answer.len());
            out.push_str(&template[..idx]);
            out.push_str(answer);
            out.push_str(&template[idx + 1..]);
            out
        }
        // Only escaped markers present; leave the template as-is.
        None => template.to_string(),
    }
}

/// Byte index of the first `$` not immediately preceded by a backslash.
fn find_unescaped_marker(template: &str) -> Option<usize> {
    let bytes = template.as_bytes();
    for (idx, &b) in bytes.iter().enumerate() {
        if b == b'$' && (idx == 0 || bytes[idx - 1] != b'\\') {
            return Some(idx);
        }
    }
    None
}
