use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObfuscationError {
    #[error("empty input")]
    Empty,
    #[error("unparseable input: {0}")]
    Unparseable(String),
}

/// Pass-through options for the obfuscation stage, named after the surface
/// of the usual script obfuscators. The built-in engine interprets `compact`
/// and `self_defending`; `control_flow_flattening` is carried for external
/// engines that implement it.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ObfuscationOptions {
    pub compact: bool,
    pub control_flow_flattening: bool,
    pub self_defending: bool,
}

impl Default for ObfuscationOptions {
    fn default() -> Self {
        Self {
            compact: true,
            control_flow_flattening: true,
            self_defending: true,
        }
    }
}

/// The injected obfuscation capability: behavior-preserving text-to-text,
/// opaque to the pipeline. Tests swap in trivial marker engines so pipeline
/// ordering is checked independently of any real engine's output.
pub trait ObfuscationEngine: Send + Sync {
    fn apply(&self, content: &str, options: &ObfuscationOptions)
        -> Result<String, ObfuscationError>;
}

static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// Built-in textual engine: hex-escapes string literals, optionally strips
/// comments and blank lines (`compact`), and optionally wraps the result in
/// an immediately-invoked function (`self_defending`). Input with unbalanced
/// brackets or an unterminated string, template, or block comment is
/// rejected as unparseable before any output is produced.
pub struct JsObfuscator;

#[derive(PartialEq)]
enum Mode {
    Code,
    Str(char),
    Template,
    LineComment,
    BlockComment,
}

impl ObfuscationEngine for JsObfuscator {
    fn apply(
        &self,
        content: &str,
        options: &ObfuscationOptions,
    ) -> Result<String, ObfuscationError> {
        if content.trim().is_empty() {
            return Err(ObfuscationError::Empty);
        }

        let mut out = rewrite(content, options)?;
        if options.compact {
            out = TRAILING_WS.replace_all(&out, "\n").into_owned();
            out = BLANK_LINES.replace_all(&out, "\n").into_owned();
            out = out.trim().to_string();
        }
        if options.self_defending {
            out = format!("(function () {{\n{}\n}})();", out);
        }
        Ok(out)
    }
}

fn rewrite(content: &str, options: &ObfuscationOptions) -> Result<String, ObfuscationError> {
    let mut out = String::with_capacity(content.len() * 2);
    let mut stack: Vec<char> = Vec::new();
    let mut mode = Mode::Code;
    let mut line = 1usize;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        match mode {
            Mode::Code => match c {
                '"' | '\'' => {
                    mode = Mode::Str(c);
                    out.push(c);
                }
                '`' => {
                    mode = Mode::Template;
                    out.push(c);
                }
                '/' => match chars.peek() {
                    Some('/') => {
                        chars.next();
                        mode = Mode::LineComment;
                        if !options.compact {
                            out.push_str("//");
                        }
                    }
                    Some('*') => {
                        chars.next();
                        mode = Mode::BlockComment;
                        if !options.compact {
                            out.push_str("/*");
                        }
                    }
                    _ => out.push(c),
                },
                '(' | '[' | '{' => {
                    stack.push(c);
                    out.push(c);
                }
                ')' | ']' | '}' => {
                    let open = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    if stack.pop() != Some(open) {
                        return Err(ObfuscationError::Unparseable(format!(
                            "unbalanced `{}` at line {}",
                            c, line
                        )));
                    }
                    out.push(c);
                }
                _ => out.push(c),
            },
            Mode::Str(quote) => {
                if c == '\\' {
                    // keep original escapes verbatim
                    out.push(c);
                    if let Some(next) = chars.next() {
                        if next == '\n' {
                            line += 1;
                        }
                        out.push(next);
                    }
                } else if c == quote {
                    mode = Mode::Code;
                    out.push(c);
                } else if c == '\n' {
                    return Err(ObfuscationError::Unparseable(format!(
                        "unterminated string literal at line {}",
                        line - 1
                    )));
                } else {
                    push_escaped(&mut out, c);
                }
            }
            Mode::Template => {
                if c == '\\' {
                    out.push(c);
                    if let Some(next) = chars.next() {
                        if next == '\n' {
                            line += 1;
                        }
                        out.push(next);
                    }
                } else if c == '`' {
                    mode = Mode::Code;
                    out.push(c);
                } else {
                    // template bodies pass through, interpolation intact
                    out.push(c);
                }
            }
            Mode::LineComment => {
                if c == '\n' {
                    mode = Mode::Code;
                    out.push('\n');
                } else if !options.compact {
                    out.push(c);
                }
            }
            Mode::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Code;
                    if !options.compact {
                        out.push_str("*/");
                    }
                } else if !options.compact {
                    out.push(c);
                }
            }
        }
    }

    match mode {
        Mode::Code | Mode::LineComment => {}
        Mode::Str(_) => {
            return Err(ObfuscationError::Unparseable(
                "unterminated string literal at end of input".into(),
            ))
        }
        Mode::Template => {
            return Err(ObfuscationError::Unparseable(
                "unterminated template literal at end of input".into(),
            ))
        }
        Mode::BlockComment => {
            return Err(ObfuscationError::Unparseable(
                "unterminated block comment at end of input".into(),
            ))
        }
    }
    if let Some(open) = stack.pop() {
        return Err(ObfuscationError::Unparseable(format!("unclosed `{}`", open)));
    }
    Ok(out)
}

fn push_escaped(out: &mut String, c: char) {
    if c.is_ascii() && !c.is_ascii_control() {
        out.push_str(&format!("\\x{:02x}", c as u32));
    } else {
        out.push(c);
    }
}
