use crate::pipeline::StageId;

/// What the generated guard does at delivery time when its predicate fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Replace the document body with a refusal message.
    DenyRender,
    /// Throw, halting further execution of the script.
    Throw,
    /// Deny render, then throw.
    Both,
}

impl FailureAction {
    pub fn denies_render(&self) -> bool {
        matches!(self, FailureAction::DenyRender | FailureAction::Both)
    }

    pub fn throws(&self) -> bool {
        matches!(self, FailureAction::Throw | FailureAction::Both)
    }
}

/// A guard as data: the runtime condition under which it fires and what it
/// does then. Nothing executes until the spec is rendered into the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardSpec {
    pub id: StageId,
    /// Statements evaluated before the predicate, e.g. digest extraction.
    pub prelude_source: Option<String>,
    /// Delivery-runtime expression; truthy means the guard fires.
    pub predicate_source: String,
    pub failure_action: FailureAction,
    /// Markup installed on `DenyRender`.
    pub deny_markup: String,
    /// Message carried by the error thrown on `Throw`.
    pub throw_message: String,
    /// When set, the check re-runs on this interval instead of once.
    pub repeat_ms: Option<u64>,
}

impl GuardSpec {
    /// Renders the spec into a preamble wrapped in an immediately-invoked
    /// block, so a throw inside one guard never prevents the rest of the
    /// file from parsing (it still halts execution, which is the point).
    pub fn render(&self) -> String {
        let mut body = String::new();
        if let Some(prelude) = &self.prelude_source {
            body.push_str(prelude);
            if !prelude.ends_with('\n') {
                body.push('\n');
            }
        }
        body.push_str(&format!("if ({}) {{\n", self.predicate_source));
        if self.failure_action.denies_render() {
            body.push_str(&format!(
                "document.body.innerHTML = {};\n",
                js_string(&self.deny_markup)
            ));
        }
        if self.failure_action.throws() {
            body.push_str(&format!(
                "throw new Error({});\n",
                js_string(&self.throw_message)
            ));
        }
        body.push('}');

        let body = match self.repeat_ms {
            Some(ms) => format!("setInterval(function () {{\n{}\n}}, {});", body, ms),
            None => body,
        };
        format!("(function () {{\n{}\n}})();", body)
    }
}

/// Quotes `value` as a JS double-quoted string literal.
pub fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // line terminators inside JS string literals
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
