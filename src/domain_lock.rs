use crate::guard::{js_string, FailureAction, GuardSpec};
use crate::pipeline::{Artifact, StageId};

pub const DENY_MARKUP: &str = "<h2>Access Denied</h2>";

/// Builds the domain-lock guard for `domain`. The value is compared verbatim
/// against the delivery origin's hostname; no hostname syntax validation is
/// done here, the guard is a deterrent, not a parser.
pub fn spec(domain: &str) -> GuardSpec {
    GuardSpec {
        id: StageId::DomainLock,
        prelude_source: None,
        predicate_source: format!("window.location.hostname !== {}", js_string(domain)),
        failure_action: FailureAction::Both,
        deny_markup: DENY_MARKUP.into(),
        throw_message: "Domain not allowed.".into(),
        repeat_ms: None,
    }
}

pub fn apply(artifact: Artifact, domain: &str) -> Artifact {
    let preamble = spec(domain).render();
    artifact.with_preamble(preamble, StageId::DomainLock)
}
