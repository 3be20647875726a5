use crate::guard::{FailureAction, GuardSpec};
use crate::pipeline::{Artifact, StageId};

/// How often the delivered script re-probes for an attached inspector.
pub const PROBE_INTERVAL_MS: u64 = 1000;
/// An outer/inner viewport delta beyond this suggests a docked devtools
/// pane. Heuristic only; false positives and negatives are expected.
pub const VIEWPORT_DELTA_PX: u32 = 160;

pub const DENY_MARKUP: &str = "<h1>Protected Code</h1>";

pub fn spec() -> GuardSpec {
    GuardSpec {
        id: StageId::DevToolsGuard,
        prelude_source: None,
        predicate_source: format!(
            "window.outerWidth - window.innerWidth > {}",
            VIEWPORT_DELTA_PX
        ),
        failure_action: FailureAction::Both,
        deny_markup: DENY_MARKUP.into(),
        throw_message: "DevTools are blocked.".into(),
        repeat_ms: Some(PROBE_INTERVAL_MS),
    }
}

pub fn apply(artifact: Artifact) -> Artifact {
    let preamble = spec().render();
    artifact.with_preamble(preamble, StageId::DevToolsGuard)
}
