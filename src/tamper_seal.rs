//! Integrity seal stage.
//!
//! Digest scope contract: the expected digest is computed over the payload
//! only, i.e. the artifact content as it stands *before* this stage's own
//! preamble is added. The emitted runtime check mirrors that scope: it takes
//! the executing script's text and extracts everything after the sentinel
//! marker line that closes the preamble, so build-time and runtime hash the
//! same span. The runtime recompute relies on a page-provided `sha256`
//! helper and is skipped (never a false positive) when none is present.

use sha2::{Digest, Sha256};

use crate::guard::{js_string, FailureAction, GuardSpec};
use crate::pipeline::{Artifact, StageId};

/// Injected digest capability, `text -> hex digest`. Collision resistance is
/// the caller's concern; the pipeline only requires determinism.
pub type DigestFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Separates the seal preamble from the payload it guards. The preamble
/// itself quotes this marker, so the runtime check slices past the last
/// occurrence and its newline, never the quoted one.
pub const SEAL_MARKER: &str = "/*@cloak-seal*/";

pub const DENY_MARKUP: &str = "<h2>Tampering detected</h2>";

pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn spec(expected_digest: &str) -> GuardSpec {
    let prelude = format!(
        "var expected = {};\n\
         var marker = {};\n\
         var body = document.currentScript ? document.currentScript.textContent : \"\";\n\
         var payload = body.slice(body.lastIndexOf(marker) + marker.length + 1);",
        js_string(expected_digest),
        js_string(SEAL_MARKER),
    );
    GuardSpec {
        id: StageId::TamperSeal,
        prelude_source: Some(prelude),
        predicate_source: "typeof sha256 === \"function\" && sha256(payload) !== expected".into(),
        failure_action: FailureAction::Both,
        deny_markup: DENY_MARKUP.into(),
        throw_message: "Code has been altered.".into(),
        repeat_ms: None,
    }
}

pub fn apply(artifact: Artifact, digest: &dyn Fn(&str) -> String) -> Artifact {
    let expected = digest(artifact.content());
    let preamble = format!("{}\n{}", spec(&expected).render(), SEAL_MARKER);
    artifact.with_preamble(preamble, StageId::TamperSeal)
}
