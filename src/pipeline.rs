use std::fmt;

use thiserror::Error;

use crate::config::CloakConfig;
use crate::obfuscator::{ObfuscationEngine, ObfuscationError};
use crate::tamper_seal::{self, DigestFn};
use crate::{devtools_guard, domain_lock};

/// Identifies one stage of the protection pipeline. The variants are listed
/// in injection order; at delivery time the guards execute in the reverse
/// order because each later preamble is prepended to everything before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    Obfuscation,
    DomainLock,
    DevToolsGuard,
    TamperSeal,
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageId::Obfuscation => "obfuscation",
            StageId::DomainLock => "domain-lock",
            StageId::DevToolsGuard => "devtools-guard",
            StageId::TamperSeal => "tamper-seal",
        };
        f.write_str(name)
    }
}

/// The immutable value flowing through the pipeline: the script text plus
/// the ordered record of stages that produced it. Stages consume one
/// artifact and return a new one; nothing is rewritten in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    content: String,
    applied_stages: Vec<StageId>,
}

impl Artifact {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            content: source.into(),
            applied_stages: Vec::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The stages applied so far, in the order they ran.
    pub fn manifest(&self) -> &[StageId] {
        &self.applied_stages
    }

    pub fn into_content(self) -> String {
        self.content
    }

    /// Replaces the content wholesale, recording `stage`. Used by the
    /// obfuscation stage, which reshapes rather than prepends.
    pub fn replaced(mut self, content: String, stage: StageId) -> Self {
        self.content = content;
        self.applied_stages.push(stage);
        self
    }

    /// Prepends a guard preamble, recording `stage`. The preamble textually
    /// precedes the accumulated content, so it executes before everything
    /// injected earlier.
    pub fn with_preamble(mut self, preamble: String, stage: StageId) -> Self {
        self.content = format!("{}\n{}", preamble, self.content);
        self.applied_stages.push(stage);
        self
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("obfuscation stage failed: {0}")]
    Obfuscation(#[from] ObfuscationError),
    #[error("{stage} stage failed: {reason}")]
    Guard { stage: StageId, reason: String },
}

impl PipelineError {
    /// The stage at which the run aborted.
    pub fn stage(&self) -> StageId {
        match self {
            PipelineError::Obfuscation(_) => StageId::Obfuscation,
            PipelineError::Guard { stage, .. } => *stage,
        }
    }
}

/// Ordered composition of the protection stages over one in-memory buffer.
///
/// Stage order is fixed and never reordered by configuration: obfuscation,
/// then domain lock, then devtools guard, then tamper seal. A guard whose
/// triggering option is absent is skipped as an identity transform. A failed
/// stage aborts the run; no partial artifact is ever returned.
pub struct Pipeline {
    engine: Box<dyn ObfuscationEngine>,
    digest: Option<DigestFn>,
}

impl Pipeline {
    /// Builds a pipeline around the given obfuscation engine, sealing with
    /// SHA-256 when the tamper check is enabled.
    pub fn new(engine: Box<dyn ObfuscationEngine>) -> Self {
        Self {
            engine,
            digest: Some(Box::new(tamper_seal::sha256_hex)),
        }
    }

    /// Replaces the seal digest function.
    pub fn with_digest(mut self, digest: DigestFn) -> Self {
        self.digest = Some(digest);
        self
    }

    /// Removes the digest capability. A pipeline built this way refuses a
    /// configuration that enables the tamper check.
    pub fn without_digest(mut self) -> Self {
        self.digest = None;
        self
    }

    pub fn run(&self, source: &str, cfg: &CloakConfig) -> Result<Artifact, PipelineError> {
        let artifact = Artifact::new(source);

        let obfuscated = self.engine.apply(artifact.content(), &cfg.obfuscation)?;
        let mut artifact = artifact.replaced(obfuscated, StageId::Obfuscation);

        if let Some(domain) = cfg.domain.as_deref().filter(|d| !d.is_empty()) {
            artifact = domain_lock::apply(artifact, domain);
        }
        if cfg.inject_runtime {
            artifact = devtools_guard::apply(artifact);
        }
        if cfg.tamper_check {
            let digest = self.digest.as_ref().ok_or(PipelineError::Guard {
                stage: StageId::TamperSeal,
                reason: "tamper check enabled but no digest function configured".into(),
            })?;
            artifact = tamper_seal::apply(artifact, digest.as_ref());
        }

        Ok(artifact)
    }
}
