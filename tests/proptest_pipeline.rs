use proptest::prelude::*;
use script_cloak::config::CloakConfig;
use script_cloak::obfuscator::{
    JsObfuscator, ObfuscationEngine, ObfuscationError, ObfuscationOptions,
};
use script_cloak::pipeline::{Pipeline, StageId};

const PROPTEST_CASES: u32 = 100;

struct MarkerEngine;

impl ObfuscationEngine for MarkerEngine {
    fn apply(
        &self,
        content: &str,
        _options: &ObfuscationOptions,
    ) -> Result<String, ObfuscationError> {
        Ok(format!("<<{}>>", content))
    }
}

// Payloads kept free of brackets, quotes and slashes so they also pass the
// built-in engine's parse gate.
fn payload_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,;=+_-]{1,200}"
}

fn domain_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-z]{1,10}\\.[a-z]{2,3}")
}

#[cfg(test)]
mod composition_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

        #[test]
        fn prop_manifest_is_ordered_subsequence(
            payload in payload_strategy(),
            domain in domain_strategy(),
            inject_runtime in any::<bool>(),
            tamper_check in any::<bool>(),
        ) {
            let pipeline = Pipeline::new(Box::new(MarkerEngine));
            let cfg = CloakConfig { domain, inject_runtime, tamper_check, ..Default::default() };
            let artifact = pipeline.run(&payload, &cfg).unwrap();

            let full = [
                StageId::Obfuscation,
                StageId::DomainLock,
                StageId::DevToolsGuard,
                StageId::TamperSeal,
            ];
            let mut cursor = 0;
            for stage in artifact.manifest() {
                let pos = full[cursor..]
                    .iter()
                    .position(|s| s == stage)
                    .expect("manifest stage out of order");
                cursor += pos + 1;
            }
            prop_assert_eq!(artifact.manifest()[0], StageId::Obfuscation);
        }

        #[test]
        fn prop_payload_always_trails_the_guards(
            payload in payload_strategy(),
            domain in domain_strategy(),
            inject_runtime in any::<bool>(),
            tamper_check in any::<bool>(),
        ) {
            let pipeline = Pipeline::new(Box::new(MarkerEngine));
            let cfg = CloakConfig { domain, inject_runtime, tamper_check, ..Default::default() };
            let artifact = pipeline.run(&payload, &cfg).unwrap();
            let expected_tail = format!("<<{}>>", payload);
            prop_assert!(artifact.content().ends_with(&expected_tail));
        }

        #[test]
        fn prop_sealed_runs_are_reproducible(payload in payload_strategy()) {
            let cfg = CloakConfig {
                domain: Some("example.com".into()),
                inject_runtime: true,
                tamper_check: true,
                ..Default::default()
            };
            let a = Pipeline::new(Box::new(MarkerEngine)).run(&payload, &cfg).unwrap();
            let b = Pipeline::new(Box::new(MarkerEngine)).run(&payload, &cfg).unwrap();
            prop_assert_eq!(a.content(), b.content());
            prop_assert_eq!(a.manifest(), b.manifest());
        }

        #[test]
        fn prop_builtin_engine_accepts_bracket_free_text(payload in payload_strategy()) {
            prop_assume!(!payload.trim().is_empty());
            let opts = ObfuscationOptions {
                compact: false,
                control_flow_flattening: false,
                self_defending: false,
            };
            let out = JsObfuscator.apply(&payload, &opts).unwrap();
            prop_assert_eq!(out, payload);
        }
    }
}
