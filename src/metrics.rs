use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use crate::pipeline::StageId;

pub struct Metrics {
    pub runs_total: IntCounter,
    pub runs_failed: IntCounter,
    pub stages_applied: IntCounterVec,
}

impl Metrics {
    pub fn new(registry: &Registry) -> Self {
        let runs_total =
            IntCounter::new("cloak_runs_total", "Completed pipeline runs").unwrap();
        let runs_failed =
            IntCounter::new("cloak_runs_failed", "Aborted pipeline runs").unwrap();
        let stages_applied = IntCounterVec::new(
            Opts::new("cloak_stages_applied", "Stage applications by stage"),
            &["stage"],
        )
        .unwrap();
        registry.register(Box::new(runs_total.clone())).unwrap();
        registry.register(Box::new(runs_failed.clone())).unwrap();
        registry.register(Box::new(stages_applied.clone())).unwrap();
        Self {
            runs_total,
            runs_failed,
            stages_applied,
        }
    }

    pub fn record_manifest(&self, manifest: &[StageId]) {
        for stage in manifest {
            self.stages_applied
                .with_label_values(&[&stage.to_string()])
                .inc();
        }
    }
}
