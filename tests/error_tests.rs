use script_cloak::errors::AppError;
use script_cloak::obfuscator::ObfuscationError;
use script_cloak::pipeline::{PipelineError, StageId};

#[test]
fn app_error_from_pipeline_obfuscation() {
    let app: AppError = PipelineError::from(ObfuscationError::Empty).into();
    assert!(matches!(
        app,
        AppError::Pipeline(PipelineError::Obfuscation(ObfuscationError::Empty))
    ));
}

#[test]
fn app_error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let app: AppError = io_err.into();
    assert!(matches!(app, AppError::Io(_)));
}

#[test]
fn pipeline_error_reports_failing_stage() {
    let err = PipelineError::Guard {
        stage: StageId::TamperSeal,
        reason: "no digest".into(),
    };
    assert_eq!(err.stage(), StageId::TamperSeal);
    assert_eq!(err.to_string(), "tamper-seal stage failed: no digest");

    let err: PipelineError = ObfuscationError::Unparseable("bad".into()).into();
    assert_eq!(err.stage(), StageId::Obfuscation);
}
