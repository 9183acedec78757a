//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{DomainError, ErrorKind};
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::Domain(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::SceneNotFound(_) => exitcode::NOINPUT,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(d) => match d.kind() {
                        ErrorKind::MissingSelection => exitcode::USAGE,
                        _ => exitcode::DATAERR,
                    },
                    ApplicationError::SceneFormat { .. } => exitcode::DATAERR,
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SelectionSlot;

    #[test]
    fn given_missing_selection_when_mapping_exit_code_then_usage() {
        let err: CliError = DomainError::MissingSelection(SelectionSlot::RootBone).into();
        assert_eq!(err.exit_code(), exitcode::USAGE);
    }

    #[test]
    fn given_root_bone_not_found_when_mapping_exit_code_then_dataerr() {
        let err: CliError = DomainError::RootBoneNotFound {
            bone: "root".into(),
            armature: "Rig".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exitcode::DATAERR);
        assert_eq!(
            err.to_string(),
            "root bone 'root' not found in parent armature 'Rig'"
        );
    }

    #[test]
    fn given_missing_scene_when_mapping_exit_code_then_noinput() {
        let err = CliError::Infra(InfraError::SceneNotFound("x.toml".into()));
        assert_eq!(err.exit_code(), exitcode::NOINPUT);
    }
}
