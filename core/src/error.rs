use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Unknown piece kind discriminant {0}")]
    UnknownPieceKind(u8),
}

/// Startup wiring failures. These are fatal and never retried.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required collaborator `{0}`")]
    MissingCollaborator(&'static str),
}

pub type Result<T> = core::result::Result<T, GameError>;
