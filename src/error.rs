use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LandingError {
    #[error("unknown scenario '{0}', expected realistic, optimistic or conservative")]
    UnknownScenario(String),
    #[error("unknown formula variant '{0}', expected return-only or with-principal")]
    UnknownVariant(String),
    #[error("unknown currency format '{0}', expected dollar or real")]
    UnknownCurrencyFormat(String),
    #[error("unknown element kind '{0}'")]
    UnknownElementKind(String),
    #[error("unknown session action '{0}'")]
    UnknownSessionAction(String),
    #[error("invalid root margin '{0}', expected 1 to 4 pixel values")]
    InvalidRootMargin(String),
    #[error("threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}
