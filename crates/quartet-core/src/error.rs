//! Error taxonomy for the generation and guess boundaries.

use thiserror::Error;

/// Failure of a single metadata lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The identifier (or scope unit) is absent from the catalog
    #[error("{0} not found in catalog")]
    NotFound(String),
    /// The lookup failed or timed out and may succeed later
    #[error("transient catalog failure: {0}")]
    Transient(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

/// Failure of a board generation attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The scope yielded too few usable identifiers
    #[error("candidate pool too small: found {found}, need {required}")]
    InsufficientPool { found: usize, required: usize },
    /// A newer generation started before this one finished
    #[error("generation superseded by a newer request")]
    Superseded,
    /// Groups must hold at least one item and a board at least one group
    #[error("invalid board shape: {group_count} groups of {group_size}")]
    InvalidShape { group_size: usize, group_count: usize },
}

/// Rejected guess submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuessError {
    #[error("wrong number of items in guess: {got}")]
    InvalidSelectionSize { got: usize },
    #[error("{0} is not on the board")]
    UnknownItem(String),
    #[error("{0} is already locked")]
    AlreadyLocked(String),
    #[error("the board has been revealed")]
    BoardRevealed,
}

/// Rejected selection toggle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("selection is full")]
    SelectionFull,
    #[error("no board entry at position {0}")]
    OutOfRange(usize),
    #[error("the board has been revealed")]
    BoardRevealed,
    #[error("the puzzle is already solved")]
    GameWon,
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(reqwest::StatusCode::NOT_FOUND) => {
                let what = err
                    .url()
                    .and_then(|url| url.path_segments()?.last().map(str::to_string))
                    .unwrap_or_default();
                ProviderError::NotFound(what)
            }
            _ => ProviderError::Transient(err.to_string()),
        }
    }
}
