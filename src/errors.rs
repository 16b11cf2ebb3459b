use thiserror::Error;

/// Error taxonomy for the matching engine and book manager.
///
/// `InsufficientLiquidity` is deliberately absent here: it is a market-normal
/// outcome (a market order exhausted the book), not an exceptional one, so it
/// rides along on the success path as a flag on [`crate::orderbook::SubmitOutcome`]
/// instead of aborting a `Result`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("order id '{0}' already exists")]
    DuplicateId(String),

    #[error("bad order: {0}")]
    BadOrder(String),

    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    #[error("order '{0}' not found")]
    NotFound(String),
}
