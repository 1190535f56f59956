use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Batch cancelled")]
    Cancelled,
}
