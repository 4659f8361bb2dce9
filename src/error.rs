//! Error taxonomy shared by the ingestion and summarization services.

/// Whether a failure can be fixed by the caller changing their input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing, empty, oversized, or unsupported input. Reported as 400.
    Input,
    /// Parsing or provider failure that retrying the same input will not fix. Reported as 500.
    Processing,
}

impl ErrorClass {
    /// HTTP status code reported for this class.
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Input => 400,
            Self::Processing => 500,
        }
    }
}
