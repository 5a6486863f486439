use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolarnetError {
    /// Two attributes from a mutually exclusive category were AND-ed together.
    #[error("Incompatible attributes combined: {left} & {right}")]
    IncompatibleAttrs { left: String, right: String },

    #[error("No creator registered for attribute type `{0}`")]
    NoCreator(String),

    #[error("No applier registered for attribute type `{0}`")]
    NoApplier(String),

    #[error("Cannot negate attribute `{0}`")]
    UnsupportedNegation(String),

    #[error("Signature of condition must match signature of handler `{0}`")]
    SignatureMismatch(String),

    /// Some entry matched the call shape, but every matching condition was false.
    #[error("Input did not fulfill the condition for any handler")]
    NoMatchingCondition,

    /// No registered entry accepts the call shape at all.
    #[error("No handler matches the input parameter signature")]
    NoMatchingSignature,

    #[error("Handler `{0}` cannot be called with the given arguments")]
    BadCall(String),

    #[error("Invalid time: {0}")]
    Time(String),

    #[error("Row error: {0}")]
    Row(String),

    #[error("Time series error: {0}")]
    TimeSeries(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

impl SolarnetError {
    /// True for both kinds of dispatch miss.
    pub fn is_dispatch_miss(&self) -> bool {
        matches!(
            self,
            SolarnetError::NoMatchingCondition | SolarnetError::NoMatchingSignature
        )
    }
}

pub type Result<T> = std::result::Result<T, SolarnetError>;
