use derive_more::Display;

pub type Result<T> = std::result::Result<T, HuffmanError>;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum HuffmanError {
    #[display(fmt = "cannot build a codec from empty input")]
    EmptyInput,

    #[display(fmt = "no code for byte {:#04x}", _0)]
    MissingCode(u8),

    #[display(fmt = "malformed stream: {}", _0)]
    MalformedStream(String),

    #[display(fmt = "metadata mismatch: {}", _0)]
    MetadataMismatch(String),
}

impl std::error::Error for HuffmanError {}

impl HuffmanError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        HuffmanError::MalformedStream(reason.into())
    }

    pub(crate) fn metadata(reason: impl Into<String>) -> Self {
        HuffmanError::MetadataMismatch(reason.into())
    }
}
