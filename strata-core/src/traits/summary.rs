use crate::errors::StrataResult;

/// Produces a short natural-language summary from member descriptions.
pub trait ISummaryProvider: Send + Sync {
    fn summarize(&self, texts: &[String]) -> StrataResult<String>;

    fn name(&self) -> &str;
}
