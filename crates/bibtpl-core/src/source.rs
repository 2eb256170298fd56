use crate::entry::Record;
use crate::error::Result;

/// A bibliographic source format.
///
/// Implementations turn raw source text into an ordered list of [`Record`]s.
/// The core never looks inside the source; everything it needs arrives
/// through this trait.
pub trait SourceParser: Send + Sync {
    /// Short identifier of the format, e.g. `"bibtex"`.
    fn name(&self) -> &'static str;

    /// Parse `source` into records, in source order.
    ///
    /// Malformed input fails with [`crate::error::BibTplError::Parse`].
    fn parse(&self, source: &str) -> Result<Vec<Record>>;
}

impl<P: SourceParser + ?Sized> SourceParser for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn parse(&self, source: &str) -> Result<Vec<Record>> {
        (**self).parse(source)
    }
}
