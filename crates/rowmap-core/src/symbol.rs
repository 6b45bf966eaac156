//! Symbolic enum support.

/// A fieldless enum stored as symbol text in a column.
///
/// Symbol matching is exact and case-sensitive. A cell value matching no
/// symbol fails the whole row, never silently defaults.
pub trait Symbolic: Sized + Send + 'static {
    /// All symbols, in declaration order.
    const SYMBOLS: &'static [&'static str];

    /// Resolve symbol text to a variant.
    fn from_symbol(symbol: &str) -> Option<Self>;

    /// This variant's symbol text.
    fn symbol(&self) -> &'static str;
}
