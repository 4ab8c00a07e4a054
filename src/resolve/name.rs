//! Test name composition

/// Prefix marking a generated test name
pub const NAME_MARKER: &str = "test: ";

/// Compose a full test name from the context descriptions (root first) and
/// the test description. Empty descriptions contribute nothing.
pub fn compose_name<'a, I>(contexts: I, test: &'a str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let parts: Vec<&str> = contexts
        .into_iter()
        .chain(std::iter::once(test))
        .filter(|part| !part.is_empty())
        .collect();
    format!("{NAME_MARKER}{}", parts.join(" "))
}
