/// Lowercase, strip every character that is neither alphanumeric nor
/// whitespace, split on whitespace. Queries and chunks go through the same
/// function; there is no stemming and no stop-word list.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}
