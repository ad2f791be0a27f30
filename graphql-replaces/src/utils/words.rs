use regex::Regex;

/// Replaces whole-word occurrences of `word` in `text`, returning `None` when there are none.
///
/// Words are GraphQL names, so `id` matches in `"id kaid"` and `"course { id }"` but not in
/// `"kaid"` or `"idValue"`.
pub(crate) fn replace_whole_word(
    text: &str,
    word: &str,
    replacement: &str,
) -> Result<Option<String>, regex::Error> {
    let regex = Regex::new(&format!(r"\b{}\b", regex::escape(word)))?;
    if !regex.is_match(text) {
        return Ok(None);
    }
    Ok(Some(regex.replace_all(text, regex::NoExpand(replacement)).into_owned()))
}
