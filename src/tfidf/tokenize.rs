//! Tokenizers for the two TF-IDF granularities
//!
//! Word tokens drive search-keyword extraction; non-letter character tokens
//! fingerprint a file's punctuation structure, which survives wholesale
//! identifier renaming.

/// Split on every non-alphanumeric character, dropping empties.
pub fn tokenize_words(input: &str) -> Vec<String> {
    input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Emit each non-letter character as its own single-rune token; letters are
/// dropped entirely.
pub fn tokenize_non_letter_chars(input: &str) -> Vec<String> {
    input
        .chars()
        .filter(|c| !c.is_alphabetic())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_punctuation_and_whitespace() {
        assert_eq!(
            tokenize_words("let x = foo(bar, 2);"),
            vec!["let", "x", "foo", "bar", "2"]
        );
    }

    #[test]
    fn words_of_empty_input() {
        assert!(tokenize_words("").is_empty());
        assert!(tokenize_words("  \t\n").is_empty());
    }

    #[test]
    fn char_tokens_keep_only_non_letters() {
        assert_eq!(
            tokenize_non_letter_chars("a+b=1;"),
            vec!["+", "=", "1", ";"]
        );
    }

    #[test]
    fn char_tokens_include_whitespace_and_digits() {
        assert_eq!(
            tokenize_non_letter_chars("if x1 {\n}"),
            vec![" ", "1", " ", "{", "\n", "}"]
        );
    }

    #[test]
    fn char_tokens_respect_unicode_letters() {
        // 'é' and 'ß' are letters; '€' is not
        assert_eq!(tokenize_non_letter_chars("éß€"), vec!["€"]);
    }
}
