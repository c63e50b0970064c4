// src/core/speech.rs

/// Something that can read material aloud.
pub trait Speaker {
    fn say(&mut self, utterance: &str);
    /// Stops anything still queued.
    fn cancel(&mut self);
}

/// Punctuation is spoken by name so it is audible.
pub fn spoken_form(phrase: &str) -> &str {
    match phrase {
        "," => "comma",
        ":" => "colon",
        "." => "full stop",
        ")" => "closing bracket",
        "!" => "exclamation mark",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_is_named() {
        assert_eq!(spoken_form("."), "full stop");
        assert_eq!(spoken_form("!"), "exclamation mark");
        assert_eq!(spoken_form("cat"), "cat");
        assert_eq!(spoken_form(". "), ". ");
    }
}
