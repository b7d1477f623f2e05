use chrono::Utc;

/// Live transcript assembled from transcription fragments
///
/// Fragments are joined with a single space in arrival order. Nothing is
/// reordered or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
    fragments: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fragment
    pub fn push(&mut self, fragment: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(fragment);
        self.fragments += 1;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.fragments = 0;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of fragments appended since the last clear
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Room name for a connect attempt
///
/// Uses the trimmed requested name, or `<prefix>-<unix millis>` when the
/// request is absent or blank.
pub fn resolve_room_name(requested: Option<&str>, prefix: &str) -> String {
    match requested.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{}-{}", prefix, Utc::now().timestamp_millis()),
    }
}
