use uuid::Uuid;

/// Identifier assigned to a story by the persistence layer on creation.
pub type StoryId = Uuid;

/// Single authoritative holder of the story currently being written.
///
/// The buffer owns the accumulated body text plus the story's identity: a
/// pending name (supplied before the first contribution) and the id the
/// store assigns once the story actually exists. Exactly one story is
/// active system-wide; finishing it resets the buffer to the blank state.
#[derive(Debug, Clone, Default)]
pub struct StoryBuffer {
    body: String,
    name: Option<String>,
    id: Option<StoryId>,
}

impl StoryBuffer {
    /// Create an empty buffer with no active story.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an accepted contribution to the body text.
    ///
    /// A single separating space is inserted when the buffer is non-empty
    /// and does not already end in whitespace. Empty `text` leaves the
    /// buffer untouched.
    pub fn append_contribution(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.body.is_empty() && !self.body.ends_with(char::is_whitespace) {
            self.body.push(' ');
        }
        self.body.push_str(text);
    }

    /// Clear the body text and unset the story name and id.
    pub fn reset(&mut self) {
        self.body.clear();
        self.name = None;
        self.id = None;
    }

    /// The accumulated body text.
    pub fn current_text(&self) -> &str {
        &self.body
    }

    /// Whether a story has been created in the store.
    pub fn is_story_active(&self) -> bool {
        self.id.is_some()
    }

    /// Whether a name has been supplied for the (pending or created) story.
    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    /// Name of the pending or created story, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Store-assigned id of the created story, if any.
    pub fn id(&self) -> Option<StoryId> {
        self.id
    }

    /// Supply the name the next created story will carry.
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Record the id the store assigned at first contribution.
    pub(crate) fn mark_created(&mut self, id: StoryId) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_separates_with_single_space() {
        let mut buffer = StoryBuffer::new();
        buffer.append_contribution("Once upon");
        buffer.append_contribution("a time");
        assert_eq!(buffer.current_text(), "Once upon a time");
    }

    #[test]
    fn append_skips_separator_after_whitespace() {
        let mut buffer = StoryBuffer::new();
        buffer.append_contribution("line one\n");
        buffer.append_contribution("line two");
        assert_eq!(buffer.current_text(), "line one\nline two");
    }

    #[test]
    fn empty_append_is_a_no_op() {
        let mut buffer = StoryBuffer::new();
        buffer.append_contribution("text");
        buffer.append_contribution("");
        assert_eq!(buffer.current_text(), "text");
    }

    #[test]
    fn reset_clears_text_and_identity() {
        let mut buffer = StoryBuffer::new();
        buffer.set_name("A story".into());
        buffer.mark_created(Uuid::new_v4());
        buffer.append_contribution("hello");

        buffer.reset();

        assert_eq!(buffer.current_text(), "");
        assert!(!buffer.is_story_active());
        assert!(!buffer.has_name());
        assert!(buffer.id().is_none());
    }

    #[test]
    fn name_and_id_are_set_independently() {
        let mut buffer = StoryBuffer::new();
        assert!(!buffer.is_story_active());

        buffer.set_name("Night shift".into());
        assert!(buffer.has_name());
        assert!(!buffer.is_story_active());

        buffer.mark_created(Uuid::new_v4());
        assert!(buffer.is_story_active());
        assert_eq!(buffer.name(), Some("Night shift"));
    }
}
