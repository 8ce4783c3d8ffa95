use crate::error::{Diagnostic, ErrorKind};

/// A single recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    text: String,
    position: usize,
    kind: ErrorKind,
}

impl ErrorMessage {
    pub(crate) fn new(position: usize, error: &impl Diagnostic) -> Self {
        Self {
            text: error.to_string(),
            position,
            kind: error.kind(),
        }
    }

    /// The human readable message.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The byte offset into the input to which this message is attributed.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The discriminator of this message.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// An entry of an [`ErrorGroup`]: either a flat message, or a nested group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorEntry {
    /// A flat message.
    Message(ErrorMessage),
    /// A nested group, covering a lexical range of the input.
    Group(ErrorGroup),
}

impl ErrorEntry {
    fn start(&self) -> usize {
        match self {
            ErrorEntry::Message(message) => message.position,
            ErrorEntry::Group(group) => group.start,
        }
    }

    fn end(&self) -> usize {
        match self {
            ErrorEntry::Message(message) => message.position.saturating_add(1),
            ErrorEntry::Group(group) => group.end,
        }
    }
}

/// A position-ordered, hierarchically nestable diagnostic container.
///
/// Entries are kept sorted by their start position.
/// Inserting an item whose range lies fully inside the preceding sub-group places it inside that sub-group.
/// Inserting a sub-group adopts every sibling that lies fully inside its `[start, end)` range.
/// The result is that diagnostics nest by lexical scope regardless of the order in which they are recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorGroup {
    name: String,
    start: usize,
    end: usize,
    entries: Vec<ErrorEntry>,
    has_errors: bool,
}

impl ErrorGroup {
    /// Create a group covering the entire input.
    pub(crate) fn root(name: impl Into<String>) -> Self {
        Self::new(name, 0, usize::MAX)
    }

    /// Create a group covering `[start, end)`.
    pub(crate) fn new(name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            entries: Vec::default(),
            has_errors: false,
        }
    }

    /// The name of this group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The start (inclusive) of the lexical range of this group.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The end (exclusive) of the lexical range of this group.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The position-ordered entries directly within this group.
    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// Whether any message was recorded into this group, or any of its sub-groups.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Every message of this group and its sub-groups, in document order.
    pub fn messages(&self) -> Vec<&ErrorMessage> {
        let mut out = Vec::default();
        self.collect_messages(&mut out);
        out
    }

    /// The number of messages within this group and its sub-groups.
    pub fn count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                ErrorEntry::Message(_) => 1,
                ErrorEntry::Group(group) => group.count(),
            })
            .sum()
    }

    /// Every message of the given kind, in document order.
    pub fn of_kind(&self, kind: ErrorKind) -> Vec<&ErrorMessage> {
        self.messages()
            .into_iter()
            .filter(|message| message.kind == kind)
            .collect()
    }

    fn collect_messages<'g>(&'g self, out: &mut Vec<&'g ErrorMessage>) {
        for entry in &self.entries {
            match entry {
                ErrorEntry::Message(message) => out.push(message),
                ErrorEntry::Group(group) => group.collect_messages(out),
            }
        }
    }

    fn contains(&self, start: usize, end: usize) -> bool {
        self.start <= start && end <= self.end
    }

    fn insertion_index(&self, start: usize) -> usize {
        self.entries.partition_point(|entry| entry.start() <= start)
    }

    /// Record a stage error at `position`.
    pub(crate) fn add(&mut self, position: usize, error: &impl Diagnostic) {
        self.insert_message(ErrorMessage::new(position, error));
    }

    pub(crate) fn insert_message(&mut self, message: ErrorMessage) {
        self.has_errors = true;
        let index = self.insertion_index(message.position);

        if let Some(ErrorEntry::Group(previous)) = index
            .checked_sub(1)
            .and_then(|i| self.entries.get_mut(i))
        {
            if previous.contains(message.position, message.position.saturating_add(1)) {
                previous.insert_message(message);
                return;
            }
        }

        self.entries.insert(index, ErrorEntry::Message(message));
    }

    /// Insert a sub-group.
    /// A sub-group which ends up without any errors (after adopting its siblings) is discarded.
    pub(crate) fn insert_group(&mut self, mut group: ErrorGroup) {
        let index = self.insertion_index(group.start);

        if let Some(ErrorEntry::Group(previous)) = index
            .checked_sub(1)
            .and_then(|i| self.entries.get_mut(i))
        {
            if previous.contains(group.start, group.end) {
                previous.insert_group(group);
                self.has_errors |= previous.has_errors;
                return;
            }
        }

        let (adopted, kept): (Vec<ErrorEntry>, Vec<ErrorEntry>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| group.contains(entry.start(), entry.end()));
        self.entries = kept;

        for entry in adopted {
            match entry {
                ErrorEntry::Message(message) => group.insert_message(message),
                ErrorEntry::Group(inner) => group.insert_group(inner),
            }
        }

        if group.has_errors {
            self.has_errors = true;
            let index = self.insertion_index(group.start);
            self.entries.insert(index, ErrorEntry::Group(group));
        }
    }

    fn render(&self, indent: usize, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            match entry {
                ErrorEntry::Message(message) => {
                    writeln!(f, "{:indent$}[{}] {}", "", message.position, message.text)?;
                }
                ErrorEntry::Group(group) => {
                    writeln!(f, "{:indent$}{}:", "", group.name)?;
                    group.render(indent + 2, f)?;
                }
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for ErrorGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}:", self.name)?;
        self.render(2, f)
    }
}
