use terminal_size::{terminal_size, Width};

use crate::runtime::ErrorContext;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

// We'll target 95% of the total width, to ensure the interface doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
pub(crate) const MINIMUM_WIDTH: usize = 17;

/// Wrap `paragraph` into lines of at most `width` characters.
/// Words longer than the width are hyphenated.
pub(crate) fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let width = std::cmp::max(width, 2);
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ') {
        if !word.is_empty() {
            if current.is_empty() {
                hyphenate(width, &mut lines, &mut current, word);
            } else if current.chars().count() + word.chars().count() < width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = String::default();
                hyphenate(width, &mut lines, &mut current, word);
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let increment = width - 1;
    let mut left = 0;
    let mut right = increment;

    while right + 1 < characters.len() {
        let part: String = characters[left..right].iter().collect();
        lines.push(format!("{part}-"));
        left += increment;
        right += increment;
    }

    current.extend(&characters[left..]);
}

/// Wrap a (possibly indented) message, keeping its indentation on every line.
pub(crate) fn wrap(message: &str, total_width: Option<usize>) -> Vec<String> {
    let Some(total_width) = total_width else {
        return vec![message.to_string()];
    };

    let body = message.trim_start_matches(' ');
    let indent = message.len() - body.len();
    let target = (total_width as f64 * TARGET_TOTAL_FACTOR) as usize;
    let width = std::cmp::max(target.saturating_sub(indent), MINIMUM_WIDTH);

    #[cfg(feature = "tracing_debug")]
    {
        debug!("Wrapping message to width {width} (indent {indent}, total {total_width}).");
    }

    chunk(body, width)
        .into_iter()
        .map(|line| format!("{:indent$}{line}", ""))
        .collect()
}

pub(crate) trait UserInterface {
    fn print(&self, message: String);
    fn print_error(&self, error: String);
    fn print_error_context(&self, error_context: ErrorContext);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {
    terminal_width: Option<usize>,
}

impl ConsoleInterface {
    pub(crate) fn terminal() -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self { terminal_width }
    }
}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: String) {
        for line in wrap(&error, self.terminal_width) {
            eprintln!("{line}");
        }
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }
}
