use crate::scanner::Token;

/// A piece of input text, with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Located {
    pub text: String,
    pub position: usize,
}

impl Located {
    pub(crate) fn new(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

impl From<Token> for Located {
    fn from(value: Token) -> Self {
        Located::new(value.text, value.position)
    }
}

/// One parsed unit ("bundle") of a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Option {
        flag: Located,
        value: Located,
    },
    MultiOption {
        flag: Located,
        values: Vec<Located>,
    },
    Positional {
        value: Located,
    },
    Group {
        flag: Located,
        children: Vec<Node>,
        // [position of '[', position past ']')
        span: (usize, usize),
    },
}

impl Node {
    /// The flag of this node, if it is not a positional.
    pub(crate) fn flag(&self) -> Option<&Located> {
        match self {
            Node::Option { flag, .. } | Node::MultiOption { flag, .. } | Node::Group { flag, .. } => {
                Some(flag)
            }
            Node::Positional { .. } => None,
        }
    }

    #[cfg(any(test, feature = "tracing_debug"))]
    fn count(&self) -> usize {
        match self {
            Node::Group { children, .. } => 1 + children.iter().map(Node::count).sum::<usize>(),
            _ => 1,
        }
    }
}

/// The syntax tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Statement {
    pub nodes: Vec<Node>,
    // The input length.
    pub end: usize,
}

impl Statement {
    /// The number of nodes in the whole tree.
    #[cfg(any(test, feature = "tracing_debug"))]
    pub(crate) fn count(&self) -> usize {
        self.nodes.iter().map(Node::count).sum()
    }
}
