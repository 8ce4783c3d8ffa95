use crate::model::{Flag, FlagPath};

/// An owned snapshot of every declared flag, mirroring the scope tree.
/// Answers alias transparent path resolution once the registry itself has been consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FlagTree {
    flags: Vec<(Flag, Option<FlagTree>)>,
}

impl FlagTree {
    pub(crate) fn new(flags: Vec<(Flag, Option<FlagTree>)>) -> Self {
        Self { flags }
    }

    /// The canonical form (main names only) of `path`, or `None` when it does not resolve.
    pub(crate) fn canonical(&self, path: &FlagPath) -> Option<FlagPath> {
        let (terminal, groups) = path.segments().split_last()?;
        let mut tree = self;
        let mut canonical = FlagPath::default();

        for segment in groups {
            let (flag, inner) = tree.find(segment)?;
            canonical = canonical.child(flag.main());
            tree = inner.as_ref()?;
        }

        let (flag, _) = tree.find(terminal)?;
        Some(canonical.child(flag.main()))
    }

    fn find(&self, name: &str) -> Option<&(Flag, Option<FlagTree>)> {
        self.flags.iter().find(|(flag, _)| flag.contains(name))
    }
}
