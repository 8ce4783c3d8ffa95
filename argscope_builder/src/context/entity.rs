use crate::api::InvalidCapture;
use crate::context::{Context, ResolvedConfig};
use crate::model::{Flag, Nargs};

/// Behaviour to capture text into a (type erased) caller variable.
///
/// The binder drives each occurrence as `begin`, then one `capture` per value, and `finish` once parsing completes.
pub(crate) trait AnonymousCapturable {
    /// Declare that a new occurrence of the entity begins.
    fn begin(&mut self);

    /// Convert and capture a value for the current occurrence.
    fn capture(&mut self, value: &str, config: &ResolvedConfig) -> Result<(), InvalidCapture>;

    /// Commit the buffered occurrence into the caller variable.
    fn finish(&mut self);

    /// The value used when the entity appears without one (ex: boolean switches).
    fn implicit(&self) -> Option<&'static str>;

    /// `None` for single value entities.
    fn nargs(&self) -> Option<Nargs>;

    /// Whether a positional slot of this kind must receive a value.
    fn required(&self) -> bool;
}

/// The user facing documentation of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Documentation {
    pub help: Option<String>,
    pub meta: Option<Vec<String>>,
}

/// A value storage slot, with its "is set" bookkeeping.
///
/// A slot only counts as set once a value of an occurrence has been captured.
pub(crate) struct Slot<'a> {
    capture: Box<dyn AnonymousCapturable + 'a>,
    occurred_at: Option<usize>,
    set_at: Option<usize>,
}

impl<'a> Slot<'a> {
    pub(crate) fn new(capture: Box<dyn AnonymousCapturable + 'a>) -> Self {
        Self {
            capture,
            occurred_at: None,
            set_at: None,
        }
    }

    /// Start a new occurrence at `position`.
    pub(crate) fn begin(&mut self, position: usize) {
        self.capture.begin();
        self.occurred_at.replace(position);

        // A multi value occurrence discards the values buffered before it.
        if self.capture.nargs().is_some() {
            self.set_at = None;
        }
    }

    pub(crate) fn capture(
        &mut self,
        value: &str,
        config: &ResolvedConfig,
    ) -> Result<(), InvalidCapture> {
        self.capture.capture(value, config)?;
        self.set_at = self.occurred_at;
        Ok(())
    }

    pub(crate) fn finish(&mut self) {
        if self.set_at.is_some() {
            self.capture.finish();
        }
    }

    pub(crate) fn implicit(&self) -> Option<&'static str> {
        self.capture.implicit()
    }

    pub(crate) fn nargs(&self) -> Option<Nargs> {
        self.capture.nargs()
    }

    pub(crate) fn required(&self) -> bool {
        self.capture.required()
    }

    /// The position of the latest occurrence which captured a value.
    pub(crate) fn set_at(&self) -> Option<usize> {
        self.set_at
    }

    /// Whether the slot appeared at all, captured or not.
    pub(crate) fn occurred(&self) -> bool {
        self.occurred_at.is_some()
    }
}

impl<'a> std::fmt::Debug for Slot<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slot[{:?}, set_at: {:?}]", self.nargs(), self.set_at)
    }
}

/// The discriminator of a declared entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntityKind {
    SingleValued,
    MultiValued,
    Group,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::SingleValued => write!(f, "single value option"),
            EntityKind::MultiValued => write!(f, "multi value option"),
            EntityKind::Group => write!(f, "group"),
        }
    }
}

/// A flag addressable entity of a scope.
#[derive(Debug)]
pub(crate) enum Entity<'a> {
    Single(Slot<'a>),
    Multi(Slot<'a>, Nargs),
    Group {
        scope: Box<Context<'a>>,
        set_at: Option<usize>,
    },
}

impl<'a> Entity<'a> {
    pub(crate) fn kind(&self) -> EntityKind {
        match self {
            Entity::Single(_) => EntityKind::SingleValued,
            Entity::Multi(_, _) => EntityKind::MultiValued,
            Entity::Group { .. } => EntityKind::Group,
        }
    }

    /// The position of the latest occurrence, if any.
    pub(crate) fn set_at(&self) -> Option<usize> {
        match self {
            Entity::Single(slot) | Entity::Multi(slot, _) => slot.set_at(),
            Entity::Group { set_at, .. } => *set_at,
        }
    }
}

/// A flag declared within a scope.
#[derive(Debug)]
pub(crate) struct Declared<'a> {
    pub flag: Flag,
    pub documentation: Documentation,
    pub entity: Entity<'a>,
}

/// A positional slot declared within a scope.
#[derive(Debug)]
pub(crate) struct PositionalSlot<'a> {
    pub name: String,
    pub documentation: Documentation,
    pub slot: Slot<'a>,
}
