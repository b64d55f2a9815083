use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Symbolic name of a basic block
///
/// A label is a shared handle: cloning it does not copy the name, it hands out another
/// reference to the same name. A block and every jump targeting that block hold clones
/// of one handle, so [Label::rename] on any of them is observed by all of them.
#[derive(Clone)]
pub struct Label(Rc<RefCell<String>>);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(name.into())))
    }

    /// Current name of the label
    pub fn name(&self) -> String {
        self.0.borrow().clone()
    }

    /// Overwrite the name for every holder of this handle
    pub fn rename(&self, name: impl Into<String>) {
        *self.0.borrow_mut() = name.into();
    }

    /// Whether both handles refer to the same label (not just an equal name)
    pub fn same_as(&self, other: &Label) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Labels compare by their current name.
impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        *self.0.borrow() == *other.0.borrow()
    }
}

impl Eq for Label {}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({:?})", self.0.borrow())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.borrow().fmt(f)
    }
}

/// Hands out fresh labels `L0`, `L1`, ...
#[derive(Debug)]
pub struct LabelGenerator {
    prefix: String,
    next: usize,
}

impl LabelGenerator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    pub fn fresh(&mut self) -> Label {
        let label = Label::new(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        tracing::trace!(%label, "fresh label");
        label
    }
}

impl Default for LabelGenerator {
    fn default() -> Self {
        Self::with_prefix("L")
    }
}
