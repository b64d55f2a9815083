use std::fmt;

/// A virtual register of the generated IR, printed as `%name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Register(String);

impl Register {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Register holding the incoming value of the parameter `name`
    pub fn argument(name: &str) -> Self {
        Self(format!(".arg_{name}"))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Hands out fresh registers `%.r0`, `%.r1`, ...
///
/// One generator is used for the whole program, so register names are unique across
/// functions and never reused. The leading dot keeps them apart from variables, whose
/// names never start with one.
#[derive(Debug, Default)]
pub struct RegisterGenerator(usize);

impl RegisterGenerator {
    pub fn fresh(&mut self) -> Register {
        let register = Register(format!(".r{}", self.0));
        self.0 += 1;
        tracing::trace!(%register, "fresh register");
        register
    }
}
