//! Top-level field layout of a decoded version

use chunkform_core::{Compound, Error, Result, TagKind};

/// Fields a version's root compound must carry, with their kinds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    required: Vec<(String, TagKind)>,
}

impl Layout {
    /// Layout with no requirements
    pub fn new() -> Self {
        Layout::default()
    }

    /// Require `field` to be present with `kind`
    pub fn require(mut self, field: impl Into<String>, kind: TagKind) -> Self {
        let field = field.into();
        match self.required.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = kind,
            None => self.required.push((field, kind)),
        }
        self
    }

    /// Required fields in declaration order
    pub fn fields(&self) -> &[(String, TagKind)] {
        &self.required
    }

    /// Whether the layout requires nothing
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Check `root` against the layout
    ///
    /// Fails with [`Error::StructuralMismatch`] naming the first missing or
    /// mistyped field.
    pub fn validate(&self, root: &Compound) -> Result<()> {
        for (field, kind) in &self.required {
            let found = root
                .get(field)
                .ok_or_else(|| Error::mismatch(format!("missing required field '{}'", field)))?
                .kind();
            if found != *kind {
                return Err(Error::mismatch(format!(
                    "field '{}' is {}, layout requires {}",
                    field, found, kind
                )));
            }
        }
        Ok(())
    }
}
