use std::fmt;

/// List and non-null wrapping of a named type. Non-null never exists as a
/// separate plan node: whoever consumes a value consults the wrapping to
/// decide whether an error at that position is contained or propagates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapping {
    inner_is_required: bool,
    /// Innermost list first, outermost last.
    list_wrappings: Vec<ListWrapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListWrapping {
    List,
    ListNonNull,
}

impl Wrapping {
    pub fn nullable() -> Self {
        Wrapping {
            inner_is_required: false,
            list_wrappings: Vec::new(),
        }
    }

    pub fn required() -> Self {
        Wrapping {
            inner_is_required: true,
            list_wrappings: Vec::new(),
        }
    }

    #[must_use]
    pub fn wrap_list(mut self) -> Self {
        self.list_wrappings.push(ListWrapping::List);
        self
    }

    #[must_use]
    pub fn wrap_list_non_null(mut self) -> Self {
        self.list_wrappings.push(ListWrapping::ListNonNull);
        self
    }

    /// Whether the outermost position rejects null.
    pub fn is_required(&self) -> bool {
        match self.list_wrappings.last() {
            Some(ListWrapping::ListNonNull) => true,
            Some(ListWrapping::List) => false,
            None => self.inner_is_required,
        }
    }

    pub fn is_nullable(&self) -> bool {
        !self.is_required()
    }

    pub fn is_list(&self) -> bool {
        !self.list_wrappings.is_empty()
    }

    pub fn list_depth(&self) -> usize {
        self.list_wrappings.len()
    }

    pub(crate) fn to_mutable(&self) -> MutableWrapping {
        MutableWrapping {
            inner_is_required: self.inner_is_required,
            list_wrappings: self.list_wrappings.clone(),
        }
    }

    pub(crate) fn type_display<'a>(&'a self, name: &'a str) -> impl fmt::Display + 'a {
        WrappingDisplay { wrapping: self, name }
    }
}

/// A wrapping being peeled during execution: each list iteration pops the
/// outermost list wrapping, what remains applies to the elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MutableWrapping {
    inner_is_required: bool,
    list_wrappings: Vec<ListWrapping>,
}

impl MutableWrapping {
    pub fn pop_outermost_list_wrapping(&mut self) -> Option<ListWrapping> {
        self.list_wrappings.pop()
    }

    pub fn is_required(&self) -> bool {
        match self.list_wrappings.last() {
            Some(ListWrapping::ListNonNull) => true,
            Some(ListWrapping::List) => false,
            None => self.inner_is_required,
        }
    }

    pub fn is_nullable(&self) -> bool {
        !self.is_required()
    }
}

struct WrappingDisplay<'a> {
    wrapping: &'a Wrapping,
    name: &'a str,
}

impl fmt::Display for WrappingDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in &self.wrapping.list_wrappings {
            f.write_str("[")?;
        }
        f.write_str(self.name)?;
        if self.wrapping.inner_is_required {
            f.write_str("!")?;
        }
        for list_wrapping in &self.wrapping.list_wrappings {
            f.write_str("]")?;
            if matches!(list_wrapping, ListWrapping::ListNonNull) {
                f.write_str("!")?;
            }
        }
        Ok(())
    }
}
