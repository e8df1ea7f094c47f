use std::{cell::RefCell, collections::HashMap, fmt::Display};

use super::{CompilerDisplay, CompilerDisplayError};

#[derive(Debug, PartialEq)]
pub enum StringTableError {
    NotFound,
}

impl Display for StringTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StringTableError::NotFound => f.write_str("StringId Not Found"),
        }
    }
}

/**
Stores a table of all distinct strings seen by the compiler: type names,
typedef aliases, field names, address space names, cross reference names and
the free variables of C expressions.  The IR refers to each distinct string
by its [`StringId`]; resolution passes compare ids instead of text.

Adding a string that is already in the table returns the id it was first
assigned; otherwise the string is added and given a fresh id.
 */
#[derive(Debug, Default)]
pub struct StringTable {
    /// The next unique [`StringId`] which has not been assigned to a string
    next_id: RefCell<StringId>,

    /// Table mapping raw strings to their [`StringId`]s
    table: RefCell<HashMap<String, StringId>>,
}

impl StringTable {
    pub fn new() -> StringTable {
        StringTable {
            next_id: RefCell::new(StringId::new()),
            table: RefCell::new(HashMap::new()),
        }
    }

    /// Inserts a string into the table and returns the assigned ID for that
    /// string value.  If the string is already in the table, then this will
    /// simply return the already assigned ID for that string.
    pub fn insert(&self, s: String) -> StringId {
        let mut table = self.table.borrow_mut();
        *table
            .entry(s)
            .or_insert_with(|| self.next_id.borrow_mut().get_and_inc())
    }

    /// Search the string table for the given string and, if found, return
    /// the associated [`StringId`].
    pub fn find(&self, s: &str) -> Option<StringId> {
        let table = self.table.borrow();
        table.get(s).copied()
    }

    /// Given an ID, if it is assigned to a string, then return the
    /// associated string, otherwise return an error.
    pub fn get(&self, id: StringId) -> Result<String, StringTableError> {
        let table = self.table.borrow();
        for s in table.iter() {
            if *s.1 == id {
                return Ok(s.0.clone());
            }
        }

        Err(StringTableError::NotFound)
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Default, Hash, Eq, PartialOrd, Ord)]
pub struct StringId(u32);

impl StringId {
    /// Create a new String ID and initialize it to 0
    pub fn new() -> StringId {
        Self::default()
    }

    /// Increment by one and return the value of the ID before the increment.
    fn get_and_inc(&mut self) -> StringId {
        let old = *self;
        self.0 += 1;
        old
    }
}

impl CompilerDisplay for StringId {
    fn fmt(&self, st: &StringTable) -> Result<String, CompilerDisplayError> {
        st.get(*self).map_err(|e| e.into())
    }
}

impl std::fmt::Display for StringId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}", self.0))
    }
}
