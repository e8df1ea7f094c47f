use super::{CompilerDisplay, CompilerDisplayError, StringTable};

/// Represents all errors that are generated from within the compiler
/// module and its submodules.
///
/// This type captures the metadata which is common to every error caused by
/// user input: the source line the offending annotation appeared on, when
/// one is available.  Resolution-phase errors concern relationships between
/// declarations rather than a single annotation and carry no line.
///
/// The inner error is specific to the submodule that raised it and is
/// stored in the `inner` field.
#[derive(Clone, Debug, PartialEq)]
pub struct CompilerError<IE: CompilerDisplay> {
    line: Option<u32>,
    inner: IE,
}

impl<IE> CompilerError<IE>
where
    IE: CompilerDisplay,
{
    pub fn new(line: Option<u32>, inner: IE) -> Self {
        CompilerError { line, inner }
    }

    pub fn inner(self) -> IE {
        self.inner
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

impl<IE> CompilerDisplay for CompilerError<IE>
where
    IE: CompilerDisplay,
{
    fn fmt(&self, st: &StringTable) -> Result<String, CompilerDisplayError> {
        let inner = self.inner.fmt(st)?;
        match self.line {
            Some(line) => Ok(format!("Line {}: Error, {}", line, inner)),
            None => Ok(format!("Error, {}", inner)),
        }
    }
}
