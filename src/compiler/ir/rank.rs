use std::fmt::Display;

/// The structural lattice a metadata type occupies.  Rank governs what a
/// type may embed and which pointer representations may refer to it, and
/// is totally ordered: an object may sit inside a container, a container
/// inside an extent, never the other way around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    Object = 1,
    Container = 2,
    Extent = 3,
}

impl Rank {
    /// Maps the rank keyword of a struct annotation to its lattice value.
    pub fn from_keyword(kw: &str) -> Option<Rank> {
        match kw {
            "object" => Some(Rank::Object),
            "container" => Some(Rank::Container),
            "extent" => Some(Rank::Extent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Object => "object",
            Rank::Container => "container",
            Rank::Extent => "extent",
        }
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
