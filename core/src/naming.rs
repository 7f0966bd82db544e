//! Entity naming convention: `<Label>_<index>`, possibly nested in a
//! path-like name such as `Shapes/solid_wire_002/Conductor_002/Conductor_002`.

use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Material role carried by an entity name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Conductor,
    Dielectric,
    OpenBoundary,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Conductor, Label::Dielectric, Label::OpenBoundary];

    /// Name prefixes recognised for this label.
    pub fn prefixes(self) -> &'static [&'static str] {
        match self {
            Label::Conductor => &["Conductor_"],
            Label::Dielectric => &["Dielectric_"],
            Label::OpenBoundary => &["OpenBoundary_", "OpenRegion_"],
        }
    }

    /// Prefix used when naming physical groups.
    pub fn group_prefix(self) -> &'static str {
        self.prefixes()[0]
    }

    /// Index encoded in `name` for this label, if the name carries the label.
    ///
    /// When several prefixes match, the one occurring last in the name decides.
    pub fn index_in(self, name: &str) -> Option<DomainResult<usize>> {
        let prefix = self
            .prefixes()
            .iter()
            .filter_map(|prefix| name.rfind(prefix).map(|pos| (pos, *prefix)))
            .max_by_key(|(pos, _)| *pos)?
            .1;
        Some(parse_index(name, prefix))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Label::Conductor => "conductor",
            Label::Dielectric => "dielectric",
            Label::OpenBoundary => "open boundary",
        };
        f.write_str(name)
    }
}

/// Parse the integer following the last occurrence of `label` in `name`.
pub fn parse_index(name: &str, label: &str) -> DomainResult<usize> {
    let malformed = || DomainError::MalformedName {
        name: name.to_string(),
        label: label.to_string(),
    };
    let start = name.rfind(label).ok_or_else(malformed)? + label.len();
    let digits = &name[start..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    digits.parse::<usize>().map_err(|_| malformed())
}
