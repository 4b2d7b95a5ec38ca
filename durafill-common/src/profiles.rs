//! Named input profiles
//!
//! A profile is a short name for a known collection file. The built-in table
//! covers the ayah recitation datasets; the `[profiles]` section of the TOML
//! config can add names or point a built-in name somewhere else.

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Built-in profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    MahmoudKhalilAlHusary,
    MuhammadAlMinshawi,
    AbuBakrAlShatri,
}

impl Profile {
    /// Every built-in profile, in display order
    pub fn all() -> &'static [Profile] {
        &[
            Profile::MahmoudKhalilAlHusary,
            Profile::MuhammadAlMinshawi,
            Profile::AbuBakrAlShatri,
        ]
    }

    /// Name accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Profile::MahmoudKhalilAlHusary => "husary",
            Profile::MuhammadAlMinshawi => "minshawi",
            Profile::AbuBakrAlShatri => "shatri",
        }
    }

    /// Collection file this profile refers to
    pub fn path(&self) -> PathBuf {
        let file = match self {
            Profile::MahmoudKhalilAlHusary => {
                "data/audio/ayah-recitation-mahmoud-khalil-al-husary-murattal-hafs-957.json"
            }
            Profile::MuhammadAlMinshawi => {
                "data/audio/ayah-recitation-muhammad-siddiq-al-minshawi-murattal-hafs-959.json"
            }
            Profile::AbuBakrAlShatri => {
                "data/audio/ayah-recitation-abu-bakr-al-shatri-murattal-hafs-952.json"
            }
        };
        PathBuf::from(file)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Profile::all()
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown profile: {}", s)))
    }
}

/// Built-in profiles merged with profiles from the TOML config
#[derive(Debug, Clone, Default)]
pub struct ProfileTable {
    entries: BTreeMap<String, PathBuf>,
}

impl ProfileTable {
    /// Build the table; `extra` entries win over built-ins with the same name
    pub fn new(extra: &BTreeMap<String, PathBuf>) -> Self {
        let mut entries: BTreeMap<String, PathBuf> = Profile::all()
            .iter()
            .map(|p| (p.name().to_string(), p.path()))
            .collect();

        for (name, path) in extra {
            entries.insert(name.trim().to_ascii_lowercase(), path.clone());
        }

        Self { entries }
    }

    /// Look up the input path for a profile name
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        self.entries
            .get(&name.trim().to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| Error::InvalidInput(format!("Unknown profile: {}", name)))
    }

    /// (name, path) pairs sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathBuf)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
