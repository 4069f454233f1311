//! Generation profiles.
//!
//! A profile is a TOML rendition of [`ProductionParams`] embedded in the
//! binary at compile time. Fields omitted from a profile inherit the
//! `Default` impl, which is the `default` profile.

use std::path::PathBuf;

use thiserror::Error;

use crate::params::ProductionParams;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("unknown profile '{name}', available profiles: {}", available_profiles().join(", "))]
    Unknown { name: String },

    #[error("failed to read profile file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: toml::de::Error,
    },
}

static PROFILES: &[(&str, &str)] = &[
    ("default", include_str!("../profiles/default.toml")),
    ("minimal", include_str!("../profiles/minimal.toml")),
    ("deep-nesting", include_str!("../profiles/deep-nesting.toml")),
    ("flat", include_str!("../profiles/flat.toml")),
    ("classes-heavy", include_str!("../profiles/classes-heavy.toml")),
];

pub fn available_profiles() -> Vec<&'static str> {
    PROFILES.iter().map(|(name, _)| *name).collect()
}

fn parse_profile_toml(name: &str, toml_str: &str) -> Result<ProductionParams, ProfileError> {
    toml::from_str(toml_str).map_err(|source| ProfileError::Parse {
        name: name.to_string(),
        source,
    })
}

/// Get a profile by name, or load one from a file path.
///
/// `name_or_path` is treated as a path if it contains `/` or ends with
/// `.toml`; otherwise it names an embedded profile.
pub fn get_profile(name_or_path: &str) -> Result<ProductionParams, ProfileError> {
    if name_or_path.contains('/') || name_or_path.ends_with(".toml") {
        let content = std::fs::read_to_string(name_or_path).map_err(|source| ProfileError::Read {
            path: PathBuf::from(name_or_path),
            source,
        })?;
        return parse_profile_toml(name_or_path, &content);
    }
    PROFILES
        .iter()
        .find(|(name, _)| *name == name_or_path)
        .map(|(name, toml_str)| parse_profile_toml(name, toml_str))
        .unwrap_or_else(|| {
            Err(ProfileError::Unknown {
                name: name_or_path.to_string(),
            })
        })
}
