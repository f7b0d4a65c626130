use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Text of the schema bundled with the crate, checked in at
/// `schemas/service-config`.
pub const DEFAULT_SCHEMA: &str = include_str!("../../schemas/service-config");

/// An ordered template of sections and default values, loaded once per
/// run and immutable after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSchema {
    pub sections: Vec<Section>,
}

/// One `[Name]` block: an ordered mapping of key to default value.
/// Defaults may be empty, and empty defaults survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: IndexMap<String, String>,
}

/// The schema shape with every default replaced by a confirmed value.
/// Produced by the override collector, serialized once, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitConfig {
    pub sections: Vec<Section>,
}

impl UnitSchema {
    /// Parse INI-like schema text in a single, order-preserving pass.
    ///
    /// `[Name]` opens a section and `Key = Value` adds a key to the
    /// current one; blank lines and anything else (comments included)
    /// are skipped. Directive names are accepted verbatim, without any
    /// check against systemd's own grammar.
    pub fn parse(input: &str) -> Result<UnitSchema> {
        let mut sections: Vec<Section> = Vec::new();

        for (idx, raw) in input.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(inner) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
                let name = inner.trim();
                if sections.iter().any(|section| section.name == name) {
                    return Err(malformed(idx, format!("duplicate section [{name}]")));
                }
                sections.push(Section {
                    name: name.to_string(),
                    entries: IndexMap::new(),
                });
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();
                if key.is_empty() {
                    return Err(malformed(idx, "missing key name before '='".to_string()));
                }
                let Some(section) = sections.last_mut() else {
                    return Err(malformed(
                        idx,
                        format!("directive '{key}' appears before any section header"),
                    ));
                };
                if section.entries.contains_key(key) {
                    return Err(malformed(
                        idx,
                        format!("duplicate key '{key}' in section [{}]", section.name),
                    ));
                }
                section.entries.insert(key.to_string(), value.to_string());
            }
        }

        Ok(UnitSchema { sections })
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Total number of keys across all sections.
    pub fn key_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.entries.len())
            .sum()
    }
}

/// Parse the bundled default schema.
pub fn default_schema() -> Result<UnitSchema> {
    UnitSchema::parse(DEFAULT_SCHEMA)
}

fn malformed(idx: usize, reason: String) -> Error {
    Error::MalformedSchema {
        line: idx + 1,
        reason,
    }
}
