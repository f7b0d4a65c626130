use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::io::prompt::{Prompter, Reply};
use crate::schema::{Section, UnitConfig, UnitSchema};

/// Keys offered in short mode: the bare minimum to describe a service.
const SHORT_KEYS: &[&str] = &["Description", "Type", "ExecStart", "WantedBy"];

/// Keys offered when neither short nor extended mode is requested.
const STANDARD_KEYS: &[&str] = &[
    "Description",
    "After",
    "Type",
    "ExecStart",
    "ExecStop",
    "Restart",
    "User",
    "Group",
    "WantedBy",
];

/// Selects which schema keys are presented for override. Keys that are
/// not presented keep their schema default verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptMode {
    Short,
    #[default]
    Standard,
    Extended,
}

impl PromptMode {
    pub fn presents(&self, key: &str) -> bool {
        match self {
            PromptMode::Short => SHORT_KEYS.contains(&key),
            PromptMode::Standard => STANDARD_KEYS.contains(&key),
            PromptMode::Extended => true,
        }
    }
}

/// Walk the schema in order and produce a unit configuration, prompting
/// for every key the mode presents. An empty reply keeps the schema
/// default; the schema itself is never mutated. An aborted prompt
/// abandons the whole collection.
pub fn collect_overrides(
    schema: &UnitSchema,
    mode: PromptMode,
    prompter: &mut dyn Prompter,
) -> Result<UnitConfig> {
    let mut sections = Vec::with_capacity(schema.sections.len());

    for section in &schema.sections {
        let has_prompts = section.entries.keys().any(|key| mode.presents(key));
        if has_prompts {
            prompter.begin_section(&section.name).map_err(Error::Prompt)?;
        }

        let mut entries = IndexMap::with_capacity(section.entries.len());
        for (key, default) in &section.entries {
            let value = if mode.presents(key) {
                match prompter.prompt(key, default).map_err(Error::Prompt)? {
                    Reply::Keep => default.clone(),
                    Reply::Value(value) => value,
                    Reply::Abort => return Err(Error::Aborted),
                }
            } else {
                default.clone()
            };
            entries.insert(key.clone(), value);
        }

        sections.push(Section {
            name: section.name.clone(),
            entries,
        });
    }

    Ok(UnitConfig { sections })
}
