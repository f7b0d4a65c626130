#![deny(rust_2018_idioms)]

mod collect;
mod error;
mod io;
mod manager;
mod schema;

pub use collect::{PromptMode, collect_overrides};
pub use error::{Error, Result};
pub use io::output::{render, write_unit};
pub use io::prompt::{Prompter, Reply, ScriptedPrompter, TerminalPrompter};
pub use manager::{DEFAULT_UNIT_DIR, Editor, Manager};
pub use schema::{DEFAULT_SCHEMA, Section, UnitConfig, UnitSchema, default_schema};

pub mod prelude {
    pub use super::{
        Error, Manager, PromptMode, Prompter, Result, UnitConfig, UnitSchema, collect_overrides,
        render,
    };
}
