use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::collect::{self, PromptMode};
use crate::error::{Error, Result};
use crate::io::output;
use crate::io::prompt::Prompter;
use crate::schema::{DEFAULT_SCHEMA, UnitSchema};

/// Where systemd expects locally administered unit files.
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";

const GENERATED_COMMENT: &str = "# Generated by unitsmith.";

/// Hands a unit file over to an external text editor. Implemented by
/// the CLI; the library never spawns processes itself.
pub trait Editor {
    fn open(&self, path: &Path) -> anyhow::Result<()>;
}

/// Resolves unit file paths inside one target directory and carries out
/// the create/edit/delete operations. Each call is a single-shot
/// transaction: it either commits its one file change or leaves the
/// directory untouched.
#[derive(Debug, Clone)]
pub struct Manager {
    directory: PathBuf,
}

impl Manager {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Resolve the on-disk path for a service name, appending the
    /// `.service` suffix when missing. Names containing `/` or NUL are
    /// rejected.
    pub fn unit_path(&self, service: &str) -> Result<PathBuf> {
        if service.is_empty() || service.contains(['/', '\0']) {
            return Err(Error::InvalidServiceName(service.to_string()));
        }
        let file = if service.ends_with(".service") {
            service.to_string()
        } else {
            format!("{service}.service")
        };
        Ok(self.directory.join(file))
    }

    /// Collect overrides for `schema` and write the resulting unit file.
    /// An existing file is never overwritten; both existence and the
    /// target directory are checked before the operator is prompted.
    pub fn create(
        &self,
        service: &str,
        schema: &UnitSchema,
        mode: PromptMode,
        prompter: &mut dyn Prompter,
    ) -> Result<PathBuf> {
        let path = self.unit_path(service)?;
        if !self.directory.is_dir() {
            return Err(Error::PathNotWritable(self.directory.clone()));
        }
        if path.exists() {
            return Err(Error::AlreadyExists(path));
        }

        let config = collect::collect_overrides(schema, mode, prompter)?;
        let mut payload = output::render(&config);
        payload.push_str(GENERATED_COMMENT);
        payload.push('\n');
        output::write_text(&payload, &path)?;
        debug!("wrote unit file {}", path.display());
        Ok(path)
    }

    /// Hand the unit file for `service` to the editor. No validation is
    /// performed on whatever the editor leaves behind.
    pub fn edit(&self, service: &str, editor: &dyn Editor) -> Result<PathBuf> {
        let path = self.unit_path(service)?;
        if !path.is_file() {
            return Err(Error::ServiceNotFound(service.to_string()));
        }
        debug!("opening {} in editor", path.display());
        editor.open(&path).map_err(Error::Editor)?;
        Ok(path)
    }

    /// Remove the unit file for `service`. Immediate and irreversible.
    pub fn delete(&self, service: &str) -> Result<PathBuf> {
        let path = self.unit_path(service)?;
        if !path.is_file() {
            return Err(Error::ServiceNotFound(service.to_string()));
        }
        fs::remove_file(&path)?;
        debug!("removed unit file {}", path.display());
        Ok(path)
    }

    /// Write the bundled default schema to `target`, for use as a
    /// starting point for custom schemas.
    pub fn build_default_schema(target: &Path) -> Result<()> {
        if target.exists() {
            return Err(Error::AlreadyExists(target.to_path_buf()));
        }
        output::write_text(DEFAULT_SCHEMA, target)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::io::prompt::ScriptedPrompter;
    use crate::schema::default_schema;

    struct RecordingEditor {
        opened: RefCell<Vec<PathBuf>>,
    }

    impl RecordingEditor {
        fn new() -> Self {
            Self {
                opened: RefCell::new(Vec::new()),
            }
        }
    }

    impl Editor for RecordingEditor {
        fn open(&self, path: &Path) -> anyhow::Result<()> {
            self.opened.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    fn demo_schema() -> UnitSchema {
        UnitSchema::parse("[Service]\nType = simple\nUser = root\n").unwrap()
    }

    #[test]
    fn unit_path_appends_the_service_suffix() {
        let manager = Manager::new("/tmp/units");
        assert_eq!(
            manager.unit_path("demo").unwrap(),
            PathBuf::from("/tmp/units/demo.service")
        );
        assert_eq!(
            manager.unit_path("demo.service").unwrap(),
            PathBuf::from("/tmp/units/demo.service")
        );
    }

    #[test]
    fn unit_path_rejects_illegal_names() {
        let manager = Manager::new("/tmp/units");
        assert!(matches!(
            manager.unit_path("../evil").unwrap_err(),
            Error::InvalidServiceName(_)
        ));
        assert!(matches!(
            manager.unit_path("").unwrap_err(),
            Error::InvalidServiceName(_)
        ));
    }

    #[test]
    fn create_with_empty_replies_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Manager::new(dir.path());
        let mut prompter = ScriptedPrompter::new([""]);

        let path = manager
            .create("demo", &demo_schema(), PromptMode::Short, &mut prompter)
            .unwrap();

        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("Type = simple"));
        assert!(contents.contains("User = root"));
        assert!(contents.ends_with(&format!("{GENERATED_COMMENT}\n")));
    }

    #[test]
    fn create_never_overwrites_an_existing_unit() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Manager::new(dir.path());
        let mut prompter = ScriptedPrompter::new(["forking"]);
        let path = manager
            .create("demo", &demo_schema(), PromptMode::Short, &mut prompter)
            .unwrap();
        let original = fs::read(&path).unwrap();

        let mut second = ScriptedPrompter::new(["oneshot"]);
        let err = manager
            .create("demo", &demo_schema(), PromptMode::Short, &mut second)
            .unwrap_err();

        assert!(matches!(err, Error::AlreadyExists(_)));
        // The failure happens before any prompting or writing.
        assert!(second.presented.is_empty());
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn create_fails_when_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Manager::new(dir.path().join("absent"));
        let mut prompter = ScriptedPrompter::new([""]);
        let err = manager
            .create("demo", &demo_schema(), PromptMode::Short, &mut prompter)
            .unwrap_err();
        assert!(matches!(err, Error::PathNotWritable(_)));
    }

    #[test]
    fn aborted_collection_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Manager::new(dir.path());
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

        let err = manager
            .create("demo", &demo_schema(), PromptMode::Short, &mut prompter)
            .unwrap_err();

        assert!(matches!(err, Error::Aborted));
        assert!(!dir.path().join("demo.service").exists());
    }

    #[test]
    fn delete_removes_the_unit_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Manager::new(dir.path());
        let mut prompter = ScriptedPrompter::new([""]);
        let path = manager
            .create("demo", &demo_schema(), PromptMode::Short, &mut prompter)
            .unwrap();

        manager.delete("demo").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn delete_of_missing_service_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Manager::new(dir.path());
        let err = manager.delete("ghost").unwrap_err();
        assert!(matches!(err, Error::ServiceNotFound(_)));
    }

    #[test]
    fn edit_hands_the_resolved_path_to_the_editor() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Manager::new(dir.path());
        let mut prompter = ScriptedPrompter::new([""]);
        let path = manager
            .create("demo", &demo_schema(), PromptMode::Short, &mut prompter)
            .unwrap();

        let editor = RecordingEditor::new();
        manager.edit("demo", &editor).unwrap();
        assert_eq!(editor.opened.borrow().as_slice(), &[path]);
    }

    #[test]
    fn edit_of_missing_service_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Manager::new(dir.path());
        let editor = RecordingEditor::new();
        let err = manager.edit("ghost", &editor).unwrap_err();
        assert!(matches!(err, Error::ServiceNotFound(_)));
        assert!(editor.opened.borrow().is_empty());
    }

    #[test]
    fn build_default_schema_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("default-schema");
        Manager::build_default_schema(&target).unwrap();

        let written = fs::read_to_string(&target).unwrap();
        assert_eq!(written, DEFAULT_SCHEMA);
        UnitSchema::parse(&written).unwrap();

        let err = Manager::build_default_schema(&target).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[test]
    fn default_schema_is_usable_for_create() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Manager::new(dir.path());
        let schema = default_schema().unwrap();
        // Short mode presents Description, Type, ExecStart and WantedBy.
        let mut prompter = ScriptedPrompter::new(["Demo service", "", "/usr/bin/demo", ""]);

        let path = manager
            .create("demo", &schema, PromptMode::Short, &mut prompter)
            .unwrap();

        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("Description = Demo service"));
        assert!(contents.contains("ExecStart = /usr/bin/demo"));
        assert!(contents.contains("WantedBy = multi-user.target"));
    }
}
