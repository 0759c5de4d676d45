use std::path::PathBuf;

use tempfile::TempDir;
use uuid::Uuid;

use crate::config::Limits;
use crate::model::{ColumnKey, EntityKind, FieldName};
use crate::store::{AttributeStore, FsBackend};

/// A file-backed attribute store rooted in a fresh temporary directory.
pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub store: AttributeStore<FsBackend>,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let store = AttributeStore::with_limits(FsBackend::new(root.clone()), limits);
        Self {
            _temp_dir: temp_dir,
            store,
            root,
        }
    }

    /// A key for a brand-new entity of `entity` kind.
    pub fn key(&self, entity: EntityKind, field: &str) -> ColumnKey {
        let field = FieldName::new(field).expect("test field name must be valid");
        ColumnKey::new(entity, Uuid::new_v4(), field)
    }
}
