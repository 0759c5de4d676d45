use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::backend::ColumnBackend;
use crate::error::{AttrError, Result};
use crate::model::{ColumnKey, EntityKind, FieldName};

const COLUMN_EXT: &str = "json";

/// Column backend that keeps one file per column under `root`.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entity_dir(&self, entity: EntityKind) -> PathBuf {
        self.root.join(entity.dir_name())
    }

    fn record_dir(&self, key: &ColumnKey) -> PathBuf {
        self.entity_dir(key.entity).join(key.id.to_string())
    }

    /// Where the column's file lives (whether or not it exists).
    pub fn column_path(&self, key: &ColumnKey) -> PathBuf {
        self.record_dir(key)
            .join(format!("{}.{}", key.field, COLUMN_EXT))
    }
}

impl ColumnBackend for FsBackend {
    fn read_column(&self, key: &ColumnKey) -> Result<Option<String>> {
        match fs::read_to_string(self.column_path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AttrError::Io(e)),
        }
    }

    fn write_column(&self, key: &ColumnKey, text: Option<&str>) -> Result<()> {
        let target = self.column_path(key);
        let Some(text) = text else {
            return match fs::remove_file(&target) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(AttrError::Io(e)),
                _ => Ok(()),
            };
        };

        let dir = self.record_dir(key);
        fs::create_dir_all(&dir)?;

        // Atomic write
        let tmp_path = dir.join(format!(".{}-{}.tmp", key.field, Uuid::new_v4()));
        fs::write(&tmp_path, text)?;
        if let Err(e) = fs::rename(&tmp_path, &target) {
            let _ = fs::remove_file(&tmp_path);
            return Err(AttrError::Io(e));
        }
        Ok(())
    }

    fn list_columns(&self, entity: EntityKind) -> Result<Vec<ColumnKey>> {
        let entity_dir = self.entity_dir(entity);
        if !entity_dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for record in fs::read_dir(&entity_dir)? {
            let record = record?;
            let record_path = record.path();
            if !record_path.is_dir() {
                continue;
            }
            let Some(id) = record_path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(|s| Uuid::parse_str(s).ok())
            else {
                continue;
            };

            for column in fs::read_dir(&record_path)? {
                let path = column?.path();
                if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some(COLUMN_EXT) {
                    continue;
                }
                // Temp files start with '.', which no field name can.
                let field = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| FieldName::new(s).ok());
                if let Some(field) = field {
                    keys.push(ColumnKey::new(entity, id, field));
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FsBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path());
        (dir, backend)
    }

    fn key(field: &str) -> ColumnKey {
        ColumnKey::new(
            EntityKind::Inspection,
            Uuid::new_v4(),
            FieldName::new(field).unwrap(),
        )
    }

    #[test]
    fn writes_land_at_the_documented_path() {
        let (dir, backend) = setup();
        let k = key("attrs");
        backend.write_column(&k, Some("{\"a\":1}")).unwrap();

        let expected = dir
            .path()
            .join("inspection")
            .join(k.id.to_string())
            .join("attrs.json");
        assert_eq!(backend.column_path(&k), expected);
        assert_eq!(fs::read_to_string(expected).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn missing_column_reads_as_none() {
        let (_dir, backend) = setup();
        assert_eq!(backend.read_column(&key("attrs")).unwrap(), None);
    }

    #[test]
    fn absent_removes_the_file() {
        let (_dir, backend) = setup();
        let k = key("attrs");
        backend.write_column(&k, Some("[]")).unwrap();
        backend.write_column(&k, None).unwrap();
        assert!(!backend.column_path(&k).exists());
        // Removing again is fine.
        backend.write_column(&k, None).unwrap();
    }

    #[test]
    fn overwrite_leaves_no_temp_files() {
        let (_dir, backend) = setup();
        let k = key("attrs");
        backend.write_column(&k, Some("1")).unwrap();
        backend.write_column(&k, Some("2")).unwrap();

        let names: Vec<_> = fs::read_dir(backend.column_path(&k).parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["attrs.json"]);
        assert_eq!(backend.read_column(&k).unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn list_skips_foreign_files() {
        let (dir, backend) = setup();
        let a = key("attrs");
        let b = key("payload");
        backend.write_column(&a, Some("1")).unwrap();
        backend.write_column(&b, Some("2")).unwrap();

        let record = backend.column_path(&a).parent().unwrap().to_path_buf();
        fs::write(record.join("notes.txt"), "x").unwrap();
        fs::write(record.join(".attrs-leftover.tmp"), "x").unwrap();
        fs::write(record.join("bad--name.json"), "x").unwrap();
        fs::create_dir_all(dir.path().join("inspection").join("not-a-uuid")).unwrap();

        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(backend.list_columns(EntityKind::Inspection).unwrap(), expected);
        assert!(backend.list_columns(EntityKind::Asset).unwrap().is_empty());
    }
}
