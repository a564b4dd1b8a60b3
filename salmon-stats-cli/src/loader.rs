use salmon_stats::{DataLoader, IdKeyMap, ReferenceDataError, StaticLoader};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads reference data from a directory, falling back to the bundled assets
/// for files the directory does not provide.
#[derive(Debug, Clone)]
pub struct FsLoader {
    dir: PathBuf,
}

impl FsLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read(&self, name: &str) -> Result<Option<String>, ReferenceDataError> {
        let path = self.dir.join(format!("{name}.json"));
        if !path.exists() {
            log::debug!("{} not found, using bundled {name}", path.display());
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| ReferenceDataError::Io {
                name: display_name(&path),
                source,
            })
    }
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}

impl DataLoader for FsLoader {
    type Error = ReferenceDataError;

    fn load_id_key_map(&self) -> Result<IdKeyMap, Self::Error> {
        match self.read("id_key_map")? {
            Some(data) => IdKeyMap::from_json(&data).map_err(|source| ReferenceDataError::Parse {
                name: "id_key_map".to_string(),
                source,
            }),
            None => StaticLoader.load_id_key_map(),
        }
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        match self.read(config_name)? {
            Some(data) => serde_json::from_str(&data).map_err(|source| ReferenceDataError::Parse {
                name: config_name.to_string(),
                source,
            }),
            None => StaticLoader.load_config(config_name),
        }
    }
}
