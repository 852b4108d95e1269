//! # inksync-adapter-modules-fs
//!
//! [`ModuleRegistry`] backed by the JSON files the device firmware writes.
//!
//! ## Layout
//! - `<modules_dir>/module1.json`, `<modules_dir>/module2.json` hold the
//!   descriptor of the module in each slot; a missing file means the slot
//!   is empty.
//! - `<configs_dir>/<uuid>.json` holds the key bindings of one module. It is
//!   created with the default bindings the first time it is read.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use inksync_app::ports::ModuleRegistry;
use inksync_domain::device::{
    self, MODULE_SLOTS, ModuleConfig, ModuleDescriptor, ModuleStatus, default_module_config,
};
use inksync_domain::error::InkSyncError;

/// Errors raised while reading or writing module files.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("unable to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<FsError> for InkSyncError {
    fn from(err: FsError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Directories the registry reads from.
#[derive(Debug, Clone)]
pub struct Config {
    pub modules_dir: PathBuf,
    pub configs_dir: PathBuf,
}

impl Config {
    #[must_use]
    pub fn build(self) -> FsModuleRegistry {
        FsModuleRegistry {
            modules_dir: self.modules_dir,
            configs_dir: self.configs_dir,
        }
    }
}

pub struct FsModuleRegistry {
    modules_dir: PathBuf,
    configs_dir: PathBuf,
}

impl FsModuleRegistry {
    fn slot_path(&self, slot: u8) -> PathBuf {
        self.modules_dir.join(format!("module{slot}.json"))
    }

    fn config_path(&self, uuid: &str) -> PathBuf {
        self.configs_dir.join(format!("{uuid}.json"))
    }
}

/// Read a file, mapping "not found" to `None`.
async fn read_optional(path: &Path) -> Result<Option<String>, FsError> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(FsError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, content: &str) -> Result<T, FsError> {
    serde_json::from_str(content).map_err(|source| FsError::Json {
        path: path.to_path_buf(),
        source,
    })
}

impl ModuleRegistry for FsModuleRegistry {
    async fn status(&self) -> Result<ModuleStatus, InkSyncError> {
        let mut connected = [false; 2];
        for (flag, slot) in connected.iter_mut().zip(MODULE_SLOTS) {
            let path = self.slot_path(slot);
            *flag = fs::try_exists(&path)
                .await
                .map_err(|source| FsError::Io { path, source })?;
        }
        let [module1, module2] = connected;
        Ok(ModuleStatus { module1, module2 })
    }

    async fn descriptor(&self, slot: u8) -> Result<Option<ModuleDescriptor>, InkSyncError> {
        let path = self.slot_path(slot);
        let Some(content) = read_optional(&path).await? else {
            return Ok(None);
        };
        let mut descriptor: ModuleDescriptor = parse(&path, &content)?;
        if descriptor.slot == 0 {
            descriptor.slot = slot;
        }
        Ok(Some(descriptor))
    }

    async fn config(&self, uuid: &str) -> Result<ModuleConfig, InkSyncError> {
        device::validate_module_uuid(uuid)?;
        let path = self.config_path(uuid);
        if let Some(content) = read_optional(&path).await? {
            return Ok(parse(&path, &content)?);
        }

        let config = default_module_config();
        let content = serde_json::to_string_pretty(&config).map_err(|source| FsError::Json {
            path: path.clone(),
            source,
        })?;
        fs::create_dir_all(&self.configs_dir)
            .await
            .map_err(|source| FsError::Io {
                path: self.configs_dir.clone(),
                source,
            })?;
        fs::write(&path, content)
            .await
            .map_err(|source| FsError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::info!(%uuid, "created default module config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inksync_domain::device::ModuleType;

    fn setup() -> (tempfile::TempDir, FsModuleRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let registry = Config {
            modules_dir: dir.path().join("modules"),
            configs_dir: dir.path().join("configs"),
        }
        .build();
        std::fs::create_dir_all(dir.path().join("modules")).unwrap();
        (dir, registry)
    }

    fn write_module(dir: &tempfile::TempDir, slot: u8, content: &str) {
        std::fs::write(dir.path().join(format!("modules/module{slot}.json")), content).unwrap();
    }

    #[tokio::test]
    async fn should_report_connected_slots_from_files() {
        let (dir, registry) = setup();
        write_module(
            &dir,
            2,
            r#"{"module_type":"knob_array","device_name":"Knobs","uuid":"k-2"}"#,
        );

        let status = registry.status().await.unwrap();
        assert_eq!(
            status,
            ModuleStatus {
                module1: false,
                module2: true
            }
        );
    }

    #[tokio::test]
    async fn should_read_descriptor_and_fill_slot() {
        let (dir, registry) = setup();
        write_module(
            &dir,
            1,
            r#"{"module_type":"keypad","device_name":"Macro Keys","uuid":"kp-1","manufacturer":"inksync","fw_version":"1.2.0"}"#,
        );

        let descriptor = registry.descriptor(1).await.unwrap().unwrap();
        assert_eq!(descriptor.module_type, ModuleType::Keypad);
        assert_eq!(descriptor.device_name, "Macro Keys");
        assert_eq!(descriptor.slot, 1);
        assert_eq!(descriptor.fw_version, "1.2.0");
    }

    #[tokio::test]
    async fn should_return_none_for_empty_slot() {
        let (_dir, registry) = setup();
        assert!(registry.descriptor(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_fail_on_corrupt_descriptor() {
        let (dir, registry) = setup();
        write_module(&dir, 1, "{not json");
        let result = registry.descriptor(1).await;
        assert!(matches!(result, Err(InkSyncError::Storage(_))));
    }

    #[tokio::test]
    async fn should_create_default_config_on_first_read() {
        let (dir, registry) = setup();

        let config = registry.config("kp-1").await.unwrap();
        assert_eq!(config, default_module_config());

        let written = std::fs::read_to_string(dir.path().join("configs/kp-1.json")).unwrap();
        let reloaded: ModuleConfig = serde_json::from_str(&written).unwrap();
        assert_eq!(reloaded, config);
    }

    #[tokio::test]
    async fn should_return_existing_config_unchanged() {
        let (dir, registry) = setup();
        std::fs::create_dir_all(dir.path().join("configs")).unwrap();
        std::fs::write(
            dir.path().join("configs/kp-1.json"),
            r#"{"KEY0":["ctrl+c",null]}"#,
        )
        .unwrap();

        let config = registry.config("kp-1").await.unwrap();
        assert_eq!(config["KEY0"], vec![Some("ctrl+c".to_string()), None]);
        assert_eq!(config.len(), 1);
    }

    #[tokio::test]
    async fn should_refuse_uuid_escaping_config_dir() {
        let (_dir, registry) = setup();
        let result = registry.config("../modules/module1").await;
        assert!(matches!(result, Err(InkSyncError::Validation(_))));
    }
}
