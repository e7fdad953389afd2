//! Secret storage backends

use std::collections::HashMap;
use std::sync::Mutex;

use crate::subprocess::run_program;
use crate::{Result, RotationError};

/// Where live credentials are kept
pub trait SecretStore: Send + Sync {
    /// Read a secret by `op://vault/item/field` reference.
    fn read(&self, reference: &str) -> Result<String>;

    /// Overwrite one field of an item.
    fn update(&self, item: &str, field: &str, value: &str) -> Result<()>;

    /// Full item metadata as JSON.
    fn get_item(&self, item: &str) -> Result<serde_json::Value>;
}

/// The 1Password CLI (`op`)
#[derive(Debug, Clone)]
pub struct OnePasswordCli {
    program: String,
    vault: String,
}

impl OnePasswordCli {
    pub fn new(vault: impl Into<String>) -> Self {
        Self {
            program: "op".to_string(),
            vault: vault.into(),
        }
    }

    /// Use a different `op` binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn vault(&self) -> &str {
        &self.vault
    }
}

impl SecretStore for OnePasswordCli {
    fn read(&self, reference: &str) -> Result<String> {
        run_program(&self.program, &["read", reference], "op read")
    }

    fn update(&self, item: &str, field: &str, value: &str) -> Result<()> {
        let assignment = format!("{field}={value}");
        run_program(
            &self.program,
            &["item", "edit", item, &assignment, "--vault", &self.vault],
            "op item edit",
        )
        .map(|_| ())
    }

    fn get_item(&self, item: &str) -> Result<serde_json::Value> {
        let stdout = run_program(
            &self.program,
            &["item", "get", item, "--vault", &self.vault, "--format", "json"],
            "op item get",
        )?;
        serde_json::from_str(&stdout).map_err(|e| RotationError::ParseError(e.to_string()))
    }
}

/// In-process store keyed by `item/field`, for dry runs and tests
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    vault: String,
    values: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new(vault: impl Into<String>) -> Self {
        Self {
            vault: vault.into(),
            values: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, item: &str, field: &str, value: &str) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(format!("{item}/{field}"), value.to_string());
    }

    pub fn get(&self, item: &str, field: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(&format!("{item}/{field}")).cloned()
    }
}

impl SecretStore for MemorySecretStore {
    fn read(&self, reference: &str) -> Result<String> {
        let prefix = format!("op://{}/", self.vault);
        let key = reference
            .strip_prefix(&prefix)
            .ok_or_else(|| RotationError::ParseError(format!("bad reference: {reference}")))?;
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned().ok_or_else(|| RotationError::CommandFailed {
            command: "read".into(),
            code: 1,
            stderr: format!("no item matches {reference}"),
        })
    }

    fn update(&self, item: &str, field: &str, value: &str) -> Result<()> {
        self.insert(item, field, value);
        Ok(())
    }

    fn get_item(&self, item: &str) -> Result<serde_json::Value> {
        let prefix = format!("{item}/");
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        let fields: Vec<serde_json::Value> = values
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .map(|field| serde_json::json!({ "label": field }))
            .collect();
        if fields.is_empty() {
            return Err(RotationError::CommandFailed {
                command: "item get".into(),
                code: 1,
                stderr: format!("\"{item}\" isn't an item"),
            });
        }
        Ok(serde_json::json!({ "title": item, "vault": { "name": self.vault }, "fields": fields }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_through_references() {
        let store = MemorySecretStore::new("API_Keys");
        store.insert("Gamma API", "credential", "old");
        assert_eq!(store.read("op://API_Keys/Gamma API/credential").unwrap(), "old");

        store.update("Gamma API", "credential", "new").unwrap();
        assert_eq!(store.get("Gamma API", "credential").as_deref(), Some("new"));

        let item = store.get_item("Gamma API").unwrap();
        assert_eq!(item["title"], "Gamma API");
        assert!(store.get_item("Nope").is_err());
        assert!(store.read("op://Other/Gamma API/credential").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn op_cli_failure_surfaces_stderr() {
        // `false` ignores its arguments and exits 1.
        let cli = OnePasswordCli::new("API_Keys").with_program("false");
        let err = cli.read("op://API_Keys/x/credential").unwrap_err();
        match err {
            RotationError::CommandFailed { command, code, .. } => {
                assert_eq!(command, "op read");
                assert_eq!(code, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
