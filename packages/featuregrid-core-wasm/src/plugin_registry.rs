use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// The plugin kinds this core ships.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PluginKind {
    WfsGrid,
    DownloadList,
}

impl PluginKind {
    pub fn parse(kind: &str) -> Result<PluginKind, String> {
        match kind {
            "wfs_grid" => Ok(PluginKind::WfsGrid),
            "download_list" => Ok(PluginKind::DownloadList),
            other => Err(format!("Unknown plugin kind: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PluginDescriptor {
    pub ptype: String,
    pub kind: PluginKind,
}

/// Process-wide plugin registry. Registration is an explicit call made by the
/// host at startup, never a module-load side effect; teardown clears it.
pub struct PluginRegistry {
    plugins: HashMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        PluginRegistry {
            plugins: HashMap::new(),
        }
    }

    /// Registering an already-known ptype replaces its descriptor.
    pub fn register(&mut self, ptype: &str, kind: PluginKind) -> PluginDescriptor {
        let descriptor = PluginDescriptor {
            ptype: ptype.to_string(),
            kind,
        };
        self.plugins.insert(ptype.to_string(), descriptor.clone());
        descriptor
    }

    pub fn unregister(&mut self, ptype: &str) -> bool {
        self.plugins.remove(ptype).is_some()
    }

    pub fn get(&self, ptype: &str) -> Option<&PluginDescriptor> {
        self.plugins.get(ptype)
    }

    pub fn registered(&self) -> Vec<PluginDescriptor> {
        let mut list: Vec<PluginDescriptor> = self.plugins.values().cloned().collect();
        list.sort_by(|a, b| a.ptype.cmp(&b.ptype));
        list
    }

    pub fn clear(&mut self) {
        self.plugins.clear();
    }
}

lazy_static! {
    static ref GLOBAL_PLUGIN_REGISTRY: Arc<Mutex<PluginRegistry>> =
        Arc::new(Mutex::new(PluginRegistry::new()));
}

pub fn with_registry<F, R>(f: F) -> R
where
    F: FnOnce(&mut PluginRegistry) -> R,
{
    let mut registry = GLOBAL_PLUGIN_REGISTRY
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_list_unregister() {
        let mut registry = PluginRegistry::new();
        registry.register("gxp_wfsgrid", PluginKind::WfsGrid);
        registry.register("gxp_downloadgrid", PluginKind::DownloadList);

        let listed = registry.registered();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].ptype, "gxp_downloadgrid");
        assert_eq!(listed[1].ptype, "gxp_wfsgrid");

        assert!(registry.unregister("gxp_wfsgrid"));
        assert!(!registry.unregister("gxp_wfsgrid"));
        assert!(registry.get("gxp_wfsgrid").is_none());
    }

    #[test]
    fn re_register_replaces_descriptor() {
        let mut registry = PluginRegistry::new();
        registry.register("grid", PluginKind::WfsGrid);
        registry.register("grid", PluginKind::DownloadList);

        assert_eq!(registry.registered().len(), 1);
        assert_eq!(registry.get("grid").unwrap().kind, PluginKind::DownloadList);
    }

    #[test]
    fn clear_empties_the_registry() {
        let mut registry = PluginRegistry::new();
        registry.register("grid", PluginKind::WfsGrid);
        registry.clear();
        assert!(registry.registered().is_empty());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(PluginKind::parse("wfs_grid").is_ok());
        assert!(PluginKind::parse("chart").is_err());
    }
}
