use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::{GenError, Result};

/// An exposed port, the port it forwards to and an optional protocol label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortMapping {
    pub port: u16,
    pub target_port: u16,
    pub protocol: String,
}

/// A `<provider>_<zone>` cluster identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub name: String,
    pub provider: String,
    pub zone: String,
}

impl Cluster {
    /// Splits on the first `_`; the zone keeps any further underscores.
    pub fn parse(raw: &str) -> Result<Self> {
        let (provider, zone) = raw
            .split_once('_')
            .ok_or_else(|| GenError::MalformedCluster(raw.to_string()))?;

        Ok(Cluster {
            name: raw.to_string(),
            provider: provider.to_string(),
            zone: zone.to_string(),
        })
    }
}

/// Parameters every template is rendered against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderContext {
    pub cluster: String,
    pub cluster_provider: String,
    pub cluster_zone: String,
    pub namespace: String,
    pub name: String,
    pub image: String,
    pub ports: Vec<PortMapping>,
    pub values: serde_yaml::Value,
}

impl RenderContext {
    pub fn new(cluster: Cluster, namespace: &str, name: &str) -> Self {
        RenderContext {
            cluster: cluster.name,
            cluster_provider: cluster.provider,
            cluster_zone: cluster.zone,
            namespace: namespace.to_string(),
            name: name.to_string(),
            image: String::new(),
            ports: Vec::new(),
            values: serde_yaml::Value::Null,
        }
    }
}

/// Reads the free-form values exposed to templates as `values`.
pub fn load_values(path: &Path) -> Result<serde_yaml::Value> {
    let contents =
        fs::read_to_string(path).map_err(|source| GenError::io("read values file", path, source))?;

    serde_yaml::from_str(&contents).map_err(|source| GenError::Values {
        path: path.to_path_buf(),
        source,
    })
}
