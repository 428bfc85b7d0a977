//! Instance directory for multi-node deployments.
//!
//! Every node knows its own id and the routable base URL of its peers.
//! Admin operations name the instance they address; resolution happens
//! before any backend is touched.

use std::collections::BTreeMap;

use serde::Serialize;
use url::Url;

use crate::Error;

/// Where an operation must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceTarget {
    /// This node.
    Local,
    /// A peer reachable at `base_url`.
    Remote { id: String, base_url: Url },
}

/// One entry of the directory, as shown to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct InstanceInfo {
    pub id: String,
    pub url: Option<String>,
    pub current: bool,
}

/// Known instances keyed by id.
#[derive(Debug, Clone)]
pub struct InstanceDirectory {
    current: String,
    peers: BTreeMap<String, Url>,
}

impl InstanceDirectory {
    /// A directory with no peers.
    pub fn single(current: impl Into<String>) -> Self {
        Self { current: current.into(), peers: BTreeMap::new() }
    }

    /// Build a directory from `id -> base URL` pairs.
    ///
    /// An entry for the current instance is accepted and ignored; requests
    /// addressed to it always run locally.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if a URL does not parse.
    pub fn new<'a>(
        current: impl Into<String>, instances: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Result<Self, Error> {
        let current = current.into();
        let mut peers = BTreeMap::new();
        for (id, raw) in instances {
            if *id == current {
                continue;
            }
            let url = Url::parse(raw).map_err(|e| Error::InvalidInput(format!("instance `{id}` url `{raw}`: {e}")))?;
            peers.insert(id.clone(), url);
        }
        Ok(Self { current, peers })
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Resolve an instance id; `None` or an empty id means the current node.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownInstance` if the id is not in the directory.
    pub fn resolve(&self, instance: Option<&str>) -> Result<InstanceTarget, Error> {
        match instance.filter(|id| !id.is_empty()) {
            None => Ok(InstanceTarget::Local),
            Some(id) if id == self.current => Ok(InstanceTarget::Local),
            Some(id) => self
                .peers
                .get(id)
                .map(|base_url| InstanceTarget::Remote { id: id.to_string(), base_url: base_url.clone() })
                .ok_or_else(|| Error::UnknownInstance(id.to_string())),
        }
    }

    /// Every known instance, current first, then peers by id.
    pub fn list(&self) -> Vec<InstanceInfo> {
        let mut all = vec![InstanceInfo { id: self.current.clone(), url: None, current: true }];
        all.extend(
            self.peers
                .iter()
                .map(|(id, url)| InstanceInfo { id: id.clone(), url: Some(url.to_string()), current: false }),
        );
        all
    }
}
