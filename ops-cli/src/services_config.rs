use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{DevenvError, Result};
use crate::paths;
use crate::service::Service;

pub const SERVICES_FILE: &str = "services.yml";

/// Services listed in `services.yml` at the monorepo root, sorted by
/// directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicesConfiguration {
    #[serde(default)]
    pub services: Vec<Service>,
}

impl ServicesConfiguration {
    /// Read `services.yml` from the monorepo found in the environment.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed, or names a service
    /// twice.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::monorepo_path())
    }

    /// Read `services.yml` from `root`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed, or names a service
    /// twice.
    pub fn load_from(root: &Path) -> Result<Self> {
        let filename = root.join(SERVICES_FILE);
        let data = fs::read_to_string(&filename).map_err(|source| DevenvError::ReadServices {
            path: filename.display().to_string(),
            source,
        })?;

        Self::parse(&data, root)
    }

    /// Parse a services file whose services live under `root`.
    ///
    /// # Errors
    ///
    /// Fails when `data` is not a valid services file or names a service
    /// twice.
    pub fn parse(data: &str, root: &Path) -> Result<Self> {
        let mut cfg: Self = serde_yaml::from_str(data).map_err(DevenvError::ParseServices)?;

        for service in &mut cfg.services {
            service.set_root(root);
        }
        cfg.services.sort_by(|a, b| a.directory.cmp(&b.directory));

        cfg.validate()
            .map_err(|err| DevenvError::InvalidServices(Box::new(err)))?;

        Ok(cfg)
    }

    /// Short names and directories must be unique.
    ///
    /// # Errors
    ///
    /// Returns the first duplicate found.
    pub fn validate(&self) -> Result<()> {
        services_to_map(&self.services).map(drop)
    }

    /// Services devenv starts and stops, narrowed to `names` when given.
    pub fn managed(&self, names: &[String]) -> Vec<&Service> {
        filter_services(filter_managed_services(&self.services), names)
    }
}

/// Index services by short name and by directory.
///
/// # Errors
///
/// Fails when a short name or a directory is used twice.
pub fn services_to_map(services: &[Service]) -> Result<HashMap<&str, &Service>> {
    let mut map = HashMap::with_capacity(services.len() * 2);

    for service in services {
        if map.insert(service.short_name.as_str(), service).is_some() {
            return Err(DevenvError::DuplicateShortName(service.short_name.clone()));
        }

        // e.g. api
        if service.short_name == service.directory {
            continue;
        }

        if map.insert(service.directory.as_str(), service).is_some() {
            return Err(DevenvError::DuplicateDirectory(service.directory.clone()));
        }
    }

    Ok(map)
}

/// Services whose short name or directory is in `names`; all of them when
/// `names` is empty.
pub fn filter_services<'a, I>(services: I, names: &[String]) -> Vec<&'a Service>
where
    I: IntoIterator<Item = &'a Service>,
{
    if names.is_empty() {
        return services.into_iter().collect();
    }

    let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
    services
        .into_iter()
        .filter(|service| wanted.contains(service.short_name.as_str()) || wanted.contains(service.directory.as_str()))
        .collect()
}

/// Services not marked `skip`.
pub fn filter_managed_services<'a, I>(services: I) -> Vec<&'a Service>
where
    I: IntoIterator<Item = &'a Service>,
{
    services
        .into_iter()
        .filter(|service| !service.skip_management)
        .collect()
}
