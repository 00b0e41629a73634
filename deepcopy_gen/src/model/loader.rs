/* Registry document loading */

use crate::error::{GenError, GenResult};
use registry_types::RegistryFile;
use std::fs;
use std::path::Path;
use tracing::debug;

pub fn parse_registry(yaml: &str, origin: &Path) -> GenResult<RegistryFile> {
    serde_yml::from_str(yaml).map_err(|source| GenError::Parse {
        path: origin.to_path_buf(),
        source,
    })
}

pub fn load_registry_file(path: &Path) -> GenResult<RegistryFile> {
    let yaml_content = fs::read_to_string(path).map_err(|source| GenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_registry(&yaml_content, path)?;
    debug!(
        path = %path.display(),
        registry = %file.registry.name,
        types = file.types.len(),
        commands = file.commands.len(),
        "loaded registry file"
    );
    Ok(file)
}

/* Load every file in order; definitions are merged later by the type model */
pub fn load_registry_files<P: AsRef<Path>>(paths: &[P]) -> GenResult<Vec<RegistryFile>> {
    paths
        .iter()
        .map(|path| load_registry_file(path.as_ref()))
        .collect()
}
