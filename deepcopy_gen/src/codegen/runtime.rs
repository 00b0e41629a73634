/* Pool runtime header shipped alongside generated code */

use crate::error::{GenError, GenResult};
use std::fs;
use std::path::{Path, PathBuf};

const POOL_TEMPLATE: &str = include_str!("../../runtime/deepcopy_pool.h.in");
const POOL_TYPE_PLACEHOLDER: &str = "@POOL_TYPE@";

/// Runtime header text with the pool class named `pool_type`.
pub fn pool_header(pool_type: &str) -> String {
  POOL_TEMPLATE.replace(POOL_TYPE_PLACEHOLDER, pool_type)
}

pub fn write_pool_header(dir: &Path, file_name: &str, pool_type: &str) -> GenResult<PathBuf> {
  fs::create_dir_all(dir).map_err(|source| GenError::Write { path: dir.to_path_buf(), source })?;
  let path = dir.join(file_name);
  fs::write(&path, pool_header(pool_type)).map_err(|source| GenError::Write { path: path.clone(), source })?;
  Ok(path)
}
