use std::collections::HashMap;

/// Variables available to `{NAME}` placeholders in configuration values.
pub type VarMap = HashMap<String, String>;

mod loader;
mod placeholders;

pub use loader::load_env_file;
pub use placeholders::expand_placeholders;
