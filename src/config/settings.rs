use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};

use crate::{
    env::{expand_placeholders, load_env_file, VarMap},
    rest::ClientOptions,
};

use super::loader::{LoadedConfig, ProfileConfig, ScreenplayConfig};

/// Fully resolved values for building a `CallRestApi` ability.
#[derive(Debug, Clone, Default)]
pub struct RestSettings {
    pub profile_name: Option<String>,
    pub variables: VarMap,
    pub base_urls: HashMap<String, String>,
    pub dump_dir: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
    pub client_options: ClientOptions,
    pub env_files: Vec<PathBuf>,
}

impl RestSettings {
    pub fn base_url(&self, name: &str) -> Result<&str> {
        self.base_urls
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("Unknown base URL: {name}"))
    }
}

#[derive(Debug, Clone)]
pub struct SettingsBuilder {
    config_dir: PathBuf,
    config: Option<LoadedConfig>,
    requested_profile: Option<String>,
    explicit_env: Option<PathBuf>,
}

impl SettingsBuilder {
    /// Relative paths in the configuration resolve against `config_dir`.
    pub fn new(config_dir: impl Into<PathBuf>, config: Option<LoadedConfig>) -> Self {
        Self {
            config_dir: config_dir.into(),
            config,
            requested_profile: None,
            explicit_env: None,
        }
    }

    pub fn profile(mut self, name: impl Into<String>) -> Self {
        self.requested_profile = Some(name.into());
        self
    }

    /// Replaces whichever env file the configuration names.
    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_env = Some(path.into());
        self
    }

    pub fn build(&self) -> Result<RestSettings> {
        let empty = ScreenplayConfig::default();
        let root = self.config.as_ref().map_or(&empty, |loaded| &loaded.config);
        let profile = resolve_profile(root, self.requested_profile.as_deref())?;
        let own = profile.as_ref().map(|(_, config)| *config);

        let mut variables = root.variables.clone();
        if let Some(own) = own {
            variables.extend(own.variables.clone());
        }

        let mut env_files = Vec::new();
        let env_path = match &self.explicit_env {
            Some(path) => Some(resolve_relative(&self.config_dir, path)),
            None => own
                .and_then(|own| own.env.as_deref())
                .or(root.env.as_deref())
                .map(|path| resolve_relative(&self.config_dir, Path::new(path))),
        };
        if let Some(path) = env_path {
            env_files.push(load_env_file(&path, &mut variables)?);
        }

        let mut base_urls = HashMap::new();
        let raw_base_urls = root
            .base_urls
            .iter()
            .chain(own.into_iter().flat_map(|own| own.base_urls.iter()));
        for (name, raw) in raw_base_urls {
            let url = expand_placeholders(raw, &variables)
                .with_context(|| format!("resolving base URL {name}"))?;
            base_urls.insert(name.clone(), url);
        }

        let mut headers: HashMap<&String, &String> = root.default_headers.iter().collect();
        if let Some(own) = own {
            headers.extend(own.default_headers.iter());
        }
        let mut default_headers = headers
            .into_iter()
            .map(|(name, raw)| {
                expand_placeholders(raw, &variables)
                    .map(|value| (name.clone(), value))
                    .with_context(|| format!("resolving default header {name}"))
            })
            .collect::<Result<Vec<_>>>()?;
        default_headers.sort();

        let dump_dir = pick(own.and_then(|own| own.dump_dir.as_ref()), &root.dump_dir)
            .map(|dir| self.resolve_dir(&dir, &variables))
            .transpose()
            .context("resolving dumpDir")?;
        let download_dir = pick(own.and_then(|own| own.download_dir.as_ref()), &root.download_dir)
            .map(|dir| self.resolve_dir(&dir, &variables))
            .transpose()
            .context("resolving downloadDir")?;
        let user_agent = pick(own.and_then(|own| own.user_agent.as_ref()), &root.user_agent)
            .map(|agent| expand_placeholders(&agent, &variables))
            .transpose()
            .context("resolving userAgent")?;

        let timeout = own.and_then(|own| own.timeout_ms).or(root.timeout_ms);
        let connect_timeout = own
            .and_then(|own| own.connect_timeout_ms)
            .or(root.connect_timeout_ms);

        Ok(RestSettings {
            profile_name: profile.map(|(name, _)| name),
            variables,
            base_urls,
            dump_dir,
            download_dir,
            client_options: ClientOptions {
                timeout: timeout.map(Duration::from_millis),
                connect_timeout: connect_timeout.map(Duration::from_millis),
                user_agent,
                default_headers,
            },
            env_files,
        })
    }

    fn resolve_dir(&self, raw: &str, variables: &VarMap) -> Result<PathBuf> {
        let expanded = expand_placeholders(raw, variables)?;
        Ok(resolve_relative(&self.config_dir, Path::new(&expanded)))
    }
}

fn pick(from_profile: Option<&String>, from_root: &Option<String>) -> Option<String> {
    from_profile.or(from_root.as_ref()).cloned()
}

fn resolve_relative(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

/// The requested profile, else `defaultProfile`, else the only profile there
/// is. Configurations without profiles resolve to none.
fn resolve_profile<'a>(
    config: &'a ScreenplayConfig,
    requested: Option<&str>,
) -> Result<Option<(String, &'a ProfileConfig)>> {
    if let Some(name) = requested {
        return match config.profiles.get(name) {
            Some(profile) => Ok(Some((name.to_string(), profile))),
            None => bail!("Unknown profile: {name}"),
        };
    }

    if let Some(name) = &config.default_profile {
        return match config.profiles.get(name) {
            Some(profile) => Ok(Some((name.clone(), profile))),
            None => bail!("Default profile {name} is not defined"),
        };
    }

    match config.profiles.len() {
        0 => Ok(None),
        1 => Ok(config
            .profiles
            .iter()
            .next()
            .map(|(name, profile)| (name.clone(), profile))),
        _ => bail!("Several profiles are defined; choose one or set defaultProfile"),
    }
}
