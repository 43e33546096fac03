//! Login configuration
//!
//! Credentials come from, in order of precedence, `MAZ_*` environment
//! variables, then `credentials.yaml` under the config directory. Setting
//! any of the environment variables switches the whole credential set to
//! the environment; the two sources are never mixed.
//!
//! Two login methods exist: interactive (a username, public-client
//! browser flow) and client-secret (a confidential client). The tenant id
//! must always be a valid UUID, as must the client id when used.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::{Error, Result};

/// Identity provider base URL; the tenant id is appended.
pub const AUTHORITY_BASE_URL: &str = "https://login.microsoftonline.com";

/// Credentials file name under the config directory.
pub const CREDENTIALS_FILE: &str = "credentials.yaml";

/// Token cache file name under the config directory.
pub const TOKEN_CACHE_FILE: &str = "token_cache.json";

const ENV_TENANT_ID: &str = "MAZ_TENANT_ID";
const ENV_USERNAME: &str = "MAZ_USERNAME";
const ENV_INTERACTIVE: &str = "MAZ_INTERACTIVE";
const ENV_CLIENT_ID: &str = "MAZ_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "MAZ_CLIENT_SECRET";

/// How the tool authenticates against the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginMethod {
    /// Browser-driven public-client flow for the named user.
    Interactive { username: String },
    /// Confidential-client flow with a client id and secret.
    ClientSecret {
        client_id: Uuid,
        client_secret: String,
    },
}

/// Validated login configuration.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub tenant_id: Uuid,
    pub method: LoginMethod,
}

/// Raw shape of `credentials.yaml`.
#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    tenant_id: Option<String>,
    username: Option<String>,
    interactive: Option<serde_yaml::Value>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl Credentials {
    /// Load credentials, preferring environment variables over the file.
    pub fn load(conf_dir: &Path) -> Result<Self> {
        if env_in_use() {
            debug!("loading credentials from environment variables");
            Self::from_env()
        } else {
            let path = conf_dir.join(CREDENTIALS_FILE);
            debug!(path = %path.display(), "loading credentials file");
            Self::from_file(&path)
        }
    }

    fn from_env() -> Result<Self> {
        let tenant_id = parse_tenant_id(&env_var(ENV_TENANT_ID), ENV_TENANT_ID)?;
        // A set username implies the interactive flow.
        let interactive =
            parse_bool(&env_var(ENV_INTERACTIVE)) || !env_var(ENV_USERNAME).is_empty();

        let method = if interactive {
            LoginMethod::Interactive {
                username: env_var(ENV_USERNAME).to_lowercase(),
            }
        } else {
            let client_id = env_var(ENV_CLIENT_ID);
            let client_id = Uuid::parse_str(&client_id).map_err(|_| {
                Error::Format(format!(
                    "[{ENV_CLIENT_ID}] client_id '{client_id}' is not a valid UUID"
                ))
            })?;
            let client_secret = env_var(ENV_CLIENT_SECRET);
            if client_secret.is_empty() {
                return Err(Error::Format(format!(
                    "[{ENV_CLIENT_SECRET}] client_secret is blank"
                )));
            }
            LoginMethod::ClientSecret {
                client_id,
                client_secret,
            }
        };

        Ok(Self { tenant_id, method })
    }

    /// Parse and validate a credentials file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Format(format!(
                "missing or unreadable credentials file {}: {e}\n\
                 rerun with 'creds set-interactive' or 'creds set-client' to configure login",
                path.display()
            ))
        })?;
        let raw: CredentialsFile = serde_yaml::from_str(&content)
            .map_err(|e| Error::Format(format!("[{}] {e}", path.display())))?;

        let label = path.display().to_string();
        let tenant_id = parse_tenant_id(raw.tenant_id.as_deref().unwrap_or(""), &label)?;

        let interactive = raw
            .interactive
            .as_ref()
            .map(|v| match v {
                serde_yaml::Value::Bool(b) => *b,
                serde_yaml::Value::String(s) => parse_bool(s),
                _ => false,
            })
            .unwrap_or(false);

        let method = if interactive {
            LoginMethod::Interactive {
                username: raw.username.unwrap_or_default().to_lowercase(),
            }
        } else {
            let client_id = raw.client_id.unwrap_or_default();
            let client_id = Uuid::parse_str(&client_id).map_err(|_| {
                Error::Format(format!(
                    "[{label}] client_id '{client_id}' is not a valid UUID"
                ))
            })?;
            let client_secret = raw.client_secret.unwrap_or_default();
            if client_secret.is_empty() {
                return Err(Error::Format(format!("[{label}] client_secret is blank")));
            }
            LoginMethod::ClientSecret {
                client_id,
                client_secret,
            }
        };

        Ok(Self { tenant_id, method })
    }

    /// The identity authority for this tenant.
    pub fn authority_url(&self) -> String {
        format!("{AUTHORITY_BASE_URL}/{}", self.tenant_id)
    }

    /// True for the interactive public-client method.
    pub fn is_interactive(&self) -> bool {
        matches!(self.method, LoginMethod::Interactive { .. })
    }
}

fn env_var(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// True when any login environment variable is set.
pub fn env_in_use() -> bool {
    [
        ENV_TENANT_ID,
        ENV_USERNAME,
        ENV_INTERACTIVE,
        ENV_CLIENT_ID,
        ENV_CLIENT_SECRET,
    ]
    .iter()
    .any(|v| !env_var(v).is_empty())
}

fn parse_tenant_id(value: &str, source: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| Error::Format(format!("[{source}] tenant_id '{value}' is not a valid UUID")))
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1")
}

/// Platform default config directory, typically `~/.config/tenaz`.
pub fn default_conf_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("tenaz")
}

/// Write `credentials.yaml` for interactive login.
pub fn write_interactive_credentials(
    conf_dir: &Path,
    tenant_id: &str,
    username: &str,
) -> Result<PathBuf> {
    let tenant_id = parse_tenant_id(tenant_id, "tenant_id")?;
    let path = conf_dir.join(CREDENTIALS_FILE);
    let mut content = String::new();
    let _ = writeln!(content, "{:<14} {tenant_id}", "tenant_id:");
    let _ = writeln!(content, "{:<14} {}", "username:", username.to_lowercase());
    let _ = writeln!(content, "{:<14} true", "interactive:");
    write_private(&path, content.as_bytes())?;
    Ok(path)
}

/// Write `credentials.yaml` for client-secret login.
pub fn write_client_credentials(
    conf_dir: &Path,
    tenant_id: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<PathBuf> {
    let tenant_id = parse_tenant_id(tenant_id, "tenant_id")?;
    let client_id = Uuid::parse_str(client_id)
        .map_err(|_| Error::Format(format!("client_id '{client_id}' is not a valid UUID")))?;
    let path = conf_dir.join(CREDENTIALS_FILE);
    let mut content = String::new();
    let _ = writeln!(content, "{:<14} {tenant_id}", "tenant_id:");
    let _ = writeln!(content, "{:<14} {client_id}", "client_id:");
    let _ = writeln!(content, "{:<14} {client_secret}", "client_secret:");
    write_private(&path, content.as_bytes())?;
    Ok(path)
}

/// Write a file with owner-only permissions (mode 0600).
pub fn write_private(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Print the configured login values: environment then file.
pub fn dump_login_values(conf_dir: &Path) {
    println!(
        "config_dir: {}  # config and cache directory",
        conf_dir.display()
    );

    println!("os_environment_variables:");
    println!("  # 1. Environment variable login values override the credentials file");
    println!("  # 2. {ENV_USERNAME}+{ENV_INTERACTIVE} take priority over {ENV_CLIENT_ID}+{ENV_CLIENT_SECRET}");
    for var in [
        ENV_TENANT_ID,
        ENV_USERNAME,
        ENV_INTERACTIVE,
        ENV_CLIENT_ID,
        ENV_CLIENT_SECRET,
    ] {
        println!("  {var}: {}", env_var(var));
    }

    println!("credentials_config_file:");
    let path = conf_dir.join(CREDENTIALS_FILE);
    println!("  file_path: {}", path.display());
    let raw = std::fs::read_to_string(&path)
        .ok()
        .and_then(|c| serde_yaml::from_str::<CredentialsFile>(&c).ok())
        .unwrap_or_default();
    println!("  tenant_id: {}", raw.tenant_id.unwrap_or_default());
    let interactive = raw
        .interactive
        .map(|v| match v {
            serde_yaml::Value::Bool(b) => b,
            serde_yaml::Value::String(s) => parse_bool(&s),
            _ => false,
        })
        .unwrap_or(false);
    if interactive {
        println!("  username: {}", raw.username.unwrap_or_default());
        println!("  interactive: true");
    } else {
        println!("  client_id: {}", raw.client_id.unwrap_or_default());
        println!("  client_secret: {}", raw.client_secret.unwrap_or_default());
    }
}
