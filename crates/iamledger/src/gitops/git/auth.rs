//! Environment for authenticated git network commands.

use std::path::PathBuf;

use secrecy::ExposeSecret;

use crate::config::{GitAuthSettings, GitAuthType};
use crate::gitops::error::{GitOpsError, Result};

/// Quotes a value for a single-quoted POSIX shell string.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Deletes the askpass script when dropped so the token does not outlive
/// the command that needed it.
#[derive(Debug)]
pub struct AskpassCleanup {
    path: Option<PathBuf>,
}

impl AskpassCleanup {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn empty() -> Self {
        Self { path: None }
    }
}

impl Drop for AskpassCleanup {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("Failed to clean up askpass script: {}", e);
            }
        }
    }
}

/// Variables to set on the git process. Keep it alive until the process
/// has exited.
#[derive(Debug)]
pub struct AuthEnv {
    pub env_vars: Vec<(String, String)>,
    _cleanup: AskpassCleanup,
}

impl AuthEnv {
    fn plain(env_vars: Vec<(String, String)>) -> Self {
        Self {
            env_vars,
            _cleanup: AskpassCleanup::empty(),
        }
    }
}

pub fn build_auth_env(auth: &GitAuthSettings) -> Result<AuthEnv> {
    // Never block on an interactive prompt.
    let mut env = vec![("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())];

    match auth.auth_type {
        GitAuthType::None => Ok(AuthEnv::plain(env)),
        GitAuthType::Token => token_env(auth, env),
        GitAuthType::SshKey => {
            let key_path = if auth.ssh_key_path.is_empty() {
                dirs::home_dir()
                    .map(|h| h.join(".ssh").join("id_ed25519"))
                    .unwrap_or_else(|| PathBuf::from(".ssh/id_ed25519"))
            } else {
                crate::secrets::expand_home(&auth.ssh_key_path)
            };

            if !key_path.exists() {
                return Err(GitOpsError::GitAuthFailed(format!(
                    "SSH key file not found: {}",
                    key_path.display()
                )));
            }

            let display = key_path.display().to_string();
            let quoted = if display.starts_with('-') {
                shell_quote(&format!("./{}", display))
            } else {
                shell_quote(&display)
            };
            env.push((
                "GIT_SSH_COMMAND".to_string(),
                format!(
                    "ssh -i {} -o IdentitiesOnly=yes -o StrictHostKeyChecking=accept-new",
                    quoted
                ),
            ));
            Ok(AuthEnv::plain(env))
        }
    }
}

fn askpass_script(username: &str, token: &str) -> String {
    format!(
        "#!/bin/sh\ncase \"$1\" in\n  Username*) echo {} ;;\n  *) echo {} ;;\nesac\n",
        shell_quote(username),
        shell_quote(token)
    )
}

#[cfg(unix)]
fn token_env(auth: &GitAuthSettings, mut env: Vec<(String, String)>) -> Result<AuthEnv> {
    use std::os::unix::fs::OpenOptionsExt;

    let env_var = Some(auth.token_env_var.as_str()).filter(|v| !v.is_empty());
    let token = crate::secrets::resolve_secret(
        auth.token_insecure.as_deref(),
        auth.token_file.as_deref(),
        env_var,
    )
    .map_err(|e| GitOpsError::GitAuthFailed(format!("Failed to resolve git token: {}", e)))?;

    let path = std::env::temp_dir().join(format!(
        ".iamledger-askpass-{}.sh",
        uuid::Uuid::new_v4()
    ));
    let script = askpass_script(&auth.username, token.expose_secret());

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o700)
        .open(&path)?;
    std::io::Write::write_all(&mut file, script.as_bytes())?;
    drop(file);

    let cleanup = AskpassCleanup::new(path.clone());
    let path_str = path
        .to_str()
        .ok_or_else(|| {
            GitOpsError::GitAuthFailed("Temp directory path is not valid UTF-8".to_string())
        })?
        .to_string();

    env.push(("GIT_ASKPASS".to_string(), path_str));
    Ok(AuthEnv {
        env_vars: env,
        _cleanup: cleanup,
    })
}

#[cfg(not(unix))]
fn token_env(_auth: &GitAuthSettings, _env: Vec<(String, String)>) -> Result<AuthEnv> {
    Err(GitOpsError::GitAuthFailed(
        "token authentication requires a POSIX shell for GIT_ASKPASS".to_string(),
    ))
}
