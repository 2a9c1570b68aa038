//! SSH/SFTP transport.
//!
//! One authenticated session and one SFTP channel are opened at construction
//! and held for the whole mirror run. `ssh2` is a blocking library, so every
//! call runs inside `tokio::task::spawn_blocking`.

use std::io::{BufReader, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{Transport, TransportError};
use crate::config::RemoteConfig;

// SFTP status codes from the protocol, as surfaced by libssh2
const SFTP_NO_SUCH_FILE: i32 = 2;
const SFTP_PERMISSION_DENIED: i32 = 3;
const SFTP_NO_SUCH_PATH: i32 = 10;

struct SftpChannel {
    sftp: ssh2::Sftp,
    // Field order matters: the channel must close before the session drops.
    _session: ssh2::Session,
}

pub struct SftpTransport {
    channel: Arc<Mutex<SftpChannel>>,
    host: String,
    base_dir: String,
}

impl SftpTransport {
    /// Connect, authenticate with the private key, and open the SFTP channel.
    ///
    /// `timeout` bounds every blocking libssh2 call on the session. The
    /// engine's own per-transfer timeout only abandons the awaiting task; it
    /// cannot interrupt a blocked call, so the session timeout is what keeps
    /// a dead peer from holding the channel indefinitely.
    pub async fn connect(remote: &RemoteConfig, timeout: Duration) -> Result<Self, TransportError> {
        let remote = remote.clone();
        tokio::task::spawn_blocking(move || Self::connect_blocking(&remote, timeout))
            .await
            .map_err(|e| TransportError::Connection(format!("ssh task failed: {}", e)))?
    }

    fn connect_blocking(remote: &RemoteConfig, timeout: Duration) -> Result<Self, TransportError> {
        let addr = format!("{}:{}", remote.host, remote.port);
        let tcp = TcpStream::connect(&addr)
            .map_err(|e| TransportError::Connection(format!("{}: {}", addr, e)))?;

        let mut session = ssh2::Session::new()
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
        session
            .handshake()
            .map_err(|e| TransportError::Connection(format!("handshake: {}", e)))?;

        session
            .userauth_pubkey_file(&remote.username, None, &remote.key_path, None)
            .map_err(|e| TransportError::Authentication(e.to_string()))?;
        if !session.authenticated() {
            return Err(TransportError::Authentication(format!(
                "key authentication rejected for {}@{}",
                remote.username, remote.host
            )));
        }

        let sftp = session
            .sftp()
            .map_err(|e| TransportError::Connection(format!("sftp channel: {}", e)))?;

        tracing::debug!(host = %remote.host, "SFTP session established");

        Ok(Self {
            channel: Arc::new(Mutex::new(SftpChannel {
                sftp,
                _session: session,
            })),
            host: remote.host.clone(),
            base_dir: remote.directory.clone(),
        })
    }

    /// Map a destination key (or a container prefix, possibly empty) onto
    /// the remote directory tree.
    fn remote_path(&self, key: &str) -> PathBuf {
        let mut path = PathBuf::from(&self.base_dir);
        if !key.is_empty() {
            path.push(key);
        }
        path
    }
}

/// Copy a local file into a destination writer in buffered chunks, so a
/// large file never has to fit in memory.
fn stream_file_to<W: Write>(
    local_path: &Path,
    dest: &mut W,
    key: &str,
) -> Result<u64, TransportError> {
    let file = std::fs::File::open(local_path).map_err(|e| TransportError::Upload {
        key: key.to_string(),
        reason: format!("read {}: {}", local_path.display(), e),
    })?;
    let mut reader = BufReader::new(file);

    std::io::copy(&mut reader, dest).map_err(|e| TransportError::Upload {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn classify_sftp_error(e: &ssh2::Error, context: &str) -> TransportError {
    match e.code() {
        ssh2::ErrorCode::SFTP(SFTP_NO_SUCH_FILE) | ssh2::ErrorCode::SFTP(SFTP_NO_SUCH_PATH) => {
            TransportError::NotFound(context.to_string())
        }
        ssh2::ErrorCode::SFTP(SFTP_PERMISSION_DENIED) => {
            TransportError::PermissionDenied(context.to_string())
        }
        _ => TransportError::Upload {
            key: context.to_string(),
            reason: e.to_string(),
        },
    }
}

#[async_trait]
impl Transport for SftpTransport {
    async fn ensure_container(&self, path: &str) -> Result<(), TransportError> {
        let channel = Arc::clone(&self.channel);
        let dir = self.remote_path(path);

        tokio::task::spawn_blocking(move || {
            let guard = channel.lock().expect("sftp channel lock poisoned");
            match guard.sftp.stat(&dir) {
                Ok(_) => Ok(()),
                Err(e) => match classify_sftp_error(&e, &dir.display().to_string()) {
                    // Missing is the one failure we are allowed to repair
                    TransportError::NotFound(_) => guard
                        .sftp
                        .mkdir(&dir, 0o755)
                        .map_err(|e| classify_sftp_error(&e, &dir.display().to_string())),
                    other => Err(other),
                },
            }
        })
        .await
        .map_err(|e| TransportError::Connection(format!("ssh task failed: {}", e)))?
    }

    async fn put_file(&self, local_path: &Path, key: &str) -> Result<(), TransportError> {
        let channel = Arc::clone(&self.channel);
        let local_path = local_path.to_path_buf();
        let remote = self.remote_path(key);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let guard = channel.lock().expect("sftp channel lock poisoned");
            let mut remote_file = guard
                .sftp
                .create(&remote)
                .map_err(|e| classify_sftp_error(&e, &key))?;
            stream_file_to(&local_path, &mut remote_file, &key)?;
            Ok(())
        })
        .await
        .map_err(|e| TransportError::Connection(format!("ssh task failed: {}", e)))?
    }

    fn describe(&self) -> String {
        format!("Remote Server: {}:{}", self.host, self.base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn streams_full_file_contents() {
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join("payload.bin");
        let payload = vec![7u8; 64 * 1024 + 13];
        fs::write(&local, &payload).unwrap();

        let mut sink: Vec<u8> = Vec::new();
        let written = stream_file_to(&local, &mut sink, "payload.bin").unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(sink, payload);
    }

    #[test]
    fn missing_local_file_is_an_upload_error() {
        let temp_dir = TempDir::new().unwrap();
        let gone = temp_dir.path().join("gone.bin");

        let mut sink: Vec<u8> = Vec::new();
        let err = stream_file_to(&gone, &mut sink, "gone.bin").unwrap_err();

        assert!(matches!(err, TransportError::Upload { ref key, .. } if key == "gone.bin"));
        assert!(sink.is_empty());
    }
}
