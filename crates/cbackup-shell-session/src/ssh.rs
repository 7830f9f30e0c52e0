//! SSH transport built on libssh2.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use cbackup_shell_core::{Error, Result, SessionConfig};

use crate::transport::{Dialer, Transport};

/// Dialer that opens real SSH connections.
#[derive(Debug, Default)]
pub struct SshDialer;

impl Dialer for SshDialer {
    fn dial(&self, config: &SessionConfig) -> Result<Box<dyn Transport>> {
        Ok(Box::new(SshTransport::open(config)?))
    }
}

/// An authenticated SSH connection with one interactive shell channel.
pub struct SshTransport {
    session: ssh2::Session,
    channel: ssh2::Channel,
    endpoint: String,
    closed: bool,
}

impl std::fmt::Debug for SshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshTransport")
            .field("endpoint", &self.endpoint)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl SshTransport {
    /// Connect, authenticate, and open the interactive shell channel.
    ///
    /// The TCP connect and the SSH handshake share the configured connect
    /// timeout. Credential rejection is an authentication error carrying the
    /// endpoint; every other failure is a transport error with the
    /// underlying message.
    pub fn open(config: &SessionConfig) -> Result<Self> {
        let endpoint = config.endpoint();
        info!("Connecting to scheduler shell at {}", endpoint);

        let addr = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| Error::Transport(format!("failed to resolve {endpoint}: {e}")))?
            .next()
            .ok_or_else(|| Error::Transport(format!("no addresses found for {endpoint}")))?;

        let tcp = TcpStream::connect_timeout(&addr, config.connect_timeout)
            .map_err(|e| Error::Transport(format!("failed to connect to {endpoint}: {e}")))?;

        let mut session = ssh2::Session::new()
            .map_err(|e| Error::Transport(format!("failed to create SSH session: {e}")))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(timeout_ms(config.connect_timeout));
        session
            .handshake()
            .map_err(|e| Error::Transport(format!("SSH handshake with {endpoint} failed: {e}")))?;

        // The scheduler shell accepts password logins only; any rejection is
        // final - credentials are never retried.
        session
            .userauth_password(&config.username, &config.password)
            .map_err(|_| Error::Authentication {
                host: config.host.clone(),
                port: config.port,
            })?;
        if !session.authenticated() {
            return Err(Error::Authentication {
                host: config.host.clone(),
                port: config.port,
            });
        }
        debug!("Authenticated at {} as {}", endpoint, config.username);

        let mut channel = session
            .channel_session()
            .map_err(|e| Error::Transport(format!("failed to open channel: {e}")))?;
        channel
            .request_pty("vt100", None, None)
            .map_err(|e| Error::Transport(format!("failed to request pty: {e}")))?;
        channel
            .shell()
            .map_err(|e| Error::Transport(format!("failed to start shell: {e}")))?;

        info!("Interactive shell ready at {}", endpoint);
        Ok(Self {
            session,
            channel,
            endpoint,
            closed: false,
        })
    }
}

impl Transport for SshTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.channel
            .write_all(data)
            .and_then(|()| self.channel.flush())
            .map_err(|e| Error::Transport(format!("write to {} failed: {e}", self.endpoint)))
    }

    fn read_chunk(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        // Applies to this read only; the executor passes the remaining
        // deadline budget on every call.
        self.session.set_timeout(timeout_ms(timeout));
        let mut buf = [0u8; 8192];
        match self.channel.read(&mut buf) {
            Ok(0) => Err(Error::Transport(format!(
                "connection to {} closed by remote shell",
                self.endpoint
            ))),
            Ok(n) => {
                debug!("Read {} bytes from {}", n, self.endpoint);
                Ok(buf[..n].to_vec())
            }
            Err(e) => Err(Error::Transport(format!(
                "read from {} failed: {e}",
                self.endpoint
            ))),
        }
    }

    fn exec(&mut self, command: &str) -> Result<String> {
        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| Error::Transport(format!("failed to open exec channel: {e}")))?;
        channel
            .exec(command)
            .map_err(|e| Error::Transport(format!("exec failed: {e}")))?;

        let mut output = String::new();
        channel
            .read_to_string(&mut output)
            .map_err(|e| Error::Transport(format!("failed to read exec output: {e}")))?;
        let _ = channel.wait_close();
        Ok(output.trim().to_string())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let _ = self.channel.close();
        let _ = self.channel.wait_close();
        if let Err(e) = self
            .session
            .disconnect(None, "closing scheduler shell session", None)
        {
            // The link may already be gone; closing stays idempotent.
            debug!("SSH disconnect from {} reported: {}", self.endpoint, e);
        }
        info!("Disconnected from {}", self.endpoint);
        Ok(())
    }
}

/// Clamp a duration into libssh2's millisecond timeout representation.
/// Zero means "block forever" to libssh2, so the floor is one millisecond.
fn timeout_ms(timeout: Duration) -> u32 {
    timeout.as_millis().clamp(1, u32::MAX as u128) as u32
}
