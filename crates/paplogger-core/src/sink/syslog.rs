//! Remote syslog sink.
//!
//! Each line is sent as `<PRI>line\0` with the `user` facility, over UDP
//! (one datagram per line) or a TCP stream. The collector address can be
//! changed in place; a new address is resolved before it replaces the old
//! one.

use std::fmt;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{Sink, SinkKind, SinkSettings};
use crate::error::{LoggerError, LoggerResult};
use crate::format::FormatKind;
use crate::level::Level;

/// Standard syslog port.
pub const DEFAULT_SYSLOG_PORT: u16 = 514;

/// Remote sinks never forward anything below this level.
pub const SYSLOG_THRESHOLD: Level = Level::Warning;

const FACILITY_USER: u8 = 1;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport used to reach the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyslogTransport {
    #[default]
    Udp,
    Tcp,
}

/// Syslog severity code for a level.
pub fn severity(level: Level) -> u8 {
    match level {
        Level::Debug => 7,
        Level::Info => 6,
        Level::Warning => 4,
        Level::Error => 3,
        Level::Critical => 2,
    }
}

/// Syslog priority value (`facility * 8 + severity`).
pub fn priority(level: Level) -> u8 {
    FACILITY_USER * 8 + severity(level)
}

/// Sink forwarding records to a syslog collector.
pub struct SyslogSink {
    settings: SinkSettings,
    transport: SyslogTransport,
    state: Mutex<RemoteState>,
}

struct RemoteState {
    host: String,
    port: u16,
    resolved: SocketAddr,
    udp: Option<UdpSocket>,
    tcp: Option<TcpStream>,
}

impl SyslogSink {
    /// Resolve (UDP) or connect to (TCP) the collector.
    ///
    /// Fails when the host cannot be resolved or, for TCP, reached.
    pub fn connect(host: impl Into<String>, port: u16, transport: SyslogTransport) -> LoggerResult<Self> {
        let host = host.into();
        let remote_err = |source: io::Error| LoggerError::Remote {
            host: host.clone(),
            port,
            source,
        };

        let addr = resolve(&host, port).map_err(remote_err)?;
        let mut state = RemoteState {
            host: host.clone(),
            port,
            resolved: addr,
            udp: None,
            tcp: None,
        };
        match transport {
            SyslogTransport::Udp => state.udp = Some(bind_udp(&addr).map_err(remote_err)?),
            SyslogTransport::Tcp => {
                state.tcp = Some(TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(remote_err)?)
            }
        }

        Ok(Self {
            settings: SinkSettings::new(SinkKind::Remote, SYSLOG_THRESHOLD, FormatKind::Syslog),
            transport,
            state: Mutex::new(state),
        })
    }

    /// Current collector address.
    pub fn address(&self) -> (String, u16) {
        let state = self.state.lock();
        (state.host.clone(), state.port)
    }

    pub fn transport(&self) -> SyslogTransport {
        self.transport
    }

    /// Point the sink at another collector without recreating it.
    ///
    /// The new address is resolved (and, for TCP, connected) first. On
    /// failure the sink keeps its current collector.
    pub fn set_address(&self, host: impl Into<String>, port: u16) -> LoggerResult<()> {
        let host = host.into();
        {
            let state = self.state.lock();
            if state.host == host && state.port == port {
                return Ok(());
            }
        }

        let remote_err = |source: io::Error| LoggerError::Remote {
            host: host.clone(),
            port,
            source,
        };
        let addr = resolve(&host, port).map_err(remote_err)?;
        let tcp = match self.transport {
            SyslogTransport::Udp => None,
            SyslogTransport::Tcp => {
                Some(TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(remote_err)?)
            }
        };

        let mut state = self.state.lock();
        state.host = host;
        state.port = port;
        state.resolved = addr;
        state.tcp = tcp;
        Ok(())
    }

    fn send(&self, state: &mut RemoteState, packet: &[u8]) -> io::Result<()> {
        let addr = state.resolved;

        match self.transport {
            SyslogTransport::Udp => {
                let family_matches = state
                    .udp
                    .as_ref()
                    .and_then(|socket| socket.local_addr().ok())
                    .is_some_and(|local| local.is_ipv4() == addr.is_ipv4());
                if !family_matches {
                    state.udp = Some(bind_udp(&addr)?);
                }
                if let Some(socket) = state.udp.as_ref() {
                    socket.send_to(packet, addr)?;
                }
                Ok(())
            }
            SyslogTransport::Tcp => {
                if state.tcp.is_none() {
                    state.tcp = Some(TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)?);
                }
                let result = match state.tcp.as_mut() {
                    Some(stream) => stream.write_all(packet).and_then(|_| stream.flush()),
                    None => Ok(()),
                };
                if result.is_err() {
                    state.tcp = None;
                }
                result
            }
        }
    }
}

impl Sink for SyslogSink {
    fn settings(&self) -> &SinkSettings {
        &self.settings
    }

    fn write_line(&self, level: Level, line: &str) -> io::Result<()> {
        let packet = format!("<{}>{}\0", priority(level), line);
        let mut state = self.state.lock();
        self.send(&mut state, packet.as_bytes())
    }

    fn close(&self) {
        let mut state = self.state.lock();
        state.tcp = None;
        state.udp = None;
    }
}

impl fmt::Debug for SyslogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SyslogSink")
            .field("settings", &self.settings)
            .field("transport", &self.transport)
            .field("host", &state.host)
            .field("port", &state.port)
            .finish()
    }
}

fn resolve(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port).to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no address found for {host}:{port}"),
        )
    })
}

fn bind_udp(target: &SocketAddr) -> io::Result<UdpSocket> {
    if target.is_ipv4() {
        UdpSocket::bind(("0.0.0.0", 0))
    } else {
        UdpSocket::bind(("::", 0))
    }
}
