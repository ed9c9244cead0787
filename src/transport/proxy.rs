//! C3 ProxyDialer: HTTP CONNECT and SOCKS5/SOCKS5H tunneling. Ported from
//! the teacher's synchronous `http_client::proxy`, rewritten against
//! `tokio::net::TcpStream` and extended with SOCKS5H (hostname resolution
//! deferred to the proxy) per §4.3.

use crate::error::{Error, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyType {
    Http,
    Https,
    Socks5,
    /// Like `Socks5`, but the target hostname is sent to the proxy
    /// unresolved -- the proxy performs DNS, not this process.
    Socks5h,
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub proxy_type: ProxyType,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    pub fn http(host: String, port: u16) -> Self {
        Self { proxy_type: ProxyType::Http, host, port, username: None, password: None }
    }

    pub fn socks5(host: String, port: u16) -> Self {
        Self { proxy_type: ProxyType::Socks5, host, port, username: None, password: None }
    }

    pub fn socks5h(host: String, port: u16) -> Self {
        Self { proxy_type: ProxyType::Socks5h, host, port, username: None, password: None }
    }

    pub fn with_auth(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }

    /// Parses `scheme://[user:pass@]host:port` proxy URLs accepted by the
    /// builder (§6). An empty URL is rejected with `Error::ProxyEmpty`; a
    /// username without a password with `Error::PasswordEmpty`.
    pub fn parse(url: &str) -> Result<Self> {
        if url.is_empty() {
            return Err(Error::ProxyEmpty);
        }
        let parsed = url::Url::parse(url).map_err(|e| Error::ProxyURL(e.to_string()))?;
        let proxy_type = match parsed.scheme() {
            "http" => ProxyType::Http,
            "https" => ProxyType::Https,
            "socks5" => ProxyType::Socks5,
            "socks5h" => ProxyType::Socks5h,
            other => return Err(Error::ProxyURL(format!("unsupported proxy scheme: {other}"))),
        };
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::ProxyURL("missing proxy host".into()))?
            .to_string();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| Error::ProxyURL("missing proxy port".into()))?;
        let username = if parsed.username().is_empty() {
            None
        } else {
            Some(parsed.username().to_string())
        };
        if username.is_some() && parsed.password().is_none() {
            return Err(Error::PasswordEmpty(url.to_string()));
        }
        let password = parsed.password().map(|p| p.to_string());
        Ok(Self { proxy_type, host, port, username, password })
    }
}

pub async fn connect_through_proxy(
    proxy: &ProxyConfig,
    target_host: &str,
    target_port: u16,
) -> Result<TcpStream> {
    match proxy.proxy_type {
        ProxyType::Http | ProxyType::Https => connect_http_proxy(proxy, target_host, target_port).await,
        ProxyType::Socks5 | ProxyType::Socks5h => connect_socks5_proxy(proxy, target_host, target_port).await,
    }
}

async fn connect_http_proxy(proxy: &ProxyConfig, target_host: &str, target_port: u16) -> Result<TcpStream> {
    let proxy_addr = format!("{}:{}", proxy.host, proxy.port);
    let mut stream = TcpStream::connect(&proxy_addr).await?;

    let mut request = format!(
        "CONNECT {target_host}:{target_port} HTTP/1.1\r\nHost: {target_host}:{target_port}\r\n"
    );
    if let (Some(user), Some(pass)) = (&proxy.username, &proxy.password) {
        use base64::Engine;
        let creds = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{pass}"));
        request.push_str(&format!("Proxy-Authorization: Basic {creds}\r\n"));
    }
    request.push_str("\r\n");

    stream.write_all(request.as_bytes()).await?;

    let mut buf = vec![0u8; 4096];
    let n = stream.read(&mut buf).await?;
    let response = String::from_utf8_lossy(&buf[..n]);
    let status_line = response.lines().next().unwrap_or("");
    if !status_line.contains("200") {
        return Err(Error::ProxyStatus(status_line.to_string()));
    }

    Ok(stream)
}

async fn connect_socks5_proxy(proxy: &ProxyConfig, target_host: &str, target_port: u16) -> Result<TcpStream> {
    let proxy_addr = format!("{}:{}", proxy.host, proxy.port);
    let mut stream = TcpStream::connect(&proxy_addr).await?;

    let auth_methods: &[u8] = if proxy.username.is_some() {
        &[0x05, 0x02, 0x00, 0x02]
    } else {
        &[0x05, 0x01, 0x00]
    };
    stream.write_all(auth_methods).await?;

    let mut chosen = [0u8; 2];
    stream.read_exact(&mut chosen).await?;
    if chosen[0] != 0x05 {
        return Err(Error::Protocol("invalid SOCKS version in proxy response".into()));
    }

    if chosen[1] == 0x02 {
        let (Some(username), Some(password)) = (&proxy.username, &proxy.password) else {
            return Err(Error::Protocol("proxy requires auth but no credentials configured".into()));
        };
        let mut auth = vec![0x01, username.len() as u8];
        auth.extend_from_slice(username.as_bytes());
        auth.push(password.len() as u8);
        auth.extend_from_slice(password.as_bytes());
        stream.write_all(&auth).await?;

        let mut auth_resp = [0u8; 2];
        stream.read_exact(&mut auth_resp).await?;
        if auth_resp[1] != 0x00 {
            return Err(Error::Protocol("SOCKS5 authentication rejected".into()));
        }
    } else if chosen[1] != 0x00 {
        return Err(Error::Protocol(format!("unsupported SOCKS5 auth method: {}", chosen[1])));
    }

    let mut connect_request = vec![0x05, 0x01, 0x00, 0x03];
    connect_request.push(target_host.len() as u8);
    connect_request.extend_from_slice(target_host.as_bytes());
    connect_request.push((target_port >> 8) as u8);
    connect_request.push((target_port & 0xff) as u8);
    stream.write_all(&connect_request).await?;

    let mut head = [0u8; 4];
    stream.read_exact(&mut head).await?;
    if head[1] != 0x00 {
        return Err(Error::Protocol(format!("SOCKS5 CONNECT failed, code {}", head[1])));
    }

    match head[3] {
        0x01 => {
            let mut rest = [0u8; 6];
            stream.read_exact(&mut rest).await?;
        }
        0x03 => {
            let mut len = [0u8; 1];
            stream.read_exact(&mut len).await?;
            let mut rest = vec![0u8; len[0] as usize + 2];
            stream.read_exact(&mut rest).await?;
        }
        0x04 => {
            let mut rest = [0u8; 18];
            stream.read_exact(&mut rest).await?;
        }
        other => return Err(Error::Protocol(format!("unsupported SOCKS5 address type: {other}"))),
    }

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_empty_url() {
        assert!(matches!(ProxyConfig::parse(""), Err(Error::ProxyEmpty)));
    }

    #[test]
    fn parse_rejects_username_without_password() {
        let err = ProxyConfig::parse("http://user@proxy.example:8080").unwrap_err();
        assert!(matches!(err, Error::PasswordEmpty(_)));
    }

    #[test]
    fn parse_socks5h_scheme() {
        let cfg = ProxyConfig::parse("socks5h://proxy.example:1080").unwrap();
        assert_eq!(cfg.proxy_type, ProxyType::Socks5h);
        assert_eq!(cfg.port, 1080);
    }
}
