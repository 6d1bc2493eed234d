//! Sequential IPv4 range port scanner
//!
//! Tries one TCP connect per address and appends every address that
//! accepted to a result file, one per line.

use std::fs::OpenOptions;
use std::io::Write;
use std::net::{Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, TcpStream};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Per-address connect timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Not four decimal octets in 0..=255
    #[error("Invalid IP: {0}")]
    InvalidIp(String),

    /// Start address is above the end address
    #[error("Empty range: {start} is after {end}")]
    EmptyRange { start: Ipv4Addr, end: Ipv4Addr },
}

/// Parse a dotted quad, accepting only four octets each <= 255
fn parse_ip(s: &str) -> Result<Ipv4Addr, ScanError> {
    let octets: Vec<u8> = s
        .trim()
        .split('.')
        .map(|part| part.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| ScanError::InvalidIp(s.to_string()))?;

    match octets.as_slice() {
        [a, b, c, d] => Ok(Ipv4Addr::new(*a, *b, *c, *d)),
        _ => Err(ScanError::InvalidIp(s.to_string())),
    }
}

/// Inclusive range of IPv4 addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpRange {
    start: Ipv4Addr,
    end: Ipv4Addr,
}

impl IpRange {
    pub fn new(start: &str, end: &str) -> Result<Self, ScanError> {
        let start = parse_ip(start)?;
        let end = parse_ip(end)?;
        Self::from_addrs(start, end)
    }

    pub fn from_addrs(start: Ipv4Addr, end: Ipv4Addr) -> Result<Self, ScanError> {
        if start > end {
            return Err(ScanError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Ipv4Addr {
        self.start
    }

    pub fn end(&self) -> Ipv4Addr {
        self.end
    }

    /// Number of addresses in the range
    pub fn len(&self) -> u64 {
        u64::from(u32::from(self.end)) - u64::from(u32::from(self.start)) + 1
    }

    /// Addresses in ascending order
    pub fn iter(&self) -> <IpRange as IntoIterator>::IntoIter {
        (*self).into_iter()
    }
}

impl IntoIterator for IpRange {
    type Item = Ipv4Addr;
    type IntoIter = std::iter::Map<std::ops::RangeInclusive<u32>, fn(u32) -> Ipv4Addr>;

    fn into_iter(self) -> Self::IntoIter {
        (u32::from(self.start)..=u32::from(self.end)).map(Ipv4Addr::from as fn(u32) -> Ipv4Addr)
    }
}

/// Scans every address of an `IpRange` on one port
#[derive(Debug, Clone)]
pub struct IpRangeScanner {
    range: IpRange,
    port: u16,
    result_file: PathBuf,
    timeout: Duration,
}

impl IpRangeScanner {
    pub fn new(range: IpRange, port: u16, result_file: impl Into<PathBuf>) -> Self {
        Self {
            range,
            port,
            result_file: result_file.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn result_file(&self) -> &Path {
        &self.result_file
    }

    /// Probe every address in order. Failures are per-address and never
    /// stop the scan. Returns the addresses that accepted a connection.
    pub fn scan(&self) -> Vec<Ipv4Addr> {
        log::info!(
            "Scanning {} address(es) {}..={} on port {}",
            self.range.len(),
            self.range.start(),
            self.range.end(),
            self.port
        );

        let open: Vec<Ipv4Addr> = self.range.iter().filter(|ip| self.scan_one(*ip)).collect();

        log::info!("Scan finished: {} open", open.len());
        open
    }

    fn scan_one(&self, ip: Ipv4Addr) -> bool {
        let addr = SocketAddr::V4(SocketAddrV4::new(ip, self.port));
        let stream = match TcpStream::connect_timeout(&addr, self.timeout) {
            Ok(stream) => stream,
            Err(e) => {
                log::debug!("{} closed: {}", addr, e);
                return false;
            }
        };

        if let Err(e) = stream.shutdown(Shutdown::Both) {
            log::debug!("Shutdown of {} failed: {}", addr, e);
        }

        if let Err(e) = self.record(ip) {
            log::warn!("Failed to record {} in {}: {}", ip, self.result_file.display(), e);
        }
        true
    }

    fn record(&self, ip: Ipv4Addr) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.result_file)?;
        writeln!(file, "{}", ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::TcpListener;
    use tempfile::TempDir;

    #[test]
    fn test_parse_ip() {
        assert_eq!(parse_ip("10.0.0.1"), Ok(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(parse_ip("10.0.0").is_err());
        assert!(parse_ip("10.0.0.1.2").is_err());
        assert!(parse_ip("10.0.0.256").is_err());
        assert!(parse_ip("a.b.c.d").is_err());
        assert!(parse_ip("").is_err());
    }

    #[test]
    fn test_range_crosses_octet_boundary() {
        let range = IpRange::new("10.0.0.254", "10.0.1.1").unwrap();
        let ips: Vec<String> = range.iter().map(|ip| ip.to_string()).collect();

        assert_eq!(ips, vec!["10.0.0.254", "10.0.0.255", "10.0.1.0", "10.0.1.1"]);
        assert_eq!(range.len(), 4);
    }

    #[test]
    fn test_single_address_range() {
        let range = IpRange::new("192.168.1.1", "192.168.1.1").unwrap();
        assert_eq!(range.into_iter().collect::<Vec<_>>(), vec![Ipv4Addr::new(192, 168, 1, 1)]);
    }

    #[test]
    fn test_reversed_range() {
        let err = IpRange::new("10.0.0.2", "10.0.0.1").unwrap_err();
        assert!(matches!(err, ScanError::EmptyRange { .. }));
    }

    #[test]
    fn test_invalid_range() {
        let err = IpRange::new("300.0.0.1", "10.0.0.1").unwrap_err();
        assert_eq!(err, ScanError::InvalidIp("300.0.0.1".to_string()));
    }

    #[test]
    fn test_scan_records_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let temp = TempDir::new().unwrap();
        let results = temp.path().join("open.txt");

        let range = IpRange::new("127.0.0.1", "127.0.0.1").unwrap();
        let open = IpRangeScanner::new(range, port, &results)
            .with_timeout(Duration::from_millis(500))
            .scan();

        assert_eq!(open, vec![Ipv4Addr::LOCALHOST]);
        assert_eq!(fs::read_to_string(&results).unwrap(), "127.0.0.1\n");
    }

    #[test]
    fn test_scan_appends() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let temp = TempDir::new().unwrap();
        let results = temp.path().join("open.txt");
        fs::write(&results, "10.0.0.1\n").unwrap();

        let range = IpRange::new("127.0.0.1", "127.0.0.1").unwrap();
        IpRangeScanner::new(range, port, &results).scan();

        assert_eq!(fs::read_to_string(&results).unwrap(), "10.0.0.1\n127.0.0.1\n");
    }

    #[test]
    fn test_scan_closed_port() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let temp = TempDir::new().unwrap();
        let results = temp.path().join("open.txt");

        let range = IpRange::new("127.0.0.1", "127.0.0.1").unwrap();
        let open = IpRangeScanner::new(range, port, &results)
            .with_timeout(Duration::from_millis(500))
            .scan();

        assert!(open.is_empty());
        assert!(!results.exists());
    }
}
