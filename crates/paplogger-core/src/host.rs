//! Host name and timezone lookups used by the formats.

use std::path::Path;

use chrono::Local;

/// Name of the machine, as used for `<hostname>_` file prefixes and the
/// host-annotated file format.
pub fn hostname() -> String {
    #[cfg(unix)]
    if let Ok(name) = nix::unistd::gethostname() {
        let name = name.to_string_lossy().trim().to_string();
        if !name.is_empty() {
            return name;
        }
    }

    ["COMPUTERNAME", "HOSTNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Local timezone name.
///
/// `TZ` wins when set. Otherwise the zone is read from `/etc/timezone` or
/// the `/etc/localtime` link target, falling back to chrono's `%Z`
/// rendering of the local offset (`+02:00`).
pub fn timezone_name() -> String {
    match std::env::var("TZ") {
        Ok(tz) if !tz.trim().is_empty() => tz.trim().trim_start_matches(':').to_string(),
        _ => system_zone().unwrap_or_else(|| Local::now().format("%Z").to_string()),
    }
}

#[cfg(unix)]
fn system_zone() -> Option<String> {
    if let Ok(zone) = std::fs::read_to_string("/etc/timezone") {
        let zone = zone.trim();
        if !zone.is_empty() {
            return Some(zone.to_string());
        }
    }
    std::fs::read_link("/etc/localtime")
        .ok()
        .and_then(|target| zone_from_zoneinfo_path(&target))
}

#[cfg(not(unix))]
fn system_zone() -> Option<String> {
    None
}

/// `Europe/Paris` from `/usr/share/zoneinfo/Europe/Paris`.
fn zone_from_zoneinfo_path(path: &Path) -> Option<String> {
    let path = path.to_string_lossy();
    let (_, zone) = path.rsplit_once("zoneinfo/")?;
    let zone = zone.strip_prefix("posix/").unwrap_or(zone);
    (!zone.is_empty()).then(|| zone.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_is_not_empty() {
        let name = hostname();
        assert!(!name.is_empty());
        assert_eq!(name, name.trim());
    }

    #[test]
    fn test_zone_from_zoneinfo_path() {
        assert_eq!(
            zone_from_zoneinfo_path(Path::new("/usr/share/zoneinfo/Europe/Paris")).as_deref(),
            Some("Europe/Paris")
        );
        assert_eq!(
            zone_from_zoneinfo_path(Path::new("../usr/share/zoneinfo/posix/UTC")).as_deref(),
            Some("UTC")
        );
        assert_eq!(zone_from_zoneinfo_path(Path::new("/etc/localtime.bak")), None);
    }

    #[test]
    fn test_timezone_name_is_not_empty() {
        assert!(!timezone_name().is_empty());
    }
}
