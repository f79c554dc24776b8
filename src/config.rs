use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MediCare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory (~/MediCare)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("MediCare")
}

/// Database path; `MEDICARE_DB` overrides the default location.
pub fn database_path() -> PathBuf {
    std::env::var("MEDICARE_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| app_data_dir().join("medicare.db"))
}

/// API bind address; `MEDICARE_BIND` overrides the default.
pub fn bind_addr() -> SocketAddr {
    std::env::var("MEDICARE_BIND")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)))
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "medicare=info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("MediCare"));
    }

    #[test]
    fn default_bind_is_loopback() {
        // Only meaningful when the env override is absent
        if std::env::var("MEDICARE_BIND").is_err() {
            assert!(bind_addr().ip().is_loopback());
        }
    }

    #[test]
    fn app_name_is_medicare() {
        assert_eq!(APP_NAME, "MediCare");
    }
}
