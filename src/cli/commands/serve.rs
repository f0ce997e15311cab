//! Web server command.

use console::style;

use crate::config::Settings;
use crate::store::StorageMode;

/// Start the web server.
pub async fn cmd_serve(
    mut settings: Settings,
    bind: Option<&str>,
    storage: Option<StorageMode>,
) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        let (host, port) = parse_bind_address(bind, &settings);
        settings.host = host;
        settings.port = port;
    }
    if let Some(mode) = storage {
        settings.storage_mode = mode;
    }

    println!(
        "{} Starting Influract API at http://{}",
        style("→").cyan(),
        settings.bind_addr()
    );
    match settings.storage_mode {
        StorageMode::Disk => println!(
            "  Storing analyses in {}",
            style(settings.data_dir.display()).dim()
        ),
        StorageMode::Memory => println!(
            "  {} Analyses are kept in memory and lost on restart",
            style("!").yellow()
        ),
    }
    println!("  Press Ctrl+C to stop");

    crate::server::serve(&settings).await
}

/// Parse a bind address that can be:
/// - Just a port: "9000" -> configured host, port 9000
/// - Just a host: "0.0.0.0" -> 0.0.0.0, configured port
/// - Host and port: "0.0.0.0:9000"
fn parse_bind_address(bind: &str, settings: &Settings) -> (String, u16) {
    if let Ok(port) = bind.parse::<u16>() {
        return (settings.host.clone(), port);
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return (host.to_string(), port);
        }
    }

    (bind.to_string(), settings.port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        let settings = Settings::default();
        assert_eq!(
            parse_bind_address("9000", &settings),
            ("127.0.0.1".to_string(), 9000)
        );
        assert_eq!(
            parse_bind_address("0.0.0.0", &settings),
            ("0.0.0.0".to_string(), 8001)
        );
        assert_eq!(
            parse_bind_address("0.0.0.0:9000", &settings),
            ("0.0.0.0".to_string(), 9000)
        );
    }
}
