//! Startup banner

use std::path::Path;

use super::config::{ServerConfig, is_all_interfaces};
use super::constants::APP_NAME;
use crate::api::server::dataset_mounts;
use crate::utils::terminal::{Color, bold, paint, terminal_link};

const LABEL_WIDTH: usize = 10;

/// Where the server can be reached from other machines
#[derive(Debug, PartialEq, Eq)]
enum NetworkHint {
    /// Bound to loopback only
    LocalOnly,
    Urls(Vec<String>),
}

fn display_host(host: &str) -> &str {
    if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    }
}

fn network_hint(host: &str, port: u16) -> NetworkHint {
    if host == "127.0.0.1" || host == "localhost" || host == "::1" {
        return NetworkHint::LocalOnly;
    }
    if !is_all_interfaces(host) {
        return NetworkHint::Urls(vec![format!("http://{}:{}", host, port)]);
    }
    let urls = local_ip_address::list_afinet_netifas()
        .map(|interfaces| {
            interfaces
                .into_iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
                .map(|(_, ip)| format!("http://{}:{}", ip, port))
                .collect()
        })
        .unwrap_or_default();
    NetworkHint::Urls(urls)
}

fn line(marker: Color, label: &str, value: &str) {
    let label = format!("{:<LABEL_WIDTH$}", label);
    println!("  {}  {} {}", paint("➜", marker), bold(&label), value);
}

fn muted(label: &str, value: &str) {
    let text = format!("➜  {:<LABEL_WIDTH$} {}", label, value);
    println!("  {}", paint(&text, Color::Gray));
}

/// Print the API address, docs link, reachable network URLs and storage paths
pub fn print_banner(server: &ServerConfig, data_dir: &Path, database: &Path) {
    let base_url = format!("http://{}:{}", display_host(&server.host), server.port);

    println!();
    println!(
        "  {} {}",
        bold(&paint(APP_NAME, Color::Cyan)),
        paint(&format!("v{}", env!("CARGO_PKG_VERSION")), Color::Gray)
    );
    println!();

    line(Color::Green, "API:", &terminal_link(&base_url));
    line(
        Color::Yellow,
        "Docs:",
        &terminal_link(&format!("{}/api/docs", base_url)),
    );

    match network_hint(&server.host, server.port) {
        NetworkHint::LocalOnly => muted("Network:", "use --host 0.0.0.0 to expose"),
        NetworkHint::Urls(urls) => {
            for url in urls {
                line(Color::Green, "Network:", &terminal_link(&url));
            }
        }
    }

    let datasets: Vec<String> = dataset_mounts().into_iter().map(|m| m.path).collect();
    muted("Datasets:", &datasets.join(", "));
    muted("Data:", &data_dir.display().to_string());
    muted("Database:", &database.display().to_string());
    println!();
}
