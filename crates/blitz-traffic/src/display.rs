//! Human-readable traffic tables.

use tabled::{Table, Tabled};

use crate::account::Accounts;

#[derive(Tabled)]
struct TrafficRow {
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Upload (TX)")]
    upload: String,
    #[tabled(rename = "Download (RX)")]
    download: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Blocked")]
    blocked: String,
}

/// Render the registry as a table, one row per user in name order.
///
/// Returns a short notice instead when the registry is empty.
pub fn traffic_table(accounts: &Accounts) -> String {
    if accounts.is_empty() {
        return "No traffic data to display.".to_string();
    }

    let rows = accounts.iter().map(|(user, acc)| TrafficRow {
        user: user.clone(),
        upload: format_bytes(acc.upload_bytes),
        download: format_bytes(acc.download_bytes),
        status: acc
            .status
            .map_or_else(|| "-".to_string(), |s| s.to_string()),
        blocked: if acc.blocked { "Yes" } else { "No" }.to_string(),
    });
    Table::new(rows).to_string()
}

/// Format a byte count with binary units and two decimals (`1.50KB`).
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes < KB {
        format!("{bytes}B")
    } else if bytes < MB {
        format!("{:.2}KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2}MB", bytes as f64 / MB as f64)
    } else if bytes < TB {
        format!("{:.2}GB", bytes as f64 / GB as f64)
    } else {
        format!("{:.2}TB", bytes as f64 / TB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountStatus};

    #[test]
    fn byte_units() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(1023), "1023B");
        assert_eq!(format_bytes(1024), "1.00KB");
        assert_eq!(format_bytes(1536), "1.50KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00MB");
        assert_eq!(format_bytes(10 * 1024 * 1024 * 1024), "10.00GB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024 * 1024), "3.00TB");
    }

    #[test]
    fn table_lists_every_user() {
        let mut accounts = Accounts::new();
        accounts.insert(
            "alice".into(),
            Account {
                upload_bytes: 2048,
                download_bytes: 10,
                status: Some(AccountStatus::Online),
                ..Default::default()
            },
        );
        accounts.insert(
            "bob".into(),
            Account {
                blocked: true,
                ..Default::default()
            },
        );

        let table = traffic_table(&accounts);
        assert!(table.contains("Upload (TX)"));
        assert!(table.contains("alice"));
        assert!(table.contains("2.00KB"));
        assert!(table.contains("Online"));
        assert!(table.contains("bob"));
        assert!(table.contains("Yes"));
        assert!(table.find("alice") < table.find("bob"));
    }

    #[test]
    fn empty_registry_notice() {
        assert_eq!(traffic_table(&Accounts::new()), "No traffic data to display.");
    }
}
