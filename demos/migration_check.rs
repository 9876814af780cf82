//! Pre/post migration check for a single access switch

use camdiff_core::utils::MemorySnapshotStore;
use camdiff_core::{CheckConfig, MigrationCheck, RunMode, RunOutcome};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

// Parsed output of `show mac address-table` before the uplink cutover
const PRE_MIGRATION: &str = r#"[
    {"destination_address": "0050.7966.6800", "type": "DYNAMIC", "vlan": "10", "destination_port": ["Gi1/0/1"]},
    {"destination_address": "0050.7966.6801", "type": "DYNAMIC", "vlan": "10", "destination_port": ["Gi1/0/2"]},
    {"destination_address": "0050.7966.6802", "type": "DYNAMIC", "vlan": "20", "destination_port": ["Gi1/0/3"]},
    {"destination_address": "0050.7966.6804", "type": "STATIC", "vlan": "99", "destination_port": ["Gi1/0/48"]}
]"#;

// ... and after it
const POST_MIGRATION: &str = r#"[
    {"destination_address": "0050.7966.6800", "type": "DYNAMIC", "vlan": "10", "destination_port": ["Gi1/0/1"]},
    {"destination_address": "0050.7966.6802", "type": "DYNAMIC", "vlan": "20", "destination_port": ["Gi1/0/7"]},
    {"destination_address": "0050.7966.6803", "type": "DYNAMIC", "vlan": "20", "destination_port": ["Gi1/0/4"]},
    {"destination_address": "0050.7966.6804", "type": "STATIC", "vlan": "99", "destination_port": ["Gi1/0/48"]}
]"#;

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let device = "access-sw1";
    let config = CheckConfig {
        site: Some("hq".to_string()),
        ..Default::default()
    };
    let mut check = MigrationCheck::with_config(MemorySnapshotStore::new(), config);

    for (mode, json) in [(RunMode::Pre, PRE_MIGRATION), (RunMode::Post, POST_MIGRATION)] {
        let records = camdiff_core::parse_records(json)?;
        if let RunOutcome::Captured { entries, .. } =
            check.run(mode, device, Some(records)).await?
        {
            info!(%mode, entries, "snapshot stored");
        }
    }

    if let RunOutcome::Diffed(report) = check.run(RunMode::Diff, device, None).await? {
        println!("{}", report);
        println!("{}", report.to_json_pretty()?);
    }

    Ok(())
}
