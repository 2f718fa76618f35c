//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `graphnorm_core` linkage end to end.
//! - Print the normalized form of the photo/user sample graphs.
//!
//! Set `GRAPHNORM_LOG_DIR` to an absolute path to also write core logs.

use anyhow::{anyhow, Result};
use graphnorm_core::{default_log_level, init_logging, GraphService, SchemaRegistry};
use log::info;

const SAMPLE_SCHEMA: &str = r#"{
    "types": {
        "photo": [{ "name": "user", "type": "user", "cardinality": "single" }],
        "user": [{ "name": "photos", "type": "photo", "cardinality": "collection" }]
    }
}"#;

const SAMPLES: &[(&str, &str, &str)] = &[
    ("Photo <- user", "photo", r#"{"id": "foo", "user": {"id": "bar"}}"#),
    ("Photo", "photo", r#"{"id": "foo"}"#),
    ("User <- photo", "user", r#"{"id": "bar", "photos": [{"id": "foo"}]}"#),
    ("User", "user", r#"{"id": "foo"}"#),
];

fn main() -> Result<()> {
    if let Ok(log_dir) = std::env::var("GRAPHNORM_LOG_DIR") {
        init_logging(default_log_level(), &log_dir).map_err(|err| anyhow!(err))?;
    }

    println!("graphnorm_core version={}", graphnorm_core::core_version());

    let service = GraphService::new(SchemaRegistry::from_json_str(SAMPLE_SCHEMA)?);
    for (title, entity_type, input) in SAMPLES {
        println!("{title}");
        println!("{}", service.normalize_json(input, entity_type)?);
    }

    info!(
        "event=cli_smoke module=cli status=ok samples={}",
        SAMPLES.len()
    );
    Ok(())
}
