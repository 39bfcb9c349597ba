use std::path::Path;

use pomobar_core::{EventRecord, HttpDelivery};
use uuid::Uuid;

use super::load_config;

/// Post a throwaway `create` event and report how the endpoint answered.
pub fn run(explicit: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(explicit)?;
    let delivery = HttpDelivery::from_config(&config.endpoint)?;
    let settings = config.timer_settings()?;
    let duration = settings.length.secs();
    let record = EventRecord::create(Uuid::new_v4(), duration, duration, settings.user_id);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(delivery.send(&record))?;

    println!("{} -> HTTP {}", delivery.endpoint(), report.status);
    if !report.body.is_empty() {
        println!("{}", report.body);
    }
    Ok(())
}
