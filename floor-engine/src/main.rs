use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use floor_engine::{FloorService, MemoryFloorStore, setup_environment};
use shared::models::Reservation;

/// Plan every (date, shift) found in a reservations JSON file.
///
/// ```text
/// floor-engine reservations.json
/// ```
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    let config = setup_environment()?;

    let path = std::env::args()
        .nth(1)
        .context("usage: floor-engine <reservations.json>")?;

    // 2. 加载桌台布局
    let catalog = config
        .load_catalog()
        .context("failed to load floor layout")?;
    tracing::info!(tables = catalog.len(), "Floor layout loaded");

    // 3. 读取预订
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path))?;
    let reservations: Vec<Reservation> =
        serde_json::from_str(&raw).with_context(|| format!("invalid reservations in {}", path))?;

    let mut shifts = BTreeMap::new();
    for reservation in &reservations {
        if let Err(e) = reservation.validate() {
            tracing::warn!(reservation_id = %reservation.id, error = %e, "Invalid reservation");
        }
        shifts
            .entry((reservation.date, reservation.shift))
            .or_insert_with(Vec::new)
            .push(reservation.clone());
    }

    // 4. 按 (date, shift) 排桌
    let service = FloorService::new(
        Arc::new(catalog),
        config.policy,
        Arc::new(MemoryFloorStore::new()),
    );
    let mut plans = Vec::new();
    for ((date, shift), scoped) in shifts {
        let plan = service.plan_shift(date, shift, &scoped)?;
        service.commit(&plan)?;
        plans.push(plan);
    }

    println!("{}", serde_json::to_string_pretty(&plans)?);
    Ok(())
}
