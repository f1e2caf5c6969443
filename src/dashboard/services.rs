//! Read models behind the landing page and the dashboard.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    schedules::{self, repo_types::ScheduleView},
    sensors::{self, repo_types::SensorReading},
    status::{self, repo_types::SystemStatus},
    watering::{self, repo_types::WateringLog, services::round2},
    zones::{self, repo_types::GardenZone},
};

pub const RECENT_LOGS: i64 = 10;

#[derive(Debug, Serialize)]
pub struct ZoneCard {
    #[serde(flatten)]
    pub zone: GardenZone,
    pub schedules: Vec<ScheduleView>,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub zones: Vec<ZoneCard>,
    pub zones_count: usize,
    pub today_waterings: i64,
    pub recent_logs: Vec<WateringLog>,
    /// Latest reading keyed by zone id; zones without readings have no entry.
    pub sensor_data: BTreeMap<String, SensorReading>,
}

#[derive(Debug, Serialize)]
pub struct HomeStats {
    pub system_status: SystemStatus,
    pub zones_count: i64,
    pub active_schedules: i64,
    pub total_waterings: i64,
    pub total_water_used: f64,
}

/// Attach schedules to their zones, keeping the zone order and each zone's time order.
pub fn zone_cards(
    zones: Vec<GardenZone>,
    schedules: Vec<schedules::repo_types::WateringSchedule>,
) -> Vec<ZoneCard> {
    let mut by_zone: HashMap<Uuid, Vec<ScheduleView>> = HashMap::new();
    for s in &schedules {
        by_zone.entry(s.zone_id).or_default().push(ScheduleView::from(s));
    }
    zones
        .into_iter()
        .map(|zone| ZoneCard {
            schedules: by_zone.remove(&zone.id).unwrap_or_default(),
            zone,
        })
        .collect()
}

pub async fn dashboard(db: &PgPool, user_id: Uuid) -> sqlx::Result<Dashboard> {
    let zones = zones::repo::list_by_user(db, user_id).await?;
    let ids: Vec<Uuid> = zones.iter().map(|z| z.id).collect();

    let schedules = schedules::repo::list_for_zones(db, &ids).await?;
    let readings = sensors::repo::latest_per_zone(db, &ids).await?;
    let today_waterings = watering::repo::count_today(db, user_id).await?;
    let recent_logs = watering::repo::recent(db, user_id, RECENT_LOGS).await?;

    let sensor_data = readings
        .into_iter()
        .map(|r| (r.zone_id.to_string(), r))
        .collect();

    Ok(Dashboard {
        zones_count: zones.len(),
        zones: zone_cards(zones, schedules),
        today_waterings,
        recent_logs,
        sensor_data,
    })
}

pub async fn home_stats(db: &PgPool, user_id: Uuid) -> sqlx::Result<HomeStats> {
    let system_status = status::repo::get_or_create(db, user_id).await?;
    let zones_count = zones::repo::count_by_user(db, user_id).await?;
    let active_schedules = schedules::repo::count_active_by_user(db, user_id).await?;
    let (total_waterings, litres) = watering::repo::totals(db, user_id).await?;
    Ok(HomeStats {
        system_status,
        zones_count,
        active_schedules,
        total_waterings,
        total_water_used: round2(litres),
    })
}
