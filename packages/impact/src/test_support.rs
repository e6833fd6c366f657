use chrono::{DateTime, Utc};
use storm_impact_crossing_models::{CrossingRecord, CrossingTrigger, TimeSource};
use storm_impact_track_models::Attributes;

pub fn crossing(region: &str, time: DateTime<Utc>, hours: f64) -> CrossingRecord {
    CrossingRecord {
        region_id: region.to_string(),
        crossing_index: 0,
        trigger: CrossingTrigger::Point,
        crossing_time: time,
        time_source: TimeSource::Observed,
        relative_hours: hours,
        relative_days: format!("{:.2}", hours / 24.0).parse().unwrap(),
        lat: 0.0,
        lon: 0.0,
        attributes: Attributes::new(),
    }
}
