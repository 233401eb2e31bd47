// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

use crate::{
    file_handler::FileHandler,
    gtfs::{FeedSink, Stop},
    objects::{Coord, StopRecord},
    projection::Projector,
    read_utils::{self, FixedWidthLine},
    Result,
};
use anyhow::Context;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Stops known from `bfkoord` and `bahnhof`, keyed by their numeric id.
///
/// A stop is written to the feed the first time a trip references it, and
/// never again.
#[derive(Debug, Default)]
pub struct StopRegistry {
    stops: BTreeMap<u32, StopRecord>,
}

impl StopRegistry {
    /// Sets the position of the stop `id`, creating it if needed
    pub fn upsert_coordinates(&mut self, id: u32, coord: Coord) {
        self.stops.entry(id).or_default().coord = Some(coord);
    }

    /// Sets the name and authority of the stop `id`, creating it if needed
    pub fn upsert_name(&mut self, id: u32, name: String, authority: String) {
        let stop = self.stops.entry(id).or_default();
        stop.name = Some(name);
        stop.authority = Some(authority);
    }

    /// The stop `id`, if any file mentions it
    pub fn get(&self, id: u32) -> Option<&StopRecord> {
        self.stops.get(&id)
    }

    /// Number of stops written to the feed
    pub fn emitted_count(&self) -> usize {
        self.stops.values().filter(|stop| stop.is_emitted()).count()
    }

    /// Writes the stop `id` in `sink` unless already done, and returns its
    /// GTFS identifier.
    ///
    /// A stop without name or position is written with empty fields.
    pub fn resolve_and_emit<S: FeedSink>(&mut self, id: u32, sink: &mut S) -> Result<String> {
        let stop_id = id.to_string();
        let record = self.stops.entry(id).or_default();
        if record.emitted {
            return Ok(stop_id);
        }
        if record.name.is_none() {
            warn!("stop {} has no name", id);
        }
        if record.coord.is_none() {
            warn!("stop {} has no coordinates", id);
        }
        sink.write_stop(Stop {
            id: stop_id.clone(),
            code: Some(stop_id.clone()),
            name: record.name.clone().unwrap_or_default(),
            lat: record.coord.map(|coord| coord.lat),
            lon: record.coord.map(|coord| coord.lon),
            ..Default::default()
        })?;
        record.emitted = true;
        Ok(stop_id)
    }
}

fn parse_bfkoord_line(line: &FixedWidthLine, projector: &dyn Projector) -> Result<(u32, Coord)> {
    let id = line.parse_columns("stop id", 0, 7)?;
    let x = line.parse_columns("x", 8, 18)?;
    let y = line.parse_columns("y", 19, 29)?;
    let coord = projector
        .to_wgs84(x, y)
        .with_context(|| format!("line {}: cannot project stop {}", line.number(), id))?;
    Ok((id, coord))
}

/// Reads the stop coordinates, converted to WGS84 by `projector`
pub(super) fn read_bfkoord<H>(
    file_handler: &mut H,
    file_name: &str,
    projector: &dyn Projector,
    stops: &mut StopRegistry,
) -> Result<()>
where
    for<'a> &'a mut H: FileHandler,
{
    let (lines, path) = read_utils::read_lines(file_handler, file_name)?;
    for line in &lines {
        let (id, coord) = parse_bfkoord_line(line, projector)
            .with_context(|| format!("Error reading {:?}", path))?;
        stops.upsert_coordinates(id, coord);
    }
    info!("{} stop coordinates read", lines.len());
    Ok(())
}

/// Reads the stop names
pub(super) fn read_bahnhof<H>(
    file_handler: &mut H,
    file_name: &str,
    stops: &mut StopRegistry,
) -> Result<()>
where
    for<'a> &'a mut H: FileHandler,
{
    let (lines, path) = read_utils::read_lines(file_handler, file_name)?;
    for line in &lines {
        let id = line
            .parse_columns("stop id", 0, 7)
            .with_context(|| format!("Error reading {:?}", path))?;
        let authority = line.columns(8, 11).trim().to_string();
        let name = line.columns_from(12).trim().to_string();
        stops.upsert_name(id, name, authority);
    }
    info!("{} stop names read", lines.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gtfs::Feed, projection::Projection};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn bfkoord_line_with_identity() {
        let line = FixedWidthLine::new(1, "0000001    6.95871   50.93712 Köln Heumarkt");
        let (id, coord) = parse_bfkoord_line(&line, &Projection::Identity).unwrap();
        assert_eq!(1, id);
        assert_relative_eq!(6.95871, coord.lon);
        assert_relative_eq!(50.93712, coord.lat);
    }

    #[test]
    fn bfkoord_line_with_bad_number() {
        let line = FixedWidthLine::new(3, "0000001    6.9x871   50.93712");
        let error = parse_bfkoord_line(&line, &Projection::Identity).unwrap_err();
        assert_eq!(
            "line 3: cannot decode x from \"   6.9x871\"",
            error.to_string()
        );
    }

    #[test]
    fn stop_is_emitted_once() {
        let mut registry = StopRegistry::default();
        registry.upsert_coordinates(
            669,
            Coord {
                lon: 7.15,
                lat: 50.97,
            },
        );
        registry.upsert_name(669, "Refrath".to_string(), "VRS".to_string());
        let mut feed = Feed::default();
        assert_eq!("669", registry.resolve_and_emit(669, &mut feed).unwrap());
        assert_eq!("669", registry.resolve_and_emit(669, &mut feed).unwrap());
        assert_eq!(1, feed.stops.len());
        assert_eq!(1, registry.emitted_count());
        let stop = &feed.stops[0];
        assert_eq!(Some("669".to_string()), stop.code);
        assert_eq!("Refrath", stop.name);
        assert_eq!(Some(50.97), stop.lat);
        assert_eq!(Some(7.15), stop.lon);
        assert_eq!(0, stop.location_type);
        assert!(registry.get(669).unwrap().is_emitted());
    }

    #[test]
    fn unknown_stop_has_empty_fields() {
        testing_logger::setup();
        let mut registry = StopRegistry::default();
        let mut feed = Feed::default();
        registry.resolve_and_emit(42, &mut feed).unwrap();
        testing_logger::validate(|captured_logs| {
            let warnings: Vec<&str> = captured_logs
                .iter()
                .filter(|captured_log| captured_log.level == tracing::log::Level::Warn)
                .map(|captured_log| captured_log.body.as_str())
                .collect();
            assert_eq!(2, warnings.len());
            assert!(warnings[0].contains("stop 42 has no name"));
            assert!(warnings[1].contains("stop 42 has no coordinates"));
        });
        assert_eq!("", feed.stops[0].name);
        assert_eq!(None, feed.stops[0].lat);
        assert_eq!(None, feed.stops[0].lon);
    }

    #[test]
    fn name_and_coordinates_are_merged() {
        let mut registry = StopRegistry::default();
        registry.upsert_name(1, "Köln Heumarkt".to_string(), "VRS".to_string());
        registry.upsert_coordinates(1, Coord::default());
        let record = registry.get(1).unwrap();
        assert_eq!(Some("Köln Heumarkt".to_string()), record.name);
        assert_eq!(Some("VRS".to_string()), record.authority);
        assert_eq!(Some(Coord::default()), record.coord);
        assert!(!record.is_emitted());
    }
}
