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

use super::{bitfeld::DEFAULT_SERVICE_ID, AGENCY_ID};
use crate::{
    gtfs::{FeedSink, Route, Trip},
    objects::TripMeta,
    Error, Result,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

// Transport mode codes of the `*G` lines
const MEANS_OF_TRANSPORT: [(&str, u16); 19] = [
    ("UUU", 0),
    ("BUS", 0),
    ("NFB", 0),
    ("STR", 0),
    ("STA", 0),
    ("SBA", 0),
    ("ZUG", 0),
    ("SCH", 0),
    ("ALT", 0),
    ("TB", 0),
    ("VUU", 0),
    ("VBU", 0),
    ("VNF", 0),
    ("VSR", 0),
    ("VSA", 0),
    ("VSB", 0),
    ("VZU", 0),
    ("VSC", 0),
    ("VAL", 0),
];

const DEFAULT_ROUTE_TYPE: u16 = 0;
const DEFAULT_DIRECTION: &str = "0";

/// GTFS route type of each transport mode code
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTypes(BTreeMap<String, u16>);

impl RouteTypes {
    /// Built-in table completed or overridden by `overrides`
    pub fn new(overrides: &BTreeMap<String, u16>) -> Self {
        let mut route_types: BTreeMap<String, u16> = MEANS_OF_TRANSPORT
            .iter()
            .map(|(code, route_type)| (code.to_string(), *route_type))
            .collect();
        route_types.extend(overrides.iter().map(|(code, t)| (code.clone(), *t)));
        RouteTypes(route_types)
    }

    /// Route type of the transport mode `code`, 0 if unknown or missing
    pub fn route_type(&self, code: Option<&str>) -> u16 {
        code.and_then(|code| self.0.get(code))
            .copied()
            .unwrap_or(DEFAULT_ROUTE_TYPE)
    }
}

impl Default for RouteTypes {
    fn default() -> Self {
        RouteTypes::new(&BTreeMap::new())
    }
}

/// Gives its identifier to the route of each trip.
///
/// The explicit line number is used when present. Otherwise a new number is
/// taken from a counter local to the conversion.
#[derive(Debug, Default)]
pub struct RouteResolver {
    counter: u32,
    emitted: BTreeSet<String>,
}

impl RouteResolver {
    /// Returns the route identifier of the trip described by `meta`,
    /// writing the route in `sink` the first time it is seen.
    pub fn resolve_and_emit<S: FeedSink>(
        &mut self,
        meta: &TripMeta,
        route_types: &RouteTypes,
        sink: &mut S,
    ) -> Result<String> {
        let route_id = match meta.line_number.as_deref() {
            Some(line_number) if !line_number.is_empty() => line_number.to_string(),
            _ => {
                self.counter += 1;
                self.counter.to_string()
            }
        };
        if self.emitted.contains(&route_id) {
            return Ok(route_id);
        }
        debug!("new route {}", route_id);
        sink.write_route(Route {
            id: route_id.clone(),
            agency_id: AGENCY_ID.to_string(),
            short_name: route_id.clone(),
            long_name: route_id.clone(),
            route_type: route_types.route_type(meta.mean_of_transport.as_deref()),
            ..Default::default()
        })?;
        self.emitted.insert(route_id.clone());
        Ok(route_id)
    }

    /// Number of routes written
    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    /// True if no route has been written
    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }
}

/// Writes the trips, identified by their service number.
#[derive(Debug, Default)]
pub struct TripResolver {
    seen: BTreeSet<u32>,
}

impl TripResolver {
    /// Writes the trip described by `meta` on the route `route_id` and
    /// returns its identifier.
    ///
    /// `line` is the line of the schedule file starting the trip. A trip
    /// without service number is an error.
    pub fn resolve_and_emit<S: FeedSink>(
        &mut self,
        meta: &TripMeta,
        route_id: &str,
        line: usize,
        sink: &mut S,
    ) -> Result<String> {
        let service_number = meta.service_number.ok_or(Error::MissingField {
            line,
            field: "service number",
        })?;
        if !self.seen.insert(service_number) {
            warn!(
                "line {}: trip {} already exists, written again",
                line, service_number
            );
        }
        let trip_id = service_number.to_string();
        sink.write_trip(Trip {
            route_id: route_id.to_string(),
            service_id: meta
                .bitfield_number
                .map_or_else(|| DEFAULT_SERVICE_ID.to_string(), |id| id.to_string()),
            id: trip_id.clone(),
            direction: meta
                .direction
                .clone()
                .unwrap_or_else(|| DEFAULT_DIRECTION.to_string()),
            ..Default::default()
        })?;
        Ok(trip_id)
    }

    /// Number of distinct trips written
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// True if no trip has been written
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
