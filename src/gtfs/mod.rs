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

//! [GTFS](http://gtfs.org/) rows produced by the conversion, and the sinks
//! receiving them.

mod write;

pub use write::CsvFeedWriter;

use crate::objects::{Date, Time};
use crate::serde_utils::*;
use crate::Result;
use serde::Serialize;

/// A row of `agency.txt`
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct Agency {
    /// Identifier of the agency
    #[serde(rename = "agency_id")]
    pub id: String,
    /// Name of the agency
    #[serde(rename = "agency_name")]
    pub name: String,
    /// Url of the agency
    #[serde(rename = "agency_url")]
    pub url: String,
    /// Timezone of the agency
    #[serde(rename = "agency_timezone")]
    pub timezone: String,
    /// Language of the agency
    #[serde(rename = "agency_lang")]
    pub lang: String,
    /// Phone of the agency
    #[serde(rename = "agency_phone")]
    pub phone: String,
}

/// A row of `routes.txt`
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct Route {
    /// Identifier of the route
    #[serde(rename = "route_id")]
    pub id: String,
    /// Agency operating the route
    pub agency_id: String,
    /// Short name of the route
    #[serde(rename = "route_short_name")]
    pub short_name: String,
    /// Long name of the route
    #[serde(rename = "route_long_name")]
    pub long_name: String,
    /// Description of the route
    #[serde(rename = "route_desc")]
    pub desc: Option<String>,
    /// Mode of transport, as a GTFS route type
    pub route_type: u16,
    /// Url of the route
    #[serde(rename = "route_url")]
    pub url: Option<String>,
    /// Color of the route
    #[serde(rename = "route_color")]
    pub color: Option<String>,
    /// Color of the text on the route color
    #[serde(rename = "route_text_color")]
    pub text_color: Option<String>,
}

/// A row of `trips.txt`
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct Trip {
    /// Route of the trip
    pub route_id: String,
    /// Service of the trip
    pub service_id: String,
    /// Identifier of the trip
    #[serde(rename = "trip_id")]
    pub id: String,
    /// Destination shown to travellers
    #[serde(rename = "trip_headsign")]
    pub headsign: Option<String>,
    /// Name shown to travellers
    #[serde(rename = "trip_short_name")]
    pub short_name: Option<String>,
    /// Direction of the trip
    #[serde(rename = "direction_id")]
    pub direction: String,
    /// Block of the trip
    pub block_id: Option<String>,
    /// Shape of the trip
    pub shape_id: Option<String>,
}

/// A row of `stop_times.txt`
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct StopTime {
    /// Trip of the stop time
    pub trip_id: String,
    /// Arrival at the stop
    pub arrival_time: Option<Time>,
    /// Departure from the stop
    pub departure_time: Option<Time>,
    /// Stop served
    pub stop_id: String,
    /// Position of the stop in the trip, from 1
    pub stop_sequence: u32,
    /// Destination shown at this stop
    pub stop_headsign: Option<String>,
    /// Boarding allowed (0) or not
    pub pickup_type: u8,
    /// Alighting allowed (0) or not
    pub drop_off_type: u8,
    /// Distance from the first stop
    pub shape_dist_traveled: u32,
}

/// A row of `stops.txt`
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct Stop {
    /// Identifier of the stop
    #[serde(rename = "stop_id")]
    pub id: String,
    /// Code shown to travellers
    #[serde(rename = "stop_code")]
    pub code: Option<String>,
    /// Name of the stop
    #[serde(rename = "stop_name")]
    pub name: String,
    /// Description of the stop
    #[serde(rename = "stop_desc")]
    pub desc: Option<String>,
    /// Latitude of the stop
    #[serde(rename = "stop_lat")]
    pub lat: Option<f64>,
    /// Longitude of the stop
    #[serde(rename = "stop_lon")]
    pub lon: Option<f64>,
    /// Fare zone of the stop
    #[serde(rename = "zone_id")]
    pub fare_zone_id: Option<String>,
    /// Url of the stop
    #[serde(rename = "stop_url")]
    pub url: Option<String>,
    /// Kind of location, 0 for a stop
    pub location_type: u8,
    /// Station containing the stop
    pub parent_station: Option<String>,
}

/// A row of `calendar.txt`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Calendar {
    /// Identifier of the service
    #[serde(rename = "service_id")]
    pub id: String,
    /// Runs on Mondays
    #[serde(serialize_with = "ser_from_bool")]
    pub monday: bool,
    /// Runs on Tuesdays
    #[serde(serialize_with = "ser_from_bool")]
    pub tuesday: bool,
    /// Runs on Wednesdays
    #[serde(serialize_with = "ser_from_bool")]
    pub wednesday: bool,
    /// Runs on Thursdays
    #[serde(serialize_with = "ser_from_bool")]
    pub thursday: bool,
    /// Runs on Fridays
    #[serde(serialize_with = "ser_from_bool")]
    pub friday: bool,
    /// Runs on Saturdays
    #[serde(serialize_with = "ser_from_bool")]
    pub saturday: bool,
    /// Runs on Sundays
    #[serde(serialize_with = "ser_from_bool")]
    pub sunday: bool,
    /// First day of the service
    #[serde(serialize_with = "ser_from_naive_date")]
    pub start_date: Date,
    /// Last day of the service
    #[serde(serialize_with = "ser_from_naive_date")]
    pub end_date: Date,
}

impl Calendar {
    /// A service running every day between `start_date` and `end_date`
    pub fn full_week(id: String, start_date: Date, end_date: Date) -> Self {
        Calendar {
            id,
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: true,
            sunday: true,
            start_date,
            end_date,
        }
    }
}

/// Kind of `calendar_dates.txt` row; bitfields only ever add dates
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionType {
    /// The service runs on the date
    #[serde(rename = "1")]
    Add,
}

/// A row of `calendar_dates.txt`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CalendarDate {
    /// Identifier of the service
    pub service_id: String,
    /// Date of the exception
    #[serde(serialize_with = "ser_from_naive_date")]
    pub date: Date,
    /// Kind of exception
    pub exception_type: ExceptionType,
}

/// Header of `agency.txt`
pub const AGENCY_HEADER: [&str; 6] = [
    "agency_id",
    "agency_name",
    "agency_url",
    "agency_timezone",
    "agency_lang",
    "agency_phone",
];
/// Header of `routes.txt`
pub const ROUTES_HEADER: [&str; 9] = [
    "route_id",
    "agency_id",
    "route_short_name",
    "route_long_name",
    "route_desc",
    "route_type",
    "route_url",
    "route_color",
    "route_text_color",
];
/// Header of `trips.txt`
pub const TRIPS_HEADER: [&str; 8] = [
    "route_id",
    "service_id",
    "trip_id",
    "trip_headsign",
    "trip_short_name",
    "direction_id",
    "block_id",
    "shape_id",
];
/// Header of `stop_times.txt`
pub const STOP_TIMES_HEADER: [&str; 9] = [
    "trip_id",
    "arrival_time",
    "departure_time",
    "stop_id",
    "stop_sequence",
    "stop_headsign",
    "pickup_type",
    "drop_off_type",
    "shape_dist_traveled",
];
/// Header of `stops.txt`
pub const STOPS_HEADER: [&str; 10] = [
    "stop_id",
    "stop_code",
    "stop_name",
    "stop_desc",
    "stop_lat",
    "stop_lon",
    "zone_id",
    "stop_url",
    "location_type",
    "parent_station",
];
/// Header of `calendar.txt`
pub const CALENDAR_HEADER: [&str; 10] = [
    "service_id",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "start_date",
    "end_date",
];
/// Header of `calendar_dates.txt`
pub const CALENDAR_DATES_HEADER: [&str; 3] = ["service_id", "date", "exception_type"];

/// Receives the GTFS rows as soon as they are produced.
///
/// Rows of a table must be kept in the order they are received.
pub trait FeedSink {
    /// Receives a row of `agency.txt`
    fn write_agency(&mut self, agency: Agency) -> Result<()>;
    /// Receives a row of `routes.txt`
    fn write_route(&mut self, route: Route) -> Result<()>;
    /// Receives a row of `trips.txt`
    fn write_trip(&mut self, trip: Trip) -> Result<()>;
    /// Receives a row of `stop_times.txt`
    fn write_stop_time(&mut self, stop_time: StopTime) -> Result<()>;
    /// Receives a row of `stops.txt`
    fn write_stop(&mut self, stop: Stop) -> Result<()>;
    /// Receives a row of `calendar.txt`
    fn write_calendar(&mut self, calendar: Calendar) -> Result<()>;
    /// Receives a row of `calendar_dates.txt`
    fn write_calendar_date(&mut self, calendar_date: CalendarDate) -> Result<()>;
}

impl<S: FeedSink + ?Sized> FeedSink for &mut S {
    fn write_agency(&mut self, agency: Agency) -> Result<()> {
        (**self).write_agency(agency)
    }
    fn write_route(&mut self, route: Route) -> Result<()> {
        (**self).write_route(route)
    }
    fn write_trip(&mut self, trip: Trip) -> Result<()> {
        (**self).write_trip(trip)
    }
    fn write_stop_time(&mut self, stop_time: StopTime) -> Result<()> {
        (**self).write_stop_time(stop_time)
    }
    fn write_stop(&mut self, stop: Stop) -> Result<()> {
        (**self).write_stop(stop)
    }
    fn write_calendar(&mut self, calendar: Calendar) -> Result<()> {
        (**self).write_calendar(calendar)
    }
    fn write_calendar_date(&mut self, calendar_date: CalendarDate) -> Result<()> {
        (**self).write_calendar_date(calendar_date)
    }
}

/// A GTFS feed kept in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    /// Rows of `agency.txt`
    pub agencies: Vec<Agency>,
    /// Rows of `routes.txt`
    pub routes: Vec<Route>,
    /// Rows of `trips.txt`
    pub trips: Vec<Trip>,
    /// Rows of `stop_times.txt`
    pub stop_times: Vec<StopTime>,
    /// Rows of `stops.txt`
    pub stops: Vec<Stop>,
    /// Rows of `calendar.txt`
    pub calendars: Vec<Calendar>,
    /// Rows of `calendar_dates.txt`
    pub calendar_dates: Vec<CalendarDate>,
}

impl FeedSink for Feed {
    fn write_agency(&mut self, agency: Agency) -> Result<()> {
        self.agencies.push(agency);
        Ok(())
    }
    fn write_route(&mut self, route: Route) -> Result<()> {
        self.routes.push(route);
        Ok(())
    }
    fn write_trip(&mut self, trip: Trip) -> Result<()> {
        self.trips.push(trip);
        Ok(())
    }
    fn write_stop_time(&mut self, stop_time: StopTime) -> Result<()> {
        self.stop_times.push(stop_time);
        Ok(())
    }
    fn write_stop(&mut self, stop: Stop) -> Result<()> {
        self.stops.push(stop);
        Ok(())
    }
    fn write_calendar(&mut self, calendar: Calendar) -> Result<()> {
        self.calendars.push(calendar);
        Ok(())
    }
    fn write_calendar_date(&mut self, calendar_date: CalendarDate) -> Result<()> {
        self.calendar_dates.push(calendar_date);
        Ok(())
    }
}
