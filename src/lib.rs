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

//! The `hafas_model` crate converts
//! [HAFAS raw data](https://www.fahrplanfelder.ch/fileadmin/fap_daten_test/hrdf.pdf)
//! timetables into [GTFS](http://gtfs.org/).
//!
//! The conversion reads five fixed-width files (`eckdaten`, `bitfeld`,
//! `bfkoord`, `bahnhof` and `fplan`) and pushes GTFS rows into a
//! [`gtfs::FeedSink`].

#![deny(missing_docs)]

pub mod configuration;
mod error;
pub mod file_handler;
pub mod gtfs;
pub mod hafas;
pub mod objects;
pub mod projection;
pub(crate) mod read_utils;
pub(crate) mod serde_utils;
#[doc(hidden)]
pub mod test_utils;
pub mod utils;

pub use crate::error::Error;

/// The corresponding result type used by the crate.
pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;
