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

use thiserror::Error;

/// Errors raised while decoding HAFAS data.
///
/// Every one of them aborts the conversion. They are usually wrapped in an
/// [`anyhow::Error`] carrying the name of the file being read, and can be
/// recovered with `downcast_ref::<Error>()`.
#[derive(Debug, Error)]
pub enum Error {
    /// A date of the timetable period is not in `DD.MM.YYYY` form.
    #[error("invalid date {value:?}, expected DD.MM.YYYY")]
    DateParse {
        /// The rejected text
        value: String,
        /// Parsing failure reported by chrono
        #[source]
        source: chrono::ParseError,
    },
    /// A bitfield cannot be turned into a calendar for the period.
    #[error("cannot decode bitfield of service {service_id}: {reason}")]
    CalendarDecode {
        /// Service whose bitfield is rejected
        service_id: String,
        /// What is wrong with the bitfield
        reason: String,
    },
    /// The projection name is neither built-in nor understood by proj.
    #[error("unknown projection {0:?}")]
    UnknownProjection(String),
    /// A fixed-column field does not hold the expected value.
    #[error("line {line}: cannot decode {field} from {value:?}")]
    FieldDecode {
        /// 1-based line number in the file
        line: usize,
        /// Name of the field
        field: &'static str,
        /// Raw content of the columns
        value: String,
    },
    /// A value required to build an output row is missing.
    #[error("line {line}: missing {field}")]
    MissingField {
        /// 1-based line number in the file
        line: usize,
        /// Name of the missing field
        field: &'static str,
    },
}
