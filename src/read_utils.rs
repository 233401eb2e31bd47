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
//! Reading of fixed-width Latin-1 files.

use crate::{file_handler::FileHandler, Error, Result};
use anyhow::Context;
use std::{io::Read, path::PathBuf, str::FromStr};
use tracing::info;

/// A decoded line of a HAFAS file.
///
/// Columns are counted in characters, starting at 0. Columns beyond the end
/// of the line are empty.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FixedWidthLine {
    number: usize,
    text: String,
}

impl FixedWidthLine {
    pub(crate) fn new(number: usize, text: impl Into<String>) -> Self {
        FixedWidthLine {
            number,
            text: text.into(),
        }
    }

    /// 1-based line number
    pub(crate) fn number(&self) -> usize {
        self.number
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    fn byte_offset(&self, column: usize) -> usize {
        self.text
            .char_indices()
            .nth(column)
            .map_or(self.text.len(), |(offset, _)| offset)
    }

    /// Characters in `[start, end)`
    pub(crate) fn columns(&self, start: usize, end: usize) -> &str {
        let begin = self.byte_offset(start);
        let end = self.byte_offset(end).max(begin);
        &self.text[begin..end]
    }

    /// Characters from `start` to the end of the line
    pub(crate) fn columns_from(&self, start: usize) -> &str {
        &self.text[self.byte_offset(start)..]
    }

    /// Parses the trimmed content of `[start, end)`
    pub(crate) fn parse_columns<T: FromStr>(
        &self,
        field: &'static str,
        start: usize,
        end: usize,
    ) -> Result<T, Error> {
        let value = self.columns(start, end);
        value.trim().parse().map_err(|_| Error::FieldDecode {
            line: self.number,
            field,
            value: value.to_string(),
        })
    }
}

/// Decodes ISO-8859-1 bytes, each byte being the code point of a character.
pub(crate) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Splits Latin-1 content in lines, without their terminator.
///
/// Blank lines are skipped, line numbers still count them.
pub(crate) fn decode_lines(content: &[u8]) -> Vec<FixedWidthLine> {
    content
        .split(|b| *b == b'\n')
        .enumerate()
        .map(|(index, line)| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            FixedWidthLine::new(index + 1, decode_latin1(line))
        })
        .filter(|line| !line.text().trim().is_empty())
        .collect()
}

/// Reads all the lines of `file_name`
pub(crate) fn read_lines<H>(
    file_handler: &mut H,
    file_name: &str,
) -> Result<(Vec<FixedWidthLine>, PathBuf)>
where
    for<'a> &'a mut H: FileHandler,
{
    let (mut reader, path) = file_handler.get_file(file_name)?;
    info!("Reading {}", file_name);
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .with_context(|| format!("Error reading {:?}", path))?;
    Ok((decode_lines(&content), path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn latin1_is_decoded_before_slicing() {
        // "Köln" in ISO-8859-1
        let lines = decode_lines(b"0000001 VRS K\xf6ln Heumarkt\r\n");
        assert_eq!(1, lines.len());
        assert_eq!("Köln Heumarkt", lines[0].columns_from(12));
        assert_eq!("VRS", lines[0].columns(8, 11));
    }

    #[test]
    fn blank_lines_are_skipped_but_counted() {
        let lines = decode_lines(b"first\n\n   \nfourth\n");
        let numbers: Vec<usize> = lines.iter().map(FixedWidthLine::number).collect();
        assert_eq!(vec![1, 4], numbers);
    }

    #[test]
    fn columns_beyond_the_line_are_empty() {
        let line = FixedWidthLine::new(1, "0000669 Refrath");
        assert_eq!("Refrath", line.columns(8, 29));
        assert_eq!("", line.columns(29, 33));
        assert_eq!("", line.columns_from(40));
    }

    #[test]
    fn parse_columns_reports_line_and_field() {
        let line = FixedWidthLine::new(7, "00x0669 Refrath");
        let error = line.parse_columns::<u32>("stop id", 0, 7).unwrap_err();
        assert_eq!(
            "line 7: cannot decode stop id from \"00x0669\"",
            error.to_string()
        );
        let line = FixedWidthLine::new(8, "  12   ");
        assert_eq!(12, line.parse_columns::<u32>("stop id", 0, 7).unwrap());
    }
}
