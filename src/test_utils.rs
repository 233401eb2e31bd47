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

use pretty_assertions::assert_eq;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

fn get_file_content<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    let mut output_file = File::open(path).unwrap_or_else(|_| panic!("file {:?} not found", path));
    let mut output_contents = String::new();
    output_file.read_to_string(&mut output_contents).unwrap();
    output_contents
}

/// Compares the files of `output_dir` with the ones of `work_dir_expected`.
///
/// When `files_to_check` is `None`, every file of `work_dir_expected` is
/// compared.
pub fn compare_output_dir_with_expected<P: AsRef<Path>>(
    output_dir: &P,
    files_to_check: Option<Vec<&str>>,
    work_dir_expected: &str,
) {
    let output_dir = output_dir.as_ref();
    let files: Vec<String> = match files_to_check {
        Some(files) => files.into_iter().map(String::from).collect(),
        None => {
            let mut files: Vec<String> = fs::read_dir(work_dir_expected)
                .unwrap_or_else(|_| panic!("directory {} not found", work_dir_expected))
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .filter_map(|entry| entry.file_name().into_string().ok())
                .collect();
            files.sort();
            files
        }
    };
    for filename in files {
        let output_contents = get_file_content(output_dir.join(&filename));
        let expected_contents = get_file_content(Path::new(work_dir_expected).join(&filename));
        assert_eq!(expected_contents, output_contents, "in file {}", filename);
    }
}

/// Writes `content` in `path/file_name`
pub fn create_file_with_content(path: &Path, file_name: &str, content: &str) -> File {
    create_file_with_bytes(path, file_name, content.as_bytes())
}

/// Writes raw `content` in `path/file_name`
pub fn create_file_with_bytes(path: &Path, file_name: &str, content: &[u8]) -> File {
    let file_path = path.join(file_name);
    let mut f = File::create(&file_path).unwrap();
    f.write_all(content).unwrap();
    File::open(file_path).unwrap()
}

/// Runs `func` with a temporary directory, deleted afterwards
pub fn test_in_tmp_dir<F>(func: F)
where
    F: FnOnce(&Path),
{
    let tmp_dir = tempfile::tempdir().expect("create temp dir");
    {
        let path = tmp_dir.path();
        func(path);
    }
    tmp_dir.close().expect("delete temp dir");
}
