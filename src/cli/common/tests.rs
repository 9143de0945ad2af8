// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::Path;

use super::*;

#[test]
fn test_arg_file_types_from_path() {
    assert_eq!(
        ArgFileTypes::from_path(Path::new("args.toml")),
        Some(ArgFileTypes::Toml)
    );
    assert_eq!(
        ArgFileTypes::from_path(Path::new("/tmp/ARGS.JSON")),
        Some(ArgFileTypes::Json)
    );
    assert_eq!(ArgFileTypes::from_path(Path::new("args.yaml")), None);
    assert_eq!(ArgFileTypes::from_path(Path::new("args")), None);
}

#[test]
fn test_arg_file_help_lists_types() {
    assert_eq!(*ARG_FILE_TYPES_COMMA_SEPARATED, "toml, json");
    assert!(ARG_FILE_HELP.ends_with("toml, json"));
}
