// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{delaycal, get_cmd_output};

#[test]
fn test_simulate_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let sols = tmp_dir.path().join("sols.json");

    #[rustfmt::skip]
    let cmd = delaycal()
        .args([
            "simulate",
            "--delays", "0", "50", "20",
            "--num-channels", "16",
            "--output", &format!("{}", sols.display()),
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "simulate failed on simple arguments: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
