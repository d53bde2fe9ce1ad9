#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::time::Duration;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a `qtool` command that reads and writes `config` and never prompts.
#[allow(dead_code)]
pub fn qtool_cmd(config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("qtool"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("QTOOL_CONFIG", config);
    cmd.env("QTOOL_NON_INTERACTIVE", "1");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Store address and credentials through the binary itself.
#[allow(dead_code)]
pub fn configure(config: &Path, address: &str, username: &str, password: &str) {
    qtool_cmd(config)
        .args(["configure", "-a", address, "-u", username, "-p", password])
        .assert()
        .success();
}
