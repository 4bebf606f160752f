use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("expense_cli").unwrap();
    cmd.env("EXPENSE_CORE_CLI_SCRIPT", "1")
        .env("EXPENSE_CORE_HOME", home.path())
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn script_mode_runs_basic_flow() {
    let home = TempDir::new().unwrap();
    let input = "login alice\ncategory Food\nexpense Lunch 12.5 Food\nreport\nexit\n";

    cli(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Logged in as `alice`"))
        .stdout(contains("Category `Food` added."))
        .stdout(contains("Food:"))
        .stdout(contains("Rs 12.50"));

    let json = std::fs::read_to_string(home.path().join("users").join("alice.json")).unwrap();
    assert!(json.contains("\"Lunch\""));
    assert!(json.contains("\"createdAt\""));
}

#[test]
fn session_is_restored_on_next_run() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("login bob\ncategory Rent\nexit\n")
        .assert()
        .success();

    cli(&home)
        .write_stdin("status\nexit\n")
        .assert()
        .success()
        .stdout(contains("Restored session for `bob`."))
        .stdout(contains("Rent"));

    cli(&home)
        .write_stdin("logout\nstatus\nexit\n")
        .assert()
        .success()
        .stdout(contains("Logged out."));

    cli(&home)
        .write_stdin("status\nexit\n")
        .assert()
        .success()
        .stdout(contains("Restored session").not());
}

#[test]
fn reset_income_scopes_the_balance() {
    let home = TempDir::new().unwrap();
    let input = "\
# comments are skipped
login carol
category Food
income 1000 2999-01-01
reset-income
balance
exit
";

    cli(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Income of Rs 1000.00 saved."))
        .stdout(contains("Income reset."))
        .stdout(contains("after reset at"))
        .stdout(contains("Add an income to see the remaining balance."));
}

#[test]
fn errors_are_reported_and_the_shell_keeps_going() {
    let home = TempDir::new().unwrap();
    let input = "expense Taxi 9 Travel\nreprot\nlogin dave\ncategory ab\nexpense Taxi 9 Travel\nstatus\nexit\n";

    cli(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stderr(contains("No user logged in"))
        .stderr(contains("Unknown command `reprot`"))
        .stdout(contains("Suggestion: `report`?"))
        .stderr(contains("at least 3 characters"))
        .stderr(contains("Unknown category `Travel`"))
        .stdout(contains("dave"));
}
