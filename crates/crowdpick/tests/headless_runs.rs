//! Headless runner driven from files, the way the binary uses it.

use std::io::Write;

use crowdpick::config::PickerConfig;
use crowdpick::runner::{load_roster, run_races, run_wheel, Pacing};
use crowdpick::WheelOutcome;

fn roster_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn races_from_a_roster_file_skip_hidden_entries() {
    let file = roster_file(
        r#"[
            (name: "Ada"),
            (name: "Bob", photo: Some("bob.png")),
            (name: "Hidden", visible: false),
        ]"#,
    );
    let participants = load_roster(file.path()).unwrap();
    assert_eq!(participants.len(), 3);

    let mut config = PickerConfig::default();
    config.runner.races = 10;
    config.runner.float_secs = 0.0;
    config.runner.seed = 3;

    let reports = run_races(&config, participants, Pacing::Fixed).unwrap();
    assert_eq!(reports.len(), 2);
    let mut chosen: Vec<_> = reports.iter().map(|r| r.chosen.name.as_str()).collect();
    chosen.sort_unstable();
    assert_eq!(chosen, vec!["Ada", "Bob"]);
    assert_eq!(reports.last().map(|r| r.remaining), Some(0));
}

#[test]
fn same_seed_same_winners() {
    let names = || crowdpick_core::roster::parse_names("a,b,c,d,e");
    let mut config = PickerConfig::default();
    config.runner.races = 4;
    config.runner.float_secs = 0.1;
    config.runner.seed = 99;

    let first: Vec<_> = run_races(&config, names(), Pacing::Fixed)
        .unwrap()
        .into_iter()
        .map(|r| r.chosen)
        .collect();
    let second: Vec<_> = run_races(&config, names(), Pacing::Fixed)
        .unwrap()
        .into_iter()
        .map(|r| r.chosen)
        .collect();
    assert_eq!(first, second);

    let wheel_a = run_wheel(&config, names()).unwrap();
    let wheel_b = run_wheel(&config, names()).unwrap();
    assert_eq!(wheel_a, wheel_b);
    assert_eq!(wheel_a.len(), 4);
    let winners = wheel_a
        .iter()
        .filter(|o| matches!(o, WheelOutcome::Winner { .. }))
        .count();
    assert!(winners >= 3);
}

#[test]
fn bad_roster_file_is_reported() {
    let file = roster_file("[(nom: 3)]");
    assert!(load_roster(file.path()).is_err());
}
