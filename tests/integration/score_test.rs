use crate::run;

#[test]
fn test_score_reports_dimensions() {
    let output = run(&["score", "0xd1342543de82ef95"]);
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Multiplier: d1342543de82ef95"));
    assert!(stdout.contains("(a << 192) - 1: composite"));
    assert!(stdout.contains("Harmonic score: 0.825718"));
    // One row per dimension 2..=24.
    let rows = stdout
        .lines()
        .filter(|line| {
            line.split_whitespace()
                .next()
                .and_then(|d| d.parse::<usize>().ok())
                .is_some_and(|d| (2..=24).contains(&d))
        })
        .count();
    assert_eq!(rows, 23);
}

#[test]
fn test_score_full_period_pair() {
    let output = run(&["score", "cba2723cca35d642", "--max-dim", "8"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(a << 192) - 1: prime"));
    assert!(stdout.contains("((a << 192) - 1) >> 1: prime"));
}

#[test]
fn test_score_invalid_multiplier() {
    let output = run(&["score", "0xnothex"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid multiplier"));
}
