use crate::{run, temp_path};

const TABLE: &str = "Multiplier,Spectral score
c000000000000001,0.6
f000000000000000,0.8
d000000000000000,0.9
f000000000000000,0.8
e000000000000000,0.7
";

#[test]
fn test_choose_ranks_by_period() {
    let path = temp_path("choose.csv");
    std::fs::write(&path, TABLE).unwrap();

    let output = run(&[
        "choose",
        "--input",
        path.to_str().unwrap(),
        "--quantile",
        "0.5",
        "--top",
        "5",
    ]);
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Rows: 5 (4 unique)"));
    // Median of 0.6, 0.7, 0.8, 0.9 is 0.75.
    assert!(stdout.contains("Kept: 2"));

    let f = stdout.find("f000000000000000").unwrap();
    let d = stdout.find("d000000000000000").unwrap();
    assert!(f < d, "Rows should be ordered by descending period");
    assert!(!stdout.contains("c000000000000001"));
    assert!(!stdout.contains("e000000000000000"));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_choose_malformed_table() {
    let path = temp_path("choose-bad.csv");
    std::fs::write(&path, "Multiplier,Spectral score\nc0,not-a-number\n").unwrap();

    let output = run(&["choose", "--input", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "stderr: {}", stderr);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_choose_missing_file() {
    let output = run(&["choose", "--input", temp_path("absent.csv").to_str().unwrap()]);
    assert!(!output.status.success());
}
