use crate::{run, temp_path};

fn search(
    output: &std::path::Path,
    seed: &str,
    iterations: &str,
    workers: &str,
) -> std::process::Output {
    search_with(output, seed, iterations, workers, &[])
}

fn search_with(
    output: &std::path::Path,
    seed: &str,
    iterations: &str,
    workers: &str,
    extra: &[&str],
) -> std::process::Output {
    let mut args = vec![
        "search",
        "--output",
        output.to_str().unwrap(),
        "--seed",
        seed,
        "--iterations",
        iterations,
        "-j",
        workers,
    ];
    args.extend_from_slice(extra);
    run(&args)
}

#[test]
fn test_search_reproducible() {
    let first = temp_path("repro-1.csv");
    let second = temp_path("repro-2.csv");

    let output = search(&first, "42", "100000", "4");
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Seed: 42"));
    assert!(stdout.contains("Iterations: 100000"));

    let output = search(&second, "42", "100000", "4");
    assert!(output.status.success());

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(a, b, "Same seed should give byte-identical tables");

    let text = String::from_utf8(a).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Multiplier,Spectral score"));
    for line in lines {
        let (multiplier, score) = line.split_once(',').unwrap();
        let multiplier = u64::from_str_radix(multiplier, 16).unwrap();
        assert_eq!(multiplier >> 62, 0b11);
        assert!(score.parse::<f64>().unwrap() >= 0.5);
    }

    std::fs::remove_file(&first).unwrap();
    std::fs::remove_file(&second).unwrap();
}

#[test]
fn test_search_rows_follow_worker_order() {
    // With a zero threshold every multiplier passing the primality filter
    // is written, so the table lists each worker's hits in turn.
    let first = temp_path("order-1.csv");
    let second = temp_path("order-2.csv");
    let extra = ["--threshold", "0", "--max-dim", "8", "--no-progress"];

    let output = search_with(&first, "42", "100000", "4", &extra);
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let output = search_with(&second, "42", "100000", "4", &extra);
    assert!(output.status.success());

    let text = std::fs::read_to_string(&first).unwrap();
    assert_eq!(text, std::fs::read_to_string(&second).unwrap());

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Multiplier,Spectral score"));
    let multipliers: Vec<&str> = lines.map(|line| line.split(',').next().unwrap()).collect();
    assert_eq!(
        multipliers,
        vec![
            // worker 0
            "e7b2951e80dde59d",
            // worker 1
            "e14d2cc4cdaabe15",
            "c88a53f466130d7d",
            "e4639fede5d1c168",
            // worker 2
            "e990f0e945deecfc",
            "f55e99fa85ccb7ac",
            // worker 3
            "ccc32764f2e78691",
            "e9a50776b6069abc",
        ]
    );
    for line in text.lines().skip(1) {
        let score: f64 = line.split_once(',').unwrap().1.parse().unwrap();
        assert!(score > 0.0 && score <= 1.0, "row {}", line);
    }

    std::fs::remove_file(&first).unwrap();
    std::fs::remove_file(&second).unwrap();
}

#[test]
fn test_search_zero_iterations_writes_header() {
    let path = temp_path("empty.csv");
    let output = search(&path, "1", "0", "3");
    assert!(output.status.success());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "Multiplier,Spectral score\n"
    );
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_search_unwritable_output_fails_first() {
    let path = temp_path("no-such-dir").join("candidates.csv");
    let output = search(&path, "1", "1000", "2");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot write output"), "stderr: {}", stderr);
    // Nothing ran, so no seed was announced.
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Seed:"));
}

#[test]
fn test_search_rejects_bad_dimension() {
    let path = temp_path("bad-dim.csv");
    let output = run(&[
        "search",
        "--output",
        path.to_str().unwrap(),
        "--max-dim",
        "30",
        "--iterations",
        "10",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid configuration"));
    assert!(!path.exists());
}

#[test]
fn test_search_requires_subcommand() {
    let output = run(&[]);
    assert!(!output.status.success());
}
