use assert_cmd::Command;
use std::fs;

const CORPUS: &str = "1\tthe cat sat\n2\tthe dog sat\n3\tcat dog bird\n";
const TOPICS: &str = "<top>\n<num> Number: MB001 </num>\n<title> cat </title>\n<querytime> t </querytime>\n\
<querytweettime> 1 </querytweettime>\n</top>\n<top>\n<num> Number: MB002 </num>\n<title> the a an </title>\n\
<querytime> t </querytime>\n<querytweettime> 2 </querytweettime>\n</top>\n<top>\n<num> Number: MB003 </num>\n\
<title> bird </title>\n<querytime> t </querytime>\n<querytweettime> 3 </querytweettime>\n</top>\n";

#[test]
fn run_writes_results_and_vocabulary() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("corpus.txt"), CORPUS).unwrap();
    fs::write(dir.path().join("topics.txt"), TOPICS).unwrap();

    Command::cargo_bin("mbir")
        .unwrap()
        .current_dir(dir.path())
        .args(["run", "--corpus", "corpus.txt", "--topics", "topics.txt"])
        .args(["--results", "out/Results.txt", "--vocab", "out/SampleVocab.txt"])
        .assert()
        .success();

    let results = fs::read_to_string(dir.path().join("out/Results.txt")).unwrap();
    assert_eq!(results, "1 Q0 1 1 1.000 myRun\n1 Q0 3 2 1.000 myRun\n3 Q0 3 1 1.000 myRun\n");

    let vocab = fs::read_to_string(dir.path().join("out/SampleVocab.txt")).unwrap();
    assert_eq!(vocab, "Total Number of Terms: 4\nbird\ncat\ndog\nsat\n");
}

#[test]
fn topic_ids_and_run_tag_flags() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("corpus.txt"), CORPUS).unwrap();
    fs::write(dir.path().join("topics.txt"), TOPICS).unwrap();

    Command::cargo_bin("mbir")
        .unwrap()
        .current_dir(dir.path())
        .args(["run", "--corpus", "corpus.txt", "--topics", "topics.txt", "--results", "r.txt"])
        .args(["--query-ids", "topic", "--run-tag", "tfidf", "--top-k", "1", "--parallel"])
        .assert()
        .success();

    let results = fs::read_to_string(dir.path().join("r.txt")).unwrap();
    assert_eq!(results, "MB001 Q0 1 1 1.000 tfidf\nMB003 Q0 3 1 1.000 tfidf\n");
}

#[test]
fn malformed_corpus_fails_with_location() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("corpus.txt"), "1\tok\nno delimiter\n").unwrap();
    fs::write(dir.path().join("topics.txt"), TOPICS).unwrap();

    let out = Command::cargo_bin("mbir")
        .unwrap()
        .current_dir(dir.path())
        .args(["run", "--corpus", "corpus.txt", "--topics", "topics.txt", "--results", "r.txt"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("building index from corpus.txt"));
    assert!(stderr.contains("corpus.txt:2"));
    assert!(!dir.path().join("r.txt").exists());
}

#[test]
fn search_prints_preview_table() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("corpus.txt"), CORPUS).unwrap();

    let out = Command::cargo_bin("mbir")
        .unwrap()
        .current_dir(dir.path())
        .args(["search", "--corpus", "corpus.txt", "--hits", "1", "dog"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("Score\tTweet ID"));
    assert!(stdout.contains("1.000\t2\tthe dog sat"));
    assert!(!stdout.contains("cat dog bird"));
}
