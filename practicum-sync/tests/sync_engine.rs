use std::path::{Path, PathBuf};

use practicum_core::{Config, SectionKind, StudentDocument};
use practicum_sync::{run, Outcome, RunOptions, RunReport};
use rstest::rstest;
use tempfile::TempDir;

const HEADER: &str =
    "Student Name,Email,Username,Project Title,GitHub,Presentation,Report,Profile Page\n";

const JOHN: &str =
    "\"John Doe\",\"jdoe@worldclass.regis.edu\",\"jdoe001\",\"Data Analysis Project\",\"\",\"\",\"\",\"\"\n";

fn write_csv(root: &TempDir, name: &str, rows: &str) -> PathBuf {
    let path = root.path().join(name);
    std::fs::write(&path, format!("{HEADER}{rows}")).unwrap();
    path
}

fn sync(root: &TempDir, csv: &Path) -> RunReport {
    run(root.path(), &Config::default(), csv, &RunOptions::default()).unwrap()
}

fn profile_path(root: &TempDir, username: &str) -> PathBuf {
    root.path()
        .join("data/students")
        .join(username)
        .join("profile.md")
}

fn read_profile(root: &TempDir, username: &str) -> String {
    std::fs::read_to_string(profile_path(root, username)).unwrap()
}

fn parse(text: &str) -> StudentDocument {
    StudentDocument::parse(text, &Config::default().courses).unwrap()
}

fn headings(doc: &StudentDocument) -> Vec<String> {
    doc.sections.iter().map(|s| s.heading.clone()).collect()
}

#[test]
fn new_student_gets_full_folder_and_profile() {
    let root = TempDir::new().unwrap();
    let csv = write_csv(&root, "2025_Summer_MSDS692.csv", JOHN);
    let report = sync(&root, &csv);

    assert!(matches!(&report.outcomes[0], Outcome::Created { username, .. } if username.as_str() == "jdoe001"));

    let dir = root.path().join("data/students/jdoe001");
    for sub in ["reports", "presentations", "assets"] {
        assert!(dir.join(sub).is_dir(), "missing {sub}/");
    }
    assert!(dir.join("README.md").is_file());

    let doc = parse(&read_profile(&root, "jdoe001"));
    assert_eq!(doc.front_matter.email, "jdoe@regis.edu");
    assert_eq!(doc.front_matter.course, "MSDS 692");
    assert_eq!(doc.front_matter.semester, "Summer 2025");
    assert_eq!(doc.practicum_codes().len(), 1);
    assert_eq!(
        headings(&doc),
        vec!["About Me", "Skills", "MSDS 692 - Practicum I", "Contact"]
    );
    let practicum = &doc.sections[2];
    assert!(practicum.raw.contains("**Title:** Data Analysis Project\n"));
}

#[test]
fn second_identical_run_changes_nothing() {
    let root = TempDir::new().unwrap();
    let csv = write_csv(&root, "2025_Summer_MSDS692.csv", JOHN);
    sync(&root, &csv);

    let profile = profile_path(&root, "jdoe001");
    let readme = profile.with_file_name("README.md");
    let hashes = root.path().join(".practicum/hashes/jdoe001.json");
    let before = (
        std::fs::read(&profile).unwrap(),
        std::fs::metadata(&profile).unwrap().modified().unwrap(),
        std::fs::metadata(&readme).unwrap().modified().unwrap(),
        std::fs::read(&hashes).unwrap(),
    );

    let report = sync(&root, &csv);
    assert!(matches!(
        report.outcomes[0],
        Outcome::Updated { changed: false, .. }
    ));
    assert_eq!(report.counts().unchanged, 1);

    let after = (
        std::fs::read(&profile).unwrap(),
        std::fs::metadata(&profile).unwrap().modified().unwrap(),
        std::fs::metadata(&readme).unwrap().modified().unwrap(),
        std::fs::read(&hashes).unwrap(),
    );
    assert_eq!(before, after);
}

#[test]
fn edited_about_me_survives_next_course() {
    let root = TempDir::new().unwrap();
    let csv = write_csv(&root, "2025_Summer_MSDS692.csv", JOHN);
    sync(&root, &csv);

    let profile = profile_path(&root, "jdoe001");
    let text = read_profile(&root, "jdoe001");
    let edited = text.replace(
        "## About Me\n",
        "## About Me\n\nI build forecasting tools for hospitals.\n",
    );
    std::fs::write(&profile, &edited).unwrap();

    let csv = write_csv(
        &root,
        "MSDS696_Fall2025.csv",
        "\"John Doe\",jdoe@regis.edu,jdoe001,Hospital Forecasting,,,,\n",
    );
    let report = sync(&root, &csv);
    assert!(matches!(report.outcomes[0], Outcome::Updated { changed: true, .. }));

    let doc = parse(&read_profile(&root, "jdoe001"));
    let about = doc.section(&SectionKind::AboutMe).unwrap();
    assert!(about.raw.contains("I build forecasting tools for hospitals."));
    assert_eq!(doc.front_matter.course, "MSDS 696");
    assert_eq!(doc.front_matter.semester, "Fall 2025");
}

#[test]
fn upload_order_does_not_change_the_document() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let row692 = "\"John Doe\",jdoe@regis.edu,jdoe001,Data Analysis Project,,,,\n";
    let row696 = "\"John Doe\",jdoe@regis.edu,jdoe001,Churn Forecasting,,,,\n";

    let a692 = write_csv(&first, "2025_Summer_MSDS692.csv", row692);
    let a696 = write_csv(&first, "2025_Fall_MSDS696.csv", row696);
    sync(&first, &a692);
    sync(&first, &a696);

    let b692 = write_csv(&second, "2025_Summer_MSDS692.csv", row692);
    let b696 = write_csv(&second, "2025_Fall_MSDS696.csv", row696);
    sync(&second, &b696);
    sync(&second, &b692);

    let in_order = read_profile(&first, "jdoe001");
    let reversed = read_profile(&second, "jdoe001");
    let expected = vec![
        "About Me",
        "Skills",
        "MSDS 692 - Practicum I",
        "MSDS 696 - Practicum II",
        "Contact",
    ];
    assert_eq!(headings(&parse(&in_order)), expected);
    assert_eq!(headings(&parse(&reversed)), expected);
    assert_eq!(in_order, reversed);

    let codes: Vec<String> = parse(&reversed)
        .front_matter
        .courses
        .iter()
        .map(|c| c.code.to_string())
        .collect();
    assert_eq!(codes, vec!["MSDS692", "MSDS696"]);
}

#[rstest]
#[case::no_username("\"Jane Roe\",jroe@regis.edu,,Project,,,,\n", "jroe")]
#[case::no_name("\"\",anon@regis.edu,anon1,Project,,,,\n", "anon1")]
#[case::demo_account("\"Demo Student\",demo@regis.edu,demo_student,Project,,,,\n", "demo_student")]
#[case::parent_dir_username("\"Eve X\",eve@regis.edu,../../escaped,Project,,,,\n", "../../escaped")]
#[case::nested_username("\"Eve X\",eve@regis.edu,eve/../../escaped,Project,,,,\n", "eve")]
#[case::hidden_username("\"Eve X\",eve@regis.edu,.practicum,Project,,,,\n", ".practicum")]
fn rejected_row_leaves_no_trace(#[case] row: &str, #[case] folder: &str) {
    let root = TempDir::new().unwrap();
    let csv = write_csv(&root, "2025_Summer_MSDS692.csv", row);
    let report = sync(&root, &csv);

    assert!(matches!(report.outcomes[0], Outcome::Skipped { line: 2, .. }));
    assert!(!root.path().join("data/students").join(folder).exists());
    assert!(!root.path().join("escaped").exists());
    assert!(!root.path().join(".practicum/hashes").exists());

    let again = sync(&root, &csv);
    assert!(matches!(again.outcomes[0], Outcome::Skipped { line: 2, .. }));
}

#[rstest]
#[case::multi_line_title(
    "\"John Doe\",jdoe@regis.edu,jdoe001,\"Line one\n## Contact\",,,,\n",
    "**Title:** Line one ## Contact\n"
)]
#[case::crlf_title(
    "\"John Doe\",jdoe@regis.edu,jdoe001,\"Line one\r\n\r\nLine two\",,,,\n",
    "**Title:** Line one Line two\n"
)]
#[case::dollar_title(
    "\"John Doe\",jdoe@regis.edu,jdoe001,\"Costs in $1 and ${name}\",,,,\n",
    "**Title:** Costs in $1 and ${name}\n"
)]
#[case::multi_line_name(
    "\"John\nDoe\",jdoe@regis.edu,jdoe001,Data Analysis Project,,,,\n",
    "**Title:** Data Analysis Project\n"
)]
fn hostile_cells_stay_on_one_line_and_resync_cleanly(#[case] row: &str, #[case] title_line: &str) {
    let root = TempDir::new().unwrap();
    let csv = write_csv(&root, "2025_Summer_MSDS692.csv", row);

    let first = sync(&root, &csv);
    assert!(matches!(&first.outcomes[0], Outcome::Created { username, .. } if username.as_str() == "jdoe001"));
    let text = read_profile(&root, "jdoe001");
    assert!(text.contains(title_line), "missing {title_line:?} in:\n{text}");

    let doc = parse(&text);
    assert_eq!(
        headings(&doc),
        vec!["About Me", "Skills", "MSDS 692 - Practicum I", "Contact"]
    );
    assert_eq!(doc.front_matter.name, "John Doe");

    let second = sync(&root, &csv);
    assert!(matches!(
        second.outcomes[0],
        Outcome::Updated { changed: false, .. }
    ));
    assert_eq!(read_profile(&root, "jdoe001"), text);
}

#[test]
fn corrupt_provenance_file_only_blocks_its_own_student() {
    let root = TempDir::new().unwrap();
    let rows = "\"John Doe\",jdoe@regis.edu,jdoe001,First Idea,,,,\n\"Ann Lee\",alee@regis.edu,alee002,Churn Study,,,,\n";
    let csv = write_csv(&root, "2025_Summer_MSDS692.csv", rows);
    sync(&root, &csv);

    let hashes = root.path().join(".practicum/hashes/jdoe001.json");
    std::fs::write(&hashes, "{ \"sections\": [").unwrap();
    let before = read_profile(&root, "jdoe001");

    let csv = write_csv(
        &root,
        "2025_Summer_MSDS692.csv",
        &rows
            .replace("First Idea", "Second Idea")
            .replace("Churn Study", "Churn Forecasting"),
    );
    let report = sync(&root, &csv);

    match &report.outcomes[0] {
        Outcome::Conflict { reason, .. } => assert!(reason.contains("provenance"), "{reason}"),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert!(matches!(report.outcomes[1], Outcome::Updated { changed: true, .. }));
    assert_eq!(report.counts().conflicts, 1);
    assert_eq!(read_profile(&root, "jdoe001"), before);
    assert_eq!(std::fs::read_to_string(&hashes).unwrap(), "{ \"sections\": [");
    assert!(read_profile(&root, "alee002").contains("**Title:** Churn Forecasting\n"));
}

#[test]
fn student_edited_practicum_only_gets_a_new_title() {
    let root = TempDir::new().unwrap();
    let csv = write_csv(&root, "2025_Summer_MSDS692.csv", JOHN);
    sync(&root, &csv);

    let profile = profile_path(&root, "jdoe001");
    let edited = read_profile(&root, "jdoe001").replace(
        "**Abstract:** This project focuses on data analysis project.",
        "**Abstract:** I measured things carefully.",
    );
    std::fs::write(&profile, &edited).unwrap();

    let csv = write_csv(
        &root,
        "2025_Summer_MSDS692.csv",
        "\"John Doe\",jdoe@regis.edu,jdoe001,Careful Measurement,,,,\n",
    );
    sync(&root, &csv);

    let expected = edited.replace(
        "**Title:** Data Analysis Project",
        "**Title:** Careful Measurement",
    );
    assert_eq!(read_profile(&root, "jdoe001"), expected);
}

#[test]
fn corrupted_front_matter_is_a_conflict_and_left_alone() {
    let root = TempDir::new().unwrap();
    let csv = write_csv(&root, "2025_Summer_MSDS692.csv", JOHN);
    sync(&root, &csv);

    let profile = profile_path(&root, "jdoe001");
    let broken = "---\nname: [John\nemail: jdoe@regis.edu\n---\n\n## About Me\n\nHi.\n";
    std::fs::write(&profile, broken).unwrap();

    let report = sync(&root, &csv);
    assert!(matches!(report.outcomes[0], Outcome::Conflict { .. }));
    assert_eq!(report.counts().conflicts, 1);
    assert_eq!(std::fs::read_to_string(&profile).unwrap(), broken);
}

#[test]
fn profile_owned_by_someone_else_is_a_conflict() {
    let root = TempDir::new().unwrap();
    let csv = write_csv(&root, "2025_Summer_MSDS692.csv", JOHN);
    sync(&root, &csv);

    let profile = profile_path(&root, "jdoe001");
    let moved = read_profile(&root, "jdoe001").replace("username: jdoe001", "username: asmith002");
    std::fs::write(&profile, &moved).unwrap();

    let report = sync(&root, &csv);
    match &report.outcomes[0] {
        Outcome::Conflict { reason, .. } => assert!(reason.contains("asmith002")),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(read_profile(&root, "jdoe001"), moved);
}

#[test]
fn duplicate_username_in_one_roster_last_row_wins() {
    let root = TempDir::new().unwrap();
    let csv = write_csv(
        &root,
        "2025_Summer_MSDS692.csv",
        "\"John Doe\",jdoe@regis.edu,jdoe001,First Idea,,,,\n\"John Doe\",jdoe@regis.edu,jdoe001,Second Idea,,,,\n",
    );
    let report = sync(&root, &csv);

    assert!(matches!(report.outcomes[0], Outcome::Created { .. }));
    assert!(matches!(report.outcomes[1], Outcome::Updated { changed: true, .. }));
    let text = read_profile(&root, "jdoe001");
    assert!(text.contains("**Title:** Second Idea\n"));
    assert!(!text.contains("First Idea"));
}

#[test]
fn roster_links_replace_generated_placeholders() {
    let root = TempDir::new().unwrap();
    let csv = write_csv(
        &root,
        "2025_Summer_MSDS692.csv",
        "\"John Doe\",jdoe@regis.edu,jdoe001,Data Analysis Project,https://github.com/jdoe/analysis,#,,\n",
    );
    sync(&root, &csv);
    let text = read_profile(&root, "jdoe001");
    assert!(text.contains(
        "- GitHub Repository: [https://github.com/jdoe/analysis](https://github.com/jdoe/analysis)\n"
    ));
    // "#" counts as no link
    assert!(text.contains("[View Slides](../presentations/jdoe001_practicumi_slides.pdf)"));
}

#[test]
fn explicit_course_overrides_file_name() {
    let root = TempDir::new().unwrap();
    let csv = write_csv(&root, "roster.csv", JOHN);
    let opts = RunOptions {
        course: Some("MSDS696".to_string()),
        semester: Some("Spring 2026".to_string()),
        dry_run: false,
    };
    let report = run(root.path(), &Config::default(), &csv, &opts).unwrap();
    assert_eq!(report.offering.course.display, "MSDS 696");

    let doc = parse(&read_profile(&root, "jdoe001"));
    assert_eq!(doc.front_matter.semester, "Spring 2026");
    assert_eq!(headings(&doc)[2], "MSDS 696 - Practicum II");
}
