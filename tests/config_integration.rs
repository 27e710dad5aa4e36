use std::path::PathBuf;

use gistpane::config::{ConfigFlags, load_config_flags, parse_flag_tokens};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".gistpanerc");
    let content = r"
# comment
--ephemeral

--default-gist aa5a315d61ae9438b18d
   
--export-dir=exports
";
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.ephemeral);
    assert_eq!(flags.default_gist.as_deref(), Some("aa5a315d61ae9438b18d"));
    assert_eq!(flags.export_dir, Some(PathBuf::from("exports")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".gistpanerc");
    let content = "--ephemeral\n--min-pane-width 24\n--log-file file.log\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "gistpane".to_string(),
        "--min-pane-width".to_string(),
        "30".to_string(),
        "--print-command".to_string(),
        "lpr".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.ephemeral, "file flags should remain enabled");
    assert_eq!(effective.print_command.as_deref(), Some("lpr"));
    assert_eq!(effective.min_pane_width, Some(30), "cli should override width");
    assert_eq!(
        effective.log_file,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "gistpane".to_string(),
        "--api-base=http://127.0.0.1:9000".to_string(),
        "--store=state.json".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.api_base.as_deref(), Some("http://127.0.0.1:9000"));
    assert_eq!(flags.store, Some(PathBuf::from("state.json")));
}

#[test]
fn test_parse_flag_tokens_ignores_positional_gist() {
    let args = vec![
        "gistpane".to_string(),
        "https://gist.github.com/octocat/aa5a315d61ae9438b18d".to_string(),
    ];
    assert_eq!(parse_flag_tokens(&args), ConfigFlags::default());
}
