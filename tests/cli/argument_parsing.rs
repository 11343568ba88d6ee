//! Argument parsing and config file merging through the public API

use clap::Parser;
use todoscan::app::cli::args::Args;
use todoscan::app::startup::build_scanner;
use toml::Table;

#[test]
fn test_toml_fills_and_command_line_overrides() {
    let mut args = Args::try_parse_from([
        "todoscan",
        "--max-file-size",
        "1000",
        "-t",
        "NOTE",
    ])
    .unwrap();

    let config: Table = toml::from_str(
        r#"
        max-file-size = 5000
        tag = ["TODO", "FIXME"]
        exclude = ["build/**", "dist/**"]
        exclude-extensions = "map"
        view-url = "https://git.example.com/{path}#L{line}"
        "#,
    )
    .unwrap();
    Args::apply_toml_values(&mut args, &config).unwrap();
    args.apply_enhanced_parsing().unwrap();

    assert_eq!(args.max_file_size, Some(1000));
    assert_eq!(args.tags, vec!["NOTE"]);
    assert_eq!(args.exclude, vec!["build/**", "dist/**"]);
    assert_eq!(args.exclude_extensions, vec!["map"]);

    let scanner = build_scanner(&args).unwrap();
    assert_eq!(scanner.policy().max_file_size(), 1000);
}

#[test]
fn test_invalid_exclude_from_config_is_rejected() {
    let mut args = Args::try_parse_from(["todoscan"]).unwrap();
    let config: Table = toml::from_str("exclude = \"src/[bad\"").unwrap();

    Args::apply_toml_values(&mut args, &config).unwrap();
    assert!(args.apply_enhanced_parsing().is_err());
}

#[test]
fn test_help_mentions_list_options() {
    let error = Args::try_parse_from(["todoscan", "--help"]).unwrap_err();
    let help = error.to_string();
    assert!(help.contains("--exclude-extensions"));
    assert!(help.contains("--watch"));
    assert!(help.contains("comma-separated"));
}
