use testview::config::Config;

#[test]
fn test_default_config_values() {
    // Arrange & Act
    let config = Config::default();

    // Assert
    assert_eq!(config.report.format, "html");
    assert!(config.report.title.is_none());
    assert!(config.report.output.is_none());
    assert_eq!(config.source.context_lines, 10);
    assert!(config.source.listings);
}

#[test]
fn test_load_from_file() {
    // Arrange
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join(".testviewrc.toml");
    std::fs::write(&path, "[report]\ntitle = \"Nightly\"\n").unwrap();

    // Act
    let config = Config::load_from_file(&path).unwrap();

    // Assert
    assert_eq!(config.report.title.as_deref(), Some("Nightly"));
    assert_eq!(config.source.context_lines, 10);
}

#[test]
fn test_load_from_missing_file() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(Config::load_from_file(&dir.path().join("absent.toml")).is_none());
}
