use super::*;

/// # Safety
/// Tests touching `MYFLIX_*` must not run concurrently with each other; both
/// env tests live in one function to keep them ordered.
unsafe fn clear_myflix_env() {
    unsafe {
        std::env::remove_var("MYFLIX_API_URL");
        std::env::remove_var("MYFLIX_STORAGE_DIR");
    }
}

#[test]
fn from_env_defaults_and_overrides() {
    unsafe { clear_myflix_env() };
    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url.as_str(), DEFAULT_API_URL);
    assert!(cfg.storage_dir.ends_with(DEFAULT_STORAGE_DIR_NAME));

    unsafe {
        std::env::set_var("MYFLIX_API_URL", "http://localhost:8080/api");
        std::env::set_var("MYFLIX_STORAGE_DIR", "/tmp/myflix-test");
    }
    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url.as_str(), "http://localhost:8080/api/");
    assert_eq!(cfg.storage_dir, PathBuf::from("/tmp/myflix-test"));

    let cfg = ClientConfig::resolve(Some("   "), Some(Path::new(""))).unwrap();
    assert_eq!(cfg.base_url.as_str(), "http://localhost:8080/api/");
    assert_eq!(cfg.storage_dir, PathBuf::from("/tmp/myflix-test"));

    unsafe {
        std::env::set_var("MYFLIX_API_URL", "not a url");
    }
    let err = ClientConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("invalid API URL"), "{err}");

    unsafe { clear_myflix_env() };
}

#[test]
fn parse_base_url_appends_trailing_slash() {
    let url = parse_base_url("https://movies.example.com").unwrap();
    assert_eq!(url.as_str(), "https://movies.example.com/");
}

#[test]
fn parse_base_url_strips_query_and_fragment() {
    let url = parse_base_url("https://movies.example.com/v1/?x=1#frag").unwrap();
    assert_eq!(url.as_str(), "https://movies.example.com/v1/");
}

#[test]
fn parse_base_url_rejects_non_http_scheme() {
    let err = parse_base_url("ftp://movies.example.com/").unwrap_err().to_string();
    assert!(err.contains("scheme"), "{err}");
}

#[test]
fn parse_base_url_rejects_opaque_url() {
    assert!(parse_base_url("mailto:someone@example.com").is_err());
}

#[test]
fn resolve_prefers_explicit_values() {
    let dir = PathBuf::from("/tmp/myflix-explicit");
    let cfg = ClientConfig::resolve(Some("  http://127.0.0.1:4000  "), Some(&dir)).unwrap();
    assert_eq!(cfg.base_url.as_str(), "http://127.0.0.1:4000/");
    assert_eq!(cfg.storage_dir, dir);
}

#[test]
fn resolve_reports_malformed_explicit_url() {
    let err = ClientConfig::resolve(Some("ftp://movies.example.com"), Some(Path::new("/tmp/x"))).unwrap_err();
    assert!(err.to_string().contains("scheme"), "{err}");
}
