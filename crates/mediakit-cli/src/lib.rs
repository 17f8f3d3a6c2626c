use std::path::Path;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "mediakit=info";

/// JSON logs when asked for on the command line or through `LOG_FORMAT=json`.
pub fn wants_json_logs(flag: bool, log_format: Option<&str>) -> bool {
    flag || log_format.is_some_and(|format| format.trim().eq_ignore_ascii_case("json"))
}

/// Initialize tracing for the CLI.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Content type hint for a local file, from its extension.
pub fn declared_content_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path).first_raw().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_json_logs() {
        assert!(wants_json_logs(true, None));
        assert!(wants_json_logs(false, Some("JSON")));
        assert!(!wants_json_logs(false, Some("pretty")));
        assert!(!wants_json_logs(false, None));
    }

    #[test]
    fn test_declared_content_type() {
        assert_eq!(
            declared_content_type(Path::new("clip.mp4")).as_deref(),
            Some("video/mp4")
        );
        assert_eq!(declared_content_type(Path::new("no-extension")), None);
    }
}
