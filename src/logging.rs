use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `EDUCATEURSELF_LOG` nor `RUST_LOG` is set.
fn default_directives(component: &str) -> String {
    format!("info,educateurself=debug,{component}=debug")
}

/// Installs the global subscriber. Network calls run on tokio workers while
/// the window runs on the main thread, so thread ids and names are included.
/// Span open and close events bracket each webhook and Gemini round trip.
pub fn init_tracing(component: &str) {
    let filter = std::env::var("EDUCATEURSELF_LOG")
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives(component)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .compact()
        .try_init();
}
