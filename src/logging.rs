use tracing_subscriber::EnvFilter;

/// stderr로 출력하는 tracing 구독자를 설치한다. `RUST_LOG`가 있으면 그 값을 따른다.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
