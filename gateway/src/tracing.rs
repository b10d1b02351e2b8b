use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer, Registry};

pub fn init_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or("info".to_string());
    let env_filter = EnvFilter::new(log_level);
    let color = std::env::var("ANSI_OUTPUT").map_or(true, |v| v == "true");

    let builder = tracing_subscriber::fmt::layer()
        .pretty()
        .with_line_number(false)
        .with_file(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(color)
        .with_filter(env_filter);

    Registry::default()
        .with(builder)
        .try_init()
        .expect("initialized subscriber successfully");
}
