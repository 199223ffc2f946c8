/// Engine-wide configuration applied by `rugl::init`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// `tracing` filter directives. `None` defers to `RUST_LOG`.
    pub log_filter: Option<String>,
    pub profiling: ProfilingMode,
}

impl Config {
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    pub fn with_profiling(mut self, mode: ProfilingMode) -> Self {
        self.profiling = mode;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfilingMode {
    /// Profiling scopes are compiled in but not collected
    #[default]
    Off,
    /// Scopes are collected and served to `puffin_viewer` over HTTP
    PuffinHttp,
}
