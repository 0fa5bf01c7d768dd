/// Tunable knobs for the presentation and query layers.
///
/// Built once at startup and passed down; neither the store nor the queries
/// keep any configuration state of their own.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Rows shown per page when browsing tasks.
    pub page_size: usize,
    /// Minimum rating for the "this week's important tasks" view.
    pub importance_threshold: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 8,
            importance_threshold: 10,
        }
    }
}
