//! Runtime configuration for the console state core.
//!
//! All knobs carry the defaults the console shipped with; embedders tune
//! them through the builder-style `with_*` methods.

use std::time::Duration;

/// Which deployment mode the user list runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Mirror the whole directory once, then filter and mutate in memory.
    #[default]
    LocalCache,
    /// Delegate the search filter and all persistence to the directory.
    BackendSearch,
}

/// Tunable settings for [`crate::domain::UserListService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    mode: FetchMode,
    page_size: u32,
    search_debounce: Duration,
    age_debounce: Duration,
    skeleton_warmup: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::default(),
            page_size: 10,
            search_debounce: Duration::from_millis(400),
            age_debounce: Duration::from_millis(500),
            skeleton_warmup: Duration::ZERO,
        }
    }
}

impl ConsoleConfig {
    /// Configuration with the stock defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the deployment mode.
    #[must_use]
    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Records per page. Zero is coerced to one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Quiescence window for the search box.
    #[must_use]
    pub fn with_search_debounce(mut self, window: Duration) -> Self {
        self.search_debounce = window;
        self
    }

    /// Quiescence window for the age filter control.
    #[must_use]
    pub fn with_age_debounce(mut self, window: Duration) -> Self {
        self.age_debounce = window;
        self
    }

    /// Minimum time the initial skeleton stays visible. Purely cosmetic;
    /// defaults to zero.
    #[must_use]
    pub fn with_skeleton_warmup(mut self, warmup: Duration) -> Self {
        self.skeleton_warmup = warmup;
        self
    }

    /// The configured deployment mode.
    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// The configured page size.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The configured search quiescence window.
    pub fn search_debounce(&self) -> Duration {
        self.search_debounce
    }

    /// The configured age-filter quiescence window.
    pub fn age_debounce(&self) -> Duration {
        self.age_debounce
    }

    /// The configured skeleton warm-up period.
    pub fn skeleton_warmup(&self) -> Duration {
        self.skeleton_warmup
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[test]
    fn defaults_match_the_shipped_console() {
        let config = ConsoleConfig::default();
        assert_eq!(config.mode(), FetchMode::LocalCache);
        assert_eq!(config.page_size(), 10);
        assert_eq!(config.search_debounce(), Duration::from_millis(400));
        assert_eq!(config.age_debounce(), Duration::from_millis(500));
        assert_eq!(config.skeleton_warmup(), Duration::ZERO);
    }

    #[test]
    fn zero_page_size_is_coerced_to_one() {
        let config = ConsoleConfig::new().with_page_size(0);
        assert_eq!(config.page_size(), 1);
    }

    #[test]
    fn builder_overrides_apply() {
        let config = ConsoleConfig::new()
            .with_mode(FetchMode::BackendSearch)
            .with_page_size(25)
            .with_search_debounce(Duration::from_millis(150))
            .with_age_debounce(Duration::from_millis(200))
            .with_skeleton_warmup(Duration::from_millis(1500));
        assert_eq!(config.mode(), FetchMode::BackendSearch);
        assert_eq!(config.page_size(), 25);
        assert_eq!(config.search_debounce(), Duration::from_millis(150));
        assert_eq!(config.age_debounce(), Duration::from_millis(200));
        assert_eq!(config.skeleton_warmup(), Duration::from_millis(1500));
    }
}
