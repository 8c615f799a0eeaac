/// Screens reachable by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Upload,
    Results,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Upload => "/upload",
            Route::Results => "/results",
        }
    }

    /// Resolves a path to a screen, following the root redirect.
    pub fn resolve(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        match normalized {
            "/" => Self::resolve(Route::Upload.path()),
            "/upload" => Some(Route::Upload),
            "/results" => Some(Route::Results),
            _ => None,
        }
    }
}
