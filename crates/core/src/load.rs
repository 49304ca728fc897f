//! Load state of data a view depends on

/// Progress of a value that is fetched or computed on demand.
///
/// Failures keep only the rendered message so the state stays cheap to clone
/// into views.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    NotLoaded,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => LoadState::Loaded(value),
            Err(e) => LoadState::Failed(e.to_string()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> LoadState<U> {
        match self {
            LoadState::NotLoaded => LoadState::NotLoaded,
            LoadState::Loading => LoadState::Loading,
            LoadState::Loaded(value) => LoadState::Loaded(f(value)),
            LoadState::Failed(message) => LoadState::Failed(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_from_result() {
        let ok: LoadState<u32> = LoadState::from_result(Ok::<_, Error>(3));
        assert_eq!(ok.loaded(), Some(&3));
        assert!(ok.error().is_none());

        let failed: LoadState<u32> =
            LoadState::from_result(Err(Error::NotFound("player 9".to_string())));
        assert!(!failed.is_loaded());
        assert_eq!(failed.error(), Some("Resource not found: player 9"));
    }

    #[test]
    fn test_map_keeps_state() {
        assert_eq!(LoadState::<u32>::NotLoaded.map(|v| v * 2), LoadState::NotLoaded);
        assert_eq!(LoadState::Loaded(2).map(|v| v * 2), LoadState::Loaded(4));
        assert_eq!(
            LoadState::<u32>::Failed("boom".into()).map(|v| v * 2),
            LoadState::Failed("boom".into())
        );
    }
}
