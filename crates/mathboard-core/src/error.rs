use thiserror::Error;

/// Failure inside one stage of a normalization pipeline.
///
/// Stage errors never reach the step consumer: the pipeline records them as a
/// diagnostic and falls back according to the configured policy.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{stage}: placeholder for {original:?} was lost during rewriting")]
    DroppedPlaceholder {
        stage: &'static str,
        original: String,
    },
    #[error("{stage}: placeholder text survived restoration")]
    LeakedPlaceholder { stage: &'static str },
    #[error("{stage}: {message}")]
    Rewrite {
        stage: &'static str,
        message: String,
    },
}
