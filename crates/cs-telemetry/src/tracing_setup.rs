use uuid::Uuid;

/// Generate a run id (32 hex characters) for correlating one invocation's logs.
pub fn generate_run_id() -> String {
    Uuid::new_v4().as_simple().to_string()
}

/// Span wrapping a whole sync invocation. Returns the span and its run id.
pub fn sync_span(event_name: &str, repository: &str) -> (tracing::Span, String) {
    let run_id = generate_run_id();
    let span = tracing::info_span!(
        "sync",
        run_id = %run_id,
        event = %event_name,
        repository = %repository,
    );
    (span, run_id)
}
