use std::future::Future;

/// Runs the future in the background on the current tokio runtime.
///
/// # Panics
///
/// Panics if called outside of a tokio runtime context.
pub fn spawn<T>(future: T)
where
    T: Future + Send + 'static,
    T::Output: Send + 'static,
{
    tokio::spawn(future);
}
