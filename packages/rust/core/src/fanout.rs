//! Bounded concurrent fan-out over independent per-item tasks.
//!
//! Every stage handler funnels its per-item work (one search term, one URL,
//! one record) through [`run_bounded`] rather than rolling its own semaphore.
//! Items are mutually independent, so results are merged back in input order
//! regardless of completion order.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use newsgraph_shared::{NewsGraphError, Result};

/// Run `task` for every item with at most `limit` in flight at once.
///
/// Returns one `(item, result)` pair per input item, in input order. A task
/// that panics yields an `Err` for its item; nothing is silently dropped.
pub async fn run_bounded<I, T, F, Fut>(
    limit: usize,
    items: Vec<I>,
    task: F,
) -> Vec<(I, Result<T>)>
where
    I: Clone + Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut handles = Vec::with_capacity(items.len());

    for item in items {
        let sem = semaphore.clone();
        // The future is lazy: work starts only after the permit is acquired
        // inside the spawned task.
        let fut = task(item.clone());
        handles.push((
            item,
            tokio::spawn(async move {
                let _permit = sem.acquire().await.expect("semaphore closed");
                fut.await
            }),
        ));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (item, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(NewsGraphError::Task(format!("task failed: {e}"))),
        };
        results.push((item, result));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn results_preserve_input_order() {
        let items: Vec<u64> = (0..10).collect();

        // Later items finish first; order must still match the input.
        let results = run_bounded(10, items.clone(), |n| async move {
            tokio::time::sleep(Duration::from_millis(50 - n * 5)).await;
            Ok(n * 2)
        })
        .await;

        let inputs: Vec<u64> = results.iter().map(|(i, _)| *i).collect();
        assert_eq!(inputs, items);
        for (i, r) in &results {
            assert_eq!(*r.as_ref().unwrap(), i * 2);
        }
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_limit() {
        let current = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let items: Vec<usize> = (0..20).collect();
        let (current_c, max_c) = (current.clone(), max_seen.clone());

        run_bounded(3, items, move |_| {
            let current = current_c.clone();
            let max_seen = max_c.clone();
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

        assert!(max_seen.load(Ordering::SeqCst) <= 3);
        assert_eq!(current.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_failing_item_does_not_affect_others() {
        let items = vec!["a", "b", "c"];

        let results = run_bounded(2, items, |item| async move {
            if item == "b" {
                Err(NewsGraphError::Scrape("b is broken".into()))
            } else {
                Ok(item.to_uppercase())
            }
        })
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].1.as_ref().unwrap(), "A");
        assert!(results[1].1.is_err());
        assert_eq!(results[2].1.as_ref().unwrap(), "C");
    }

    #[tokio::test]
    async fn zero_limit_is_clamped_to_one() {
        let results = run_bounded(0, vec![1, 2], |n| async move { Ok(n) }).await;
        assert_eq!(results.len(), 2);
    }
}
