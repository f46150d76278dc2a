//! Running independent sessions on scoped worker threads

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Default number of workers: one per available core
pub fn default_jobs() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Apply `f` to every item using up to `jobs` threads. Results come back
/// in input order. A panic in `f` fails only its own item, carrying the
/// panic message.
pub(crate) fn map_ordered<T, R, F>(items: &[T], jobs: usize, f: F) -> Vec<Result<R, String>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let run = |item: &T| {
        panic::catch_unwind(AssertUnwindSafe(|| f(item))).map_err(panic_message)
    };

    let workers = jobs.max(1).min(items.len());
    if workers <= 1 {
        return items.iter().map(run).collect();
    }

    let next = AtomicUsize::new(0);
    let mut results: Vec<(usize, Result<R, String>)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let run = &run;
                let next = &next;
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(item) = items.get(index) else {
                            break;
                        };
                        done.push((index, run(item)));
                    }
                    done
                })
            })
            .collect();

        // Workers catch every panic from `f`, so a join error can only come
        // from the bookkeeping above; its items are simply missing.
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap_or_default())
            .collect()
    });

    results.sort_by_key(|(index, _)| *index);
    let mut ordered = Vec::with_capacity(items.len());
    let mut results = results.into_iter().peekable();
    for index in 0..items.len() {
        match results.next_if(|(done, _)| *done == index) {
            Some((_, result)) => ordered.push(result),
            None => ordered.push(Err("worker thread stopped".to_string())),
        }
    }
    ordered
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
