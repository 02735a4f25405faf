//! Per-operation accounting: how many nodes an edit allocated and how long it
//! took. The counters are thread local; the engine itself is single threaded.

use std::cell::Cell;
use std::time::Instant;

thread_local! {
    static ALLOC_COUNT: Cell<u64> = const { Cell::new(0) };
    static OP_START: Cell<Option<Instant>> = const { Cell::new(None) };
}

pub(crate) fn count_alloc() {
    ALLOC_COUNT.with(|count| count.set(count.get() + 1));
}

/// Resets the allocation counter and starts timing an operation.
pub fn begin_operation() {
    ALLOC_COUNT.with(|count| count.set(0));
    OP_START.with(|start| start.set(Some(Instant::now())));
}

/// Logs how long the operation took and how many cubes it created since
/// `begin_operation`, and returns the allocation count.
pub fn end_operation(name: &str) -> u64 {
    let count = ALLOC_COUNT.with(|count| count.get());
    let elapsed = OP_START.with(|start| start.take());
    match elapsed {
        Some(start) => log::debug!(
            "{} took {}ms and created {} cubes",
            name,
            start.elapsed().as_millis(),
            count
        ),
        None => log::debug!("{} created {} cubes", name, count),
    }
    count
}
