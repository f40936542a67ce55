//! Stack growth for the recursive parts of pytex.
//!
//! The parser descends once per nesting level of an expression and the
//! evaluator once per nested call or sub-expression. Code embedded in a
//! document is untrusted in shape if not in intent, so both wrap their
//! recursive entry points in [`ensure_sufficient_stack`].
//!
//! Call depth of user functions is limited separately (`RecursionError`);
//! this only keeps the host stack from overflowing before that limit.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const GROWTH: usize = 2 * 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_results_through() {
        let result: Result<&str, u8> = ensure_sufficient_stack(|| Ok("done"));
        assert_eq!(result, Ok("done"));
    }

    #[test]
    fn nested_recursion_survives() {
        fn depth(n: u32) -> u32 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(200_000), 200_000);
    }
}
