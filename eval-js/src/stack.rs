//! Native stack headroom for the recursive evaluators.
//!
//! The node builder, statement and expression evaluation, pattern binding and calls all recurse
//! along the syntax tree. Each of those entry points runs through [`ensure_sufficient_stack`], so
//! nesting within [`VmOptions`](crate::VmOptions) limits reaches the engine's own
//! [`NestingTooDeep`](crate::VmError::NestingTooDeep) and stack-overflow terminations instead of
//! exhausting the host thread's stack.

/// Remaining stack below which a fresh segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated segment.
const STACK_PER_SEGMENT: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
  stacker::maybe_grow(RED_ZONE, STACK_PER_SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
  f()
}

#[cfg(test)]
mod tests {
  use super::ensure_sufficient_stack;

  #[test]
  fn deep_recursion_grows_the_stack() {
    fn depth(n: u64) -> u64 {
      ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
    }

    let handle = std::thread::Builder::new()
      .stack_size(256 * 1024)
      .spawn(|| depth(50_000))
      .unwrap();
    assert_eq!(handle.join().unwrap(), 50_000);
  }
}
