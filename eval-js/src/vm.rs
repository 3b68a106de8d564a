use crate::error::Termination;
use crate::error::TerminationReason;
use crate::error::VmError;
use crate::heap::HeapLimits;

/// Construction-time engine options.
#[derive(Debug, Clone)]
pub struct VmOptions {
  /// Maximum nesting of function calls before execution terminates with
  /// [`TerminationReason::StackOverflow`].
  pub max_stack_depth: usize,
  /// Maximum syntactic nesting accepted when building a [`Script`](crate::Script) node tree.
  pub max_syntax_depth: usize,
  /// Ticks available to each top-level evaluation; `None` is unlimited.
  pub default_fuel: Option<u64>,
  /// Memory limit of the realm's heap.
  pub heap_limits: HeapLimits,
}

impl Default for VmOptions {
  fn default() -> Self {
    Self {
      max_stack_depth: 256,
      max_syntax_depth: 512,
      default_fuel: None,
      heap_limits: HeapLimits::default(),
    }
  }
}

/// Per-realm execution state: call depth and the fuel budget.
#[derive(Debug)]
pub struct Vm {
  options: VmOptions,
  fuel: Option<u64>,
  ticks: u64,
  depth: usize,
}

impl Vm {
  pub fn new(options: VmOptions) -> Self {
    Self {
      fuel: options.default_fuel,
      options,
      ticks: 0,
      depth: 0,
    }
  }

  pub fn options(&self) -> &VmOptions {
    &self.options
  }

  /// Replaces the remaining fuel.
  pub fn set_fuel(&mut self, fuel: Option<u64>) {
    self.fuel = fuel;
  }

  /// Refills the fuel budget from the options; called before each top-level evaluation.
  pub(crate) fn reset_budget(&mut self) {
    self.fuel = self.options.default_fuel;
    self.depth = 0;
  }

  /// Total ticks consumed since construction.
  pub fn ticks(&self) -> u64 {
    self.ticks
  }

  pub fn depth(&self) -> usize {
    self.depth
  }

  pub fn push_frame(&mut self) -> Result<(), VmError> {
    if self.depth >= self.options.max_stack_depth {
      return Err(self.terminate(TerminationReason::StackOverflow));
    }
    self.depth += 1;
    Ok(())
  }

  pub fn pop_frame(&mut self) {
    debug_assert!(self.depth > 0, "unbalanced pop_frame");
    self.depth = self.depth.saturating_sub(1);
  }

  fn terminate(&self, reason: TerminationReason) -> VmError {
    VmError::Termination(Termination::new(reason, self.depth))
  }

  /// Consume one tick, failing once the fuel budget is exhausted.
  pub fn tick(&mut self) -> Result<(), VmError> {
    if let Some(fuel) = &mut self.fuel {
      if *fuel == 0 {
        return Err(self.terminate(TerminationReason::OutOfFuel));
      }
      *fuel -= 1;
    }
    self.ticks = self.ticks.wrapping_add(1);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::{Vm, VmOptions};
  use crate::{TerminationReason, VmError};

  #[test]
  fn fuel_exhaustion_triggers_out_of_fuel_after_exact_tick_count() {
    let mut vm = Vm::new(VmOptions {
      default_fuel: Some(3),
      ..VmOptions::default()
    });
    assert!(vm.tick().is_ok());
    assert!(vm.tick().is_ok());
    assert!(vm.tick().is_ok());
    match vm.tick().unwrap_err() {
      VmError::Termination(term) => assert_eq!(term.reason, TerminationReason::OutOfFuel),
      other => panic!("expected termination, got {other:?}"),
    }
  }

  #[test]
  fn stack_depth_is_bounded() {
    let mut vm = Vm::new(VmOptions {
      max_stack_depth: 2,
      ..VmOptions::default()
    });
    vm.push_frame().unwrap();
    vm.push_frame().unwrap();
    match vm.push_frame().unwrap_err() {
      VmError::Termination(term) => {
        assert_eq!(term.reason, TerminationReason::StackOverflow);
        assert_eq!(term.depth, 2);
      }
      other => panic!("expected termination, got {other:?}"),
    }
    vm.pop_frame();
    assert!(vm.push_frame().is_ok());
  }
}
