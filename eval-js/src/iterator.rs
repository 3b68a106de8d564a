use crate::intrinsics::{StringIntrinsic, SymbolIntrinsic};
use crate::{Completion, ExecutionContext, Value, VmError};

/// ECMAScript Iterator Record.
#[derive(Debug, Clone, Copy)]
pub struct IteratorRecord {
  pub iterator: Value,
  pub next_method: Value,
  pub done: bool,
}

impl ExecutionContext<'_, '_> {
  /// GetIterator(obj, sync).
  pub fn get_iterator(&mut self, iterable: Value) -> Result<IteratorRecord, VmError> {
    let iterator_key = self.intrinsics().symbol_key(SymbolIntrinsic::Iterator)?;
    let Some(method) = self.get_method(iterable, &iterator_key)? else {
      let what = self.type_of(iterable)?;
      return Err(self.throw_type_error(&format!("{what} is not iterable")));
    };
    self.get_iterator_from_method(iterable, method)
  }

  pub fn get_iterator_from_method(
    &mut self,
    iterable: Value,
    method: Value,
  ) -> Result<IteratorRecord, VmError> {
    let iterator = self.call(method, iterable, &[])?;
    if !matches!(iterator, Value::Object(_)) {
      return Err(self.throw_type_error("Result of the Symbol.iterator method is not an object"));
    }
    let next_key = self.key(StringIntrinsic::Next)?;
    let next_method = self.get_v(iterator, &next_key)?;
    Ok(IteratorRecord {
      iterator,
      next_method,
      done: false,
    })
  }

  /// IteratorStepValue: `None` once the iterator reports `done`. Any error marks the record done,
  /// so callers never close an iterator that already failed.
  pub fn iterator_step_value(&mut self, record: &mut IteratorRecord) -> Result<Option<Value>, VmError> {
    let result = self.iterator_step_value_inner(record);
    if !matches!(result, Ok(Some(_))) {
      record.done = true;
    }
    result
  }

  fn iterator_step_value_inner(&mut self, record: &IteratorRecord) -> Result<Option<Value>, VmError> {
    let result = self.call(record.next_method, record.iterator, &[])?;
    let Value::Object(result) = result else {
      return Err(self.throw_type_error("Iterator result is not an object"));
    };
    let done_key = self.key(StringIntrinsic::Done)?;
    let done = self.get(result, &done_key)?;
    if self.to_boolean(done)? {
      return Ok(None);
    }
    let value_key = self.key(StringIntrinsic::Value)?;
    Ok(Some(self.get(result, &value_key)?))
  }

  /// IteratorClose for a normal completion: calls `return` if present and checks its result.
  pub fn iterator_close(&mut self, record: &IteratorRecord) -> Result<(), VmError> {
    let return_key = self.key(StringIntrinsic::Return)?;
    let Some(method) = self.get_method(record.iterator, &return_key)? else {
      return Ok(());
    };
    let result = self.call(method, record.iterator, &[])?;
    if !matches!(result, Value::Object(_)) {
      return Err(self.throw_type_error("Iterator result is not an object"));
    }
    Ok(())
  }

  /// IteratorClose for a throw completion: whatever `return` throws is discarded in favour of the
  /// original exception. Engine errors still propagate.
  pub fn iterator_close_after_throw(&mut self, record: &IteratorRecord) -> Result<(), VmError> {
    match self.iterator_close(record) {
      Ok(()) | Err(VmError::Throw(_)) => Ok(()),
      Err(err) => Err(err),
    }
  }

  /// IteratorClose(iteratorRecord, completion) for statement completions.
  pub(crate) fn iterator_close_completion(
    &mut self,
    record: &IteratorRecord,
    completion: Completion,
  ) -> Result<Completion, VmError> {
    if let Completion::Throw(_) = completion {
      self.iterator_close_after_throw(record)?;
      return Ok(completion);
    }
    match self.iterator_close(record) {
      Ok(()) => Ok(completion),
      Err(VmError::Throw(thrown)) => Ok(Completion::Throw(thrown)),
      Err(err) => Err(err),
    }
  }

  /// IteratorToList(GetIterator(iterable)).
  pub fn iterable_to_list(&mut self, iterable: Value) -> Result<Vec<Value>, VmError> {
    let mut record = self.get_iterator(iterable)?;
    let mut values = Vec::new();
    while let Some(value) = self.iterator_step_value(&mut record)? {
      values.push(value);
    }
    Ok(values)
  }
}
