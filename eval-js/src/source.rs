use crate::VmError;
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Parses `source` as a sloppy-mode classic script into `allocator`.
///
/// Every parser diagnostic is reported; a program with diagnostics is never returned, even when
/// the parser recovered.
pub fn parse_script<'a>(allocator: &'a Allocator, source: &'a str) -> Result<&'a Program<'a>, VmError> {
  let _span = tracing::trace_span!("eval_js.parse", len = source.len()).entered();
  let source_type = SourceType::default().with_script(true);
  let ret = Parser::new(allocator, source, source_type).parse();
  if ret.panicked || !ret.errors.is_empty() {
    let messages: Vec<String> = ret.errors.iter().map(|err| err.to_string()).collect();
    tracing::debug!(errors = messages.len(), "parse failed");
    return Err(VmError::Syntax(messages));
  }
  Ok(allocator.alloc(ret.program))
}

#[cfg(test)]
mod tests {
  use super::parse_script;
  use crate::VmError;
  use oxc_allocator::Allocator;

  #[test]
  fn parses_statements() {
    let allocator = Allocator::default();
    let program = parse_script(&allocator, "var a = 1; a;").unwrap();
    assert_eq!(program.body.len(), 2);
  }

  #[test]
  fn reports_diagnostics() {
    let allocator = Allocator::default();
    match parse_script(&allocator, "let = ;") {
      Err(VmError::Syntax(messages)) => assert!(!messages.is_empty()),
      other => panic!("expected syntax error, got {other:?}"),
    }
  }
}
