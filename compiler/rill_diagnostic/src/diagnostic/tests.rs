use super::*;
use pretty_assertions::assert_eq;

#[test]
fn renders_code_position_and_message() {
    let diag = Diagnostic::error(ErrorCode::E3002)
        .with_message("Attempt to rebind var: x")
        .with_pos(Some(Pos::new(3, 7)));
    assert_eq!(diag.to_string(), "error[E3002] at 3:7: Attempt to rebind var: x");
}

#[test]
fn renders_without_position() {
    let diag = Diagnostic::error(ErrorCode::E3003).with_message("No open scopes");
    assert_eq!(diag.to_string(), "error[E3003]: No open scopes");
}

#[test]
fn notes_follow_on_their_own_lines() {
    let diag = Diagnostic::error(ErrorCode::E2002)
        .with_message("Func not applicable: f")
        .with_note("candidates: f(Int Int)")
        .with_note("ambiguous");
    assert_eq!(
        diag.to_string(),
        "error[E2002]: Func not applicable: f\n  note: candidates: f(Int Int)\n  note: ambiguous"
    );
}

#[test]
fn warnings_are_not_errors() {
    let diag = Diagnostic::warning(ErrorCode::E9002);
    assert!(!diag.is_error());
    assert!(Diagnostic::error(ErrorCode::E9002).is_error());
}
