use super::*;
use std::collections::HashSet;

#[test]
fn codes_are_unique() {
    let strs: HashSet<&str> = ErrorCode::ALL.iter().map(ErrorCode::as_str).collect();
    assert_eq!(strs.len(), ErrorCode::ALL.len());
}

#[test]
fn parse_roundtrips_every_code() {
    for code in ErrorCode::ALL {
        assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(*code));
    }
    assert_eq!("e3003".parse::<ErrorCode>(), Ok(ErrorCode::E3003));
    assert!("E0000".parse::<ErrorCode>().is_err());
}

#[test]
fn every_code_belongs_to_one_component() {
    for code in ErrorCode::ALL {
        let groups = [
            code.is_type_error(),
            code.is_dispatch_error(),
            code.is_scope_error(),
            code.is_value_error(),
            code.is_user_error(),
            code.is_internal_error(),
        ];
        assert_eq!(groups.iter().filter(|g| **g).count(), 1, "{code}");
        assert!(!code.description().is_empty());
    }
}
