#[test]
fn test_rejected_derive_inputs() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/ui/*.rs");
}
