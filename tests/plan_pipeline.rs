//! Reply-to-plan pipeline through the public API, without a model or server.

use tidy::plan::{self, PlanViolation, PlannedOperation};

const REPLY: &str = r#"Here is what I suggest.

PLAN:
1. call tool 'create_directory' with args { 'path': 'Images' }
2. call tool 'create_directory' with args { 'path': 'Documents' }
3. call tool 'move_file' with args { 'source': 'beach.png', 'destination': 'Images/beach.png' }
4. call tool 'move_file' with args { 'source': 'tax-2023.pdf', 'destination': 'Documents/tax-2023.pdf' }

Let me know if you want a different grouping."#;

#[test]
fn well_formed_reply_becomes_an_executable_plan() {
    let plan = plan::extract(REPLY);

    assert_eq!(plan.counts(), (2, 2));
    assert_eq!(
        plan.operations()[2],
        PlannedOperation::move_entry("beach.png", "Images/beach.png")
    );
    assert!(plan::validate(&plan).is_ok());
    assert_eq!(
        plan.render_lines()[0],
        "1. create_directory('Images')"
    );
}

#[test]
fn unsafe_reply_is_refused_before_execution() {
    let plan = plan::extract(
        "move_file('/etc/passwd', 'stolen')\n\
         move_file('Photos', 'Photos/Old/Photos')\n\
         create_directory('../outside')",
    );
    assert_eq!(plan.len(), 3);

    let violations = plan::validate(&plan).unwrap_err();
    assert!(violations
        .iter()
        .any(|v| matches!(v, PlanViolation::AbsolutePath { index: 1, .. })));
    assert!(violations
        .iter()
        .any(|v| matches!(v, PlanViolation::MoveIntoItself { index: 2, .. })));
    assert!(violations
        .iter()
        .any(|v| matches!(v, PlanViolation::EscapesTarget { index: 3, .. })));
}

#[test]
fn chatter_without_operations_yields_an_empty_plan() {
    let plan = plan::extract("The directory already looks organized. Nothing to do.");
    assert!(plan.is_empty());
    assert!(plan::validate(&plan).is_ok());
}
