//! Edit Session Tests
//!
//! The session is the only writer of a live record: calculated fields are
//! read-only, edits recalculate immediately and auto-fill only fills gaps.

use pumpcalc::keys::*;
use pumpcalc::{EditError, EditSession, EngineeringRecord, FieldValue};

fn shown(session: &EditSession, key: &str) -> String {
    session.record().get(key).map(FieldValue::display).unwrap_or_default()
}

#[test]
fn calculated_fields_cannot_be_edited() {
    let mut session = EditSession::open(EngineeringRecord::new());

    for field in [
        CV_RATIO,
        TOTAL_SUCTION_LOSSES,
        NPSHA,
        DIFFERENTIAL_HEAD,
        MAX_DISCHARGE_PRESSURE_OPTION_2,
    ] {
        match session.apply_edit(field, 1.0) {
            Err(EditError::CalculatedField { field: f, .. }) => assert_eq!(f, field),
            other => panic!("editing {field} should be rejected, got {other:?}"),
        }
    }
    assert!(session.record().is_empty());
}

#[test]
fn rejection_message_names_the_field() {
    let mut session = EditSession::open(EngineeringRecord::new());
    let err = session.apply_edit(NPSHA, 3.0).unwrap_err();
    assert!(err.to_string().contains(NPSHA));
}

#[test]
fn suction_form_walkthrough() {
    let mut session = EditSession::open(EngineeringRecord::new());
    session
        .apply_edits([
            (SOURCE_OP_PRESSURE, "5"),
            (SUCTION_EL_M, "2"),
            (INLINE_INST_LOSSES, "0.2"),
            (LINE_FRIC_LOSSES, "0.3"),
        ])
        .unwrap();

    assert_eq!(shown(&session, TOTAL_SUCTION_LOSSES), "0.50");
    assert_eq!(shown(&session, TOTAL_SUCTION_PRESSURE), "6.50");
    assert_eq!(shown(&session, SUCTION_PRESSURE_RESULT), "4.304");

    let outcome = session.apply_edit(DESTINATION_PRESSURE, "6").unwrap();
    assert!(outcome.updated.contains(&TOTAL_DISCHARGE_PRESSURE));
    assert_eq!(shown(&session, TOTAL_DISCHARGE_PRESSURE), "6.00");
    assert_eq!(shown(&session, DIFFERENTIAL_PRESSURE), "1.696");
    assert_eq!(shown(&session, DIFFERENTIAL_HEAD), "17.294");
    assert_eq!(session.edit_count(), 5);
}

#[test]
fn batch_stops_at_first_rejected_edit() {
    let mut session = EditSession::open(EngineeringRecord::new());
    let result = session.apply_edits([(CV_MAX, 80.0), (CV_RATIO, 2.0), (CV_MIN, 40.0)]);

    assert!(matches!(result, Err(EditError::CalculatedField { .. })));
    assert_eq!(shown(&session, CV_MAX), "80");
    assert!(session.record().get(CV_MIN).is_none());
}

#[test]
fn autofill_fills_gaps_and_recalculates() {
    let record = EngineeringRecord::new()
        .with(REVISION, "3")
        .with(HYDRAULIC_POWER, 45.0)
        .with(MOTOR_EFFICIENCY, "");
    let mut session = EditSession::open(record);

    let suggestions = EngineeringRecord::new()
        .with(REVISION, "0")
        .with(PUMP_EFFICIENCY, 75.0)
        .with(MOTOR_EFFICIENCY, 95.0)
        .with(POWER_CONSUMPTION, 99.0);
    let filled = session.apply_autofill(suggestions);

    assert_eq!(filled, vec![MOTOR_EFFICIENCY.to_string(), PUMP_EFFICIENCY.to_string()]);
    assert_eq!(shown(&session, REVISION), "3");
    assert_eq!(shown(&session, BREAK_HORSE_POWER), "60.00");
    assert_eq!(shown(&session, POWER_CONSUMPTION), "63.16");
}

#[test]
fn recalculate_all_on_loaded_record() {
    let record = EngineeringRecord::new()
        .with(CV_MAX, 90.0)
        .with(CV_MIN, 30.0)
        .with(CV_RATIO, "1.00");
    let mut session = EditSession::open(record);
    assert_eq!(shown(&session, CV_RATIO), "1.00");

    session.recalculate_all();
    assert_eq!(shown(&session, CV_RATIO), "3.00");
}

#[test]
fn dropping_session_cancels_its_token() {
    let session = EditSession::open(EngineeringRecord::new());
    let token = session.cancellation_token();
    let record = session.into_record();
    assert!(record.is_empty());
    assert!(token.is_cancelled());
}
