use chrono::NaiveDate;
use school_calendar::{
    LessonPlan, LessonPlanError,
    lesson_plan::{DidacticSequence, Evaluation, EvaluationInstrument, Topic, validate_lesson_plan},
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn plan() -> LessonPlan {
    LessonPlan {
        id: "plano-1".into(),
        discipline: "Ciências".into(),
        team: "7B".into(),
        period_start: d(2025, 2, 3),
        period_end: d(2025, 4, 23),
        objectives: vec!["Compreender o ciclo da água".into()],
        topics: vec![
            Topic {
                title: "Estados físicos".into(),
                description: None,
                workload_hours: 4.0,
            },
            Topic {
                title: "Ciclo hidrológico".into(),
                description: Some("Evaporação e condensação".into()),
                workload_hours: 6.5,
            },
        ],
        didactic_sequences: vec![DidacticSequence {
            title: "Experimento".into(),
            start_date: d(2025, 3, 10),
            end_date: d(2025, 3, 14),
            steps: vec!["Montagem".into(), "Observação".into()],
            resources: vec!["Béquer".into()],
        }],
        evaluation: Evaluation {
            instruments: vec![
                EvaluationInstrument {
                    name: "Prova".into(),
                    weight: Some(60.0),
                },
                EvaluationInstrument {
                    name: "Relatório".into(),
                    weight: Some(40.0),
                },
            ],
            criteria: vec!["Participação".into()],
        },
    }
}

#[test]
fn complete_plan_is_valid() {
    let plan = plan();
    assert!(validate_lesson_plan(&plan).is_ok());
    assert_eq!(plan.total_workload_hours(), 10.5);
}

#[test]
fn required_fields_are_checked() {
    let mut missing_discipline = plan();
    missing_discipline.discipline = " ".into();
    assert_eq!(
        validate_lesson_plan(&missing_discipline),
        Err(LessonPlanError::MissingField("discipline"))
    );

    let mut no_objectives = plan();
    no_objectives.objectives = vec!["".into()];
    assert_eq!(validate_lesson_plan(&no_objectives), Err(LessonPlanError::NoObjectives));

    let mut inverted = plan();
    inverted.period_end = d(2025, 1, 1);
    assert_eq!(validate_lesson_plan(&inverted), Err(LessonPlanError::PeriodDates));
}

#[test]
fn topic_workload_must_be_positive() {
    let mut plan = plan();
    plan.topics[1].workload_hours = 0.0;
    assert_eq!(
        validate_lesson_plan(&plan),
        Err(LessonPlanError::InvalidWorkload {
            topic: "Ciclo hidrológico".into()
        })
    );
}

#[test]
fn sequences_must_fit_the_plan_period() {
    let mut outside = plan();
    outside.didactic_sequences[0].end_date = d(2025, 5, 2);
    assert!(matches!(
        validate_lesson_plan(&outside),
        Err(LessonPlanError::SequenceOutsidePeriod { .. })
    ));

    let mut inverted = plan();
    inverted.didactic_sequences[0].start_date = d(2025, 3, 20);
    assert!(matches!(
        validate_lesson_plan(&inverted),
        Err(LessonPlanError::SequenceDates { .. })
    ));
}

#[test]
fn evaluation_weights_sum_to_one_hundred() {
    let mut plan = plan();
    plan.evaluation.instruments[1].weight = Some(30.0);
    assert_eq!(
        validate_lesson_plan(&plan),
        Err(LessonPlanError::WeightsDoNotSum { total: 90.0 })
    );

    for instrument in &mut plan.evaluation.instruments {
        instrument.weight = None;
    }
    assert!(validate_lesson_plan(&plan).is_ok());
}

#[test]
fn plan_json_uses_camel_case() {
    let json = serde_json::to_value(plan()).unwrap();
    assert_eq!(json["periodStart"], "2025-02-03");
    assert_eq!(json["didacticSequences"][0]["startDate"], "2025-03-10");
    let back: LessonPlan = serde_json::from_value(json).unwrap();
    assert_eq!(back, plan());
}
