use emocause::{
    data::seeds::SeedDictionary,
    nlp::{
        bootstrap::{BootstrapConfig, Bootstrapper, Relation, SeedPool, SeedStatus},
        context::ContextVectors,
        rules::RuleKind,
        similarity::SimilarityWeights,
    },
};
use ndarray::{arr1, Array1};

fn unit() -> Array1<f64> {
    arr1(&[1.0, 0.0])
}

/// A relation whose `between` context sits at `angle` radians from the x-axis
/// and whose emotion vector sits at `emotion_angle`.
fn relation(emotion: &str, cause: &str, angle: f64, emotion_angle: f64) -> Relation {
    Relation {
        sentence_id: 0,
        sentence_text: format!("{emotion} {cause}"),
        emotion_span: vec![1],
        cause_span: vec![2],
        emotion_text: emotion.into(),
        cause_text: cause.into(),
        emotion_surface: emotion.into(),
        cause_surface: cause.into(),
        rule: RuleKind::VerbDirectObject,
        vectors: ContextVectors {
            before: unit(),
            between: arr1(&[angle.cos(), angle.sin()]),
            after: unit(),
            emotion: arr1(&[emotion_angle.cos(), emotion_angle.sin()]),
            cause: unit(),
        },
        status: SeedStatus::Unevaluated,
    }
}

fn between_only(tau: f64) -> BootstrapConfig {
    BootstrapConfig {
        tau,
        neg_tau: 0.9,
        cycles: 10,
        positive: SimilarityWeights::new(0.0, 1.0, 0.0, 0.0, 0.0),
        negative: SimilarityWeights::new(0.0, 0.0, 0.0, 0.0, 1.0),
        workers: 0,
    }
}

fn dictionary(pairs: &[(&str, &str)]) -> SeedDictionary {
    let mut dict = SeedDictionary::new();
    for (emotion, cause) in pairs {
        dict.insert(emotion, cause);
    }
    dict
}

#[test]
fn candidate_above_tau_is_accepted_at_cycle_one() {
    let relations = vec![
        relation("love", "pizza", 0.0, 0.0),
        relation("hate", "rain", 0.92_f64.acos(), 0.0),
    ];
    let mut engine = Bootstrapper::new(between_only(0.85), relations).unwrap();
    engine.pre_seed(&dictionary(&[("love", "pizza")]), &SeedDictionary::new());
    assert_eq!(
        engine.relations()[0].status,
        SeedStatus::Accepted {
            confidence: 1.0,
            cycle: 0
        }
    );

    let report = engine.run_cycle();
    assert_eq!(report.cycle, 1);
    assert_eq!(report.accepted, 1);
    match engine.relations()[1].status {
        SeedStatus::Accepted { confidence, cycle } => {
            assert!((confidence - 0.92).abs() < 1e-9);
            assert_eq!(cycle, 1);
        }
        other => panic!("expected acceptance, got {other:?}"),
    }
    assert_eq!(engine.pool().accepted.len(), 2);
}

#[test]
fn rejected_seed_vetoes_acceptance() {
    let relations = vec![
        relation("love", "pizza", 0.0, 0.0),
        relation("love", "it", 0.0, std::f64::consts::FRAC_PI_2),
        // Identical context to the accepted seed, emotion close to the rejected one.
        relation("adore", "you", 0.0, std::f64::consts::FRAC_PI_2 - 0.95_f64.acos()),
    ];
    let mut engine = Bootstrapper::new(between_only(0.85), relations).unwrap();
    let report = engine.pre_seed(
        &dictionary(&[("love", "pizza")]),
        &dictionary(&[("love", "it")]),
    );
    assert_eq!((report.accepted, report.rejected), (1, 1));

    engine.run_cycle();
    assert_eq!(
        engine.relations()[2].status,
        SeedStatus::Rejected {
            confidence: 0.0,
            cycle: 1
        }
    );
    assert_eq!(engine.pool().rejected.len(), 2);
}

#[test]
fn score_equal_to_tau_is_not_accepted() {
    let relations = vec![
        relation("love", "pizza", 0.0, 0.0),
        relation("love", "pasta", 0.0, 0.0),
    ];
    let mut engine = Bootstrapper::new(between_only(1.0), relations).unwrap();
    engine.pre_seed(&dictionary(&[("love", "pizza")]), &SeedDictionary::new());
    let summary = engine.run();
    assert!(engine.relations()[1].status.is_unevaluated());
    assert_eq!(summary.undetermined, 1);
    assert_eq!(summary.cycles.len(), 1);
}

#[test]
fn score_just_above_tau_is_accepted() {
    let relations = vec![
        relation("love", "pizza", 0.0, 0.0),
        relation("love", "pasta", 0.0, 0.0),
    ];
    let mut engine = Bootstrapper::new(between_only(1.0 - 1e-12), relations).unwrap();
    engine.pre_seed(&dictionary(&[("love", "pizza")]), &SeedDictionary::new());
    let summary = engine.run();
    assert_eq!(
        engine.relations()[1].status,
        SeedStatus::Accepted {
            confidence: 1.0,
            cycle: 1
        }
    );
    assert_eq!(summary.accepted, 2);
}

#[test]
fn negative_match_wins_and_pre_seeding_is_idempotent() {
    let relations = vec![relation("love", "it", 0.0, 0.0)];
    let mut engine = Bootstrapper::new(between_only(0.8), relations).unwrap();
    let positive = dictionary(&[("love", "it")]);
    let negative = dictionary(&[("love", "it")]);

    let first = engine.pre_seed(&positive, &negative);
    assert_eq!((first.accepted, first.rejected), (0, 1));
    let second = engine.pre_seed(&positive, &negative);
    assert_eq!((second.accepted, second.rejected), (0, 0));
    assert_eq!(engine.pool().len(), 1);
}

#[test]
fn decisions_are_monotone_and_propagate_by_cycle() {
    // A chain at 0.3 rad steps: each link is only reachable from the previous one.
    let mut relations = vec![relation("love", "pizza", 0.0, 0.0)];
    for step in 1..=4 {
        relations.push(relation("like", &format!("thing{step}"), 0.3 * step as f64, 0.0));
    }
    let mut engine = Bootstrapper::new(between_only(0.95), relations).unwrap();
    engine.pre_seed(&dictionary(&[("love", "pizza")]), &SeedDictionary::new());

    let mut pool_sizes = vec![engine.pool().len()];
    let mut cycles_run = Vec::new();
    loop {
        let report = engine.run_cycle();
        pool_sizes.push(engine.pool().len());
        cycles_run.push(report);
        if report.is_fixed_point() {
            break;
        }
    }
    assert!(pool_sizes.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(pool_sizes, vec![1, 2, 3, 4, 5, 5]);

    let cycles: Vec<usize> = engine
        .relations()
        .iter()
        .filter_map(|r| r.status.cycle())
        .collect();
    assert_eq!(cycles, vec![0, 1, 2, 3, 4]);
    assert_eq!(cycles_run.len(), 5);

    let ranked = engine.ranked();
    assert_eq!(ranked[0].cause_text, "pizza");
    assert!(ranked
        .windows(2)
        .all(|w| w[0].status.confidence() >= w[1].status.confidence()));
}

#[test]
fn frozen_pool_runs_one_cycle_numbered_zero() {
    let mut seed = relation("love", "pizza", 0.0, 0.0);
    seed.status = SeedStatus::Accepted {
        confidence: 1.0,
        cycle: 0,
    };
    let pool = SeedPool {
        accepted: vec![seed],
        rejected: Vec::new(),
    };
    let relations = vec![
        relation("like", "pasta", 0.1, 0.0),
        relation("like", "bread", 0.2, 0.0),
    ];
    let mut engine = Bootstrapper::with_frozen_pool(between_only(0.9), relations, pool).unwrap();
    let summary = engine.run();

    assert_eq!(summary.cycles.len(), 1);
    assert_eq!(summary.cycles[0].cycle, 0);
    assert_eq!(summary.accepted, 2);
    assert_eq!(engine.pool().len(), 1);
    assert!(engine
        .relations()
        .iter()
        .all(|r| r.status.cycle() == Some(0)));
}

#[test]
fn worker_count_does_not_change_results() {
    let build = || {
        let mut relations = vec![
            relation("love", "pizza", 0.0, 0.0),
            relation("hate", "it", 1.5, 1.5),
        ];
        for i in 0..40 {
            let angle = (i as f64 * 0.137) % 1.6;
            relations.push(relation("feel", &format!("c{i}"), angle, angle));
        }
        relations
    };
    let run = |workers: usize| {
        let mut config = between_only(0.97);
        config.workers = workers;
        let mut engine = Bootstrapper::new(config, build()).unwrap();
        engine.pre_seed(
            &dictionary(&[("love", "pizza")]),
            &dictionary(&[("hate", "it")]),
        );
        engine.run();
        engine
            .relations()
            .iter()
            .map(|r| r.status)
            .collect::<Vec<_>>()
    };

    let single = run(1);
    assert_eq!(single, run(4));
    assert_eq!(single, run(0));
}
