use std::time::Duration;

use polyedge::adapter::outbound::solver::BranchBoundSolver;
use polyedge::application::decision::DecisionRule;
use polyedge::application::solver::{initialize, FrankWolfe, FrankWolfeConfig};
use polyedge::domain::market_state::MarketState;
use polyedge::domain::model::ConstraintModel;
use polyedge::domain::outcome::PartialOutcome;
use polyedge::domain::vertex::Vertex;

fn solver() -> BranchBoundSolver {
    BranchBoundSolver::with_timeout(Duration::from_secs(5))
}

/// Two binary markets (YES at 0 and 2) with "market 0 implies market 2".
fn implication_model() -> ConstraintModel {
    let mut model = ConstraintModel::new(4);
    model.add_exactly_one(&[0, 1]).unwrap();
    model.add_exactly_one(&[2, 3]).unwrap();
    model.add_implication(0, 2).unwrap();
    model
}

#[test]
fn init_finds_every_feasible_outcome_of_implication() {
    let model = implication_model();

    let init = initialize(&solver(), &model, &PartialOutcome::new()).unwrap();

    assert!(!init.timed_out);
    assert_eq!(init.vertex_count(), 3);
    assert!(!init
        .vertices
        .contains(&Vertex::from_bits(vec![1, 0, 0, 1])));
    assert!(init.partial_outcome.is_empty());
    for vertex in init.vertices.iter() {
        assert!(model.is_satisfied_by(&vertex.to_point()));
    }
}

#[test]
fn settling_the_premise_forces_the_conclusion() {
    let model = implication_model();
    let mut settled = PartialOutcome::new();
    settled.settle(0, true).unwrap();

    let init = initialize(&solver(), &model, &settled).unwrap();

    assert_eq!(init.partial_outcome.get(2), Some(true));
    assert_eq!(init.partial_outcome.get(3), Some(false));
    assert_eq!(init.vertex_count(), 1);
    assert!(init.unsettled_indices.is_empty());
}

#[test]
fn consistent_prices_sit_on_the_polytope() {
    let model = implication_model();
    let init = initialize(&solver(), &model, &PartialOutcome::new()).unwrap();
    let state = MarketState::from_prices(&[0.3, 0.7, 0.7, 0.3], 100.0).with_mass(2.0);

    let result = FrankWolfe::default().optimize(&state, &model, &init, &solver());
    let decision = DecisionRule::default().should_trade(result.divergence, result.gap, 0.02);

    assert!(result.divergence < 0.01, "{result:?}");
    assert!(!decision.should_trade);
}

#[test]
fn pipeline_approves_violated_implication() {
    let model = implication_model();
    let init = initialize(&solver(), &model, &PartialOutcome::new()).unwrap();
    // P(a) = 0.7 while P(b) = 0.2, although a implies b.
    let state = MarketState::from_prices(&[0.7, 0.3, 0.2, 0.8], 100.0).with_mass(2.0);

    let config = FrankWolfeConfig {
        alpha: 0.5,
        ..FrankWolfeConfig::default()
    };
    let result = FrankWolfe::new(config).optimize(&state, &model, &init, &solver());

    let rule = DecisionRule {
        alpha: 0.5,
        ..DecisionRule::default()
    };
    let decision = rule.should_trade(result.divergence, result.gap, 0.02);

    assert!(result.divergence > 0.2, "{result:?}");
    assert!(decision.should_trade, "{}", decision.reason);
    assert!(decision.guaranteed_profit > 0.1);
}
