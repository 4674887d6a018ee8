//! Property tests for the incremental evaluation contract.

use kestrel_core::Position;
use kestrel_engine::{EvalState, Evaluator, GameStage, Material, Pst};
use proptest::prelude::*;

fn walk(choices: &[u8]) -> Position {
    let mut position = Position::starting_position();
    for &choice in choices {
        let moves = position.legal_moves();
        if moves.is_empty() {
            break;
        }
        position.make_move(moves[choice as usize % moves.len()]);
    }
    position
}

fn stage_strategy() -> impl Strategy<Value = GameStage> {
    prop_oneof![Just(GameStage::Early), Just(GameStage::Mid), Just(GameStage::End)]
}

fn check_every_move<E: Evaluator>(
    evaluator: &E,
    position: &mut Position,
    stage: GameStage,
) -> Result<(), TestCaseError> {
    let before = evaluator.static_score(position, stage);
    let state = EvalState::from_position(position);

    for mv in position.legal_moves() {
        let mut next_state = state;
        let delta = evaluator.delta_for_move(position, mv, stage, &mut next_state);

        position.make_move(mv);
        let after = evaluator.static_score(position, stage);
        prop_assert_eq!(after, before + delta, "delta drifted for {} in {}", mv, position);
        prop_assert_eq!(next_state, EvalState::from_position(position));
        position.unmake_move();
    }
    Ok(())
}

proptest! {
    #[test]
    fn pst_delta_matches_rescan(
        choices in prop::collection::vec(any::<u8>(), 0..80),
        stage in stage_strategy(),
    ) {
        let mut position = walk(&choices);
        check_every_move(&Pst, &mut position, stage)?;
    }

    #[test]
    fn material_delta_matches_rescan(
        choices in prop::collection::vec(any::<u8>(), 0..80),
        stage in stage_strategy(),
    ) {
        let mut position = walk(&choices);
        check_every_move(&Material, &mut position, stage)?;
    }

    #[test]
    fn running_score_survives_a_whole_line(choices in prop::collection::vec(any::<u8>(), 0..60)) {
        let stage = GameStage::Mid;
        let mut position = Position::starting_position();
        let mut state = EvalState::from_position(&position);
        let mut running = Pst.static_score(&position, stage);

        for choice in choices {
            let moves = position.legal_moves();
            if moves.is_empty() {
                break;
            }
            let mv = moves[choice as usize % moves.len()];
            running += Pst.delta_for_move(&mut position, mv, stage, &mut state);
            position.make_move(mv);
            prop_assert_eq!(running, Pst.static_score(&position, stage));
        }
    }
}
