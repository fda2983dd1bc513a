use dominoes_engine::Side::{Left, Right};
use dominoes_engine::{
    Knowledge, Move, PieceTable, PlayRecord, PlayRequest, PlayResponse, Recommender, SearchConfig,
    Side,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn request(seat: u8, hand: &[&str], plays: &[(u8, &str, Side)]) -> PlayRequest {
    PlayRequest {
        seat,
        hand: hand.iter().map(|s| s.to_string()).collect(),
        table: vec![],
        plays: plays
            .iter()
            .map(|&(seat, piece, side)| PlayRecord {
                seat,
                piece: piece.to_string(),
                side: Some(side),
            })
            .collect(),
    }
}

fn config() -> SearchConfig {
    SearchConfig {
        budget_ms: 60_000,
        max_sample_retries: 10_000,
        max_samples: Some(8),
        seed: Some(2024),
    }
}

/// Checks that every sample is the same deal and returns the best moves for it.
fn solve_determined(table: &PieceTable, knowledge: &Knowledge) -> (Vec<Move>, [Vec<String>; 4]) {
    let mut rng = StdRng::seed_from_u64(5);
    let first = knowledge.sample(&mut rng, 10_000).unwrap();
    for _ in 0..50 {
        let mut again = knowledge.sample(&mut rng, 10_000).unwrap();
        let mut expected = first.clone();
        for (a, b) in again.iter_mut().zip(expected.iter_mut()) {
            a.sort_by_key(|p| p.id());
            b.sort_by_key(|p| p.id());
        }
        assert_eq!(again, expected, "hidden hands are not uniquely determined");
    }
    let names = first.clone().map(|hand| {
        let mut names: Vec<String> = hand.iter().map(|&p| table.name(p).to_string()).collect();
        names.sort();
        names
    });
    let best = knowledge.position(table, &first).find_best_moves();
    (best.moves, names)
}

#[test]
fn determined_deal_matches_direct_search_for_seat_one() {
    let table = PieceTable::new();
    // seats 2, 3 and 4 are pinned down by the passes they were forced into
    let req = request(
        1,
        &["6-1", "0-1", "0-0"],
        &[
            (2, "6-6", Right),
            (4, "2-6", Right),
            (1, "4-6", Left),
            (2, "2-2", Right),
            (3, "0-4", Left),
            (4, "0-3", Left),
            (1, "3-4", Left),
            (2, "1-2", Right),
            (3, "1-3", Right),
            (4, "2-4", Left),
            (2, "3-3", Right),
            (3, "2-5", Left),
            (4, "3-5", Left),
            (2, "3-6", Left),
            (4, "2-3", Right),
            (1, "5-6", Left),
            (3, "5-5", Left),
            (1, "1-5", Left),
            (3, "0-2", Right),
            (4, "1-4", Left),
        ],
    );
    let knowledge = req.knowledge(&table).unwrap();
    assert_eq!((knowledge.end1, knowledge.end2), (4, 0));
    assert_eq!(knowledge.hand_size, [0, 2, 2, 1]);

    let (direct, hands) = solve_determined(&table, &knowledge);
    assert_eq!(hands[1], vec!["0-6", "4-4"]);
    assert_eq!(hands[2], vec!["0-5", "4-5"]);
    assert_eq!(hands[3], vec!["1-1"]);
    assert_eq!(direct, vec![Move::right(2)]);

    let recommender = Recommender::new(&table, config());
    assert_eq!(recommender.best_move(&knowledge).unwrap(), direct[0]);
    assert_eq!(recommender.recommend(&req).unwrap(), PlayResponse::play("0-0".into(), Right));
}

#[test]
fn determined_deal_matches_direct_search_for_seat_three() {
    let table = PieceTable::new();
    let req = request(
        3,
        &["3-0", "3-3"],
        &[
            (2, "6-6", Right),
            (3, "0-6", Right),
            (4, "1-6", Left),
            (1, "1-3", Left),
            (2, "3-4", Left),
            (3, "4-5", Left),
            (4, "1-5", Left),
            (1, "0-4", Right),
            (2, "1-1", Left),
            (3, "1-4", Left),
            (4, "4-4", Left),
            (3, "2-4", Left),
            (4, "1-2", Left),
            (4, "0-1", Left),
            (2, "0-2", Left),
            (4, "4-6", Right),
            (1, "2-6", Left),
            (2, "5-6", Right),
            (3, "5-5", Right),
            (1, "3-6", Left),
            (2, "2-5", Right),
        ],
    );
    let knowledge = req.knowledge(&table).unwrap();
    assert_eq!((knowledge.end1, knowledge.end2), (3, 2));
    assert_eq!(knowledge.last_mover, 2);

    let (direct, hands) = solve_determined(&table, &knowledge);
    assert_eq!(hands[0], vec!["2-2", "2-3", "3-5"]);
    assert_eq!(hands[1], vec!["0-5"]);
    assert_eq!(hands[3], vec!["0-0"]);
    assert_eq!(direct, vec![Move::left(1)]);

    let recommender = Recommender::new(&table, config());
    assert_eq!(recommender.recommend(&req).unwrap(), PlayResponse::play("3-3".into(), Left));
}

#[test]
fn forced_pass_is_reported_as_empty_response() {
    // nothing in hand fits 6/6, so pass is the only legal move
    let table = PieceTable::new();
    let req = request(2, &["0-0", "1-1"], &[(1, "6-6", Right)]);
    let response = Recommender::new(&table, config()).recommend(&req).unwrap();
    assert!(response.is_pass());
    assert_eq!(serde_json::to_string(&response).unwrap(), "{}");
}

#[test]
fn boundary_errors_surface_from_recommend() {
    let table = PieceTable::new();
    let recommender = Recommender::new(&table, config());
    assert!(recommender.recommend(&request(2, &["0-0"], &[])).is_err());
    assert!(recommender.recommend(&request(2, &["x-y"], &[(1, "6-6", Right)])).is_err());
}
