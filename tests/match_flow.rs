use maze_chase::{
    create_match, CellPos, MatchConfig, MatchState, PathFinder, Role, Strategy, WinKind,
};

fn config(seed: u64, players: usize, hunters: usize) -> MatchConfig {
    MatchConfig {
        width: 300,
        height: 200,
        agent_count: players,
        hunter_count: hunters,
        seed: Some(seed),
        ..MatchConfig::default()
    }
}

/// Ticks at 60 fps until the match ends; every agent path is finite, so
/// this is bounded.
fn play_out(game: &mut maze_chase::Match) -> usize {
    game.start();
    let mut frames = 0;
    while game.state() == MatchState::Running {
        game.update(1.0 / 60.0);
        frames += 1;
        assert!(frames < 100_000, "match did not finish");
    }
    frames
}

#[test]
fn seeded_matches_replay_identically() {
    let mut a = create_match(&config(99, 6, 2)).unwrap();
    let mut b = create_match(&config(99, 6, 2)).unwrap();

    assert_eq!(a.maze(), b.maze());
    for (x, y) in a.agents().iter().zip(b.agents()) {
        assert_eq!(x.path(), y.path());
        assert_eq!(x.strategy, y.strategy);
        assert_eq!(x.speed, y.speed);
    }

    let frames_a = play_out(&mut a);
    let frames_b = play_out(&mut b);
    assert_eq!(frames_a, frames_b);
    assert_eq!(a.outcome(), b.outcome());
}

#[test]
fn runner_paths_lead_to_the_goal() {
    for seed in 0..20 {
        let game = create_match(&config(seed, 8, 0)).unwrap();
        let goal = game.goal();
        assert_eq!(goal, CellPos::new(5, 7));
        for agent in game.agents() {
            assert_eq!(agent.role, Role::Runner);
            assert_eq!(agent.path().first(), Some(&agent.cell()));
            assert_eq!(agent.path().last(), Some(&goal));
            assert_eq!(agent.path_index(), 0);
        }
    }
}

#[test]
fn perfect_maze_makes_strategies_agree() {
    // A spanning tree has exactly one simple path between two cells, so BFS
    // and DFS must reconstruct the same route.
    let game = create_match(&config(5, 1, 0)).unwrap();
    let finder = PathFinder::new(game.maze());
    let start = CellPos::new(0, 0);
    let target = CellPos::new(9, 14);
    assert_eq!(
        finder.find_path(Strategy::Bfs, start, target),
        finder.find_path(Strategy::Dfs, start, target)
    );
}

#[test]
fn every_match_ends_with_a_valid_winner() {
    for seed in 0..12 {
        let mut game = create_match(&config(seed, 4, 1)).unwrap();
        play_out(&mut game);

        assert_eq!(game.state(), MatchState::Ended);
        let outcome = game.outcome().unwrap();
        let winner = game.winner().unwrap();
        assert_eq!(winner.id, outcome.winner);
        match outcome.kind {
            WinKind::ReachedGoal => {
                assert_eq!(winner.role, Role::Runner);
                assert_eq!(winner.cell(), game.goal());
            }
            WinKind::Caught { quarry } => {
                assert_eq!(winner.role, Role::Hunter { quarry });
                assert_eq!(winner.cell(), game.agent(quarry).unwrap().cell());
            }
        }
    }
}

#[test]
fn pause_freezes_the_board() {
    let mut game = create_match(&config(3, 3, 0)).unwrap();
    game.start();
    for _ in 0..10 {
        game.update(1.0 / 60.0);
    }
    assert!(game.stop());
    let frozen = game.snapshot();
    for _ in 0..10 {
        assert_eq!(game.update(1.0 / 60.0), None);
    }
    let still = game.snapshot();
    for (a, b) in frozen.agents.iter().zip(&still.agents) {
        assert_eq!((a.x, a.y, a.path_index), (b.x, b.y, b.path_index));
    }
    assert!(game.start());
    assert_eq!(game.state(), MatchState::Running);
}

#[test]
fn snapshot_exposes_the_maze_for_rendering() {
    let game = create_match(&config(8, 2, 0)).unwrap();
    let snap = game.snapshot();
    assert_eq!((snap.rows, snap.cols), (10, 15));
    assert_eq!(snap.walls.len(), 150);
    assert_eq!(snap.seed, 8);
    assert_eq!(snap.state, MatchState::Stopped);
    assert!(snap.outcome.is_none());
    // Outer boundary is always closed.
    assert_ne!(snap.walls[0] & maze_chase::maze::WALL_TOP, 0);
    assert_ne!(snap.walls[0] & maze_chase::maze::WALL_LEFT, 0);
}
