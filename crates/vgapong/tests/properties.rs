//! Behavioural properties of the engine, run against the fake board.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use vgapong::game::Score;
use vgapong::prelude::*;

const W: u32 = 320;
const H: u32 = 240;
const BASE: u32 = 0x0800_0000;

fn board() -> GameState {
    GameState::new(Geometry::new(W, H), Rules::DEFAULT)
}

fn snapshot() -> impl Strategy<Value = InputSnapshot> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(a, b, c, d)| InputSnapshot {
        paddle1_up: a,
        paddle1_down: b,
        paddle2_up: c,
        paddle2_down: d,
        reset: false,
    })
}

/// Keep both paddles centred on the ball so rallies never end
fn track_ball(state: &mut GameState) {
    let limit = state.paddle_limit();
    let target = (state.ball.y + state.ball.size / 2 - state.left.height / 2).clamp(0, limit);
    state.left.y = target;
    state.right.y = target;
}

proptest! {
    #[test]
    fn paddles_stay_on_screen(inputs in prop::collection::vec(snapshot(), 1..200)) {
        let mut state = board();
        let limit = H as i32 - Rules::DEFAULT.paddle_height;
        for input in &inputs {
            state.step(input);
            prop_assert!((0..=limit).contains(&state.left.y));
            prop_assert!((0..=limit).contains(&state.right.y));
        }
    }

    #[test]
    fn ball_stays_between_walls(
        y in 0i32..=235,
        dy in -12i32..=12,
        inputs in prop::collection::vec(snapshot(), 1..200),
    ) {
        let mut state = board();
        state.ball.y = y;
        state.ball.dy = dy;
        for input in &inputs {
            state.step(input);
            prop_assert!(state.ball.y >= 0);
            prop_assert!(state.ball.y + state.ball.size <= H as i32);
        }
    }

    #[test]
    fn ball_never_passes_left_paddle(
        offset in 0i32..60,
        speed in 1i32..=40,
        overlap in -4i32..=40,
    ) {
        let mut state = board();
        let face = state.left.face();
        state.ball.x = face + offset;
        state.ball.y = state.left.y + overlap;
        state.ball.dx = -speed;
        state.ball.dy = 0;

        let events = state.step(&InputSnapshot::NONE);

        prop_assert!(state.ball.x >= face);
        prop_assert!(!events.contains(TickEvents::POINT));
        if face + offset - speed <= face {
            prop_assert!(events.contains(TickEvents::PADDLE_HIT));
            prop_assert_eq!(state.ball.x, face);
            prop_assert_eq!(state.ball.dx, speed);
        } else {
            prop_assert_eq!(state.ball.dx, -speed);
        }
    }

    #[test]
    fn ball_never_passes_right_paddle(
        offset in 0i32..60,
        speed in 1i32..=40,
        overlap in -4i32..=40,
    ) {
        let mut state = board();
        let face = state.right.face();
        let size = state.ball.size;
        state.ball.x = face - size - offset;
        state.ball.y = state.right.y + overlap;
        state.ball.dx = speed;
        state.ball.dy = 0;

        let events = state.step(&InputSnapshot::NONE);

        prop_assert!(state.ball.x + size <= face);
        prop_assert!(!events.contains(TickEvents::POINT));
        if offset <= speed {
            prop_assert!(events.contains(TickEvents::PADDLE_HIT));
            prop_assert_eq!(state.ball.x + size, face);
            prop_assert_eq!(state.ball.dx, -speed);
        }
    }

    #[test]
    fn reset_twice_matches_reset_once(inputs in prop::collection::vec(snapshot(), 0..300)) {
        let mut state = board();
        for input in &inputs {
            state.step(input);
        }

        state.step(&InputSnapshot::RESET);
        let once = state.clone();
        state.step(&InputSnapshot::RESET);

        prop_assert_eq!(once.score, Score::default());
        prop_assert_eq!(state.score, once.score);
        prop_assert_eq!(state.left, once.left);
        prop_assert_eq!(state.right, once.right);
        prop_assert_eq!((state.ball.x, state.ball.y, state.ball.dy), (once.ball.x, once.ball.y, once.ball.dy));
        // Consecutive serves alternate direction.
        prop_assert_eq!(state.ball.dx, -once.ball.dx);
    }
}

#[test]
fn fifth_point_ends_the_game() {
    let mut state = board();
    for point in 1..=5u8 {
        state.ball.x = 2;
        state.ball.y = 10;
        state.ball.dx = -3;
        state.ball.dy = 0;
        let events = state.step(&InputSnapshot::NONE);
        assert!(events.contains(TickEvents::POINT));
        assert_eq!(state.score.right, point);
        assert_eq!(state.score.game_over, point == 5);
        assert_eq!(events.contains(TickEvents::GAME_WON), point == 5);
    }
    assert_eq!(state.score.winner, Some(Side::Right));

    let frozen = state.clone();
    let held = InputSnapshot { paddle1_up: true, paddle2_down: true, ..InputSnapshot::NONE };
    for _ in 0..10 {
        assert_eq!(state.step(&held), TickEvents::FROZEN);
    }
    assert_eq!(state, frozen);

    state.step(&InputSnapshot::RESET);
    assert_eq!(state.score, Score::default());
    assert!(!state.step(&InputSnapshot::NONE).contains(TickEvents::FROZEN));
}

#[test]
fn top_wall_clamps_and_reflects() {
    let mut state = board();
    state.ball.x = 158;
    state.ball.y = 118;
    state.ball.dx = -3;
    state.ball.dy = 3;

    let mut bottom_bounces = 0;
    for _ in 0..500 {
        track_ball(&mut state);
        let before = state.ball;
        let events = state.step(&InputSnapshot::NONE);
        assert!(!events.contains(TickEvents::POINT));
        if events.contains(TickEvents::WALL_BOUNCE) && before.dy < 0 {
            assert!(bottom_bounces > 0);
            assert_eq!(state.ball.y, 0);
            assert_eq!(state.ball.dy, 3);
            return;
        }
        if events.contains(TickEvents::WALL_BOUNCE) {
            bottom_bounces += 1;
        }
    }
    panic!("ball never reached the top wall");
}

#[test]
fn left_paddle_reflects_and_snaps() {
    let mut state = board();
    state.left.y = 100;
    state.ball.x = 17;
    state.ball.y = 120;
    state.ball.dx = -3;
    state.ball.dy = 0;

    let events = state.step(&InputSnapshot::NONE);

    assert!(events.contains(TickEvents::PADDLE_HIT));
    assert_eq!(state.ball.dx, 3);
    assert_eq!(state.ball.x, state.left.x + state.left.width);
}

#[test]
fn exit_left_scores_for_right_and_serves_right() {
    let mut state = board();
    state.ball.x = 1;
    state.ball.y = 10;
    state.ball.dx = -3;
    state.ball.dy = -3;

    let events = state.step(&InputSnapshot::NONE);

    assert!(events.contains(TickEvents::POINT));
    assert_eq!((state.score.left, state.score.right), (0, 1));
    assert_eq!((state.ball.x, state.ball.y), (158, 118));
    assert_eq!((state.ball.dx, state.ball.dy), (3, 3));
}

#[test]
fn tick_cost_is_render_plus_flip_latency() {
    const LATENCY: u32 = 250;
    let model = CostModel { cycles_per_pixel: 4, cycles_per_poll: 6 };
    let config = GameConfig {
        cost_model: model,
        flip_policy: FlipPolicy::Bounded { max_polls: 1_000 },
        ..GameConfig::DEFAULT
    };

    let mut port = FakePort::new(Geometry::new(W, H))
        .with_flip_latency(LATENCY)
        .with_cycles_per_poll(u64::from(model.cycles_per_poll));
    let mut vram = vec![0u8; 2 * (W * H) as usize];
    let mut dispatcher = TickDispatcher::init(&mut port, VideoMemory::new(&mut vram, BASE), config).unwrap();

    for _ in 0..20 {
        let clock = dispatcher.port().clock();
        let report = dispatcher.on_timer();
        let spent = dispatcher.port().clock() - clock;

        assert_eq!(report.outcome, TickOutcome::Presented);
        assert_eq!(report.flip_polls, LATENCY);
        assert_eq!(spent, u64::from(LATENCY) * u64::from(model.cycles_per_poll));
        assert_eq!(
            model.tick_cycles(&report),
            u64::from(report.pixels_written) * 4 + spent
        );
        assert!(model.fits(&report, config.timer_period));
        assert!(model.tick_cycles(&report) <= vgapong::budget::worst_case_cycles(Geometry::new(W, H), &config).unwrap());
    }
}

#[test]
fn displayed_buffer_alternates_every_tick() {
    let mut port = FakePort::new(Geometry::new(W, H));
    let mut vram = vec![0u8; 2 * (W * H) as usize];
    let mut dispatcher =
        TickDispatcher::init(&mut port, VideoMemory::new(&mut vram, BASE), GameConfig::DEFAULT).unwrap();

    let mut previous = dispatcher.port().displayed();
    for _ in 0..6 {
        dispatcher.on_timer();
        let shown = dispatcher.port().displayed();
        assert_ne!(shown, previous);
        assert_eq!(shown, Some(dispatcher.flip().front_address()));
        previous = shown;
    }
}
