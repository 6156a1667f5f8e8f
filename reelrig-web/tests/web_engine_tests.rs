use reelrig_web::game::{
    ExitOutcome, MachineController, SpinOutcome, TICK_MS, create_web_engine,
};

#[test]
fn web_engine_builds_a_session_from_embedded_assets() {
    let engine = create_web_engine();
    let session = engine.create_session(0xC0FFEE).expect("assets load");
    assert_eq!(session.reels().len(), 3);
    assert_eq!(session.wallet().coins, 100);
    assert!(session.reels().iter().all(|reel| reel.strip().len() == 6));
}

#[test]
fn a_full_spin_runs_through_animation_frames() {
    let mut controller = MachineController::from_assets(2024);
    assert!(matches!(controller.action(), SpinOutcome::Started { .. }));
    for _ in 0..3 {
        controller.advance(TICK_MS * 4.0);
        assert!(matches!(controller.action(), SpinOutcome::Stopping { .. }));
    }
    assert_eq!(controller.exit(), ExitOutcome::Ignored);
    let mut frames = 0;
    while !controller.session().phase().is_settled(3) {
        controller.advance(TICK_MS * 2.0);
        frames += 1;
        assert!(frames < 2_000, "reels never settled");
    }
    assert!(controller.session().last_reward().is_some());
    let json = controller.drain_events_json().expect("events serialize");
    assert!(json.contains("reward_settled"));
}
