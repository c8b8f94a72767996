use std::time::Duration;

use simulation::{init::Episode, App, DriverConfig, LanderStatus};

fn app() -> App {
    App::try_new(Episode::default(), DriverConfig::default()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn free_fall_session_finishes() {
    let session = app().start();
    let mut updates = session.subscribe();

    let state = session.finished().await.unwrap();
    assert_eq!(state.lander_status, LanderStatus::Crushed);
    assert!(state.tick > 0);

    // The last published snapshot is the terminal one.
    let published = updates.borrow_and_update().clone();
    assert_eq!(published.tick, state.tick);
    assert_eq!(published.lander_status, LanderStatus::Crushed);
}

#[tokio::test(start_paused = true)]
async fn frame_rate_follows_tick_interval() {
    let session = app().start();
    tokio::time::sleep(Duration::from_millis(1000)).await;

    let fps = session.frame_rate();
    assert!(fps > 25. && fps < 40., "unexpected frame rate {fps}");

    session.shutdown();
    session.finished().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn engine_control_reaches_tick_loop() {
    let session = app().start();
    session.set_control(0., true);
    tokio::time::sleep(Duration::from_millis(600)).await;

    let state = session.current_state();
    assert!(state.engine_in_use);
    assert!(state.lander.y > 40.);
    assert!(state.lander.vy > 0.);

    let control = session.control();
    control.set_control(35., false);
    assert!(!control.control().engine_on);
    tokio::time::sleep(Duration::from_millis(300)).await;
    let state = session.current_state();
    assert!(!state.engine_in_use);
    assert!(state.lander.rotation > 0.);

    session.shutdown();
    let state = session.finished().await.unwrap();
    assert_eq!(state.lander_status, LanderStatus::InAir);
}

#[tokio::test(start_paused = true)]
async fn shell_can_land_through_control_handle() {
    let session = app().start();
    let control = session.control();
    let mut updates = session.subscribe();

    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();
        if state.lander_status.is_terminal() {
            break;
        }
        control.set_control(0., state.lander.vy < -1.);
    }

    let state = session.finished().await.unwrap();
    assert_eq!(state.lander_status, LanderStatus::Landed);
}

#[tokio::test(start_paused = true)]
async fn settle_delay_before_return() {
    let config = DriverConfig::default().with_settle_delay(Duration::from_secs(5));
    let episode = Episode {
        lander: simulation::Lander::default().with_y(-1.),
        ..Episode::default()
    };
    let session = App::try_new(episode, config).unwrap().start();
    let started = tokio::time::Instant::now();
    let state = session.finished().await.unwrap();
    assert!(state.lander_status.is_terminal());
    assert!(started.elapsed() >= Duration::from_secs(5));
}
