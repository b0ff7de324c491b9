mod common;

use std::sync::Arc;

use uuid::Uuid;

use engine::{
    ContributeCmd, CreatePoolCmd, EngineError, FULL_PROGRESS_BPS, Operation, PoolStatus,
};

use common::{engine, file_engine, inr, remove_database_file};

async fn trip_pool(engine: &engine::Engine) -> Uuid {
    engine
        .create_pool(CreatePoolCmd::new("alice", "Goa trip", inr(5000)).description("flights"))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn progress_clamps_and_close_rejects_contributions() {
    let (engine, _) = engine().await;
    let pool_id = trip_pool(&engine).await;

    engine
        .contribute(ContributeCmd::new("alice", pool_id, "Asha", inr(2000)))
        .await
        .unwrap();
    let progress = engine
        .contribute(ContributeCmd::new("bob", pool_id, "Ravi", inr(2000)))
        .await
        .unwrap();
    assert_eq!(progress.collected, inr(4000));
    assert_eq!(progress.remaining, inr(1000));
    assert_eq!(progress.progress_bps, 8000);
    assert_eq!(progress.as_fraction(), 0.8);
    assert_eq!(progress.contributors, 2);

    let progress = engine
        .contribute(ContributeCmd::new("alice", pool_id, "Asha", inr(2000)))
        .await
        .unwrap();
    assert_eq!(progress.collected, inr(6000));
    assert_eq!(progress.progress_bps, FULL_PROGRESS_BPS);
    assert_eq!(progress.remaining, inr(0));
    assert_eq!(progress.contributors, 2);

    let closed = engine.close_pool("alice", pool_id).await.unwrap();
    assert_eq!(closed.status, PoolStatus::Closed);
    assert!(closed.closed_at.is_some());
    assert_eq!(closed.contributions.len(), 3);

    let err = engine
        .contribute(ContributeCmd::new("alice", pool_id, "Asha", inr(2000)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidState {
            op: Operation::Contribute,
            id: pool_id.to_string(),
            reason: "pool is closed".to_string(),
        }
    );
    assert_eq!(
        engine.pool_progress(pool_id).await.unwrap().collected,
        inr(6000)
    );
}

#[tokio::test]
async fn close_is_owner_only_and_one_way() {
    let (engine, _) = engine().await;
    let pool_id = trip_pool(&engine).await;

    let err = engine.close_pool("bob", pool_id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound { op: Operation::ClosePool, .. }));

    engine.close_pool("alice", pool_id).await.unwrap();
    let err = engine.close_pool("alice", pool_id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState { op: Operation::ClosePool, .. }));
}

#[tokio::test]
async fn pool_input_is_validated() {
    let (engine, _) = engine().await;

    let err = engine
        .create_pool(CreatePoolCmd::new("alice", "Gift", inr(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { op: Operation::CreatePool, .. }));
    let err = engine
        .create_pool(CreatePoolCmd::new("alice", " ", inr(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));

    let pool_id = trip_pool(&engine).await;
    for (who, amount) in [("Asha", -5), ("Asha", 0), ("", 100)] {
        let err = engine
            .contribute(ContributeCmd::new("alice", pool_id, who, inr(amount)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { op: Operation::Contribute, .. }));
    }

    let err = engine
        .contribute(ContributeCmd::new("alice", Uuid::new_v4(), "Asha", inr(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound { .. }));
    assert!(engine.pool(pool_id).await.unwrap().contributions.is_empty());
}

#[tokio::test]
async fn joined_contribute_and_close_never_drop_money() {
    let (engine, _) = engine().await;
    let pool_id = trip_pool(&engine).await;

    let (contributed, closed) = tokio::join!(
        engine.contribute(ContributeCmd::new("bob", pool_id, "Bob", inr(700))),
        engine.close_pool("alice", pool_id),
    );
    closed.unwrap();

    let pool = engine.pool(pool_id).await.unwrap();
    assert_eq!(pool.status, PoolStatus::Closed);
    match contributed {
        Ok(_) => assert_eq!(pool.contributions.len(), 1),
        Err(err) => {
            assert!(matches!(
                err,
                EngineError::InvalidState { .. } | EngineError::ConcurrencyConflict { .. }
            ));
            assert!(pool.contributions.is_empty());
        }
    }
}

#[tokio::test]
async fn pools_list_owned_with_progress() {
    let (engine, _) = engine().await;
    let first = trip_pool(&engine).await;
    let second = engine
        .create_pool(CreatePoolCmd::new("alice", "Birthday gift", inr(1000)))
        .await
        .unwrap()
        .id;
    engine
        .contribute(ContributeCmd::new("bob", second, "Bob", inr(250)))
        .await
        .unwrap();

    let pools = engine.pools("alice").await.unwrap();
    assert_eq!(
        pools.iter().map(|(p, _)| p.id).collect::<Vec<_>>(),
        [second, first]
    );
    assert_eq!(pools[0].1.progress_bps, 2500);
    assert_eq!(pools[0].0.contributions[0].recorded_by, "bob");
    assert!(engine.pools("bob").await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn racing_contributions_and_close_on_separate_connections() {
    let (engine, path) = file_engine().await;
    let pool_id = trip_pool(&engine).await;

    let mut contributions = Vec::new();
    for i in 0..24 {
        let engine = Arc::clone(&engine);
        contributions.push(tokio::spawn(async move {
            let amount = 100 + i;
            let cmd = ContributeCmd::new("bob", pool_id, format!("friend {i}"), inr(amount));
            (amount, engine.contribute(cmd).await)
        }));
    }
    let closer = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            loop {
                match engine.close_pool("alice", pool_id).await {
                    Err(EngineError::ConcurrencyConflict { .. }) => tokio::task::yield_now().await,
                    other => return other,
                }
            }
        })
    };

    let mut accepted = 0;
    let mut accepted_minor = 0;
    for handle in contributions {
        let (amount, outcome) = handle.await.unwrap();
        match outcome {
            Ok(_) => {
                accepted += 1;
                accepted_minor += amount;
            }
            Err(err) => assert!(
                matches!(
                    err,
                    EngineError::InvalidState { .. } | EngineError::ConcurrencyConflict { .. }
                ),
                "unexpected error: {err:?}"
            ),
        }
    }
    let closed = closer.await.unwrap().unwrap();
    assert_eq!(closed.status, PoolStatus::Closed);

    let pool = engine.pool(pool_id).await.unwrap();
    assert_eq!(pool.status, PoolStatus::Closed);
    assert_eq!(pool.contributions.len(), accepted);
    let mut seqs: Vec<i32> = pool.contributions.iter().map(|c| c.seq).collect();
    seqs.sort_unstable();
    assert_eq!(seqs, (0..accepted as i32).collect::<Vec<_>>());
    let progress = engine.pool_progress(pool_id).await.unwrap();
    assert_eq!(progress.collected, inr(accepted_minor));

    let late = engine
        .contribute(ContributeCmd::new("bob", pool_id, "late", inr(1)))
        .await
        .unwrap_err();
    assert!(matches!(late, EngineError::InvalidState { op: Operation::Contribute, .. }));

    drop(engine);
    remove_database_file(&path);
}
