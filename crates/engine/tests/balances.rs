mod common;

use chrono::{Datelike, Utc};

use engine::{CreateLekkaCmd, EngineError, FriendFilter, FriendRef, LekkaKind, Operation};

use common::{engine, inr, lend_to, token_of};

#[tokio::test]
async fn dashboard_excludes_pending_from_net() {
    let (engine, _) = engine().await;

    lend_to(&engine, FriendRef::new_contact("Ravi", None), 500).await;
    let borrowed = engine
        .create_lekka(CreateLekkaCmd::new(
            "alice",
            FriendRef::new_contact("Asha", None),
            LekkaKind::Borrowed,
            inr(1000),
        ))
        .await
        .unwrap();
    engine
        .redeem_confirmation(&token_of(&borrowed), None)
        .await
        .unwrap();
    engine.settle("alice", borrowed.id).await.unwrap();

    let stats = engine.dashboard_stats("alice").await.unwrap();
    assert_eq!(stats.total_lekkas, 2);
    assert_eq!(stats.pending_lekkas, 1);
    assert_eq!(stats.total_tracked, inr(1500));
    assert_eq!(stats.net_balance, inr(-1000));

    let empty = engine.dashboard_stats("bob").await.unwrap();
    assert_eq!(empty.total_lekkas, 0);
    assert_eq!(empty.net_balance, inr(0));
}

#[tokio::test]
async fn adding_a_friend_links_matching_lekkas() {
    let (engine, _) = engine().await;
    let lekka = lend_to(
        &engine,
        FriendRef::new_contact("Ravi", Some("+91 98450-12345".into())),
        300,
    )
    .await;
    let other = lend_to(&engine, FriendRef::new_contact("Asha", None), 50).await;
    assert_eq!(lekka.friend_id, None);
    engine.redeem_confirmation(&token_of(&lekka), None).await.unwrap();

    let friend = engine
        .add_friend("alice", "Ravi K", Some("+919845012345"))
        .await
        .unwrap();

    let linked = engine.lekka("alice", lekka.id).await.unwrap();
    assert_eq!(linked.friend_id, Some(friend.id));
    assert_eq!(linked.friend_name, "Ravi");
    assert_eq!(engine.lekka("alice", other.id).await.unwrap().friend_id, None);
    assert_eq!(engine.net_balance("alice", friend.id).await.unwrap(), inr(300));

    // A new Lekka with the same phone links straight away.
    let again = lend_to(
        &engine,
        FriendRef::new_contact("R", Some("+91 98450 12345".into())),
        10,
    )
    .await;
    assert_eq!(again.friend_id, Some(friend.id));

    let summary = engine.friend("alice", friend.id).await.unwrap();
    assert_eq!(summary.total_lekkas, 2);
    assert_eq!(summary.pending_lekkas, 1);
    assert_eq!(summary.net_balance, inr(300));

    let err = engine
        .add_friend("alice", "Dup", Some("+91 9845012345"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { op: Operation::AddFriend, .. }));
}

#[tokio::test]
async fn friend_filters_follow_balance_sign() {
    let (engine, _) = engine().await;
    let owes_me = engine.add_friend("alice", "Asha", None).await.unwrap();
    let i_owe = engine.add_friend("alice", "Bala", None).await.unwrap();
    let even = engine.add_friend("alice", "Chitra", None).await.unwrap();

    let lent = lend_to(&engine, FriendRef::Existing(owes_me.id), 400).await;
    engine.redeem_confirmation(&token_of(&lent), None).await.unwrap();
    let borrowed = engine
        .create_lekka(CreateLekkaCmd::new(
            "alice",
            FriendRef::Existing(i_owe.id),
            LekkaKind::Borrowed,
            inr(250),
        ))
        .await
        .unwrap();
    engine
        .redeem_confirmation(&token_of(&borrowed), None)
        .await
        .unwrap();
    lend_to(&engine, FriendRef::Existing(even.id), 999).await;

    let names = |list: Vec<engine::FriendSummary>| {
        list.into_iter().map(|s| s.friend.name).collect::<Vec<_>>()
    };
    assert_eq!(
        names(engine.friends("alice", FriendFilter::All).await.unwrap()),
        ["Asha", "Bala", "Chitra"]
    );
    assert_eq!(
        names(engine.friends("alice", FriendFilter::Owed).await.unwrap()),
        ["Asha"]
    );
    assert_eq!(
        names(engine.friends("alice", FriendFilter::Owing).await.unwrap()),
        ["Bala"]
    );

    let stats = engine.friend_stats("alice", i_owe.id).await.unwrap();
    assert_eq!(stats.net_balance, inr(-250));
    assert_eq!(
        engine.dashboard_stats("alice").await.unwrap().net_balance,
        inr(150)
    );
}

#[tokio::test]
async fn editing_or_deleting_a_friend_keeps_snapshots() {
    let (engine, _) = engine().await;
    let friend = engine.add_friend("alice", "Ravi", Some("111")).await.unwrap();
    let lekka = lend_to(&engine, FriendRef::Existing(friend.id), 100).await;
    assert_eq!(lekka.friend_name, "Ravi");
    assert_eq!(lekka.friend_phone.as_deref(), Some("111"));

    let renamed = engine
        .update_friend("alice", friend.id, Some("Ravi Kumar"), None)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Ravi Kumar");
    assert_eq!(renamed.phone.as_deref(), Some("111"));
    assert_eq!(engine.lekka("alice", lekka.id).await.unwrap().friend_name, "Ravi");

    engine.delete_friend("alice", friend.id).await.unwrap();
    let orphan = engine.lekka("alice", lekka.id).await.unwrap();
    assert_eq!(orphan.friend_id, None);
    assert_eq!(orphan.friend_name, "Ravi");

    let err = engine.net_balance("alice", friend.id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound {
            op: Operation::NetBalance,
            id: friend.id.to_string()
        }
    );
}

#[tokio::test]
async fn updating_a_friend_to_a_taken_phone_is_rejected() {
    let (engine, _) = engine().await;
    engine.add_friend("alice", "Ravi", Some("+91 11111")).await.unwrap();
    let asha = engine.add_friend("alice", "Asha", Some("+91 22222")).await.unwrap();

    let err = engine
        .update_friend("alice", asha.id, None, Some("+91-111-11"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { op: Operation::UpdateFriend, .. }));
    let unchanged = engine.friend("alice", asha.id).await.unwrap();
    assert_eq!(unchanged.friend.phone.as_deref(), Some("+9122222"));

    let same = engine
        .update_friend("alice", asha.id, Some("Asha R"), Some("+91 22222"))
        .await
        .unwrap();
    assert_eq!(same.phone.as_deref(), Some("+9122222"));

    // Another owner's contacts do not count.
    engine.add_friend("bob", "Ravi", Some("+91 33333")).await.unwrap();
    let moved = engine
        .update_friend("alice", asha.id, None, Some("+91 33333"))
        .await
        .unwrap();
    assert_eq!(moved.phone.as_deref(), Some("+9133333"));
}

#[tokio::test]
async fn friends_are_private_to_their_owner() {
    let (engine, _) = engine().await;
    let friend = engine.add_friend("alice", "Ravi", None).await.unwrap();

    assert!(engine.friend("bob", friend.id).await.is_err());
    assert!(engine.delete_friend("bob", friend.id).await.is_err());
    assert!(engine.friends("bob", FriendFilter::All).await.unwrap().is_empty());

    let err = engine
        .create_lekka(CreateLekkaCmd::new(
            "bob",
            FriendRef::Existing(friend.id),
            LekkaKind::Lent,
            inr(10),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound { op: Operation::CreateLekka, .. }));

    let err = engine.add_friend("alice", "  ", None).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));
}

#[tokio::test]
async fn monthly_and_profile_stats() {
    let (engine, _) = engine().await;
    engine.add_friend("alice", "Ravi", None).await.unwrap();
    let a = lend_to(&engine, FriendRef::new_contact("Ravi", None), 100).await;
    engine
        .create_lekka(CreateLekkaCmd::new(
            "alice",
            FriendRef::new_contact("Asha", None),
            LekkaKind::Borrowed,
            inr(40),
        ))
        .await
        .unwrap();
    engine.redeem_confirmation(&token_of(&a), None).await.unwrap();
    engine.settle("alice", a.id).await.unwrap();

    let monthly = engine.monthly_stats("alice").await.unwrap();
    let now = Utc::now();
    assert_eq!(monthly.len(), 1);
    assert_eq!((monthly[0].year, monthly[0].month), (now.year(), now.month()));
    assert_eq!(monthly[0].count, 2);
    assert_eq!(monthly[0].lent, inr(100));
    assert_eq!(monthly[0].borrowed, inr(40));

    let profile = engine.profile_stats("alice").await.unwrap();
    assert_eq!(profile.total_lekkas, 2);
    assert_eq!(profile.total_friends, 1);
    assert_eq!(profile.settled_lekkas, 1);
}
