//! Integration tests for the registration/voting invariants, exercised
//! directly against the repository layer:
//! - one registration per (user, event), enforced by the unique constraint
//! - upload quota: exactly 3 images per registration
//! - vote deduplication and the votes == voter-record-size invariant
//! - leaderboard ordering and tie stability

use assert_matches::assert_matches;
use sqlx::PgPool;

use snapvote_core::leaderboard::VoteOrder;
use snapvote_core::registration::PAYMENT_PENDING;
use snapvote_db::models::event::CreateEvent;
use snapvote_db::models::image::VoteOutcome;
use snapvote_db::models::registration::AddImageOutcome;
use snapvote_db::models::user::CreateUser;
use snapvote_db::repositories::{EventRepo, ImageRepo, RegistrationRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, name: &str) -> snapvote_db::models::user::User {
    let input = CreateUser {
        username: name.to_string(),
        email: format!("{name}@test.com"),
        password_hash: "$argon2id$fake".to_string(),
    };
    UserRepo::create(pool, &input).await.unwrap()
}

async fn create_event(pool: &PgPool, name: &str) -> snapvote_db::models::event::Event {
    let input = CreateEvent {
        name: name.to_string(),
        description: "test event".to_string(),
        price: 49900,
        image_url: "https://cdn.test/event.png".to_string(),
    };
    EventRepo::create(pool, &input).await.unwrap()
}

/// Register `user` for `event` and upload one image, returning the image.
async fn upload_image(
    pool: &PgPool,
    user_id: i64,
    event_id: i64,
    url: &str,
) -> snapvote_db::models::image::Image {
    match RegistrationRepo::add_image(pool, user_id, event_id, url)
        .await
        .unwrap()
    {
        AddImageOutcome::Created(image) => image,
        other => panic!("expected image creation, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Registration uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_registration_starts_pending_with_zero_images(pool: PgPool) {
    let user = create_user(&pool, "reg_pending").await;
    let event = create_event(&pool, "Pending Gala").await;

    let reg = RegistrationRepo::create(&pool, user.id, event.id)
        .await
        .unwrap();

    assert_eq!(reg.user_id, user.id);
    assert_eq!(reg.event_id, event.id);
    assert_eq!(reg.payment_status, PAYMENT_PENDING);
    assert_eq!(reg.image_count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_registration_rejected(pool: PgPool) {
    let user = create_user(&pool, "reg_dup").await;
    let event = create_event(&pool, "Dup Gala").await;

    RegistrationRepo::create(&pool, user.id, event.id)
        .await
        .unwrap();
    let second = RegistrationRepo::create(&pool, user.id, event.id).await;

    assert!(second.is_err(), "second registration must hit the unique constraint");

    // Exactly one row survives.
    let existing = RegistrationRepo::find_by_user_and_event(&pool, user.id, event.id)
        .await
        .unwrap();
    assert!(existing.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_same_user_may_register_for_two_events(pool: PgPool) {
    let user = create_user(&pool, "reg_two_events").await;
    let event_a = create_event(&pool, "Gala A").await;
    let event_b = create_event(&pool, "Gala B").await;

    RegistrationRepo::create(&pool, user.id, event_a.id)
        .await
        .unwrap();
    let second = RegistrationRepo::create(&pool, user.id, event_b.id).await;
    assert!(second.is_ok(), "uniqueness is per (user, event) pair");
}

// ---------------------------------------------------------------------------
// Upload quota
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_without_registration_is_rejected(pool: PgPool) {
    let user = create_user(&pool, "quota_unreg").await;
    let event = create_event(&pool, "Quota Gala").await;

    let outcome = RegistrationRepo::add_image(&pool, user.id, event.id, "https://cdn.test/a.png")
        .await
        .unwrap();
    assert_matches!(outcome, AddImageOutcome::NotRegistered);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_quota_allows_three_then_rejects(pool: PgPool) {
    let user = create_user(&pool, "quota_three").await;
    let event = create_event(&pool, "Quota Gala").await;
    RegistrationRepo::create(&pool, user.id, event.id)
        .await
        .unwrap();

    for i in 0..3 {
        let url = format!("https://cdn.test/{i}.png");
        let outcome = RegistrationRepo::add_image(&pool, user.id, event.id, &url)
            .await
            .unwrap();
        assert_matches!(outcome, AddImageOutcome::Created(_), "upload {i} should succeed");
    }

    let fourth = RegistrationRepo::add_image(&pool, user.id, event.id, "https://cdn.test/3.png")
        .await
        .unwrap();
    assert_matches!(fourth, AddImageOutcome::QuotaExceeded);

    let reg = RegistrationRepo::find_by_user_and_event(&pool, user.id, event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reg.image_count, 3);

    let images = ImageRepo::list_for_event(&pool, event.id).await.unwrap();
    assert_eq!(images.len(), 3, "exactly three image rows must exist");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_quota_survives_concurrent_uploads(pool: PgPool) {
    let user = create_user(&pool, "quota_race").await;
    let event = create_event(&pool, "Race Gala").await;
    RegistrationRepo::create(&pool, user.id, event.id)
        .await
        .unwrap();

    // Fire more uploads than the quota concurrently; the conditional
    // increment must let exactly three through.
    let mut handles = Vec::new();
    for i in 0..8 {
        let pool = pool.clone();
        let url = format!("https://cdn.test/race-{i}.png");
        handles.push(tokio::spawn(async move {
            RegistrationRepo::add_image(&pool, user.id, event.id, &url).await
        }));
    }

    let mut created = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            AddImageOutcome::Created(_) => created += 1,
            AddImageOutcome::QuotaExceeded => rejected += 1,
            AddImageOutcome::NotRegistered => panic!("registration exists"),
        }
    }
    assert_eq!(created, 3);
    assert_eq!(rejected, 5);

    let images = ImageRepo::list_for_event(&pool, event.id).await.unwrap();
    assert_eq!(images.len(), 3);
}

// ---------------------------------------------------------------------------
// Voting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_vote_on_missing_image(pool: PgPool) {
    let voter = create_user(&pool, "vote_missing").await;
    let outcome = ImageRepo::vote(&pool, 999_999, voter.id).await.unwrap();
    assert_matches!(outcome, VoteOutcome::ImageNotFound);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_double_vote_records_exactly_once(pool: PgPool) {
    let owner = create_user(&pool, "vote_owner").await;
    let voter = create_user(&pool, "vote_voter").await;
    let event = create_event(&pool, "Vote Gala").await;
    RegistrationRepo::create(&pool, owner.id, event.id)
        .await
        .unwrap();
    let image = upload_image(&pool, owner.id, event.id, "https://cdn.test/v.png").await;

    let first = ImageRepo::vote(&pool, image.id, voter.id).await.unwrap();
    let updated = match first {
        VoteOutcome::Recorded(img) => img,
        other => panic!("expected recorded vote, got {other:?}"),
    };
    assert_eq!(updated.votes, 1);

    let second = ImageRepo::vote(&pool, image.id, voter.id).await.unwrap();
    assert_matches!(second, VoteOutcome::AlreadyVoted);

    // votes == size of the voter record, with the voter exactly once.
    let voters = ImageRepo::voters(&pool, image.id).await.unwrap();
    assert_eq!(voters, vec![voter.id]);
    let reread = ImageRepo::find_by_id(&pool, image.id).await.unwrap().unwrap();
    assert_eq!(reread.votes, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_votes_by_same_user_count_once(pool: PgPool) {
    let owner = create_user(&pool, "race_owner").await;
    let voter = create_user(&pool, "race_voter").await;
    let event = create_event(&pool, "Race Vote Gala").await;
    RegistrationRepo::create(&pool, owner.id, event.id)
        .await
        .unwrap();
    let image = upload_image(&pool, owner.id, event.id, "https://cdn.test/rv.png").await;

    let mut handles = Vec::new();
    for _ in 0..6 {
        let pool = pool.clone();
        let image_id = image.id;
        let voter_id = voter.id;
        handles.push(tokio::spawn(async move {
            ImageRepo::vote(&pool, image_id, voter_id).await
        }));
    }

    let mut recorded = 0;
    for handle in handles {
        if let VoteOutcome::Recorded(_) = handle.await.unwrap().unwrap() {
            recorded += 1;
        }
    }
    assert_eq!(recorded, 1, "exactly one of the racing votes may land");

    let reread = ImageRepo::find_by_id(&pool, image.id).await.unwrap().unwrap();
    assert_eq!(reread.votes, 1);
    assert_eq!(ImageRepo::voters(&pool, image.id).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_leaderboard_orders_and_breaks_ties_stably(pool: PgPool) {
    let alice = create_user(&pool, "lb_alice").await;
    let bob = create_user(&pool, "lb_bob").await;
    let carol = create_user(&pool, "lb_carol").await;
    let event = create_event(&pool, "Leaderboard Gala").await;

    RegistrationRepo::create(&pool, alice.id, event.id)
        .await
        .unwrap();
    RegistrationRepo::create(&pool, bob.id, event.id)
        .await
        .unwrap();

    // first and second tie on zero votes; third gets two votes.
    let first = upload_image(&pool, alice.id, event.id, "https://cdn.test/1.png").await;
    let second = upload_image(&pool, bob.id, event.id, "https://cdn.test/2.png").await;
    let third = upload_image(&pool, alice.id, event.id, "https://cdn.test/3.png").await;

    for voter in [&alice, &carol] {
        let outcome = ImageRepo::vote(&pool, third.id, voter.id).await.unwrap();
        assert_matches!(outcome, VoteOutcome::Recorded(_));
    }

    let asc = ImageRepo::leaderboard(&pool, event.id, VoteOrder::Asc)
        .await
        .unwrap();
    let asc_ids: Vec<_> = asc.iter().map(|i| i.id).collect();
    assert_eq!(asc_ids, vec![first.id, second.id, third.id]);

    let desc = ImageRepo::leaderboard(&pool, event.id, VoteOrder::Desc)
        .await
        .unwrap();
    let desc_ids: Vec<_> = desc.iter().map(|i| i.id).collect();
    // Ties still break oldest-first in descending order.
    assert_eq!(desc_ids, vec![third.id, first.id, second.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_leaderboard_for_unknown_event_is_empty(pool: PgPool) {
    let images = ImageRepo::leaderboard(&pool, 424_242, VoteOrder::Asc)
        .await
        .unwrap();
    assert!(images.is_empty());
}

// ---------------------------------------------------------------------------
// Payment reconciliation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_expire_stale_pending_only_touches_old_rows(pool: PgPool) {
    let user_old = create_user(&pool, "exp_old").await;
    let user_new = create_user(&pool, "exp_new").await;
    let event = create_event(&pool, "Expiry Gala").await;

    let stale = RegistrationRepo::create(&pool, user_old.id, event.id)
        .await
        .unwrap();
    let fresh = RegistrationRepo::create(&pool, user_new.id, event.id)
        .await
        .unwrap();

    // Backdate the first registration past the reconciliation window.
    sqlx::query("UPDATE registrations SET created_at = NOW() - INTERVAL '100 hours' WHERE id = $1")
        .bind(stale.id)
        .execute(&pool)
        .await
        .unwrap();

    let cutoff = chrono::Utc::now() - chrono::Duration::hours(72);
    let expired = RegistrationRepo::expire_stale_pending(&pool, cutoff)
        .await
        .unwrap();
    assert_eq!(expired, 1);

    let stale_reread = RegistrationRepo::find_by_user_and_event(&pool, user_old.id, event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stale_reread.payment_status, "EXPIRED");

    let fresh_reread = RegistrationRepo::find_by_user_and_event(&pool, user_new.id, event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fresh_reread.payment_status, PAYMENT_PENDING);
    assert_eq!(fresh_reread.id, fresh.id);
}
