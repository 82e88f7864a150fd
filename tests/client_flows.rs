mod common;

use chrono::NaiveDate;
use std::time::Duration;

use common::{harness, harness_with, PASSWORD};
use nexus_client::config::{Config, DEFAULT_AVATAR_URL, DEFAULT_BIO};
use nexus_client::entities::{
    FriendshipStatus, NewComment, NewNotification, NotificationType, ProfileForm, SignUpForm,
};
use nexus_client::infrastructure::{Backend, BackendOp};
use nexus_client::state::{NoticeKind, NotificationsTab, Page, SearchTab};
use nexus_client::views::{Action, PageView};
use nexus_client::{AppError, RequestOutcome};

fn sign_up_form(password: &str, confirm: &str) -> SignUpForm {
    SignUpForm {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1906, 12, 9),
        phone: Some("555-0100".to_string()),
        email: "grace@example.com".to_string(),
        password: password.to_string(),
        confirm_password: confirm.to_string(),
    }
}

// Auth

#[tokio::test]
async fn test_short_password_rejected_without_backend_call() {
    let h = harness();

    let err = h
        .client
        .sign_up(sign_up_form("abc", "abc"))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.user_message(), "Password must be at least 6 characters long");
    assert_eq!(h.metrics.total_calls().await, 0);
    let notice = h.client.ui().notice().await.unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, "Password must be at least 6 characters long");
}

#[tokio::test]
async fn test_sign_up_then_verify_creates_profile_from_form() {
    let h = harness();

    h.client
        .sign_up(sign_up_form(PASSWORD, PASSWORD))
        .await
        .unwrap();
    assert_eq!(h.client.ui().page().await, Page::Verification);

    let bad = h.client.verify_email_code("12").await.unwrap_err();
    assert!(bad.is_validation());
    assert_eq!(h.metrics.calls(BackendOp::VerifyEmailCode).await, 0);

    let code = h.backend.verification_code("grace@example.com").await.unwrap();
    let session = h.client.verify_email_code(&code).await.unwrap();

    let profile = h.client.session().current_profile().await.unwrap();
    assert_eq!(profile.id, session.user_id);
    assert_eq!(profile.first_name, "Grace");
    assert_eq!(profile.phone.as_deref(), Some("555-0100"));
    assert!(h.client.session().pending_sign_up().await.is_none());
    assert_eq!(h.client.ui().page().await, Page::Feed);
}

#[tokio::test]
async fn test_sign_in_creates_missing_profile_from_metadata() {
    let h = harness();
    h.backend
        .register_confirmed(
            "ada@example.com",
            PASSWORD,
            nexus_client::entities::UserMetadata {
                first_name: Some("Ada".to_string()),
                last_name: None,
            },
        )
        .await;

    h.client.sign_in("ada@example.com", PASSWORD).await.unwrap();

    let profile = h.client.session().current_profile().await.unwrap();
    assert_eq!(profile.first_name, "Ada");
    assert_eq!(profile.last_name, "Name");
    assert_eq!(h.metrics.calls(BackendOp::CreateProfile).await, 1);
}

#[tokio::test]
async fn test_profile_falls_back_to_local_stub() {
    let h = harness();
    h.backend
        .register_confirmed("ada@example.com", PASSWORD, Default::default())
        .await;
    h.faults.fail(BackendOp::GetProfile).await;
    h.faults.fail(BackendOp::CreateProfile).await;

    let session = h.client.sign_in("ada@example.com", PASSWORD).await.unwrap();

    let profile = h.client.session().current_profile().await.unwrap();
    assert_eq!(profile.id, session.user_id);
    assert_eq!(profile.avatar_url.as_deref(), Some(DEFAULT_AVATAR_URL));
    assert_eq!(profile.bio.as_deref(), Some(DEFAULT_BIO));
    // Not surfaced as an error
    assert_eq!(h.client.ui().notice().await.unwrap().kind, NoticeKind::Success);
}

#[tokio::test]
async fn test_sign_out_clears_social_state() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let other = h.seed("bob@example.com", "Bob", "Builder").await;
    h.client.send_friend_request(other.id).await.unwrap();
    h.backend
        .create_notification(NewNotification::from_sender(
            me.id,
            NotificationType::Like,
            "Bob liked your post".to_string(),
            other.id,
        ))
        .await
        .unwrap();
    h.client.load_notifications().await;
    assert_eq!(h.client.store().unread_count().await, 1);

    h.client.sign_out().await.unwrap();

    assert!(h.client.session().current_session().await.is_none());
    assert_eq!(h.client.store().unread_count().await, 0);
    assert!(!h.client.store().has_outgoing_request(other.id).await);
    assert_eq!(h.client.ui().page().await, Page::Auth);
}

#[tokio::test]
async fn test_init_restores_existing_session() {
    let h = harness();
    h.seed("ada@example.com", "Ada", "Lovelace").await;
    h.backend.sign_in("ada@example.com", PASSWORD).await.unwrap();

    let page = h.client.init().await;

    assert_eq!(page, Page::Feed);
    assert!(h.client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_init_without_session_lands_on_auth() {
    let h = harness();
    assert_eq!(h.client.init().await, Page::Auth);
}

#[tokio::test]
async fn test_auth_listener_applies_sign_out() {
    let h = harness();
    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    h.client.listen_for_auth_events().await;

    h.backend.sign_out().await.unwrap();

    for _ in 0..50 {
        if !h.client.session().is_authenticated().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(!h.client.session().is_authenticated().await);
    assert_eq!(h.client.ui().page().await, Page::Auth);
}

#[tokio::test]
async fn test_pushed_sign_in_switches_user_and_profile() {
    let h = harness();
    let carol = h.seed("carol@example.com", "Carol", "Shaw").await;
    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    h.client.send_friend_request(carol.id).await.unwrap();
    let bob = h.seed("bob@example.com", "Bob", "Builder").await;
    h.client.listen_for_auth_events().await;

    h.backend.sign_in("bob@example.com", PASSWORD).await.unwrap();

    for _ in 0..50 {
        let current = h.client.session().current_session().await;
        if current.map(|s| s.user_id) == Some(bob.id) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let session = h.client.session().current_session().await.unwrap();
    let profile = h.client.session().current_profile().await.unwrap();
    assert_eq!(session.user_id, bob.id);
    assert_eq!(profile.id, session.user_id);
    assert_eq!(profile.first_name, "Bob");
    assert!(!h.client.store().has_outgoing_request(carol.id).await);
}

#[tokio::test]
async fn test_sign_in_over_existing_session_drops_previous_user_state() {
    let h = harness();
    let carol = h.seed("carol@example.com", "Carol", "Shaw").await;
    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    assert_eq!(
        h.client.send_friend_request(carol.id).await.unwrap(),
        RequestOutcome::Sent
    );
    h.client.search_users("carol").await.unwrap();
    assert_eq!(h.client.store().search_results().await.len(), 1);

    let bob = h.sign_in_as("bob@example.com", "Bob", "Builder").await;

    assert!(!h.client.store().has_outgoing_request(carol.id).await);
    assert!(h.client.store().search_results().await.is_empty());
    assert_eq!(h.client.session().current_profile().await.unwrap().id, bob.id);
    assert_eq!(h.client.ui().page().await, Page::Feed);
}

#[tokio::test]
async fn test_late_sign_out_event_does_not_end_new_session() {
    let h = harness();
    h.seed("ada@example.com", "Ada", "Lovelace").await;
    h.client.listen_for_auth_events().await;

    h.client.sign_in("ada@example.com", PASSWORD).await.unwrap();
    h.client.sign_out().await.unwrap();
    h.client.sign_in("ada@example.com", PASSWORD).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(h.client.session().is_authenticated().await);
    assert!(h.client.session().current_profile().await.is_some());
    assert_eq!(h.client.ui().page().await, Page::Feed);
}

// Feed, likes and posts

#[tokio::test]
async fn test_empty_feed_shows_create_post_prompt() {
    let h = harness();
    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;

    match h.client.page_view().await {
        PageView::Feed(feed) => {
            assert!(feed.posts.is_empty());
            assert_eq!(feed.empty_state.unwrap().action, Some(Action::CreatePost));
        }
        other => panic!("expected feed, got {:?}", other),
    }
    assert_eq!(h.client.ui().notice().await.unwrap().kind, NoticeKind::Success);
}

#[tokio::test]
async fn test_loading_posts_twice_replaces_slot() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    h.post_as(me.id, "one").await;
    h.client.load_posts().await.unwrap();
    let first = h.client.store().posts().await;

    h.backend.delete_post(first.items()[0].id, me.id).await.unwrap();
    h.post_as(me.id, "two").await;
    h.client.load_posts().await.unwrap();

    let second = h.client.store().posts().await;
    assert_eq!(second.len(), 1);
    assert_eq!(second.items()[0].content, "two");
    assert_eq!(second.generation(), first.generation() + 1);
}

#[tokio::test]
async fn test_like_reverts_when_remote_fails() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let post = h.post_as(me.id, "hello").await;
    h.client.load_posts().await.unwrap();
    h.faults.fail(BackendOp::AddLike).await;

    let err = h.client.toggle_like(post.id).await.unwrap_err();

    assert!(matches!(err, AppError::Remote(_)));
    assert!(!h.client.store().is_liked(post.id).await);
    assert_eq!(h.client.store().like_counts(post.id).await.0, Some(0));
    assert_eq!(
        h.client.ui().notice().await.unwrap().message,
        "Failed to update like"
    );
}

#[tokio::test]
async fn test_like_then_unlike() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let post = h.post_as(me.id, "hello").await;
    h.client.load_posts().await.unwrap();

    assert!(h.client.toggle_like(post.id).await.unwrap());
    assert_eq!(h.client.store().like_counts(post.id).await.0, Some(1));
    assert_eq!(h.backend.liked_post_ids(me.id).await.unwrap(), vec![post.id]);

    assert!(!h.client.toggle_like(post.id).await.unwrap());
    assert_eq!(h.client.store().like_counts(post.id).await.0, Some(0));
    assert!(h.backend.liked_post_ids(me.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_toggles_on_one_post_serialize() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let post = h.post_as(me.id, "hello").await;
    h.client.load_posts().await.unwrap();
    h.faults.delay(BackendOp::AddLike, Duration::from_millis(20)).await;

    let (first, second) = tokio::join!(
        h.client.toggle_like(post.id),
        h.client.toggle_like(post.id)
    );

    // One like, one unlike, in that order
    assert!(first.unwrap());
    assert!(!second.unwrap());
    assert!(!h.client.store().is_liked(post.id).await);
    assert_eq!(h.client.store().like_counts(post.id).await.0, Some(0));
}

#[tokio::test]
async fn test_like_requires_session() {
    let h = harness();
    let author = h.seed("ada@example.com", "Ada", "Lovelace").await;
    let post = h.post_as(author.id, "hello").await;

    let err = h.client.toggle_like(post.id).await.unwrap_err();

    assert_eq!(err.user_message(), "Please login to like posts");
    assert_eq!(h.metrics.calls(BackendOp::AddLike).await, 0);
}

#[tokio::test]
async fn test_create_post_with_media_draft() {
    let h = harness();
    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;

    let err = h.client.attach_post_media("ftp://x/y.png").await.unwrap_err();
    assert_eq!(err.user_message(), "URL must start with http:// or https://");
    assert!(h.client.create_post("   ").await.unwrap_err().is_validation());
    assert_eq!(h.metrics.calls(BackendOp::CreatePost).await, 0);

    h.client
        .attach_post_media("https://img.example.com/cat.png")
        .await
        .unwrap();
    let post = h.client.create_post("").await.unwrap();

    assert_eq!(post.media_url.as_deref(), Some("https://img.example.com/cat.png"));
    assert!(h.client.ui().drafts().await.post_media_url.is_none());
    assert_eq!(h.client.store().posts().await.len(), 1);
}

#[tokio::test]
async fn test_delete_post_refreshes_profile_posts() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    h.post_as(me.id, "keep").await;
    let doomed = h.post_as(me.id, "drop").await;
    h.client.navigate(Page::Profile).await;
    assert_eq!(h.client.store().profile_posts().await.len(), 2);

    h.client.delete_post(doomed.id).await.unwrap();

    let remaining = h.client.store().profile_posts().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining.items()[0].content, "keep");
}

// Comments

#[tokio::test]
async fn test_comment_delete_touches_only_that_post() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let a = h.post_as(me.id, "a").await;
    let b = h.post_as(me.id, "b").await;
    h.client.load_posts().await.unwrap();

    assert!(h.client.toggle_comments(a.id).await.unwrap());
    let keep = h.client.add_comment(a.id, "first").await.unwrap();
    let doomed = h.client.add_comment(a.id, "second").await.unwrap();
    h.client.add_comment(b.id, "other").await.unwrap();

    let before = h.client.store().posts().await;
    let count = |id| {
        before
            .items()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.comment_count)
    };
    assert_eq!(count(a.id), Some(2));
    assert_eq!(count(b.id), Some(1));

    h.client.delete_comment(a.id, doomed.id).await.unwrap();

    let comments = h.client.store().comments(a.id).await;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments.items()[0].id, keep.id);
    let after = h.client.store().posts().await;
    let count = |id| {
        after
            .items()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.comment_count)
    };
    assert_eq!(count(a.id), Some(1));
    assert_eq!(count(b.id), Some(1));
    assert_eq!(h.client.store().comments(b.id).await.len(), 1);
}

#[tokio::test]
async fn test_deleting_a_comment_twice_moves_count_once() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let post = h.post_as(me.id, "a").await;
    h.client.load_posts().await.unwrap();
    h.client.toggle_comments(post.id).await.unwrap();
    h.client.add_comment(post.id, "first").await.unwrap();
    let doomed = h.client.add_comment(post.id, "second").await.unwrap();

    h.client.delete_comment(post.id, doomed.id).await.unwrap();
    let again = h.client.delete_comment(post.id, doomed.id).await;

    assert!(matches!(again, Err(AppError::NotFound(_))));
    let posts = h.client.store().posts().await;
    assert_eq!(posts.items()[0].comment_count, 1);
    assert_eq!(h.client.store().comments(post.id).await.len(), 1);
}

#[tokio::test]
async fn test_cannot_delete_someone_elses_comment() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let bob = h.seed("bob@example.com", "Bob", "Builder").await;
    let post = h.post_as(me.id, "a").await;
    let theirs = h
        .backend
        .create_comment(NewComment {
            post_id: post.id,
            author_id: bob.id,
            content: "mine".to_string(),
        })
        .await
        .unwrap();
    h.client.load_posts().await.unwrap();
    h.client.toggle_comments(post.id).await.unwrap();

    let result = h.client.delete_comment(post.id, theirs.id).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(
        h.client.ui().notice().await.unwrap().message,
        "You can only delete your own comments"
    );
    assert_eq!(h.metrics.calls(BackendOp::DeleteComment).await, 0);
    assert_eq!(h.client.store().comments(post.id).await.len(), 1);
    assert_eq!(h.client.store().posts().await.items()[0].comment_count, 1);
    assert_eq!(h.backend.list_comments(post.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_blank_comment_rejected_locally() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let post = h.post_as(me.id, "a").await;

    let err = h.client.add_comment(post.id, "   ").await.unwrap_err();

    assert_eq!(err.user_message(), "Please write a comment");
    assert_eq!(h.metrics.calls(BackendOp::CreateComment).await, 0);
}

// Search

#[tokio::test(start_paused = true)]
async fn test_short_query_issues_no_lookup() {
    let h = harness();
    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;

    h.client.on_search_input(" a ").await;
    h.client.settle_search().await;
    h.client.search_users("b").await.unwrap();

    assert_eq!(h.metrics.calls(BackendOp::SearchProfiles).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_keystrokes_issue_one_lookup_with_final_query() {
    let h = harness();
    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    h.seed("bob@example.com", "Bob", "Builder").await;
    h.seed("bobby@example.com", "Bobby", "Tables").await;

    for input in ["b", "bo", "bob", "bobby"] {
        h.client.on_search_input(input).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    h.client.settle_search().await;

    assert_eq!(h.metrics.calls(BackendOp::SearchProfiles).await, 1);
    let results = h.client.store().search_results().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results.items()[0].first_name, "Bobby");
}

#[tokio::test(start_paused = true)]
async fn test_blank_input_cancels_pending_lookup() {
    let h = harness();
    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    h.seed("bob@example.com", "Bob", "Builder").await;

    h.client.on_search_input("bob").await;
    h.client.on_search_input("   ").await;
    h.client.settle_search().await;

    assert_eq!(h.metrics.calls(BackendOp::SearchProfiles).await, 0);
    assert!(h.client.store().search_results().await.is_empty());
}

#[tokio::test]
async fn test_search_excludes_self_and_respects_limit() {
    let mut config = Config::default();
    config.search.result_limit = 2;
    let h = harness_with(config);
    h.sign_in_as("sam1@example.com", "Sam", "One").await;
    for i in 2..6 {
        h.seed(&format!("sam{}@example.com", i), "Sam", &format!("N{}", i))
            .await;
    }

    h.client.search_users("SAM").await.unwrap();

    let results = h.client.store().search_results().await;
    assert_eq!(results.len(), 2);
    assert!(results.items().iter().all(|p| p.last_name != "One"));
}

// Friendships

#[tokio::test]
async fn test_friend_request_lifecycle() {
    let h = harness();
    let ada = h.seed("ada@example.com", "Ada", "Lovelace").await;
    let bob = h.sign_in_as("bob@example.com", "Bob", "Builder").await;

    // Ada asks Bob
    let request = h.backend.create_friendship(ada.id, bob.id).await.unwrap();
    h.backend
        .create_notification(NewNotification::from_sender(
            bob.id,
            NotificationType::FriendRequest,
            "Ada Lovelace sent you a friend request".to_string(),
            ada.id,
        ))
        .await
        .unwrap();
    h.client.load_notifications().await;
    h.client.load_friend_count().await;
    assert_eq!(h.client.store().unread_count().await, 1);
    assert_eq!(h.client.store().friend_count().await, Some(0));

    let accepted = h.client.accept_friend_request(request.id).await.unwrap();

    assert_eq!(accepted.status, FriendshipStatus::Accepted);
    assert_eq!(h.client.store().unread_count().await, 0);
    assert_eq!(h.client.store().friend_count().await, Some(1));
    assert!(h.client.store().friend_requests().await.is_empty());

    // Ada was told
    let ada_inbox = h.backend.list_notifications(ada.id, None).await.unwrap();
    assert_eq!(ada_inbox.len(), 1);
    assert_eq!(ada_inbox[0].kind, NotificationType::FriendAccept);

    // Accepted is terminal
    let err = h.client.reject_friend_request(request.id).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_only_target_may_answer_request() {
    let h = harness();
    let ada = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let bob = h.seed("bob@example.com", "Bob", "Builder").await;
    let request = h.backend.create_friendship(ada.id, bob.id).await.unwrap();

    let err = h.client.accept_friend_request(request.id).await.unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(h.metrics.calls(BackendOp::UpdateFriendshipStatus).await, 0);
    let row = h.backend.friendship_between(ada.id, bob.id).await.unwrap();
    assert_eq!(row.status, FriendshipStatus::Pending);
}

#[tokio::test]
async fn test_send_friend_request_outcomes() {
    let h = harness();
    let ada = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let bob = h.seed("bob@example.com", "Bob", "Builder").await;
    let eve = h.seed("eve@example.com", "Eve", "Evil").await;

    assert_eq!(
        h.client.send_friend_request(bob.id).await.unwrap(),
        RequestOutcome::Sent
    );
    assert!(h.client.store().has_outgoing_request(bob.id).await);
    let bob_inbox = h.backend.list_notifications(bob.id, None).await.unwrap();
    assert_eq!(bob_inbox[0].kind, NotificationType::FriendRequest);
    assert_eq!(bob_inbox[0].sender.as_ref().map(|s| s.id), Some(ada.id));

    assert_eq!(
        h.client.send_friend_request(bob.id).await.unwrap(),
        RequestOutcome::AlreadyPending
    );
    assert_eq!(
        h.client.ui().notice().await.unwrap().message,
        "Friend request already pending"
    );

    let declined = h.backend.create_friendship(eve.id, ada.id).await.unwrap();
    h.backend
        .update_friendship_status(declined.id, FriendshipStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(
        h.client.send_friend_request(eve.id).await.unwrap(),
        RequestOutcome::Declined
    );
    assert_eq!(h.metrics.calls(BackendOp::CreateFriendship).await, 1);
}

#[tokio::test]
async fn test_request_notification_failure_is_not_fatal() {
    let h = harness();
    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let bob = h.seed("bob@example.com", "Bob", "Builder").await;
    h.faults.fail(BackendOp::CreateNotification).await;

    let outcome = h.client.send_friend_request(bob.id).await.unwrap();

    assert_eq!(outcome, RequestOutcome::Sent);
    assert!(h.backend.list_notifications(bob.id, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_friends_tab_and_remove_friend() {
    let h = harness();
    let ada = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let bob = h.seed("bob@example.com", "Bob", "Builder").await;
    let row = h.backend.create_friendship(bob.id, ada.id).await.unwrap();
    h.backend
        .update_friendship_status(row.id, FriendshipStatus::Accepted)
        .await
        .unwrap();

    assert_eq!(h.client.navigate(Page::Search).await, Page::Search);
    assert_eq!(h.client.ui().search_tab().await, SearchTab::Users);
    h.client.switch_search_tab(SearchTab::Friends).await.unwrap();
    let friends = h.client.store().friends().await;
    assert_eq!(friends.len(), 1);
    assert_eq!(friends.items()[0].id, bob.id);

    h.client.remove_friend(bob.id).await.unwrap();

    assert!(h.client.store().friends().await.is_empty());
    assert_eq!(h.client.store().friend_count().await, Some(0));
}

#[tokio::test]
async fn test_users_tab_reruns_current_query() {
    let h = harness();
    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    h.seed("grace@example.com", "Grace", "Hopper").await;
    h.client.navigate(Page::Search).await;
    h.client.ui().set_search_query("grace").await;
    h.client.switch_search_tab(SearchTab::Friends).await.unwrap();
    assert!(h.client.store().search_results().await.is_empty());

    h.client.switch_search_tab(SearchTab::Users).await.unwrap();

    assert_eq!(h.metrics.calls(BackendOp::SearchProfiles).await, 1);
    assert_eq!(h.client.store().search_results().await.len(), 1);

    h.client.ui().set_search_query("").await;
    h.client.switch_search_tab(SearchTab::Users).await.unwrap();
    assert!(h.client.store().search_results().await.is_empty());
    assert_eq!(h.metrics.calls(BackendOp::SearchProfiles).await, 1);
}

// Notifications

#[tokio::test]
async fn test_mark_read_and_tabs() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    let bob = h.seed("bob@example.com", "Bob", "Builder").await;
    for kind in [NotificationType::Like, NotificationType::FriendRequest] {
        h.backend
            .create_notification(NewNotification::from_sender(
                me.id,
                kind,
                format!("{} from Bob", kind.as_str()),
                bob.id,
            ))
            .await
            .unwrap();
    }
    h.client.navigate(Page::Notifications).await;
    assert_eq!(h.client.store().unread_count().await, 2);

    let newest = h.client.store().notifications().await.items()[0].id;
    h.client.mark_notification_read(newest).await.unwrap();
    assert_eq!(h.client.store().unread_count().await, 1);

    h.client
        .switch_notifications_tab(NotificationsTab::Unread)
        .await;
    assert_eq!(h.client.notifications_view().await.items.len(), 1);

    h.client.mark_all_notifications_read().await.unwrap();
    let view = h.client.notifications_view().await;
    assert_eq!(view.unread, 0);
    assert!(view.badge.is_none());
    assert!(view.items.is_empty());
    assert!(view.empty_state.is_some());
}

#[tokio::test]
async fn test_failed_load_keeps_previous_slot() {
    let h = harness();
    let me = h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    h.post_as(me.id, "hello").await;
    h.client.load_posts().await.unwrap();
    h.faults.fail(BackendOp::ListPosts).await;

    assert!(h.client.load_posts().await.is_err());

    assert_eq!(h.client.store().posts().await.len(), 1);
    let notice = h.client.ui().notice().await.unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, "Failed to load posts");
}

// Profile and navigation

#[tokio::test]
async fn test_update_profile_applies_defaults_and_avatar_draft() {
    let h = harness();
    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    h.client
        .stage_avatar("https://img.example.com/ada.png")
        .await
        .unwrap();

    let profile = h
        .client
        .update_profile(ProfileForm {
            first_name: "Augusta".to_string(),
            last_name: "King".to_string(),
            bio: Some("  ".to_string()),
            website: Some("https://ada.dev".to_string()),
            phone: None,
        })
        .await
        .unwrap();

    assert_eq!(profile.first_name, "Augusta");
    assert_eq!(profile.bio.as_deref(), Some(DEFAULT_BIO));
    assert_eq!(profile.avatar_url.as_deref(), Some("https://img.example.com/ada.png"));
    assert!(h.client.ui().drafts().await.avatar_url.is_none());
    assert_eq!(h.client.session().current_profile().await, Some(profile));
}

#[tokio::test]
async fn test_navigation_guards_and_fallback() {
    let h = harness();
    let author = h.seed("grace@example.com", "Grace", "Hopper").await;
    h.post_as(author.id, "public").await;

    assert_eq!(h.client.navigate(Page::Feed).await, Page::Feed);
    assert_eq!(h.client.store().posts().await.len(), 1);
    assert!(h.client.store().liked_posts().await.is_empty());
    assert_eq!(h.client.navigate(Page::Profile).await, Page::Auth);
    assert_eq!(h.client.navigate(Page::Notifications).await, Page::Auth);

    h.sign_in_as("ada@example.com", "Ada", "Lovelace").await;
    assert_eq!(h.client.navigate_to("settings").await, Page::Feed);
    assert_eq!(h.client.navigate_to("profile").await, Page::Profile);

    match h.client.page_view().await {
        PageView::Profile(view) => {
            assert_eq!(view.display_name, "Ada Lovelace");
            assert_eq!(view.post_count, 0);
            assert_eq!(view.friend_count, 0);
        }
        other => panic!("expected profile, got {:?}", other),
    }
}
