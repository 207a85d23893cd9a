//! End-to-end tests of the REST adapter and the stores
//!
//! Every test starts its own in-memory backend on an ephemeral port.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use std::time::Duration;

use anyhow::Result;
use blog_core::{
    CommentApi, DomainError, ImageSource, PostApi, PostDraft, PostId, ReactionKind, UserId,
};
use blog_sync::ProfileUpdate;
use integration_tests::{
    context, get_json, png, seed_blog, signed_in, signup_form, FakeBackend, ADA_EMAIL,
    GRACE_EMAIL, PASSWORD,
};

/// Wait until the backend has received `calls` reaction requests
async fn wait_for_react_calls(backend: &FakeBackend, calls: usize) {
    while backend.react_calls() < calls {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_login_loads_profile() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 0);

    let ctx = signed_in(&backend, ADA_EMAIL, PASSWORD).await?;

    let user = ctx.session().user().expect("signed in");
    assert_eq!(user.id, UserId::from(seeded.ada.as_str()));
    assert_eq!(user.username, "Ada Lovelace");
    assert_eq!(user.email.as_deref(), Some(ADA_EMAIL));
    assert!(ctx.session().token().is_some());
    Ok(())
}

#[tokio::test]
async fn test_login_with_wrong_password() -> Result<()> {
    let backend = FakeBackend::start().await?;
    seed_blog(&backend, 0);
    let ctx = context(&backend)?;

    let result = ctx.auth().login(ADA_EMAIL, "not-the-password").await;

    assert_eq!(result, Err(DomainError::Unauthenticated));
    assert!(!ctx.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_signup_then_duplicate_email() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let ctx = context(&backend)?;

    let user = ctx
        .auth()
        .signup(&signup_form("Linus", "Torvalds", "linus@example.com"))
        .await?;
    assert_eq!(user.username, "Linus Torvalds");
    assert_eq!(ctx.session().current_user_id(), Some(user.id));

    let err = context(&backend)?
        .auth()
        .signup(&signup_form("Linus", "Again", "linus@example.com"))
        .await
        .unwrap_err();
    let DomainError::Validation(fields) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(fields.first("email"), Some("email already exists"));
    Ok(())
}

#[tokio::test]
async fn test_profile_update_and_picture() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 0);
    let ctx = signed_in(&backend, ADA_EMAIL, PASSWORD).await?;
    let auth = ctx.auth();

    assert_eq!(
        auth.update_profile(Some("Ada Lovelace"), Some(ADA_EMAIL)).await?,
        ProfileUpdate::Unchanged
    );

    let ProfileUpdate::Updated(user) = auth.update_profile(Some("Ada King"), None).await? else {
        panic!("expected an update");
    };
    assert_eq!(user.username, "Ada King");
    assert_eq!(
        ctx.session().user().map(|u| u.username).as_deref(),
        Some("Ada King")
    );

    let public = get_json(&backend, &format!("/users/{}/profile", seeded.ada)).await?;
    assert_eq!(public["username"], "Ada King");
    assert!(public.get("email").is_none());

    let user = auth.upload_profile_picture(&png("me.png")).await?;
    assert_eq!(user.profile_picture_url.as_deref(), Some("/uploads/me.png"));
    Ok(())
}

#[tokio::test]
async fn test_public_profile() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 0);
    let auth = context(&backend)?.auth();

    let grace = auth.public_profile(&UserId::from(seeded.grace.as_str())).await?;
    assert_eq!(grace.username, "Grace Hopper");
    assert!(grace.email.is_none());

    assert!(matches!(
        auth.public_profile(&UserId::from("missing")).await,
        Err(DomainError::NotFound(_))
    ));
    Ok(())
}

// ============================================================================
// Post Tests
// ============================================================================

#[tokio::test]
async fn test_post_listing_pages() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 7);
    let board = context(&backend)?.post_board();

    let page = board.load(String::new()).await?;
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_items, 7);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items[0].id, PostId::from(seeded.posts[0].as_str()));
    assert_eq!(
        page.items[0].author.as_ref().map(|a| a.username.as_str()),
        Some("Ada Lovelace")
    );
    assert!(page.items[0].image_url.is_none());

    let last = board.go_to_page(3).await?;
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.page_number, 3);

    assert_eq!(
        board.go_to_page(4).await,
        Err(DomainError::InvalidPage {
            requested: 4,
            total_pages: 3
        })
    );
    assert_eq!(board.snapshot(), last);
    Ok(())
}

#[tokio::test]
async fn test_search_posts() -> Result<()> {
    let backend = FakeBackend::start().await?;
    seed_blog(&backend, 7);
    let board = context(&backend)?.post_board();
    board.load(String::new()).await?;

    let page = board.search("NUMBER 6").await?;

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "Post number 6");
    assert_eq!(page.total_pages, 1);

    let page = board.search("nothing like this").await?;
    assert!(page.is_empty());
    assert_eq!(page.total_pages, 1);
    Ok(())
}

#[tokio::test]
async fn test_author_posts_use_server_total_pages() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 7);
    let board = context(&backend)?.author_posts();

    let page = board.load(UserId::from(seeded.ada.as_str())).await?;

    assert_eq!(page.total_items, 4);
    assert_eq!(page.total_pages, 2);
    assert!(page
        .items
        .iter()
        .all(|post| post.author.as_ref().map(|a| a.id.as_str()) == Some(seeded.ada.as_str())));
    Ok(())
}

#[tokio::test]
async fn test_create_edit_delete_post() -> Result<()> {
    let backend = FakeBackend::start().await?;
    seed_blog(&backend, 4);
    let ctx = signed_in(&backend, ADA_EMAIL, PASSWORD).await?;
    let board = ctx.post_board();
    board.load(String::new()).await?;
    board.go_to_page(2).await?;

    let draft = PostDraft::new("Analytical engines", "Notes on note G")
        .with_image(ImageSource::Upload(png("engine.png")));
    let post = board.create_post(&draft).await?;
    assert_eq!(post.image_url.as_deref(), Some("/uploads/engine.png"));
    assert_eq!(backend.post_count(), 5);
    let page = board.snapshot();
    assert_eq!(page.page_number, 1);
    assert_eq!(page.items[0].id, post.id);
    assert!(board.can_modify(&page.items[0]));

    let edited = board
        .update_post(
            &post.id,
            &PostDraft::new("Analytical engines, revised", "Notes on note G")
                .with_image(ImageSource::Url("https://example.com/g.png".to_string())),
        )
        .await?;
    assert_eq!(edited.title, "Analytical engines, revised");
    assert_eq!(edited.image_url.as_deref(), Some("https://example.com/g.png"));
    assert_eq!(board.snapshot().items[0].title, "Analytical engines, revised");

    board.delete_post(&post.id).await?;
    assert_eq!(backend.post_count(), 4);
    assert!(board.feed().find(&post.id).is_none());
    assert_eq!(board.snapshot().total_items, 4);
    Ok(())
}

#[tokio::test]
async fn test_only_author_may_change_post() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 2);
    let ctx = signed_in(&backend, ADA_EMAIL, PASSWORD).await?;
    let board = ctx.post_board();
    board.load(String::new()).await?;
    // newest post is the second one, written by Grace
    let graces = PostId::from(seeded.posts[0].as_str());

    let draft = PostDraft::new("Hijacked", "content");
    assert_eq!(
        board.update_post(&graces, &draft).await,
        Err(DomainError::NotAuthor)
    );
    assert_eq!(board.delete_post(&graces).await, Err(DomainError::NotAuthor));

    // the server enforces the same rule when the local guard is bypassed
    let err = ctx.client().update_post(&graces, &draft).await.unwrap_err();
    assert!(matches!(err, DomainError::Fetch { status: Some(403), .. }));
    assert_eq!(backend.post_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_server_side_validation_and_auth() -> Result<()> {
    let backend = FakeBackend::start().await?;
    seed_blog(&backend, 0);

    let anonymous = context(&backend)?;
    assert_eq!(
        anonymous
            .client()
            .create_post(&PostDraft::new("Title", "Body"))
            .await,
        Err(DomainError::Unauthenticated)
    );

    let ctx = signed_in(&backend, ADA_EMAIL, PASSWORD).await?;
    let err = ctx
        .client()
        .create_post(&PostDraft::new("   ", "Body"))
        .await
        .unwrap_err();
    let DomainError::Validation(fields) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(fields.general(), ["title should not be empty".to_string()]);
    assert_eq!(backend.post_count(), 0);
    Ok(())
}

// ============================================================================
// Reaction Tests
// ============================================================================

#[tokio::test]
async fn test_toggle_is_optimistic_then_confirmed() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 1);
    let post = seeded.posts[0].clone();
    backend.set_reaction(&post, &seeded.ada, "like");

    let ctx = signed_in(&backend, GRACE_EMAIL, PASSWORD).await?;
    let board = ctx.post_board();
    board.load(String::new()).await?;
    let id = PostId::from(post.as_str());
    let before = board.tally(&id).expect("tracked");
    assert_eq!(before.count(ReactionKind::Like), 1);
    assert_eq!(before.user_reaction(), None);

    let gate = backend.hold_reactions();
    let (confirmed, ()) = tokio::join!(board.toggle_reaction(&id, ReactionKind::Love), async {
        wait_for_react_calls(&backend, 1).await;

        let optimistic = board.tally(&id).expect("tracked");
        assert_eq!(optimistic.count(ReactionKind::Love), 1);
        assert_eq!(optimistic.count(ReactionKind::Like), 1);
        assert_eq!(optimistic.user_reaction(), Some(ReactionKind::Love));
        assert!(board.reactions().is_in_flight(&id));
        assert_eq!(
            board.toggle_reaction(&id, ReactionKind::Like).await,
            Err(DomainError::AlreadyInFlight(id.clone()))
        );

        gate.notify_one();
    });

    let confirmed = confirmed?;
    assert_eq!(confirmed.user_reaction(), Some(ReactionKind::Love));
    assert_eq!(confirmed.total(), 2);
    assert_eq!(board.tally(&id), Some(confirmed));
    assert!(!board.reactions().is_in_flight(&id));
    assert_eq!(backend.react_calls(), 1);
    assert_eq!(backend.reaction_counts(&post).get("love"), Some(&1));
    Ok(())
}

#[tokio::test]
async fn test_toggle_same_kind_removes_reaction() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 1);
    let post = seeded.posts[0].clone();
    backend.set_reaction(&post, &seeded.ada, "haha");

    let ctx = signed_in(&backend, ADA_EMAIL, PASSWORD).await?;
    let board = ctx.post_board();
    board.load(String::new()).await?;
    let id = PostId::from(post.as_str());

    let tally = board.toggle_reaction(&id, ReactionKind::Haha).await?;

    assert!(tally.is_empty());
    assert_eq!(tally.user_reaction(), None);
    assert!(backend.reaction_counts(&post).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_toggle_rolls_back() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 1);
    let post = seeded.posts[0].clone();
    backend.set_reaction(&post, &seeded.grace, "sad");
    backend.fail_reactions(true);

    let ctx = signed_in(&backend, GRACE_EMAIL, PASSWORD).await?;
    let board = ctx.post_board();
    board.load(String::new()).await?;
    let id = PostId::from(post.as_str());
    let before = board.tally(&id);

    let err = board
        .toggle_reaction(&id, ReactionKind::Wow)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Fetch { status: Some(500), .. }));
    assert_eq!(board.tally(&id), before);
    assert!(!board.reactions().is_in_flight(&id));
    assert_eq!(backend.reaction_counts(&post).get("sad"), Some(&1));
    Ok(())
}

#[tokio::test]
async fn test_anonymous_toggle_never_reaches_server() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 1);
    let board = context(&backend)?.post_board();
    board.load(String::new()).await?;
    let id = PostId::from(seeded.posts[0].as_str());

    assert_eq!(
        board.toggle_reaction(&id, ReactionKind::Like).await,
        Err(DomainError::Unauthenticated)
    );
    assert_eq!(backend.react_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_boards_share_reaction_state() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 3);
    let ctx = signed_in(&backend, ADA_EMAIL, PASSWORD).await?;
    let home = ctx.post_board();
    let profile = ctx.author_posts();
    home.load(String::new()).await?;
    profile.load(UserId::from(seeded.ada.as_str())).await?;
    let mut changes = ctx.reactions().subscribe();
    // oldest post, written by Ada, shows on both boards
    let id = PostId::from(seeded.posts[2].as_str());

    let tally = home.toggle_reaction(&id, ReactionKind::Angry).await?;

    assert_eq!(profile.tally(&id), Some(tally.clone()));
    let optimistic = changes.recv().await?;
    assert_eq!(optimistic.post_id, id);
    let confirmed = changes.recv().await?;
    assert_eq!(confirmed.tally, tally);
    Ok(())
}

// ============================================================================
// Comment Tests
// ============================================================================

#[tokio::test]
async fn test_comment_thread_load_more_and_add() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 1);
    let post = seeded.posts[0].clone();
    for i in 1..=5 {
        backend.add_comment(&post, &seeded.ada, &format!("Comment {i}"));
    }

    let ctx = signed_in(&backend, GRACE_EMAIL, PASSWORD).await?;
    let thread = ctx.comment_thread();
    let page = thread.open(PostId::from(post.as_str())).await?;
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items[0].content, "Comment 5");

    thread.load_more().await?;
    let page = thread.load_more().await?;
    assert_eq!(page.items.len(), 5);
    assert!(!page.has_more());
    assert_eq!(thread.load_more().await?, page);

    let comment = thread.add_comment("Lovely notes").await?;
    assert_eq!(comment.post_id, PostId::from(post.as_str()));
    let page = thread.snapshot();
    assert_eq!(page.page_number, 1);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, comment.id);
    assert_eq!(page.total_items, 6);
    assert_eq!(backend.comment_count(&post), 6);
    Ok(())
}

#[tokio::test]
async fn test_edit_and_delete_own_comment() -> Result<()> {
    let backend = FakeBackend::start().await?;
    let seeded = seed_blog(&backend, 1);
    let post = seeded.posts[0].clone();
    backend.add_comment(&post, &seeded.grace, "Grace was here");
    backend.add_comment(&post, &seeded.ada, "First draft");

    let ctx = signed_in(&backend, ADA_EMAIL, PASSWORD).await?;
    let thread = ctx.comment_thread();
    let page = thread.open(PostId::from(post.as_str())).await?;
    let mine = page.items[0].clone();
    let graces = page.items[1].clone();

    let edited = thread.edit_comment(&mine.id, "Second draft").await?;
    assert_eq!(edited.content, "Second draft");
    assert!(edited.updated_at.is_some());
    assert_eq!(thread.snapshot().items[0].content, "Second draft");
    let stored = ctx.client().get_comment(&mine.id).await?;
    assert_eq!(stored.content, "Second draft");

    assert_eq!(
        thread.delete_comment(&graces.id).await,
        Err(DomainError::NotAuthor)
    );
    // bypassing the guard gets a 403 from the server
    assert!(matches!(
        ctx.client().delete_comment(&graces.id).await,
        Err(DomainError::Fetch { status: Some(403), .. })
    ));

    thread.delete_comment(&mine.id).await?;
    let page = thread.snapshot();
    assert_eq!(page.items, vec![graces]);
    assert_eq!(page.total_items, 1);
    assert_eq!(backend.comment_count(&post), 1);
    Ok(())
}
