// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end dialogue scenarios over a temp SQLite store and mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use reelsmith_core::types::AspectRatio;
use reelsmith_core::{
    Effect, Event, JobId, JobKind, JobPayload, JobStatus, JobStore, Step, TerminalResult,
    Workflow,
};
use reelsmith_dialogue::Dispatcher;
use reelsmith_test_utils::{MockChannel, TestHarness};
use tokio_util::sync::CancellationToken;

const USER: &str = "1001";

fn logo_dialogue() -> Vec<Event> {
    vec![
        Event::Start(Workflow::Logo),
        Event::Text("Programming".into()),
        Event::Text("Minimal laptop icon".into()),
    ]
}

fn finished(effect: &Effect) -> (JobId, &TerminalResult, bool) {
    match effect {
        Effect::JobFinished {
            job_id,
            outcome,
            unrecorded,
            ..
        } => (*job_id, outcome, *unrecorded),
        other => panic!("expected JobFinished, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_with_malformed_metadata_falls_back_to_topic() {
    let h = TestHarness::new().await.unwrap();
    h.text.push_response("{\"title\": \"broken").await;
    let video = h.video_artifact("lesson.mp4").unwrap();

    let effect = h
        .send_all(
            USER,
            vec![
                Event::Start(Workflow::Upload),
                Event::Text("Intro to sorting algorithms".into()),
                Event::File(video.clone()),
            ],
        )
        .await;

    let (job_id, outcome, unrecorded) = finished(&effect);
    assert_eq!(outcome, &TerminalResult::Success("abc123".into()));
    assert!(!unrecorded);

    let job = h.job(job_id).await.unwrap().expect("job exists");
    assert_eq!(job.kind, JobKind::Video);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.result.as_deref(), Some("abc123"));
    assert_eq!(job.note, None);
    match &job.payload {
        JobPayload::Video {
            title,
            tags,
            thumbnail_path,
            ..
        } => {
            assert_eq!(title.as_deref(), Some("Intro to sorting algorithms"));
            assert_eq!(tags, &vec!["youtube".to_string(), "video".to_string()]);
            assert!(thumbnail_path.is_some());
        }
        other => panic!("expected video payload, got {other:?}"),
    }

    let uploads = h.videos.uploads().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, video);
    assert_eq!(uploads[0].1.title, "Intro to sorting algorithms");
    assert!(uploads[0].1.description.ends_with("\n\n#youtube #video"));

    let attached = h.videos.thumbnails().await;
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].0, "abc123");

    assert!(!video.path.exists(), "uploaded video is removed");
    assert!(!attached[0].1.path.exists(), "attached thumbnail is removed");

    assert!(h.state(USER).await.unwrap().is_idle());
}

#[tokio::test]
async fn logo_reject_creates_no_job() {
    let h = TestHarness::new().await.unwrap();

    let effect = h.send_all(USER, logo_dialogue()).await;
    assert_eq!(
        effect,
        Effect::ConfirmationRequested {
            workflow: Workflow::Logo,
            description: "Programming".into(),
            style: "Minimal laptop icon".into(),
        }
    );

    assert_eq!(h.send(USER, Event::Reject).await, Effect::Rejected);
    assert!(h.state(USER).await.unwrap().is_idle());
    assert!(h.jobs_of(USER).await.unwrap().is_empty());
    assert!(h.images.requests().await.is_empty());
}

#[tokio::test]
async fn confirmed_logo_completes_with_result_url() {
    let h = TestHarness::new().await.unwrap();
    h.send_all(USER, logo_dialogue()).await;

    let effect = h.send(USER, Event::Confirm).await;
    let (job_id, outcome, _) = finished(&effect);
    assert!(outcome.is_success());

    let job = h.job(job_id).await.unwrap().expect("job exists");
    assert_eq!(job.kind, JobKind::Logo);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(
        job.result.as_deref(),
        Some("https://images.example/generated.png")
    );

    let requests = h.images.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].aspect_ratio, AspectRatio::Portrait);
    assert!(requests[0].prompt.starts_with("Theme: Programming, Description: Minimal laptop icon."));
}

#[tokio::test]
async fn banner_timeout_fails_the_job() {
    let h = TestHarness::builder()
        .with_image_outcome(TerminalResult::Failure(
            "timeout: task still running after 60 polls".into(),
        ))
        .build()
        .await
        .unwrap();

    let effect = h
        .send_all(
            USER,
            vec![
                Event::Start(Workflow::Banner),
                Event::Text("Cooking".into()),
                Event::Text("Chef Anna".into()),
                Event::Confirm,
            ],
        )
        .await;
    let (job_id, outcome, _) = finished(&effect);
    assert!(!outcome.is_success());

    let job = h.job(job_id).await.unwrap().expect("job exists");
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.note.as_deref().is_some_and(|n| n.contains("timeout")));
    assert_eq!(h.images.requests().await[0].aspect_ratio, AspectRatio::Wide);
    assert!(h.state(USER).await.unwrap().is_idle());
}

#[tokio::test]
async fn second_confirm_while_running_is_busy() {
    let h = Arc::new(
        TestHarness::builder()
            .with_gated_images()
            .build()
            .await
            .unwrap(),
    );
    let gate = h.gate.clone().expect("gated harness");
    h.send_all(USER, logo_dialogue()).await;

    let first = {
        let h = Arc::clone(&h);
        tokio::spawn(async move { h.send(USER, Event::Confirm).await })
    };
    gate.entered.notified().await;

    assert!(h.orchestrator.is_busy(&reelsmith_core::UserId(USER.into())));
    assert_eq!(h.send(USER, Event::Confirm).await, Effect::Busy);
    assert_eq!(h.send(USER, Event::Start(Workflow::Seo)).await, Effect::Busy);
    let stray = h.video_artifact("stray.mp4").unwrap();
    assert_eq!(h.send(USER, Event::File(stray.clone())).await, Effect::Busy);
    assert!(!stray.path.exists());

    // Other users are unaffected.
    assert_eq!(
        h.send("2002", Event::Start(Workflow::Seo)).await,
        Effect::Prompt {
            workflow: Workflow::Seo,
            step: Step::TopicPending
        }
    );

    gate.release.notify_one();
    let effect = first.await.unwrap();
    finished(&effect);

    assert_eq!(h.jobs_of(USER).await.unwrap().len(), 1);
    assert_eq!(h.send(USER, Event::Home).await, Effect::Menu { connected: false });
}

#[tokio::test]
async fn replay_after_failure_creates_a_fresh_job() {
    let h = TestHarness::builder()
        .with_image_outcome(TerminalResult::Failure("GENERATE_FAILED".into()))
        .build()
        .await
        .unwrap();

    h.send_all(USER, logo_dialogue()).await;
    let (failed_id, _, _) = finished(&h.send(USER, Event::Confirm).await);
    let failed_before = h.job(failed_id).await.unwrap().expect("failed job");

    h.images
        .set_outcome(TerminalResult::Success("https://images.example/2.png".into()))
        .await;
    h.send_all(USER, logo_dialogue()).await;
    let confirm_reply = h.send(USER, Event::Confirm).await;
    let (second_id, outcome, _) = finished(&confirm_reply);

    assert_ne!(failed_id, second_id);
    assert!(outcome.is_success());
    assert_eq!(h.job(failed_id).await.unwrap(), Some(failed_before));
    assert_eq!(h.jobs_of(USER).await.unwrap().len(), 2);
}

#[tokio::test]
async fn blank_text_reprompts_without_advancing() {
    let h = TestHarness::new().await.unwrap();
    h.send(USER, Event::Start(Workflow::Banner)).await;
    let before = h.state(USER).await.unwrap();

    let effect = h.send(USER, Event::Text("   ".into())).await;
    assert_eq!(
        effect,
        Effect::EmptyInput {
            step: Step::DescriptionPending
        }
    );
    assert_eq!(h.state(USER).await.unwrap(), before);
}

#[tokio::test]
async fn cancel_discards_collected_fields() {
    let h = TestHarness::new().await.unwrap();
    h.send_all(
        USER,
        vec![Event::Start(Workflow::Logo), Event::Text("Programming".into())],
    )
    .await;
    assert!(!h.state(USER).await.unwrap().fields.is_empty());

    assert_eq!(h.send(USER, Event::Cancel).await, Effect::Cancelled);
    let state = h.state(USER).await.unwrap();
    assert!(state.is_idle());
    assert!(state.fields.is_empty());
    assert!(h.jobs_of(USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn seo_answers_directly_without_a_job() {
    let h = TestHarness::builder().with_language("uz").build().await.unwrap();
    h.text
        .push_response(r#"{"title": "Rust in 10 minutes", "description": "Fast intro", "tags": ["rust", "programming"]}"#)
        .await;

    let effect = h
        .send_all(
            USER,
            vec![Event::Start(Workflow::Seo), Event::Text("Rust basics".into())],
        )
        .await;
    match effect {
        Effect::SeoReady { topic, metadata } => {
            assert_eq!(topic, "Rust basics");
            assert_eq!(metadata.title, "Rust in 10 minutes");
            assert_eq!(metadata.tags, vec!["rust", "programming"]);
        }
        other => panic!("expected SeoReady, got {other:?}"),
    }
    assert_eq!(
        h.text.calls().await,
        vec![("Rust basics".to_string(), "uz".to_string())]
    );
    assert!(h.jobs_of(USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn seo_generator_error_is_reported() {
    let h = TestHarness::new().await.unwrap();
    h.text.push_error("quota exceeded").await;

    let effect = h
        .send_all(
            USER,
            vec![Event::Start(Workflow::Seo), Event::Text("Rust basics".into())],
        )
        .await;
    assert!(matches!(effect, Effect::SeoFailed { reason } if reason.contains("quota exceeded")));
    assert!(h.state(USER).await.unwrap().is_idle());
}

#[tokio::test]
async fn create_failure_aborts_before_external_work() {
    let h = TestHarness::new().await.unwrap();
    h.send_all(USER, logo_dialogue()).await;
    h.jobs.fail_create(true);

    let effect = h.send(USER, Event::Confirm).await;
    assert!(matches!(effect, Effect::Aborted { .. }), "got {effect:?}");
    assert!(h.images.requests().await.is_empty());
    assert!(h.jobs_of(USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn processing_update_failure_fails_the_draft() {
    let h = TestHarness::new().await.unwrap();
    h.jobs.fail_processing_updates(true);
    let video = h.video_artifact("clip.mp4").unwrap();

    let effect = h
        .send_all(
            USER,
            vec![
                Event::Start(Workflow::Upload),
                Event::Text("Cooking pasta".into()),
                Event::File(video.clone()),
            ],
        )
        .await;
    assert!(matches!(effect, Effect::Aborted { .. }), "got {effect:?}");
    assert!(h.videos.uploads().await.is_empty());
    assert!(!video.path.exists());

    let jobs = h.jobs_of(USER).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Failed);
    assert!(jobs[0].note.as_deref().is_some_and(|n| n.contains("job update failed")));
}

#[tokio::test]
async fn update_failure_after_success_is_flagged() {
    let h = TestHarness::new().await.unwrap();
    h.send_all(USER, logo_dialogue()).await;
    h.jobs.fail_terminal_updates(true);

    let effect = h.send(USER, Event::Confirm).await;
    let (job_id, outcome, unrecorded) = finished(&effect);
    assert!(outcome.is_success());
    assert!(unrecorded);

    let job = h.job(job_id).await.unwrap().expect("job exists");
    assert_eq!(job.status, JobStatus::Processing);
}

#[tokio::test]
async fn thumbnail_attach_failure_completes_with_note() {
    let h = TestHarness::new().await.unwrap();
    h.videos.fail_attach("thumbnails disabled for this channel").await;
    let video = h.video_artifact("clip.mp4").unwrap();

    let effect = h
        .send_all(
            USER,
            vec![
                Event::Start(Workflow::Upload),
                Event::Text("Cooking pasta".into()),
                Event::File(video),
            ],
        )
        .await;
    let (job_id, outcome, _) = finished(&effect);
    assert!(outcome.is_success());

    let job = h.job(job_id).await.unwrap().expect("job exists");
    assert_eq!(job.status, JobStatus::Completed);
    assert!(
        job.note
            .as_deref()
            .is_some_and(|n| n.contains("thumbnails disabled"))
    );
}

#[tokio::test]
async fn thumbnail_render_failure_still_uploads() {
    let h = TestHarness::builder()
        .with_failing_thumbnails()
        .build()
        .await
        .unwrap();
    let video = h.video_artifact("clip.mp4").unwrap();

    let effect = h
        .send_all(
            USER,
            vec![
                Event::Start(Workflow::Upload),
                Event::Text("Cooking pasta".into()),
                Event::File(video),
            ],
        )
        .await;
    let (job_id, outcome, _) = finished(&effect);
    assert!(outcome.is_success());
    assert!(h.videos.thumbnails().await.is_empty());
    let job = h.job(job_id).await.unwrap().expect("job exists");
    assert_eq!(job.note.as_deref(), Some("thumbnail not rendered"));
}

#[tokio::test]
async fn metadata_failure_fails_the_draft_without_uploading() {
    let h = TestHarness::new().await.unwrap();
    h.text.push_error("connection reset").await;
    let video = h.video_artifact("clip.mp4").unwrap();

    let effect = h
        .send_all(
            USER,
            vec![
                Event::Start(Workflow::Upload),
                Event::Text("Cooking pasta".into()),
                Event::File(video),
            ],
        )
        .await;
    let (job_id, outcome, _) = finished(&effect);
    assert!(!outcome.is_success());
    assert!(h.videos.uploads().await.is_empty());

    let job = h.job(job_id).await.unwrap().expect("job exists");
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.note.as_deref().is_some_and(|n| n.contains("connection reset")));
}

#[tokio::test]
async fn failed_upload_is_recorded() {
    let h = TestHarness::builder()
        .with_video_outcome(TerminalResult::Failure("upload rejected: 403".into()))
        .build()
        .await
        .unwrap();
    let video = h.video_artifact("clip.mp4").unwrap();

    let effect = h
        .send_all(
            USER,
            vec![
                Event::Start(Workflow::Upload),
                Event::Text("Cooking pasta".into()),
                Event::File(video),
            ],
        )
        .await;
    let (job_id, _, _) = finished(&effect);
    let job = h.job(job_id).await.unwrap().expect("job exists");
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.note.as_deref(), Some("upload rejected: 403"));
    assert!(h.videos.thumbnails().await.is_empty());
}

#[tokio::test]
async fn profile_reports_job_counts() {
    let h = TestHarness::new().await.unwrap();
    h.send_all(USER, logo_dialogue()).await;
    h.send(USER, Event::Confirm).await;

    match h.send(USER, Event::Profile).await {
        Effect::Profile { user, counts } => {
            assert_eq!(user.id.0, USER);
            assert!(!user.connected);
            assert_eq!(counts.total, 1);
            assert_eq!(counts.completed, 1);
            assert_eq!(counts.failed, 0);
        }
        other => panic!("expected Profile, got {other:?}"),
    }
}

#[tokio::test]
async fn dispatcher_delivers_effects_per_chat() {
    let h = TestHarness::new().await.unwrap();
    let channel = Arc::new(MockChannel::new());
    let dispatcher = Dispatcher::new(channel.clone(), Arc::clone(&h.orchestrator))
        .with_drain_timeout(Duration::from_secs(5));

    let cancel = CancellationToken::new();
    let run = {
        let cancel = cancel.clone();
        tokio::spawn(async move { dispatcher.run(cancel).await })
    };

    channel.inject("a", Event::Home).await;
    channel.inject("b", Event::Start(Workflow::Seo)).await;
    let sent = channel.wait_for_sent(2).await;

    let to_a = sent.iter().find(|m| m.chat_id == "a").expect("reply to a");
    assert_eq!(to_a.effect, Effect::Menu { connected: false });
    let to_b = sent.iter().find(|m| m.chat_id == "b").expect("reply to b");
    assert_eq!(
        to_b.effect,
        Effect::Prompt {
            workflow: Workflow::Seo,
            step: Step::TopicPending
        }
    );

    cancel.cancel();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn dispatcher_stops_when_channel_closes() {
    let h = TestHarness::new().await.unwrap();
    let channel = Arc::new(MockChannel::new());
    let dispatcher = Dispatcher::new(channel.clone(), Arc::clone(&h.orchestrator));

    channel.inject("a", Event::Home).await;
    channel.close();

    tokio::time::timeout(Duration::from_secs(5), dispatcher.run(CancellationToken::new()))
        .await
        .expect("dispatcher should stop on its own")
        .unwrap();
    assert_eq!(channel.sent_count().await, 1);
}

#[tokio::test]
async fn file_outside_the_upload_step_is_deleted() {
    let h = TestHarness::new().await.unwrap();
    let idle = h.video_artifact("idle.mp4").unwrap();
    assert_eq!(h.send(USER, Event::File(idle.clone())).await, Effect::Ignored);
    assert!(!idle.path.exists());

    h.send_all(USER, vec![Event::Start(Workflow::Logo)]).await;
    let early = h.video_artifact("early.mp4").unwrap();
    h.send(USER, Event::File(early.clone())).await;
    assert!(!early.path.exists());
    assert!(h.videos.uploads().await.is_empty());
}

#[tokio::test]
async fn thumbnails_can_be_left_to_youtube() {
    let h = TestHarness::builder()
        .without_thumbnails()
        .build()
        .await
        .unwrap();
    let video = h.video_artifact("clip.mp4").unwrap();

    let effect = h
        .send_all(
            USER,
            vec![
                Event::Start(Workflow::Upload),
                Event::Text("Cooking pasta".into()),
                Event::File(video),
            ],
        )
        .await;
    let (job_id, outcome, _) = finished(&effect);
    assert!(outcome.is_success());
    assert!(h.thumbnails.titles().await.is_empty());
    assert!(h.videos.thumbnails().await.is_empty());

    let job = h.job(job_id).await.unwrap().expect("job exists");
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.note, None);
}

#[tokio::test]
async fn linked_account_shows_on_menu_and_profile() {
    let h = TestHarness::builder()
        .with_linked_youtube()
        .build()
        .await
        .unwrap();

    assert_eq!(h.send(USER, Event::Home).await, Effect::Menu { connected: true });
    match h.send(USER, Event::Profile).await {
        Effect::Profile { user, .. } => assert!(user.connected),
        other => panic!("expected Profile, got {other:?}"),
    }
    let stored = h
        .storage
        .get_user(&reelsmith_core::UserId(USER.into()))
        .await
        .unwrap()
        .expect("user row");
    assert!(stored.connected);
}

#[tokio::test]
async fn statistics_leave_the_dialogue_untouched() {
    let h = TestHarness::new().await.unwrap();
    h.send_all(USER, vec![Event::Start(Workflow::Logo)]).await;
    let before = h.state(USER).await.unwrap();

    match h.send(USER, Event::Statistics).await {
        Effect::Statistics { stats } => {
            assert_eq!(stats.title, "Mock Channel");
            assert_eq!(stats.subscribers, 10);
        }
        other => panic!("expected Statistics, got {other:?}"),
    }
    assert_eq!(h.state(USER).await.unwrap(), before);
    assert!(h.jobs_of(USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn statistics_failure_is_reported() {
    let h = TestHarness::new().await.unwrap();
    h.videos.set_stats(Err("quotaExceeded".into())).await;

    let effect = h.send(USER, Event::Statistics).await;
    assert!(
        matches!(&effect, Effect::StatisticsUnavailable { reason } if reason.contains("quotaExceeded")),
        "got {effect:?}"
    );
}
