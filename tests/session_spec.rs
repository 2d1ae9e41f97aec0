use std::sync::Arc;

use emotion_canvas::ai::mock::{Reply, ScriptedCompletion};
use emotion_canvas::db::{MemorySessionStore, SessionStore};
use emotion_canvas::models::*;
use emotion_canvas::reappraisal::{REAPPRAISAL_EMPTY, REAPPRAISAL_UNAVAILABLE};
use emotion_canvas::session::{SessionError, SessionMachine, RESTART_MESSAGE, RESTART_PROMPT};
use speculate2::speculate;
use tokio_test::block_on;

fn machine_with(completion: ScriptedCompletion) -> (SessionMachine, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let machine = SessionMachine::new(store.clone(), Arc::new(completion));
    (machine, store)
}

speculate! {
    before {
        let completion = Arc::new(ScriptedCompletion::always("How does that feel?"));
        let store = Arc::new(MemorySessionStore::new());
        let machine = SessionMachine::new(store.clone(), completion.clone());
        let id = SessionId::new();
    }

    describe "view" {
        it "initializes a fresh session and asks question one" {
            block_on(async {
                let view = machine.view(id).await.expect("view failed");

                assert_eq!(view.question, "Question 1: How does that feel?");
                assert_eq!(view.step, 2);
                assert_eq!(view.progress, 16.67);

                let state = store.get(&id).expect("get failed").expect("state missing");
                assert_eq!(state.history, vec![HistoryEntry::system("Question 1: How does that feel?")]);
                assert!(state.responses.is_empty());
            });
        }

        it "advances the session every time it is viewed" {
            block_on(async {
                machine.view(id).await.expect("view failed");
                let second = machine.view(id).await.expect("view failed");

                assert_eq!(second.question, "Question 2: How does that feel?");
                assert_eq!(second.step, 3);
                assert_eq!(completion.requests().len(), 2);
            });
        }

        it "offers a restart once every question was asked" {
            block_on(async {
                for _ in 0..6 {
                    machine.view(id).await.expect("view failed");
                }
                let calls = completion.requests().len();

                let view = machine.view(id).await.expect("view failed");

                assert_eq!(view.question, RESTART_PROMPT);
                assert_eq!(view.step, 7);
                assert_eq!(view.progress, 100.0);
                assert_eq!(completion.requests().len(), calls);
            });
        }
    }

    describe "submit" {
        it "walks steps two through seven then restarts on the sixth answer" {
            block_on(async {
                let mut steps = Vec::new();
                let mut progress = Vec::new();

                let view = machine.view(id).await.expect("view failed");
                steps.push(machine.snapshot(id).expect("snapshot failed").step);
                progress.push(view.progress);

                for i in 1..=5 {
                    let result = machine.submit(id, format!("answer {}", i)).await.expect("submit failed");
                    assert!(!result.restart);
                    steps.push(machine.snapshot(id).expect("snapshot failed").step);
                    progress.push(result.progress);
                }

                assert_eq!(steps, vec![2, 3, 4, 5, 6, 7]);
                assert_eq!(progress, vec![16.67, 33.33, 50.0, 66.67, 83.33, 100.0]);

                let last = machine.submit(id, "answer 6".into()).await.expect("submit failed");
                assert!(last.restart);
                assert_eq!(last.question, RESTART_MESSAGE);
                assert_eq!(last.progress, 100.0);
                assert!(store.get(&id).expect("get failed").is_none());

                let fresh = machine.view(id).await.expect("view failed");
                assert_eq!(fresh.question, "Question 1: How does that feel?");
                assert_eq!(fresh.step, 2);
            });
        }

        it "starts an unborn session at question one" {
            block_on(async {
                let result = machine.submit(id, "hello".into()).await.expect("submit failed");

                assert_eq!(result.question, "Question 1: How does that feel?");
                assert_eq!(result.progress, 16.67);
                assert_eq!(result.responses, ResponsesPayload::List(vec!["hello".into()]));
            });
        }

        it "keeps responses in step with user history entries" {
            block_on(async {
                machine.view(id).await.expect("view failed");
                for text in ["red", "tummy", "school"] {
                    machine.submit(id, text.into()).await.expect("submit failed");
                }

                let state = store.get(&id).expect("get failed").expect("state missing");
                let user_entries: Vec<&str> = state
                    .history
                    .iter()
                    .filter(|e| e.speaker == Speaker::User)
                    .map(|e| e.text.as_str())
                    .collect();
                assert_eq!(user_entries, state.responses.iter().map(String::as_str).collect::<Vec<_>>());
                assert_eq!(state.history.len(), 7);
            });
        }

        it "reappraises the latest response when finishing" {
            block_on(async {
                machine.view(id).await.expect("view failed");
                for i in 1..=6 {
                    machine.submit(id, format!("r{}", i)).await.expect("submit failed");
                }

                let prompts = completion.prompts();
                assert!(prompts.last().expect("no prompts").ends_with(": r6"));
            });
        }

        it "keeps sessions independent" {
            block_on(async {
                let other = SessionId::new();
                machine.view(id).await.expect("view failed");
                machine.submit(id, "mine".into()).await.expect("submit failed");

                let snapshot = machine.snapshot(other).expect("snapshot failed");
                assert_eq!(snapshot.step, 1);
                assert!(snapshot.responses.is_empty());
                assert!(store.get(&other).expect("get failed").is_none());
            });
        }
    }

    describe "final advice" {
        it "falls back when the reappraisal call fails" {
            block_on(async {
                let script = (0..6).fold(
                    ScriptedCompletion::failing("down"),
                    |s, _| s.then(Reply::text("Next?")),
                );
                let (machine, _store) = machine_with(script);

                machine.view(id).await.expect("view failed");
                let mut last = None;
                for i in 1..=6 {
                    last = Some(machine.submit(id, format!("r{}", i)).await.expect("submit failed"));
                }

                let last = last.expect("no submissions");
                let ResponsesPayload::Report(report) = last.responses else {
                    panic!("expected report");
                };
                assert!(report.ends_with(&format!("Final Advice: {}", REAPPRAISAL_UNAVAILABLE)));
            });
        }

        it "asks to refine when the reappraisal is empty" {
            block_on(async {
                let script = (0..6).fold(ScriptedCompletion::empty(), |s, _| s.then(Reply::text("Next?")));
                let (machine, _store) = machine_with(script);

                machine.view(id).await.expect("view failed");
                for i in 1..=5 {
                    machine.submit(id, format!("r{}", i)).await.expect("submit failed");
                }
                let last = machine.submit(id, "r6".into()).await.expect("submit failed");

                let ResponsesPayload::Report(report) = last.responses else {
                    panic!("expected report");
                };
                assert!(report.ends_with(REAPPRAISAL_EMPTY));
            });
        }
    }

    describe "question failures" {
        it "propagates a typed error" {
            block_on(async {
                let (machine, store) = machine_with(ScriptedCompletion::failing("down"));

                let result = machine.view(id).await;

                assert!(matches!(result, Err(SessionError::Question(_))));
                assert!(store.is_empty());
            });
        }
    }
}
