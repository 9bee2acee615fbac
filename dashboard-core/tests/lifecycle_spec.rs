use speculate2::speculate;

speculate! {
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    use dashboard_core::error::{DashboardError, LifecycleError, ValidationError};
    use dashboard_core::lifecycle::*;
    use dashboard_core::models::{CreateTaskInput, Task, TaskForm, TaskStatus};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    fn task(title: &str, status: TaskStatus) -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            status,
            due_date: None,
            completed_at: (status == TaskStatus::Complete).then(|| at(8)),
            completion_notes: None,
            scheduler_job_id: None,
            created_at: at(7),
            updated_at: at(7),
        }
    }

    describe "completed_at" {
        it "is stamped when a task becomes complete" {
            let effect = CompletedAt::for_transition(Some(TaskStatus::Pending), TaskStatus::Complete, at(9));
            assert_eq!(effect, CompletedAt::Stamp(at(9)));
        }

        it "keeps the original stamp when a complete task stays complete" {
            let effect = CompletedAt::for_transition(Some(TaskStatus::Complete), TaskStatus::Complete, at(9));
            assert_eq!(effect, CompletedAt::Keep);
            assert_eq!(effect.as_patch(), None);
        }

        it "is cleared on every other transition" {
            for from in TaskStatus::ALL {
                for to in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Cancelled] {
                    let effect = CompletedAt::for_transition(Some(from), to, at(9));
                    assert_eq!(effect, CompletedAt::Clear);
                    assert_eq!(effect.as_patch(), Some(None));
                }
            }
        }

        it "holds exactly when the resulting status is complete" {
            for from in TaskStatus::ALL {
                for to in TaskStatus::ALL {
                    let t = task("any", from);
                    let patch = transition(&t, to, at(9), &TransitionPolicy::permissive()).unwrap();
                    let completed_at = match patch.completed_at {
                        Some(value) => value,
                        None => t.completed_at,
                    };
                    assert_eq!(completed_at.is_some(), to == TaskStatus::Complete);
                }
            }
        }
    }

    describe "toggle_complete" {
        it "completes a pending task" {
            let t = task("Draft proposal", TaskStatus::Pending);
            let patch = toggle_complete(&t, at(10));
            assert_eq!(patch.status, Some(TaskStatus::Complete));
            assert_eq!(patch.completed_at, Some(Some(at(10))));
        }

        it "completes in-progress and cancelled tasks too" {
            for status in [TaskStatus::InProgress, TaskStatus::Cancelled] {
                let patch = toggle_complete(&task("t", status), at(10));
                assert_eq!(patch.status, Some(TaskStatus::Complete));
            }
        }

        it "reopens a complete task as pending and clears completed_at" {
            let t = task("Draft proposal", TaskStatus::Complete);
            let patch = toggle_complete(&t, at(10));
            assert_eq!(patch.status, Some(TaskStatus::Pending));
            assert_eq!(patch.completed_at, Some(None));
        }

        it "returns to pending with no completion time after two toggles" {
            let mut t = task("Draft proposal", TaskStatus::Pending);
            for now in [at(10), at(11)] {
                let patch = toggle_complete(&t, now);
                t.status = patch.status.unwrap();
                if let Some(value) = patch.completed_at {
                    t.completed_at = value;
                }
            }
            assert_eq!(t.status, TaskStatus::Pending);
            assert_eq!(t.completed_at, None);
        }

        it "ignores a restrictive transition policy" {
            let policy = TransitionPolicy::permissive().deny(TaskStatus::Pending, TaskStatus::Complete);
            assert!(!policy.allows(TaskStatus::Pending, TaskStatus::Complete));
            let patch = toggle_complete(&task("t", TaskStatus::Pending), at(10));
            assert_eq!(patch.status, Some(TaskStatus::Complete));
        }
    }

    describe "transition policy" {
        it "allows everything by default" {
            let policy = TransitionPolicy::default();
            for from in TaskStatus::ALL {
                for to in TaskStatus::ALL {
                    assert!(policy.allows(from, to));
                }
            }
        }

        it "rejects a denied transition" {
            let policy = TransitionPolicy::permissive().deny(TaskStatus::Cancelled, TaskStatus::Complete);
            let t = task("t", TaskStatus::Cancelled);
            let err = transition(&t, TaskStatus::Complete, at(9), &policy).unwrap_err();
            assert_eq!(
                err,
                LifecycleError::TransitionDenied {
                    from: TaskStatus::Cancelled,
                    to: TaskStatus::Complete,
                }
            );
        }

        it "always allows staying put" {
            let policy = TransitionPolicy::permissive().deny(TaskStatus::Pending, TaskStatus::Pending);
            assert!(policy.allows(TaskStatus::Pending, TaskStatus::Pending));
        }
    }

    describe "edit" {
        it "writes every form field and stamps completion" {
            let t = task("Old title", TaskStatus::InProgress);
            let mut form = TaskForm::from_task(&t);
            form.title = "  New title ".to_string();
            form.status = TaskStatus::Complete;
            form.completion_notes = Some("Shipped".to_string());

            let patch = edit(&t, form, at(12), &TransitionPolicy::permissive()).unwrap();
            assert_eq!(patch.title.as_deref(), Some("New title"));
            assert_eq!(patch.status, Some(TaskStatus::Complete));
            assert_eq!(patch.completed_at, Some(Some(at(12))));
            assert_eq!(patch.completion_notes, Some(Some("Shipped".to_string())));
            assert_eq!(patch.description, Some(None));
        }

        it "rejects a blank title" {
            let t = task("Title", TaskStatus::Pending);
            let mut form = TaskForm::from_task(&t);
            form.title = "   ".to_string();
            let err = edit(&t, form, at(12), &TransitionPolicy::permissive()).unwrap_err();
            assert!(matches!(err, DashboardError::Validation(ValidationError::Required("title"))));
        }

        it "rejects a denied status change" {
            let t = task("Title", TaskStatus::Complete);
            let mut form = TaskForm::from_task(&t);
            form.status = TaskStatus::Pending;
            let policy = TransitionPolicy::permissive().deny(TaskStatus::Complete, TaskStatus::Pending);
            let err = edit(&t, form, at(12), &policy).unwrap_err();
            assert!(matches!(err, DashboardError::Lifecycle(_)));
        }
    }

    describe "prepare_create" {
        it "stamps tasks created as complete" {
            let input = CreateTaskInput {
                status: Some(TaskStatus::Complete),
                ..CreateTaskInput::new(Uuid::new_v4(), "Already done")
            };
            let input = prepare_create(input, at(9)).unwrap();
            assert_eq!(input.completed_at, Some(at(9)));
        }

        it "drops a caller-supplied completion time on open tasks" {
            let input = CreateTaskInput {
                completed_at: Some(at(3)),
                ..CreateTaskInput::new(Uuid::new_v4(), "Not done")
            };
            let input = prepare_create(input, at(9)).unwrap();
            assert_eq!(input.completed_at, None);
        }
    }

    describe "display order" {
        it "puts in-progress first, then pending, complete, cancelled" {
            let tasks = vec![
                task("cancelled", TaskStatus::Cancelled),
                task("complete", TaskStatus::Complete),
                task("pending", TaskStatus::Pending),
                task("in progress", TaskStatus::InProgress),
            ];
            let titles: Vec<&str> = in_display_order(&tasks).iter().map(|t| t.title.as_str()).collect();
            assert_eq!(titles, vec!["in progress", "pending", "complete", "cancelled"]);
        }

        it "keeps relative order within a status" {
            let mut tasks = vec![
                task("p1", TaskStatus::Pending),
                task("c1", TaskStatus::Complete),
                task("p2", TaskStatus::Pending),
                task("i1", TaskStatus::InProgress),
                task("p3", TaskStatus::Pending),
            ];
            sort_for_display(&mut tasks);
            let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
            assert_eq!(titles, vec!["i1", "p1", "p2", "p3", "c1"]);
        }

        it "shows completion notes only for finished tasks" {
            assert!(shows_completion_notes(TaskStatus::Complete));
            assert!(shows_completion_notes(TaskStatus::Cancelled));
            assert!(!shows_completion_notes(TaskStatus::Pending));
            assert!(!shows_completion_notes(TaskStatus::InProgress));
        }

        it "ranks statuses apart" {
            let mut ranks: Vec<u8> = TaskStatus::ALL.iter().map(|s| display_rank(*s)).collect();
            ranks.sort();
            ranks.dedup();
            assert_eq!(ranks.len(), TaskStatus::ALL.len());
        }
    }
}
