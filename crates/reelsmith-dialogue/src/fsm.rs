// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation state machine.
//!
//! [`advance`] is a pure function of the current [`ConversationState`] and one
//! [`Event`]. It never touches storage or collaborators; the orchestrator
//! persists the returned state and acts on the returned [`Signal`].
//!
//! Each workflow is a linear chain of steps:
//!
//! | workflow      | steps                                                       |
//! |---------------|-------------------------------------------------------------|
//! | seo           | `topic_pending`                                             |
//! | upload        | `topic_pending` -> `file_pending`                           |
//! | logo / banner | `description_pending` -> `style_pending` -> `confirmation_pending` |

use reelsmith_core::{Artifact, ConversationState, Event, Field, JobKind, Step, Workflow};

/// Image workflows, the ones that end in an explicit confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Logo,
    Banner,
}

impl ImageKind {
    pub fn job_kind(self) -> JobKind {
        match self {
            Self::Logo => JobKind::Logo,
            Self::Banner => JobKind::Banner,
        }
    }
}

/// Inputs collected by a finished dialogue, handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Seo {
        topic: String,
    },
    Image {
        kind: ImageKind,
        description: String,
        style: String,
    },
    Upload {
        topic: String,
        video: Artifact,
    },
}

/// What the orchestrator should do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Back at the top-level menu.
    Menu,
    /// Ask for the value of this step of the current workflow.
    Prompt(Step),
    /// Blank text at this step; nothing changed.
    EmptyInput(Step),
    /// The event does not apply here; nothing changed.
    Ignored,
    Cancelled,
    Rejected,
    /// The dialogue is complete and its operation should run.
    Submitted(Submission),
}

/// Result of feeding one event to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ConversationState,
    pub signal: Signal,
}

impl Transition {
    fn new(state: ConversationState, signal: Signal) -> Self {
        Self { state, signal }
    }

    fn idle(signal: Signal) -> Self {
        Self::new(ConversationState::idle(), signal)
    }

    fn unchanged(state: &ConversationState, signal: Signal) -> Self {
        Self::new(state.clone(), signal)
    }
}

/// Ordered steps of `workflow`.
pub fn steps(workflow: Workflow) -> &'static [Step] {
    match workflow {
        Workflow::Seo => &[Step::TopicPending],
        Workflow::Upload => &[Step::TopicPending, Step::FilePending],
        Workflow::Logo | Workflow::Banner => &[
            Step::DescriptionPending,
            Step::StylePending,
            Step::ConfirmationPending,
        ],
    }
}

/// The text field a step collects, if any.
pub fn field_for(step: Step) -> Option<Field> {
    match step {
        Step::TopicPending => Some(Field::Topic),
        Step::DescriptionPending => Some(Field::Description),
        Step::StylePending => Some(Field::Style),
        Step::FilePending | Step::ConfirmationPending => None,
    }
}

/// Feeds `event` to the machine in `state`.
pub fn advance(state: &ConversationState, event: Event) -> Transition {
    match event {
        Event::Start(workflow) => {
            let first = steps(workflow)[0];
            Transition::new(ConversationState::at(workflow, first), Signal::Prompt(first))
        }
        Event::Home => Transition::idle(Signal::Menu),
        Event::Cancel => Transition::idle(Signal::Cancelled),
        // Answered by the orchestrator from the job store.
        Event::Profile | Event::Statistics => Transition::unchanged(state, Signal::Ignored),
        event => match state.cursor {
            None => Transition::unchanged(state, Signal::Ignored),
            Some(cursor) => in_workflow(state, cursor.workflow, cursor.step, event),
        },
    }
}

fn in_workflow(state: &ConversationState, workflow: Workflow, step: Step, event: Event) -> Transition {
    match event {
        Event::Back => back(state, workflow, step),
        Event::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Transition::unchanged(state, Signal::EmptyInput(step));
            }
            match field_for(step) {
                Some(field) => {
                    let collected = state.clone().with_field(field, text);
                    forward(collected, workflow, step)
                }
                None => Transition::unchanged(state, Signal::Ignored),
            }
        }
        Event::File(video) if step == Step::FilePending => match state.field(Field::Topic) {
            Some(topic) => Transition::idle(Signal::Submitted(Submission::Upload {
                topic: topic.to_string(),
                video,
            })),
            None => Transition::idle(Signal::Cancelled),
        },
        Event::Confirm if step == Step::ConfirmationPending => submit(state, workflow),
        Event::Reject if step == Step::ConfirmationPending => Transition::idle(Signal::Rejected),
        _ => Transition::unchanged(state, Signal::Ignored),
    }
}

/// Moves past `step` after its field was collected.
fn forward(state: ConversationState, workflow: Workflow, step: Step) -> Transition {
    let chain = steps(workflow);
    let next = chain
        .iter()
        .position(|s| *s == step)
        .and_then(|i| chain.get(i + 1))
        .copied();

    match next {
        Some(next) => {
            let fields = state.fields;
            let moved = ConversationState {
                fields,
                ..ConversationState::at(workflow, next)
            };
            Transition::new(moved, Signal::Prompt(next))
        }
        None => submit(&state, workflow),
    }
}

fn back(state: &ConversationState, workflow: Workflow, step: Step) -> Transition {
    let chain = steps(workflow);
    match chain.iter().position(|s| *s == step) {
        Some(i) if i > 0 => {
            let previous = chain[i - 1];
            let mut fields = state.fields.clone();
            for s in &chain[i - 1..] {
                if let Some(field) = field_for(*s) {
                    fields.remove(&field);
                }
            }
            let moved = ConversationState {
                fields,
                ..ConversationState::at(workflow, previous)
            };
            Transition::new(moved, Signal::Prompt(previous))
        }
        _ => Transition::idle(Signal::Menu),
    }
}

/// Builds the submission from the collected fields. A dialogue missing a
/// field it should have collected is dropped rather than submitted.
fn submit(state: &ConversationState, workflow: Workflow) -> Transition {
    let submission = match workflow {
        Workflow::Seo => state.field(Field::Topic).map(|topic| Submission::Seo {
            topic: topic.to_string(),
        }),
        Workflow::Logo | Workflow::Banner => {
            let kind = if workflow == Workflow::Logo {
                ImageKind::Logo
            } else {
                ImageKind::Banner
            };
            match (state.field(Field::Description), state.field(Field::Style)) {
                (Some(description), Some(style)) => Some(Submission::Image {
                    kind,
                    description: description.to_string(),
                    style: style.to_string(),
                }),
                _ => None,
            }
        }
        // Uploads are submitted by the file event, never by text.
        Workflow::Upload => None,
    };

    match submission {
        Some(submission) => Transition::idle(Signal::Submitted(submission)),
        None => Transition::idle(Signal::Cancelled),
    }
}
